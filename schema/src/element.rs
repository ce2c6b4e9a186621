use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum Element {
    Physical,
    Fire,
    Water,
    Electric,
    Flying,
    Void,
    Blood,
}

/// How a defending element reacts to an attacking element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Relation {
    Weak,
    Resistant,
    Immune,
}

impl Relation {
    pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

    pub fn multiplier(self) -> f64 {
        match self {
            Relation::Weak => 1.2,
            Relation::Resistant => 0.8,
            Relation::Immune => 0.0,
        }
    }

    /// Lookup order when a defender has several elements. The first relation
    /// found across all defender elements decides the multiplier.
    pub const PRIORITY: [Relation; 3] = [Relation::Weak, Relation::Resistant, Relation::Immune];
}

/// One entry of `types.ron`: the relations of `element` when it is attacked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementData {
    pub element: Element,
    #[serde(default)]
    pub weak_to: Vec<Element>,
    #[serde(default)]
    pub resistant_to: Vec<Element>,
    #[serde(default)]
    pub immune_to: Vec<Element>,
    #[serde(default)]
    pub can_extinguish: bool,
}

impl ElementData {
    pub fn relations(&self) -> impl Iterator<Item = (Element, Relation)> + '_ {
        self.weak_to
            .iter()
            .map(|e| (*e, Relation::Weak))
            .chain(self.resistant_to.iter().map(|e| (*e, Relation::Resistant)))
            .chain(self.immune_to.iter().map(|e| (*e, Relation::Immune)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_element_names_round_trip_through_strum() {
        for element in Element::iter() {
            let name = element.to_string();
            assert_eq!(name, name.to_uppercase());
            assert_eq!(Element::from_str(&name).unwrap(), element);
        }
    }

    #[test]
    fn test_relations_iterates_every_set() {
        let data = ElementData {
            element: Element::Void,
            weak_to: vec![],
            resistant_to: vec![Element::Physical],
            immune_to: vec![Element::Blood],
            can_extinguish: true,
        };
        let relations: Vec<_> = data.relations().collect();
        assert_eq!(
            relations,
            vec![
                (Element::Physical, Relation::Resistant),
                (Element::Blood, Relation::Immune)
            ]
        );
    }
}
