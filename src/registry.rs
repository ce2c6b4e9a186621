//! Immutable game data: the element chart, status templates, moves, creature
//! species and AI scoring overrides.
//!
//! Everything is parsed from RON once, names are resolved to handles, and the
//! result is shared behind an `Arc` for the lifetime of a match. The standard
//! data set is embedded in the binary; `Registry::load_from_dir` reads the same
//! files from disk.

use crate::errors::{DataError, DataResult};
use schema::{
    CreatureData, DamageRange, Element, ElementData, MoveData, Relation, RosterData, ScoringData,
    Speed, StatusDuration, StatusTemplate, Targeting,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, LazyLock};

/// Highest supported AI level. Level 0 plays randomly.
pub const MAX_AI_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StatusId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MoveId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(pub u16);

/// Directed relations between elements, keyed by (defender, attacker).
/// Keying by the pair makes a second relation for the same pair impossible.
#[derive(Debug, Clone, Default)]
pub struct TypeChart {
    relations: HashMap<(Element, Element), Relation>,
    extinguishers: HashSet<Element>,
}

impl TypeChart {
    pub fn from_data(entries: &[ElementData]) -> DataResult<Self> {
        let mut chart = TypeChart::default();
        let mut seen = HashSet::new();

        for entry in entries {
            if !seen.insert(entry.element) {
                return Err(DataError::DuplicateElement(entry.element));
            }
            if entry.can_extinguish {
                chart.extinguishers.insert(entry.element);
            }
            for (attacker, relation) in entry.relations() {
                if chart
                    .relations
                    .insert((entry.element, attacker), relation)
                    .is_some()
                {
                    return Err(DataError::ConflictingRelation {
                        defender: entry.element,
                        attacker,
                    });
                }
            }
        }

        Ok(chart)
    }

    pub fn relation(&self, defender: Element, attacker: Element) -> Option<Relation> {
        self.relations.get(&(defender, attacker)).copied()
    }

    /// Multiplier for `attacking` hitting something with `defenders` elements.
    ///
    /// Weakness on any defender element wins, then resistance, then immunity.
    /// Relations are never multiplied together.
    pub fn relationship(&self, attacking: Element, defenders: &[Element]) -> f64 {
        Relation::PRIORITY
            .iter()
            .find(|wanted| {
                defenders
                    .iter()
                    .any(|defender| self.relation(*defender, attacking) == Some(**wanted))
            })
            .map(|relation| relation.multiplier())
            .unwrap_or(Relation::NEUTRAL_MULTIPLIER)
    }

    pub fn can_extinguish(&self, element: Element) -> bool {
        self.extinguishers.contains(&element)
    }

    /// True when a status of element `holder` is washed away by `incoming`.
    pub fn is_weak_to(&self, holder: Element, incoming: Element) -> bool {
        self.relation(holder, incoming) == Some(Relation::Weak)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusProc {
    pub status: StatusId,
    pub chance: u8,
}

/// A move with its status reference resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTemplate {
    pub name: String,
    pub element: Element,
    pub speed: Speed,
    pub targeting: Targeting,
    pub damage: DamageRange,
    pub hit_attempts: u8,
    pub status: Option<StatusProc>,
    pub cooldown: u8,
    pub rage_cost: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: CreatureId,
    pub name: String,
    pub description: String,
    pub max_health: i32,
    pub defense: i32,
    pub elements: Vec<Element>,
    /// Own moves, then the universal move, then the rage move if any.
    pub moves: Vec<MoveId>,
}

/// Raw text of the five data files.
#[derive(Debug, Clone)]
pub struct DataSources {
    pub types: String,
    pub statuses: String,
    pub moves: String,
    pub creatures: String,
    pub scoring: String,
}

impl DataSources {
    pub fn embedded() -> Self {
        Self {
            types: include_str!("../data/types.ron").to_string(),
            statuses: include_str!("../data/statuses.ron").to_string(),
            moves: include_str!("../data/moves.ron").to_string(),
            creatures: include_str!("../data/creatures.ron").to_string(),
            scoring: include_str!("../data/scoring.ron").to_string(),
        }
    }

    pub fn read_dir(data_path: &Path) -> DataResult<Self> {
        let read = |file: &str| {
            let path = data_path.join(file);
            std::fs::read_to_string(&path).map_err(|e| DataError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        };
        Ok(Self {
            types: read("types.ron")?,
            statuses: read("statuses.ron")?,
            moves: read("moves.ron")?,
            creatures: read("creatures.ron")?,
            scoring: read("scoring.ron")?,
        })
    }
}

static STANDARD_REGISTRY: LazyLock<DataResult<Arc<Registry>>> =
    LazyLock::new(|| Registry::from_sources(&DataSources::embedded()).map(Arc::new));

#[derive(Debug, Clone)]
pub struct Registry {
    types: TypeChart,
    statuses: Vec<StatusTemplate>,
    moves: Vec<MoveTemplate>,
    species: Vec<Species>,
    status_names: HashMap<String, StatusId>,
    move_names: HashMap<String, MoveId>,
    species_names: HashMap<String, CreatureId>,
    scoring_overrides: HashMap<(CreatureId, MoveId, Option<CreatureId>), f64>,
    handicaps: Vec<Option<StatusId>>,
}

fn check_range(name: &str, field: &str, range: &DamageRange) -> DataResult<()> {
    if range.low > range.high {
        return Err(DataError::InvertedRange {
            name: name.to_string(),
            field: field.to_string(),
        });
    }
    Ok(())
}

fn parse<T: DeserializeOwned>(source_name: &str, text: &str) -> DataResult<T> {
    ron::from_str(text).map_err(|e| DataError::Parse {
        source_name: source_name.to_string(),
        message: e.to_string(),
    })
}

impl Registry {
    /// The embedded data set, parsed once per process.
    pub fn standard() -> DataResult<Arc<Registry>> {
        (*STANDARD_REGISTRY).clone()
    }

    pub fn load_from_dir(data_path: &Path) -> DataResult<Self> {
        Self::from_sources(&DataSources::read_dir(data_path)?)
    }

    pub fn from_sources(sources: &DataSources) -> DataResult<Self> {
        let type_data: Vec<ElementData> = parse("types.ron", &sources.types)?;
        let status_data: Vec<StatusTemplate> = parse("statuses.ron", &sources.statuses)?;
        let move_data: Vec<MoveData> = parse("moves.ron", &sources.moves)?;
        let roster: RosterData = parse("creatures.ron", &sources.creatures)?;
        let scoring: ScoringData = parse("scoring.ron", &sources.scoring)?;

        let mut registry = Registry {
            types: TypeChart::from_data(&type_data)?,
            statuses: Vec::new(),
            moves: Vec::new(),
            species: Vec::new(),
            status_names: HashMap::new(),
            move_names: HashMap::new(),
            species_names: HashMap::new(),
            scoring_overrides: HashMap::new(),
            handicaps: Vec::new(),
        };

        for status in status_data {
            registry.add_status(status)?;
        }
        for data in move_data {
            registry.add_move(data)?;
        }
        let universal = registry.move_id(&roster.universal_move)?;
        for creature in roster.creatures {
            registry.add_species(creature, universal)?;
        }
        for entry in scoring.overrides {
            let key = (
                registry.creature_id(&entry.creature)?,
                registry.move_id(&entry.move_name)?,
                entry
                    .opponent
                    .as_deref()
                    .map(|name| registry.creature_id(name))
                    .transpose()?,
            );
            registry.scoring_overrides.insert(key, entry.multiplier);
        }
        registry.add_handicaps();

        Ok(registry)
    }

    fn add_status(&mut self, template: StatusTemplate) -> DataResult<StatusId> {
        if self.status_names.contains_key(&template.name) {
            return Err(DataError::DuplicateName(template.name));
        }
        check_range(&template.name, "tick_damage", &template.tick_damage)?;
        check_range(&template.name, "thorn", &template.thorn)?;
        let id = StatusId(self.statuses.len() as u16);
        self.status_names.insert(template.name.clone(), id);
        self.statuses.push(template);
        Ok(id)
    }

    fn add_move(&mut self, data: MoveData) -> DataResult<()> {
        if self.move_names.contains_key(&data.name) {
            return Err(DataError::DuplicateName(data.name));
        }
        check_range(&data.name, "damage", &data.damage)?;
        if data.hit_attempts == 0 {
            return Err(DataError::InvalidMove {
                name: data.name,
                reason: "needs at least one hit attempt".to_string(),
            });
        }
        if data.status.as_ref().is_some_and(|proc| proc.chance > 100) {
            return Err(DataError::InvalidMove {
                name: data.name,
                reason: "status chance above 100".to_string(),
            });
        }
        let status = match &data.status {
            Some(proc) => Some(StatusProc {
                status: self.status_id(&proc.status)?,
                chance: proc.chance,
            }),
            None => None,
        };

        let id = MoveId(self.moves.len() as u16);
        self.move_names.insert(data.name.clone(), id);
        self.moves.push(MoveTemplate {
            name: data.name,
            element: data.element,
            speed: data.speed,
            targeting: data.targeting,
            damage: data.damage,
            hit_attempts: data.hit_attempts,
            status,
            cooldown: data.cooldown,
            rage_cost: data.rage_cost,
        });
        Ok(())
    }

    fn add_species(&mut self, data: CreatureData, universal: MoveId) -> DataResult<()> {
        if self.species_names.contains_key(&data.name) {
            return Err(DataError::DuplicateName(data.name));
        }
        let invalid = |reason: &str| DataError::InvalidCreature {
            name: data.name.clone(),
            reason: reason.to_string(),
        };
        if data.health <= 0 {
            return Err(invalid("health must be positive"));
        }
        if data.elements.is_empty() {
            return Err(invalid("needs at least one element"));
        }
        if data.moves.is_empty() {
            return Err(invalid("needs at least one move"));
        }

        let mut moves = data
            .moves
            .iter()
            .map(|name| self.move_id(name))
            .collect::<DataResult<Vec<_>>>()?;
        if moves.iter().any(|id| self.move_template(*id).rage_cost.is_some()) {
            return Err(invalid("rage moves belong in the rage_move slot"));
        }
        moves.push(universal);
        if let Some(rage_name) = &data.rage_move {
            let rage_move = self.move_id(rage_name)?;
            if self.move_template(rage_move).rage_cost.is_none() {
                return Err(invalid("rage_move has no rage cost"));
            }
            moves.push(rage_move);
        }

        let id = CreatureId(self.species.len() as u16);
        self.species_names.insert(data.name.clone(), id);
        self.species.push(Species {
            id,
            name: data.name,
            description: data.description,
            max_health: data.health,
            defense: data.defense,
            elements: data.elements,
            moves,
        });
        Ok(())
    }

    /// Handicap statuses for AI levels below the maximum. Aim and defense drop
    /// by 3 per missing level, and the two lowest levels also deal 1 less damage.
    fn add_handicaps(&mut self) {
        for level in 0..=MAX_AI_LEVEL {
            let missing = (MAX_AI_LEVEL - level) as i32;
            let stat_mod = -3 * missing;
            let damage_mod = if missing > 3 { -1 } else { 0 };
            if stat_mod == 0 && damage_mod == 0 {
                self.handicaps.push(None);
                continue;
            }
            let id = StatusId(self.statuses.len() as u16);
            self.statuses.push(StatusTemplate {
                name: format!("AI HANDICAP {}", level),
                element: Element::Physical,
                tick_damage: DamageRange::ZERO,
                aim_mod: stat_mod,
                defense_mod: stat_mod,
                damage_mod,
                damage_mod_scope: None,
                duration: StatusDuration::Unbounded,
                stun: None,
                thorn: DamageRange::ZERO,
                extinguish_scoring: 0.0,
            });
            self.handicaps.push(Some(id));
        }
    }

    pub fn types(&self) -> &TypeChart {
        &self.types
    }

    pub fn status(&self, id: StatusId) -> &StatusTemplate {
        &self.statuses[id.0 as usize]
    }

    pub fn move_template(&self, id: MoveId) -> &MoveTemplate {
        &self.moves[id.0 as usize]
    }

    pub fn species(&self, id: CreatureId) -> &Species {
        &self.species[id.0 as usize]
    }

    pub fn all_species(&self) -> &[Species] {
        &self.species
    }

    pub fn status_id(&self, name: &str) -> DataResult<StatusId> {
        self.status_names
            .get(name)
            .copied()
            .ok_or_else(|| DataError::UnknownStatus(name.to_string()))
    }

    pub fn move_id(&self, name: &str) -> DataResult<MoveId> {
        self.move_names
            .get(name)
            .copied()
            .ok_or_else(|| DataError::UnknownMove(name.to_string()))
    }

    pub fn creature_id(&self, name: &str) -> DataResult<CreatureId> {
        self.species_names
            .get(name)
            .copied()
            .ok_or_else(|| DataError::UnknownCreature(name.to_string()))
    }

    /// Hand-tuned multiplier for a move's score. An entry for the specific
    /// opponent takes precedence over one that applies to every opponent.
    pub fn scoring_override(
        &self,
        creature: CreatureId,
        move_id: MoveId,
        opponent: CreatureId,
    ) -> f64 {
        self.scoring_overrides
            .get(&(creature, move_id, Some(opponent)))
            .or_else(|| self.scoring_overrides.get(&(creature, move_id, None)))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn handicap_status(&self, level: u8) -> Option<StatusId> {
        self.handicaps.get(level as usize).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn standard() -> Arc<Registry> {
        Registry::standard().expect("embedded data should load")
    }

    #[test]
    fn test_standard_registry_loads_every_file() {
        let registry = standard();
        assert_eq!(registry.all_species().len(), 4);
        let fragonire = registry.species(registry.creature_id("FRAGONIRE").unwrap());
        assert_eq!(fragonire.max_health, 60);
        assert_eq!(fragonire.elements, vec![Element::Fire, Element::Physical]);
        // five own moves, the universal move, the rage move
        assert_eq!(fragonire.moves.len(), 7);
        assert_eq!(
            registry.move_template(fragonire.moves[5]).name,
            "BRACE".to_string()
        );
        assert!(registry.move_template(fragonire.moves[6]).rage_cost.is_some());
    }

    #[test]
    fn test_every_pair_has_at_most_one_relation() {
        let registry = standard();
        let chart = registry.types();
        for defender in Element::iter() {
            for attacker in Element::iter() {
                let matches = Relation::PRIORITY
                    .iter()
                    .filter(|r| chart.relation(defender, attacker) == Some(**r))
                    .count();
                assert!(matches <= 1, "{} vs {}", defender, attacker);
            }
        }
    }

    #[rstest]
    #[case(Element::Fire, vec![Element::Water, Element::Physical], 0.8)]
    #[case(Element::Water, vec![Element::Fire, Element::Physical], 1.2)]
    #[case(Element::Blood, vec![Element::Void, Element::Blood], 0.0)]
    #[case(Element::Physical, vec![Element::Fire], 1.0)]
    #[case(Element::Electric, vec![Element::Water, Element::Electric], 1.2)]
    #[case(Element::Fire, vec![Element::Blood, Element::Fire], 1.2)]
    fn test_relationship(
        #[case] attacking: Element,
        #[case] defenders: Vec<Element>,
        #[case] expected: f64,
    ) {
        assert_eq!(standard().types().relationship(attacking, &defenders), expected);
    }

    #[test]
    fn test_weakness_beats_immunity_on_dual_elements() {
        let chart = TypeChart::from_data(&[
            ElementData {
                element: Element::Void,
                weak_to: vec![],
                resistant_to: vec![],
                immune_to: vec![Element::Fire],
                can_extinguish: false,
            },
            ElementData {
                element: Element::Blood,
                weak_to: vec![Element::Fire],
                resistant_to: vec![],
                immune_to: vec![],
                can_extinguish: false,
            },
        ])
        .unwrap();
        assert_eq!(
            chart.relationship(Element::Fire, &[Element::Void, Element::Blood]),
            1.2
        );
    }

    #[rstest]
    #[case(Element::Physical, false)]
    #[case(Element::Flying, false)]
    #[case(Element::Blood, false)]
    #[case(Element::Water, true)]
    #[case(Element::Void, true)]
    fn test_can_extinguish(#[case] element: Element, #[case] expected: bool) {
        assert_eq!(standard().types().can_extinguish(element), expected);
    }

    #[test]
    fn test_conflicting_relation_is_rejected() {
        let result = TypeChart::from_data(&[ElementData {
            element: Element::Fire,
            weak_to: vec![Element::Water],
            resistant_to: vec![Element::Water],
            immune_to: vec![],
            can_extinguish: true,
        }]);
        assert_eq!(
            result.unwrap_err(),
            DataError::ConflictingRelation {
                defender: Element::Fire,
                attacker: Element::Water
            }
        );
    }

    #[test]
    fn test_unknown_status_reference_is_rejected() {
        let mut sources = DataSources::embedded();
        sources.moves = sources.moves.replace("\"BURNING\"", "\"SMOULDERING\"");
        assert_eq!(
            Registry::from_sources(&sources).unwrap_err(),
            DataError::UnknownStatus("SMOULDERING".to_string())
        );
    }

    #[test]
    fn test_inverted_move_damage_is_rejected() {
        let mut sources = DataSources::embedded();
        sources.moves = sources
            .moves
            .replace("damage: (low: 6, high: 12)", "damage: (low: 12, high: 6)");
        assert_eq!(
            Registry::from_sources(&sources).unwrap_err(),
            DataError::InvertedRange {
                name: "DRAGON CLAW".to_string(),
                field: "damage".to_string(),
            }
        );
    }

    #[test]
    fn test_inverted_thorn_is_rejected() {
        let mut sources = DataSources::embedded();
        sources.statuses = sources
            .statuses
            .replace("thorn: (low: 8, high: 12)", "thorn: (low: 12, high: 8)");
        assert_eq!(
            Registry::from_sources(&sources).unwrap_err(),
            DataError::InvertedRange {
                name: "BITING FLAMES".to_string(),
                field: "thorn".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_source_reports_file() {
        let mut sources = DataSources::embedded();
        sources.types = "[ (element: ".to_string();
        match Registry::from_sources(&sources) {
            Err(DataError::Parse { source_name, .. }) => assert_eq!(source_name, "types.ron"),
            other => panic!("expected parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_scoring_override_prefers_specific_opponent() {
        let registry = standard();
        let fragonire = registry.creature_id("FRAGONIRE").unwrap();
        let psawarca = registry.creature_id("PSAWARCA").unwrap();
        let schonips = registry.creature_id("SCHONIPS").unwrap();
        let shigowi = registry.creature_id("SHIGOWI").unwrap();
        let warmth = registry.move_id("WARMTH").unwrap();
        let reset = registry.move_id("RESET VOID").unwrap();

        assert_eq!(registry.scoring_override(fragonire, warmth, psawarca), 0.25);
        assert_eq!(registry.scoring_override(fragonire, warmth, schonips), 1.0);
        assert_eq!(registry.scoring_override(shigowi, reset, fragonire), 0.75);
    }

    #[rstest]
    #[case(0, -15, -1)]
    #[case(1, -12, -1)]
    #[case(4, -3, 0)]
    fn test_handicap_scales_with_level(
        #[case] level: u8,
        #[case] stat_mod: i32,
        #[case] damage_mod: i32,
    ) {
        let registry = standard();
        let status = registry.status(registry.handicap_status(level).unwrap());
        assert_eq!(status.aim_mod, stat_mod);
        assert_eq!(status.defense_mod, stat_mod);
        assert_eq!(status.damage_mod, damage_mod);
        assert_eq!(status.duration, StatusDuration::Unbounded);
    }

    #[test]
    fn test_top_level_has_no_handicap() {
        assert_eq!(standard().handicap_status(MAX_AI_LEVEL), None);
    }
}
