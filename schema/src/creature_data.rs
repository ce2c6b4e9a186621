use crate::Element;
use serde::{Deserialize, Serialize};

/// A species as written in `creatures.ron`. Moves are referenced by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub health: i32,
    #[serde(default)]
    pub defense: i32,
    pub elements: Vec<Element>,
    pub moves: Vec<String>,
    #[serde(default)]
    pub rage_move: Option<String>,
}

/// Root of `creatures.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterData {
    /// Appended to every creature's move list after its own moves.
    pub universal_move: String,
    pub creatures: Vec<CreatureData>,
}

/// Hand-tuned multiplier for one (creature, move[, opponent]) combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringOverride {
    pub creature: String,
    #[serde(rename = "move")]
    pub move_name: String,
    #[serde(default)]
    pub opponent: Option<String>,
    pub multiplier: f64,
}

/// Root of `scoring.ron`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoringData {
    #[serde(default)]
    pub overrides: Vec<ScoringOverride>,
}
