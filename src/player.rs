use crate::battle::ai::{AiState, Assumption};
use crate::creature::CreatureInst;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveChoice {
    // The index refers to the move's position in the active creature's move list.
    UseMove { move_index: usize },

    // Forced when the active creature starts the turn stunned.
    Stunned,

    // Forced when every move is cooling down.
    Pass,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PlayerType {
    Human,
    Ai(AiState),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Player {
    pub player_id: String,
    pub player_name: String,

    // Creatures fight in roster order; fainted ones stay in place.
    pub roster: Vec<CreatureInst>,
    pub active_index: usize,

    pub player_type: PlayerType,

    // What the AI expected the opponent to do this turn, checked once the opponent moves.
    pub pending_assumption: Option<Assumption>,
}

impl Player {
    pub fn new(
        player_id: String,
        player_name: String,
        roster: Vec<CreatureInst>,
        player_type: PlayerType,
    ) -> Self {
        Player {
            player_id,
            player_name,
            roster,
            active_index: 0,
            player_type,
            pending_assumption: None,
        }
    }

    pub fn active(&self) -> &CreatureInst {
        &self.roster[self.active_index]
    }

    pub fn active_mut(&mut self) -> &mut CreatureInst {
        &mut self.roster[self.active_index]
    }

    /// The next creature after the active one that can still fight.
    pub fn next_available_index(&self) -> Option<usize> {
        (self.active_index + 1..self.roster.len()).find(|i| !self.roster[*i].is_fainted())
    }

    pub fn switch_to(&mut self, index: usize) {
        self.active_index = index;
        if let PlayerType::Ai(ai) = &mut self.player_type {
            ai.reset_novelty(self.roster[index].moves.len());
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.roster.iter().all(|creature| creature.is_fainted())
    }

    pub fn ai_level(&self) -> Option<u8> {
        match &self.player_type {
            PlayerType::Ai(ai) => Some(ai.level),
            PlayerType::Human => None,
        }
    }
}

const FIRST_NAMES: [&str; 10] = [
    "ADA", "BORYS", "CELINA", "DAREK", "EDYTA", "FELIKS", "GRETA", "HUGO", "IRENA", "JONAS",
];
const LAST_NAMES: [&str; 10] = [
    "ASHFORD", "BRANDT", "COLE", "DRAKE", "EMBER", "FROST", "GALE", "HOLLOW", "IRONS", "JURA",
];

/// A name for an AI opponent that was configured without one.
pub fn random_player_name() -> String {
    let mut rng = rand::rng();
    let first = FIRST_NAMES.choose(&mut rng).copied().unwrap_or("NAMELESS");
    let last = LAST_NAMES.choose(&mut rng).copied().unwrap_or("RIVAL");
    format!("{} {}", first, last)
}
