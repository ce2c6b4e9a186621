// Creature Clash Schema - shared data definitions
// The element enum and the serializable shapes of the game data files
// (types, statuses, moves, creatures, scoring overrides).

pub use battle_data::*;
pub use creature_data::*;
pub use element::*;

pub mod battle_data;
pub mod creature_data;
pub mod element;
