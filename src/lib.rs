//! Creature Clash Battle Engine
//!
//! A turn-based, two-player creature battle simulator. Game content (elements,
//! statuses, moves, creatures and AI scoring tweaks) lives in RON data files
//! that are validated into an immutable registry; battles run turn by turn
//! against that registry with either human or AI players.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod creature;
pub mod errors;
pub mod player;
pub mod registry;
pub mod teams;

// --- PUBLIC API RE-EXPORTS ---

// Data definitions from the `schema` crate.
pub use schema::{DamageRange, Element, Speed, StatusDuration, StatusTemplate, Targeting};

// Core battle engine functions and state.
pub use battle::ai::{AiState, AiTraits, Assumption, Behavior};
pub use battle::engine::{
    collect_ai_actions, prepare_turn, ready_for_turn_resolution, resolve_turn, start_battle,
    submit_action,
};
pub use battle::runner::{BattleRunner, MatchOutcome, MatchSummary, MoveRequester, Presenter};
pub use battle::scoring::score_move;
pub use battle::state::{BattleEvent, BattleState, EventBus, GameState, TurnRng};

// Core runtime types for a battle.
pub use creature::CreatureInst;
pub use player::{MoveChoice, Player, PlayerType};
pub use registry::{CreatureId, MoveId, Registry, StatusId, MAX_AI_LEVEL};
pub use teams::{MatchConfig, PlayerConfig};

// Crate-specific error and result types.
pub use errors::{
    ActionError, BattleEngineError, BattleResult, BattleStateError, DataError, DataResult,
};
