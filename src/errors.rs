use schema::Element;
use std::fmt;

/// Main error type for the Creature Clash battle engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleEngineError {
    /// Error while loading or validating game data
    Data(DataError),
    /// Error related to invalid battle state
    BattleState(BattleStateError),
    /// Error related to invalid player actions
    Action(ActionError),
}

/// Errors raised while building the registry from data files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    /// A data source could not be read
    Io { path: String, message: String },
    /// A data source is not valid RON for its schema
    Parse { source_name: String, message: String },
    /// An element pair was listed in more than one relation set
    ConflictingRelation { defender: Element, attacker: Element },
    /// The same element was described twice
    DuplicateElement(Element),
    /// A name was defined more than once in the same file
    DuplicateName(String),
    UnknownStatus(String),
    UnknownMove(String),
    UnknownCreature(String),
    /// Move data is malformed or incomplete
    InvalidMove { name: String, reason: String },
    /// Creature data is malformed or incomplete
    InvalidCreature { name: String, reason: String },
    /// A damage, tick or thorn range whose low end is above its high end
    InvertedRange { name: String, field: String },
    /// A match config must name exactly two players
    PlayerCount(usize),
}

/// Errors related to battle state validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BattleStateError {
    /// The battle already reached a terminal state
    BattleOver,
    /// Actions were submitted or resolved outside of action selection
    NotAcceptingActions,
    /// Invalid player index
    InvalidPlayerIndex(usize),
    /// A player was configured without any creatures
    EmptyRoster(String),
    /// AI level outside the supported range
    InvalidAiLevel(u8),
}

/// Errors related to player actions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Move index is out of bounds
    InvalidMoveIndex(usize),
    /// The move was used too recently
    MoveOnCooldown { move_index: usize, turns_remaining: u8 },
    /// Not enough rage for the move
    InsufficientRage { move_index: usize, required: u8, available: u8 },
    /// The active creature is stunned and cannot choose a move
    CreatureStunned,
    /// Stunned or Pass was chosen while a move could be used
    ChoiceNotForced,
    /// An action was already queued for this player
    ActionAlreadyQueued(usize),
    /// The move requester kept returning illegal moves
    TooManyInvalidChoices(usize),
}

impl fmt::Display for BattleEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleEngineError::Data(err) => write!(f, "Data error: {}", err),
            BattleEngineError::BattleState(err) => write!(f, "Battle state error: {}", err),
            BattleEngineError::Action(err) => write!(f, "Action error: {}", err),
        }
    }
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io { path, message } => write!(f, "Failed to read {}: {}", path, message),
            DataError::Parse {
                source_name,
                message,
            } => write!(f, "Failed to parse {}: {}", source_name, message),
            DataError::ConflictingRelation { defender, attacker } => write!(
                f,
                "{} lists {} in more than one relation set",
                defender, attacker
            ),
            DataError::DuplicateElement(element) => {
                write!(f, "Element described twice: {}", element)
            }
            DataError::DuplicateName(name) => write!(f, "Name defined twice: {}", name),
            DataError::UnknownStatus(name) => write!(f, "Unknown status: {}", name),
            DataError::UnknownMove(name) => write!(f, "Unknown move: {}", name),
            DataError::UnknownCreature(name) => write!(f, "Unknown creature: {}", name),
            DataError::InvalidMove { name, reason } => {
                write!(f, "Invalid move {}: {}", name, reason)
            }
            DataError::InvalidCreature { name, reason } => {
                write!(f, "Invalid creature {}: {}", name, reason)
            }
            DataError::InvertedRange { name, field } => {
                write!(f, "{} of {} has its low end above its high end", field, name)
            }
            DataError::PlayerCount(count) => {
                write!(f, "A match needs exactly 2 players, found {}", count)
            }
        }
    }
}

impl fmt::Display for BattleStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BattleStateError::BattleOver => write!(f, "The battle is already over"),
            BattleStateError::NotAcceptingActions => {
                write!(f, "The battle is not waiting for actions")
            }
            BattleStateError::InvalidPlayerIndex(index) => {
                write!(f, "Invalid player index: {}", index)
            }
            BattleStateError::EmptyRoster(player) => {
                write!(f, "Player {} has no creatures", player)
            }
            BattleStateError::InvalidAiLevel(level) => write!(f, "Invalid AI level: {}", level),
        }
    }
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::InvalidMoveIndex(index) => write!(f, "Invalid move index: {}", index),
            ActionError::MoveOnCooldown {
                move_index,
                turns_remaining,
            } => write!(
                f,
                "Move {} is on cooldown for {} more turn(s)",
                move_index, turns_remaining
            ),
            ActionError::InsufficientRage {
                move_index,
                required,
                available,
            } => write!(
                f,
                "Move {} needs {} rage, only {} available",
                move_index, required, available
            ),
            ActionError::CreatureStunned => write!(f, "The active creature is stunned"),
            ActionError::ChoiceNotForced => {
                write!(f, "Only a stunned creature or one with no move ready may skip")
            }
            ActionError::ActionAlreadyQueued(index) => {
                write!(f, "Player {} already chose an action", index)
            }
            ActionError::TooManyInvalidChoices(index) => {
                write!(f, "Player {} kept choosing illegal moves", index)
            }
        }
    }
}

impl std::error::Error for BattleEngineError {}
impl std::error::Error for DataError {}
impl std::error::Error for BattleStateError {}
impl std::error::Error for ActionError {}

impl From<DataError> for BattleEngineError {
    fn from(err: DataError) -> Self {
        BattleEngineError::Data(err)
    }
}

impl From<BattleStateError> for BattleEngineError {
    fn from(err: BattleStateError) -> Self {
        BattleEngineError::BattleState(err)
    }
}

impl From<ActionError> for BattleEngineError {
    fn from(err: ActionError) -> Self {
        BattleEngineError::Action(err)
    }
}

/// Type alias for Results using BattleEngineError
pub type BattleResult<T> = Result<T, BattleEngineError>;

/// Type alias for Results using DataError
pub type DataResult<T> = Result<T, DataError>;
