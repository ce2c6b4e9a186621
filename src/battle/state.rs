use crate::player::{MoveChoice, Player};
use crate::registry::Registry;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schema::Element;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Copy)]
pub enum GameState {
    WaitingForActions,
    TurnInProgress,
    Player1Win,
    Player2Win,
    Draw,
}

impl GameState {
    pub fn is_over(&self) -> bool {
        matches!(
            self,
            GameState::Player1Win | GameState::Player2Win | GameState::Draw
        )
    }
}

/// Why a creature's health changed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum HealthSource {
    Move(String),
    Graze(String),
    Status(String),
    Thorn,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // Turn Management
    TurnStarted {
        turn_number: u32,
    },
    TurnEnded,
    MoveOrderDecided {
        order: Vec<usize>,
        coin_flip: bool,
    },

    // Creature Actions
    CreatureEntered {
        player_index: usize,
        creature: String,
    },
    MoveUsed {
        player_index: usize,
        creature: String,
        move_name: String,
    },
    MoveHit {
        player_index: usize,
        move_name: String,
        roll: u32,
        hit_chance: i32,
    },
    MoveMissed {
        player_index: usize,
        move_name: String,
        roll: u32,
        hit_chance: i32,
    },
    AttackTypeEffectiveness {
        multiplier: f64,
    },
    StunnedSkipsTurn {
        player_index: usize,
        creature: String,
    },
    StunnedBeforeMoving {
        player_index: usize,
        creature: String,
    },
    NoMoveReady {
        player_index: usize,
        creature: String,
    },

    // Health
    Damaged {
        player_index: usize,
        creature: String,
        amount: i32,
        previous_health: i32,
        current_health: i32,
        source: HealthSource,
    },
    Healed {
        player_index: usize,
        creature: String,
        amount: i32,
        previous_health: i32,
        current_health: i32,
        source: HealthSource,
    },
    CreatureFainted {
        player_index: usize,
        creature: String,
    },

    // Statuses
    StatusApplied {
        player_index: usize,
        creature: String,
        status: String,
    },
    StatusExpired {
        player_index: usize,
        creature: String,
        status: String,
    },
    StatusExtinguished {
        player_index: usize,
        creature: String,
        status: String,
        by: Element,
    },
    RageGained {
        player_index: usize,
        rage: u8,
    },

    // Battle End
    PlayerDefeated {
        player_index: usize,
    },
    BattleEnded {
        winner: Option<usize>,
    },
}

/// Health change forwarded to a presenter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthChange {
    pub player_index: usize,
    pub creature: String,
    pub previous_health: i32,
    pub current_health: i32,
}

impl BattleEvent {
    /// Formats the event into up to two lines of narration.
    /// Returns None for silent events that should not produce user-visible text.
    pub fn lines(&self, battle_state: &BattleState) -> Option<(String, Option<String>)> {
        let single = |text: String| Some((text, None));
        match self {
            BattleEvent::TurnStarted { turn_number } => {
                single(format!("=== TURN {} ===", turn_number))
            }
            BattleEvent::TurnEnded => None,
            BattleEvent::MoveOrderDecided { .. } => None,

            BattleEvent::CreatureEntered {
                player_index,
                creature,
            } => {
                let player_name = &battle_state.players[*player_index].player_name;
                Some((
                    format!("{} JOINS THE BATTLE!", creature),
                    Some(format!("SENT OUT BY {}", player_name)),
                ))
            }
            BattleEvent::MoveUsed {
                creature,
                move_name,
                ..
            } => single(format!("{} USES {}!", creature, move_name)),
            BattleEvent::MoveHit { .. } => None,
            BattleEvent::MoveMissed { move_name, .. } => {
                single(format!("{} MISSED!", move_name))
            }
            BattleEvent::AttackTypeEffectiveness { multiplier } => match *multiplier {
                m if m > 1.0 => single("IT'S SUPER EFFECTIVE!".to_string()),
                m if m > 0.0 && m < 1.0 => single("IT'S NOT VERY EFFECTIVE...".to_string()),
                m if m == 0.0 => single("IT HAD NO EFFECT!".to_string()),
                _ => None,
            },
            BattleEvent::StunnedSkipsTurn { creature, .. } => {
                single(format!("{} IS STUNNED AND SKIPS THE TURN!", creature))
            }
            BattleEvent::StunnedBeforeMoving { creature, .. } => {
                single(format!("{} IS STUNNED AND CANNOT MOVE!", creature))
            }
            BattleEvent::NoMoveReady { creature, .. } => {
                single(format!("{} HAS NO MOVE READY!", creature))
            }

            BattleEvent::Damaged {
                creature,
                amount,
                source,
                ..
            } => {
                let detail = match source {
                    HealthSource::Move(_) => None,
                    HealthSource::Graze(_) => Some("A GLANCING BLOW!".to_string()),
                    HealthSource::Status(status) => Some(format!("FROM {}!", status)),
                    HealthSource::Thorn => Some("FROM RETALIATION!".to_string()),
                };
                Some((format!("{} TAKES {} DAMAGE!", creature, amount), detail))
            }
            BattleEvent::Healed {
                creature,
                amount,
                source,
                ..
            } => {
                let detail = match source {
                    HealthSource::Status(status) => Some(format!("FROM {}!", status)),
                    HealthSource::Thorn => Some("BY DRAINING ITS FOE!".to_string()),
                    _ => None,
                };
                Some((format!("{} RECOVERS {} HEALTH!", creature, amount), detail))
            }
            BattleEvent::CreatureFainted { creature, .. } => {
                single(format!("{} FAINTED!", creature))
            }

            BattleEvent::StatusApplied {
                creature, status, ..
            } => single(format!("{} IS AFFECTED BY {}!", creature, status)),
            BattleEvent::StatusExpired {
                creature, status, ..
            } => single(format!("{} WORE OFF FOR {}.", status, creature)),
            BattleEvent::StatusExtinguished {
                creature,
                status,
                by,
                ..
            } => Some((
                format!("{} WAS EXTINGUISHED!", status),
                Some(format!("{} WASHED IT AWAY FROM {}.", by, creature)),
            )),
            BattleEvent::RageGained { .. } => None,

            BattleEvent::PlayerDefeated { player_index } => {
                let player_name = &battle_state.players[*player_index].player_name;
                single(format!("{} HAS NO CREATURES LEFT!", player_name))
            }
            BattleEvent::BattleEnded { winner } => match winner {
                Some(index) => single(format!("PLAYER {} WINS!", index + 1)),
                None => single("DRAW! NO ONE WINS!".to_string()),
            },
        }
    }

    /// Formats the event into a single human-readable line.
    pub fn format(&self, battle_state: &BattleState) -> Option<String> {
        self.lines(battle_state).map(|(first, second)| match second {
            Some(second) => format!("{} {}", first, second),
            None => first,
        })
    }

    /// The health change carried by this event, if any.
    pub fn health_change(&self) -> Option<HealthChange> {
        match self {
            BattleEvent::Damaged {
                player_index,
                creature,
                previous_health,
                current_health,
                ..
            }
            | BattleEvent::Healed {
                player_index,
                creature,
                previous_health,
                current_health,
                ..
            } => Some(HealthChange {
                player_index: *player_index,
                creature: creature.clone(),
                previous_health: *previous_health,
                current_health: *current_health,
            }),
            _ => None,
        }
    }
}

/// Event bus for collecting and managing battle events.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    /// Print all events in debug format with indentation.
    pub fn print_debug(&self) {
        for event in &self.events {
            println!("  {:?}", event);
        }
    }

    /// Print all events in debug format with a custom prefix message.
    pub fn print_debug_with_message(&self, message: &str) {
        println!("{}", message);
        self.print_debug();
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl std::fmt::Display for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for event in &self.events {
            writeln!(f, "  {:?}", event)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
enum RngSource {
    Random(StdRng),
    Scripted { outcomes: Vec<u32>, index: usize },
}

/// The single source of randomness for a battle.
///
/// Every draw carries a label. In scripted mode the labels are printed during
/// tests, and running out of outcomes panics with the label that asked.
#[derive(Debug, Clone)]
pub struct TurnRng {
    source: RngSource,
}

impl TurnRng {
    /// Scripted outcomes, consumed in order. `percent` uses `v % 100`,
    /// `range` uses `low + v % span` and `unit` uses `(v % 100) / 100`.
    pub fn new_for_test(outcomes: Vec<u32>) -> Self {
        Self {
            source: RngSource::Scripted { outcomes, index: 0 },
        }
    }

    pub fn new_random() -> Self {
        Self {
            source: RngSource::Random(StdRng::from_os_rng()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: RngSource::Random(StdRng::seed_from_u64(seed)),
        }
    }

    fn next_scripted(outcomes: &[u32], index: &mut usize, reason: &str) -> u32 {
        if *index >= outcomes.len() {
            panic!(
                "TurnRng exhausted! Tried to get a value for: '{}'. Need more random values.",
                reason
            );
        }
        let outcome = outcomes[*index];

        #[cfg(test)]
        println!("[RNG] Consumed {} for: {}", outcome, reason);

        *index += 1;
        outcome
    }

    /// A roll in `[0, 100)`.
    pub fn percent(&mut self, reason: &str) -> u32 {
        match &mut self.source {
            RngSource::Random(rng) => rng.random_range(0..100),
            RngSource::Scripted { outcomes, index } => {
                Self::next_scripted(outcomes, index, reason) % 100
            }
        }
    }

    /// A roll in `[low, high]`. Degenerate ranges return `high` without drawing.
    pub fn range(&mut self, low: i32, high: i32, reason: &str) -> i32 {
        if low >= high {
            return high;
        }
        match &mut self.source {
            RngSource::Random(rng) => rng.random_range(low..=high),
            RngSource::Scripted { outcomes, index } => {
                let span = (high - low + 1) as u32;
                low + (Self::next_scripted(outcomes, index, reason) % span) as i32
            }
        }
    }

    /// A roll in `[0, 1)`.
    pub fn unit(&mut self, reason: &str) -> f64 {
        match &mut self.source {
            RngSource::Random(rng) => rng.random::<f64>(),
            RngSource::Scripted { outcomes, index } => {
                (Self::next_scripted(outcomes, index, reason) % 100) as f64 / 100.0
            }
        }
    }

    /// A roll in `[low, high)`. Degenerate ranges return `low` without drawing.
    pub fn uniform(&mut self, low: f64, high: f64, reason: &str) -> f64 {
        if low >= high {
            return low;
        }
        low + self.unit(reason) * (high - low)
    }

    pub fn coin_flip(&mut self, reason: &str) -> bool {
        self.percent(reason) < 50
    }
}

#[derive(Debug, Clone)]
pub struct BattleState {
    pub battle_id: String,
    pub registry: Arc<Registry>,
    pub players: [Player; 2],
    pub turn_number: u32,
    pub game_state: GameState,
    pub action_queue: [Option<MoveChoice>; 2],
}

impl BattleState {
    pub fn new(id: String, registry: Arc<Registry>, player1: Player, player2: Player) -> Self {
        Self {
            battle_id: id,
            registry,
            players: [player1, player2],
            turn_number: 1,
            game_state: GameState::WaitingForActions,
            action_queue: [None, None],
        }
    }

    pub fn winner(&self) -> Option<usize> {
        match self.game_state {
            GameState::Player1Win => Some(0),
            GameState::Player2Win => Some(1),
            _ => None,
        }
    }
}
