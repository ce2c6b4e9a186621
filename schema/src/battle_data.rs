use crate::Element;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive roll range. Negative values heal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageRange {
    pub low: i32,
    pub high: i32,
}

impl DamageRange {
    pub const ZERO: DamageRange = DamageRange { low: 0, high: 0 };

    pub fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// A range that can only produce `high`; rolling it never consumes randomness.
    pub fn is_degenerate(&self) -> bool {
        self.low >= self.high
    }

    pub fn is_zero(&self) -> bool {
        self.low == 0 && self.high == 0
    }

    pub fn is_healing(&self) -> bool {
        self.high < 0
    }

    pub fn sum(&self) -> i32 {
        self.low + self.high
    }

    pub fn average(&self) -> f64 {
        self.sum() as f64 / 2.0
    }
}

impl fmt::Display for DamageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_degenerate() {
            write!(f, "{}", self.high)
        } else {
            write!(f, "{}-{}", self.low, self.high)
        }
    }
}

/// Remaining lifetime of a status. `Turns(0)` lasts for the current turn only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusDuration {
    Turns(u8),
    Unbounded,
}

impl StatusDuration {
    pub fn is_expired(&self) -> bool {
        matches!(self, StatusDuration::Turns(0))
    }

    /// One tick later. `Unbounded` never changes and counters never go below zero.
    pub fn decremented(self) -> Self {
        match self {
            StatusDuration::Turns(n) => StatusDuration::Turns(n.saturating_sub(1)),
            StatusDuration::Unbounded => StatusDuration::Unbounded,
        }
    }

    /// Turns the status is expected to stay, with `Unbounded` treated as `cap`.
    pub fn capped(&self, cap: f64) -> f64 {
        match self {
            StatusDuration::Turns(n) => (*n as f64).min(cap),
            StatusDuration::Unbounded => cap,
        }
    }
}

impl fmt::Display for StatusDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusDuration::Turns(n) => write!(f, "{} turns", n),
            StatusDuration::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Shape of a status template as written in `statuses.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTemplate {
    pub name: String,
    pub element: Element,
    #[serde(default)]
    pub tick_damage: DamageRange,
    #[serde(default)]
    pub aim_mod: i32,
    #[serde(default)]
    pub defense_mod: i32,
    #[serde(default)]
    pub damage_mod: i32,
    /// When set, `damage_mod` only applies to moves of this element.
    #[serde(default)]
    pub damage_mod_scope: Option<Element>,
    pub duration: StatusDuration,
    #[serde(default)]
    pub stun: Option<u8>,
    #[serde(default)]
    pub thorn: DamageRange,
    /// Value of this status to its holder per remaining turn. AI only.
    #[serde(default)]
    pub extinguish_scoring: f64,
}

impl StatusTemplate {
    pub fn damage_mod_applies_to(&self, move_element: Element, include_unscoped: bool) -> bool {
        match self.damage_mod_scope {
            Some(scope) => scope == move_element,
            None => include_unscoped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Speed {
    Slowest = 1,
    Slow = 2,
    Normal = 3,
    Fast = 4,
    Fastest = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Targeting {
    SelfTargeted,
    OpponentTargeted { aim: i32 },
}

impl Targeting {
    pub fn is_offensive(&self) -> bool {
        matches!(self, Targeting::OpponentTargeted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusProcData {
    pub status: String,
    /// Percent chance per connecting attempt.
    pub chance: u8,
}

fn one_attempt() -> u8 {
    1
}

/// Shape of a move as written in `moves.ron`. Status procs refer to statuses by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub name: String,
    pub element: Element,
    pub speed: Speed,
    pub targeting: Targeting,
    #[serde(default)]
    pub damage: DamageRange,
    #[serde(default = "one_attempt")]
    pub hit_attempts: u8,
    #[serde(default)]
    pub status: Option<StatusProcData>,
    pub cooldown: u8,
    #[serde(default)]
    pub rage_cost: Option<u8>,
}
