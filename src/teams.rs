use crate::battle::ai::AiState;
use crate::battle::state::{BattleState, TurnRng};
use crate::creature::CreatureInst;
use crate::errors::{BattleResult, BattleStateError, DataError, DataResult};
use crate::player::{random_player_name, Player, PlayerType};
use crate::registry::{Registry, MAX_AI_LEVEL};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// One side of a match.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// A random name is picked when this is left out.
    #[serde(default)]
    pub name: Option<String>,
    /// Creature names, in the order they will fight.
    pub roster: Vec<String>,
    /// `None` for a human player.
    #[serde(default)]
    pub ai_level: Option<u8>,
}

impl PlayerConfig {
    pub fn human(name: &str, roster: &[&str]) -> Self {
        Self {
            name: Some(name.to_string()),
            roster: roster.iter().map(|name| name.to_string()).collect(),
            ai_level: None,
        }
    }

    pub fn ai(level: u8, roster: &[&str]) -> Self {
        Self {
            name: None,
            roster: roster.iter().map(|name| name.to_string()).collect(),
            ai_level: Some(level),
        }
    }
}

fn default_battle_id() -> String {
    "match".to_string()
}

/// Everything needed to set up a match. Can be read from RON:
///
/// ```ron
/// (
///     players: [
///         (name: Some("ALICE"), roster: ["FRAGONIRE", "PSAWARCA"]),
///         (roster: ["SCHONIPS", "SHIGOWI"], ai_level: Some(3)),
///     ],
///     seed: Some(7),
/// )
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchConfig {
    #[serde(default = "default_battle_id")]
    pub battle_id: String,
    /// Exactly two entries: player 1, then player 2.
    pub players: Vec<PlayerConfig>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl MatchConfig {
    pub fn new(player1: PlayerConfig, player2: PlayerConfig) -> Self {
        Self {
            battle_id: default_battle_id(),
            players: vec![player1, player2],
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn from_ron_str(text: &str) -> DataResult<Self> {
        let config: Self = ron::from_str(text).map_err(|e| DataError::Parse {
            source_name: "match config".to_string(),
            message: e.to_string(),
        })?;
        config.sides()?;
        Ok(config)
    }

    fn sides(&self) -> DataResult<(&PlayerConfig, &PlayerConfig)> {
        match self.players.as_slice() {
            [first, second] => Ok((first, second)),
            other => Err(DataError::PlayerCount(other.len())),
        }
    }

    pub fn load(path: &Path) -> DataResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| DataError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_ron_str(&text)
    }

    /// The battle's random source: seeded when a seed is configured.
    pub fn rng(&self) -> TurnRng {
        match self.seed {
            Some(seed) => TurnRng::from_seed(seed),
            None => TurnRng::new_random(),
        }
    }

    /// Resolves rosters against the registry and rolls AI traits from `rng`.
    pub fn build(&self, registry: Arc<Registry>, rng: &mut TurnRng) -> BattleResult<BattleState> {
        let (first, second) = self.sides()?;
        let player1 = build_player(&registry, "p1", first, rng)?;
        let player2 = build_player(&registry, "p2", second, rng)?;
        Ok(BattleState::new(
            self.battle_id.clone(),
            registry,
            player1,
            player2,
        ))
    }
}

fn build_player(
    registry: &Registry,
    player_id: &str,
    config: &PlayerConfig,
    rng: &mut TurnRng,
) -> BattleResult<Player> {
    let player_name = config.name.clone().unwrap_or_else(random_player_name);
    if config.roster.is_empty() {
        return Err(BattleStateError::EmptyRoster(player_name).into());
    }

    let roster = config
        .roster
        .iter()
        .map(|name| {
            registry
                .creature_id(name)
                .map(|species| CreatureInst::new(registry, species))
        })
        .collect::<DataResult<Vec<_>>>()?;

    let player_type = match config.ai_level {
        Some(level) if level > MAX_AI_LEVEL => {
            return Err(BattleStateError::InvalidAiLevel(level).into());
        }
        Some(level) => PlayerType::Ai(AiState::new(level, roster[0].moves.len(), rng)),
        None => PlayerType::Human,
    };
    debug!("{} ({}) fields {:?}", player_name, player_id, config.roster);

    Ok(Player::new(
        player_id.to_string(),
        player_name,
        roster,
        player_type,
    ))
}
