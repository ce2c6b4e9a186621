use crate::battle::ai::{AiState, AiTraits};
use crate::battle::state::{BattleState, TurnRng};
use crate::battle::status::apply_status;
use crate::creature::CreatureInst;
use crate::player::{Player, PlayerType};
use crate::registry::Registry;
use std::sync::Arc;

pub fn test_registry() -> Arc<Registry> {
    match Registry::standard() {
        Ok(registry) => registry,
        Err(err) => panic!("Failed to load embedded game data: {}", err),
    }
}

/// A builder for creating test creature instances with common defaults.
///
/// # Example
/// ```ignore
/// let fragonire = TestCreatureBuilder::new("FRAGONIRE")
///     .with_health(20)
///     .with_status("BURNING")
///     .build(&registry);
/// ```
pub struct TestCreatureBuilder {
    name: String,
    health: Option<i32>,
    statuses: Vec<String>,
    cooldowns: Vec<(usize, u8)>,
    rage: Option<u8>,
}

impl TestCreatureBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            health: None,
            statuses: Vec::new(),
            cooldowns: Vec::new(),
            rage: None,
        }
    }

    /// Sets the current health. If not set, health will be max.
    pub fn with_health(mut self, health: i32) -> Self {
        self.health = Some(health);
        self
    }

    /// Applies a status by name, as if it had just landed.
    pub fn with_status(mut self, status: &str) -> Self {
        self.statuses.push(status.to_string());
        self
    }

    pub fn with_cooldown(mut self, slot: usize, turns: u8) -> Self {
        self.cooldowns.push((slot, turns));
        self
    }

    pub fn with_rage(mut self, rage: u8) -> Self {
        self.rage = Some(rage);
        self
    }

    pub fn build(self, registry: &Registry) -> CreatureInst {
        let species = match registry.creature_id(&self.name) {
            Ok(id) => id,
            Err(err) => panic!("Unknown test creature {}: {}", self.name, err),
        };
        let mut creature = CreatureInst::new(registry, species);

        if let Some(health) = self.health {
            creature.set_health(health);
        }
        for name in &self.statuses {
            let status = match registry.status_id(name) {
                Ok(id) => id,
                Err(err) => panic!("Unknown test status {}: {}", name, err),
            };
            apply_status(registry, &mut creature, status);
        }
        for (slot, turns) in self.cooldowns {
            creature.cooldowns[slot] = turns;
        }
        if let Some(rage) = self.rage {
            creature.rage = rage;
        }
        creature
    }
}

/// Slot of the move called `move_name` on `creature`.
pub fn slot_of(registry: &Registry, creature: &CreatureInst, move_name: &str) -> usize {
    creature
        .moves
        .iter()
        .position(|id| registry.move_template(*id).name == move_name)
        .unwrap_or_else(|| panic!("{} does not know {}", creature.name, move_name))
}

pub fn roster_of(registry: &Registry, names: &[&str]) -> Vec<CreatureInst> {
    names
        .iter()
        .map(|name| TestCreatureBuilder::new(name).build(registry))
        .collect()
}

/// Creates a battle between two human players.
pub fn create_test_battle(player1: &[&str], player2: &[&str]) -> BattleState {
    let registry = test_registry();
    let p1 = Player::new(
        "p1".to_string(),
        "ALICE".to_string(),
        roster_of(&registry, player1),
        PlayerType::Human,
    );
    let p2 = Player::new(
        "p2".to_string(),
        "BOB".to_string(),
        roster_of(&registry, player2),
        PlayerType::Human,
    );
    BattleState::new("test_battle".to_string(), registry, p1, p2)
}

/// Creates a battle between two AI players with fixed, middling traits.
pub fn create_ai_battle(
    player1: &[&str],
    player2: &[&str],
    level1: u8,
    level2: u8,
) -> BattleState {
    let mut state = create_test_battle(player1, player2);
    let traits = AiTraits {
        risk_aversion: 0.5,
        blunder_assumption: 0.3,
    };
    for (player, level) in state.players.iter_mut().zip([level1, level2]) {
        let move_count = player.active().moves.len();
        player.player_type = PlayerType::Ai(AiState::with_traits(level, traits, move_count));
    }
    state
}

/// Every draw lands in the middle: percent 50, unit 0.5.
pub fn predictable_rng() -> TurnRng {
    TurnRng::new_for_test(vec![50; 200])
}
