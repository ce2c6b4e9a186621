use crate::errors::ActionError;
use crate::registry::{CreatureId, MoveId, Registry, StatusId};
use schema::{Element, StatusDuration};
use serde::{Deserialize, Serialize};

/// Rage points stop accumulating here.
pub const MAX_RAGE: u8 = 10;

/// A status attached to one creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusOccurrence {
    pub status: StatusId,
    pub remaining: StatusDuration,
    /// `None` once the stun has worn off (or if the status never stuns).
    pub stun: Option<u8>,
    /// Status element against the holder's elements, fixed when applied.
    pub multiplier: f64,
}

/// A creature taking part in a battle. Created from a species and kept for the
/// whole match, fainted or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureInst {
    pub species: CreatureId,
    pub name: String,
    pub elements: Vec<Element>,
    pub defense: i32,
    pub max_health: i32,
    health: i32,
    pub moves: Vec<MoveId>,
    pub cooldowns: Vec<u8>,
    pub statuses: Vec<StatusOccurrence>,
    pub rage: u8,
    pub total_healed: i32,
    pub move_uses: Vec<u32>,
}

impl CreatureInst {
    pub fn new(registry: &Registry, species: CreatureId) -> Self {
        let data = registry.species(species);
        Self {
            species,
            name: data.name.clone(),
            elements: data.elements.clone(),
            defense: data.defense,
            max_health: data.max_health,
            health: data.max_health,
            moves: data.moves.clone(),
            cooldowns: vec![0; data.moves.len()],
            statuses: Vec::new(),
            rage: 0,
            total_healed: 0,
            move_uses: vec![0; data.moves.len()],
        }
    }

    pub fn health(&self) -> i32 {
        self.health
    }

    /// Sets health directly, clamped to `[0, max_health]`.
    pub fn set_health(&mut self, health: i32) {
        self.health = health.clamp(0, self.max_health);
    }

    /// Returns the health actually lost.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.set_health(self.health - amount.max(0));
        before - self.health
    }

    /// Returns the health actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.health;
        self.set_health(self.health + amount.max(0));
        let healed = self.health - before;
        self.total_healed += healed;
        healed
    }

    pub fn is_fainted(&self) -> bool {
        self.health <= 0
    }

    pub fn is_stunned(&self) -> bool {
        self.statuses.iter().any(|occurrence| occurrence.stun.is_some())
    }

    pub fn has_status(&self, status: StatusId) -> bool {
        self.statuses.iter().any(|occurrence| occurrence.status == status)
    }

    pub fn gain_rage(&mut self) {
        self.rage = (self.rage + 1).min(MAX_RAGE);
    }

    /// Checks cooldown and rage for the move in `slot`.
    pub fn check_move_ready(&self, registry: &Registry, slot: usize) -> Result<(), ActionError> {
        let move_id = *self
            .moves
            .get(slot)
            .ok_or(ActionError::InvalidMoveIndex(slot))?;
        if self.cooldowns[slot] > 0 {
            return Err(ActionError::MoveOnCooldown {
                move_index: slot,
                turns_remaining: self.cooldowns[slot],
            });
        }
        if let Some(cost) = registry.move_template(move_id).rage_cost {
            if self.rage < cost {
                return Err(ActionError::InsufficientRage {
                    move_index: slot,
                    required: cost,
                    available: self.rage,
                });
            }
        }
        Ok(())
    }

    /// Slots of every move that could be chosen right now.
    pub fn legal_moves(&self, registry: &Registry) -> Vec<usize> {
        (0..self.moves.len())
            .filter(|slot| self.check_move_ready(registry, *slot).is_ok())
            .collect()
    }

    /// Puts the move on cooldown, pays its rage cost and counts the use.
    pub fn record_move_use(&mut self, registry: &Registry, slot: usize) {
        let template = registry.move_template(self.moves[slot]);
        // Counted from the next cooldown tick, so a cooldown of 1 skips one turn.
        self.cooldowns[slot] = template.cooldown.saturating_add(1);
        if let Some(cost) = template.rage_cost {
            self.rage = self.rage.saturating_sub(cost);
        }
        self.move_uses[slot] += 1;
    }

    pub fn tick_cooldowns(&mut self) {
        for cooldown in self.cooldowns.iter_mut() {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    pub fn aim_modifier(&self, registry: &Registry) -> i32 {
        self.statuses
            .iter()
            .map(|occurrence| registry.status(occurrence.status).aim_mod)
            .sum()
    }

    pub fn defense_modifier(&self, registry: &Registry) -> i32 {
        self.statuses
            .iter()
            .map(|occurrence| registry.status(occurrence.status).defense_mod)
            .sum()
    }

    /// Damage modifiers that apply to a move of `element`. Unscoped modifiers
    /// only count when `include_unscoped` is set (opponent-targeted moves).
    pub fn damage_modifier(
        &self,
        registry: &Registry,
        element: Element,
        include_unscoped: bool,
    ) -> i32 {
        self.statuses
            .iter()
            .map(|occurrence| registry.status(occurrence.status))
            .filter(|template| template.damage_mod_applies_to(element, include_unscoped))
            .map(|template| template.damage_mod)
            .sum()
    }
}
