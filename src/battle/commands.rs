use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState, HealthSource};
use crate::battle::status::{apply_status, extinguish};
use crate::registry::StatusId;
use schema::Element;

/// Player target for commands - provides type safety over raw indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerTarget {
    Player1,
    Player2,
}

impl PlayerTarget {
    pub fn to_index(self) -> usize {
        match self {
            PlayerTarget::Player1 => 0,
            PlayerTarget::Player2 => 1,
        }
    }

    pub fn opponent(self) -> PlayerTarget {
        match self {
            PlayerTarget::Player1 => PlayerTarget::Player2,
            PlayerTarget::Player2 => PlayerTarget::Player1,
        }
    }

    pub fn from_index(index: usize) -> PlayerTarget {
        match index {
            0 => PlayerTarget::Player1,
            1 => PlayerTarget::Player2,
            _ => panic!("Invalid player index: {}", index),
        }
    }
}

/// Atomic commands representing final state changes
#[derive(Debug, Clone, PartialEq)]
pub enum BattleCommand {
    // Direct state changes
    SetGameState(GameState),
    IncrementTurnNumber,
    ClearActionQueue,

    // Active creature modifications
    DealDamage {
        target: PlayerTarget,
        amount: i32,
        source: HealthSource,
    },
    Heal {
        target: PlayerTarget,
        amount: i32,
        source: HealthSource,
    },
    ApplyStatus {
        target: PlayerTarget,
        status: StatusId,
    },
    Extinguish {
        target: PlayerTarget,
        element: Element,
    },
    GainRage {
        target: PlayerTarget,
    },
    RecordMoveUse {
        target: PlayerTarget,
        move_index: usize,
    },

    // Roster changes
    SwitchCreature {
        target: PlayerTarget,
        roster_index: usize,
    },

    // Event emission
    EmitEvent(BattleEvent),
}

/// Execute a batch of commands in order
pub fn execute_command_batch(
    commands: Vec<BattleCommand>,
    state: &mut BattleState,
    bus: &mut EventBus,
) {
    for command in commands {
        execute_command(command, state, bus);
    }
}

pub fn execute_command(command: BattleCommand, state: &mut BattleState, bus: &mut EventBus) {
    let registry = state.registry.clone();
    match command {
        BattleCommand::EmitEvent(event) => bus.push(event),
        BattleCommand::SetGameState(game_state) => state.game_state = game_state,
        BattleCommand::IncrementTurnNumber => state.turn_number += 1,
        BattleCommand::ClearActionQueue => state.action_queue = [None, None],

        BattleCommand::DealDamage {
            target,
            amount,
            source,
        } => {
            let player_index = target.to_index();
            let creature = state.players[player_index].active_mut();
            let previous_health = creature.health();
            let dealt = creature.take_damage(amount);
            if dealt > 0 {
                bus.push(BattleEvent::Damaged {
                    player_index,
                    creature: creature.name.clone(),
                    amount: dealt,
                    previous_health,
                    current_health: creature.health(),
                    source,
                });
            }
        }
        BattleCommand::Heal {
            target,
            amount,
            source,
        } => {
            let player_index = target.to_index();
            let creature = state.players[player_index].active_mut();
            let previous_health = creature.health();
            let healed = creature.heal(amount);
            if healed > 0 {
                bus.push(BattleEvent::Healed {
                    player_index,
                    creature: creature.name.clone(),
                    amount: healed,
                    previous_health,
                    current_health: creature.health(),
                    source,
                });
            }
        }
        BattleCommand::ApplyStatus { target, status } => {
            let player_index = target.to_index();
            let creature = state.players[player_index].active_mut();
            apply_status(&registry, creature, status);
            bus.push(BattleEvent::StatusApplied {
                player_index,
                creature: creature.name.clone(),
                status: registry.status(status).name.clone(),
            });
        }
        BattleCommand::Extinguish { target, element } => {
            let player_index = target.to_index();
            let creature = state.players[player_index].active_mut();
            for status in extinguish(&registry, creature, element) {
                bus.push(BattleEvent::StatusExtinguished {
                    player_index,
                    creature: creature.name.clone(),
                    status: registry.status(status).name.clone(),
                    by: element,
                });
            }
        }
        BattleCommand::GainRage { target } => {
            let player_index = target.to_index();
            let creature = state.players[player_index].active_mut();
            creature.gain_rage();
            bus.push(BattleEvent::RageGained {
                player_index,
                rage: creature.rage,
            });
        }
        BattleCommand::RecordMoveUse { target, move_index } => {
            state.players[target.to_index()]
                .active_mut()
                .record_move_use(&registry, move_index);
        }
        BattleCommand::SwitchCreature {
            target,
            roster_index,
        } => {
            let player_index = target.to_index();
            let player = &mut state.players[player_index];
            player.switch_to(roster_index);
            bus.push(BattleEvent::CreatureEntered {
                player_index,
                creature: player.active().name.clone(),
            });
        }
    }
}
