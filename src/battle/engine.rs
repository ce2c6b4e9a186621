use crate::battle::ai::{adapt_traits, behavior_for};
use crate::battle::calculators::{calculate_attempt_outcome, calculate_thorn_outcome};
use crate::battle::commands::{
    execute_command, execute_command_batch, BattleCommand, PlayerTarget,
};
use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState, HealthSource, TurnRng};
use crate::battle::status::{apply_status, tick_statuses, TickEffect};
use crate::errors::{ActionError, BattleResult, BattleStateError};
use crate::player::{MoveChoice, PlayerType};
use crate::registry::MAX_AI_LEVEL;
use log::{debug, info, warn};

/// Share of max health an AI creature loses per level below 4.
const HANDICAP_HEALTH_SHARE: f64 = 0.04;

/// Sets up a fresh battle: weakens AI rosters by level and sends out the
/// first creature of each side. Call once, before the first turn.
pub fn start_battle(battle_state: &mut BattleState) -> EventBus {
    let mut bus = EventBus::new();
    let registry = battle_state.registry.clone();

    for player in battle_state.players.iter_mut() {
        let Some(level) = player.ai_level() else {
            continue;
        };
        let below = (MAX_AI_LEVEL - 1).saturating_sub(level) as f64;
        let handicap = registry.handicap_status(level);
        for creature in player.roster.iter_mut() {
            let share = HANDICAP_HEALTH_SHARE * creature.max_health as f64 * below;
            let penalty = share.ceil() as i32;
            creature.set_health(creature.health() - penalty);
            if let Some(status) = handicap {
                apply_status(&registry, creature, status);
            }
        }
        debug!(
            "{} plays at AI level {} (health penalty per creature: {:.0}%)",
            player.player_name,
            level,
            HANDICAP_HEALTH_SHARE * below * 100.0
        );
    }

    for (player_index, player) in battle_state.players.iter().enumerate() {
        bus.push(BattleEvent::CreatureEntered {
            player_index,
            creature: player.active().name.clone(),
        });
    }
    info!(
        "Battle {} started: {} vs {}",
        battle_state.battle_id,
        battle_state.players[0].player_name,
        battle_state.players[1].player_name
    );
    bus
}

/// Runs the start of a round: status ticks, faint check, cooldown tick and
/// forced choices for creatures that cannot pick a move.
pub fn prepare_turn(battle_state: &mut BattleState, rng: &mut TurnRng) -> EventBus {
    let mut bus = EventBus::new();
    if battle_state.game_state.is_over() {
        return bus;
    }
    let registry = battle_state.registry.clone();

    execute_command_batch(
        vec![
            BattleCommand::SetGameState(GameState::TurnInProgress),
            BattleCommand::ClearActionQueue,
        ],
        battle_state,
        &mut bus,
    );
    bus.push(BattleEvent::TurnStarted {
        turn_number: battle_state.turn_number,
    });

    for player_index in 0..2 {
        let creature = battle_state.players[player_index].active_mut();
        let effects = tick_statuses(&registry, creature, rng);
        for effect in effects {
            bus.push(tick_event(battle_state, player_index, effect));
        }
    }

    check_for_faints(battle_state, &mut bus);
    if battle_state.game_state.is_over() {
        return bus;
    }

    for player in battle_state.players.iter_mut() {
        player.active_mut().tick_cooldowns();
    }

    for player_index in 0..2 {
        let creature = battle_state.players[player_index].active();
        let forced = if creature.is_stunned() {
            Some(MoveChoice::Stunned)
        } else if creature.legal_moves(&registry).is_empty() {
            Some(MoveChoice::Pass)
        } else {
            None
        };
        battle_state.action_queue[player_index] = forced;
    }

    execute_command(
        BattleCommand::SetGameState(GameState::WaitingForActions),
        battle_state,
        &mut bus,
    );
    bus
}

fn tick_event(battle_state: &BattleState, player_index: usize, effect: TickEffect) -> BattleEvent {
    let registry = &battle_state.registry;
    let creature = battle_state.players[player_index].active().name.clone();
    match effect {
        TickEffect::Damaged {
            status,
            amount,
            previous_health,
        } => BattleEvent::Damaged {
            player_index,
            creature,
            amount,
            previous_health,
            current_health: previous_health - amount,
            source: HealthSource::Status(registry.status(status).name.clone()),
        },
        TickEffect::Healed {
            status,
            amount,
            previous_health,
        } => BattleEvent::Healed {
            player_index,
            creature,
            amount,
            previous_health,
            current_health: previous_health + amount,
            source: HealthSource::Status(registry.status(status).name.clone()),
        },
        TickEffect::Expired { status } => BattleEvent::StatusExpired {
            player_index,
            creature,
            status: registry.status(status).name.clone(),
        },
    }
}

/// Lets every AI player without a queued choice decide on its move.
pub fn collect_ai_actions(battle_state: &mut BattleState, rng: &mut TurnRng) {
    if battle_state.game_state != GameState::WaitingForActions {
        return;
    }

    for player_index in 0..2 {
        if battle_state.action_queue[player_index].is_some() {
            continue;
        }
        let PlayerType::Ai(ai) = &battle_state.players[player_index].player_type else {
            continue;
        };
        let ai = ai.clone();

        let decision = behavior_for(ai.level).decide_action(&ai, player_index, battle_state, rng);
        let player = &mut battle_state.players[player_index];
        match decision {
            Some(decision) => {
                battle_state.action_queue[player_index] = Some(MoveChoice::UseMove {
                    move_index: decision.move_index,
                });
                player.pending_assumption = Some(decision.assumption);
                player.player_type = PlayerType::Ai(decision.state);
            }
            None => {
                battle_state.action_queue[player_index] = Some(MoveChoice::Pass);
                player.pending_assumption = None;
            }
        }
    }
}

/// Validates and queues a choice for `player_index`.
pub fn submit_action(
    battle_state: &mut BattleState,
    player_index: usize,
    choice: MoveChoice,
) -> BattleResult<()> {
    if battle_state.game_state.is_over() {
        return Err(BattleStateError::BattleOver.into());
    }
    if battle_state.game_state != GameState::WaitingForActions {
        return Err(BattleStateError::NotAcceptingActions.into());
    }
    if player_index > 1 {
        return Err(BattleStateError::InvalidPlayerIndex(player_index).into());
    }
    if battle_state.action_queue[player_index].is_some() {
        return Err(ActionError::ActionAlreadyQueued(player_index).into());
    }

    let creature = battle_state.players[player_index].active();
    match choice {
        MoveChoice::UseMove { move_index } => {
            if creature.is_stunned() {
                return Err(ActionError::CreatureStunned.into());
            }
            creature.check_move_ready(&battle_state.registry, move_index)?;
        }
        // Both are queued by `prepare_turn` when they apply
        MoveChoice::Stunned | MoveChoice::Pass => {
            return Err(ActionError::ChoiceNotForced.into());
        }
    }

    battle_state.action_queue[player_index] = Some(choice);
    Ok(())
}

/// Check if battle is ready for turn resolution (both players have provided actions)
pub fn ready_for_turn_resolution(battle_state: &BattleState) -> bool {
    battle_state.game_state == GameState::WaitingForActions
        && battle_state.action_queue.iter().all(Option::is_some)
}

/// Which queued moves go, and in what order. The flag is set when a speed tie
/// was broken by a coin flip.
pub fn determine_move_order(battle_state: &BattleState, rng: &mut TurnRng) -> (Vec<usize>, bool) {
    let registry = &battle_state.registry;
    let movers: Vec<(usize, schema::Speed)> = battle_state
        .action_queue
        .iter()
        .enumerate()
        .filter_map(|(player_index, choice)| match choice {
            Some(MoveChoice::UseMove { move_index }) => {
                let creature = battle_state.players[player_index].active();
                let speed = registry.move_template(creature.moves[*move_index]).speed;
                Some((player_index, speed))
            }
            _ => None,
        })
        .collect();

    match movers.as_slice() {
        [(first, first_speed), (second, second_speed)] => {
            if first_speed > second_speed {
                (vec![*first, *second], false)
            } else if first_speed < second_speed {
                (vec![*second, *first], false)
            } else if rng.coin_flip("speed tie") {
                (vec![*first, *second], true)
            } else {
                (vec![*second, *first], true)
            }
        }
        _ => (movers.iter().map(|(player_index, _)| *player_index).collect(), false),
    }
}

/// Main entry point for turn resolution
/// Takes a battle state and RNG oracle, executes the queued moves
/// Returns EventBus containing all events that occurred during the turn
pub fn resolve_turn(battle_state: &mut BattleState, rng: &mut TurnRng) -> EventBus {
    let mut bus = EventBus::new();
    if !ready_for_turn_resolution(battle_state) {
        warn!("resolve_turn called before both players chose a move");
        return bus;
    }

    execute_command(
        BattleCommand::SetGameState(GameState::TurnInProgress),
        battle_state,
        &mut bus,
    );

    for player_index in 0..2 {
        let creature = battle_state.players[player_index].active().name.clone();
        match battle_state.action_queue[player_index] {
            Some(MoveChoice::Stunned) => bus.push(BattleEvent::StunnedSkipsTurn {
                player_index,
                creature,
            }),
            Some(MoveChoice::Pass) => bus.push(BattleEvent::NoMoveReady {
                player_index,
                creature,
            }),
            _ => {}
        }
    }

    let (order, coin_flip) = determine_move_order(battle_state, rng);
    debug!("Move order {:?} (coin flip: {})", order, coin_flip);
    bus.push(BattleEvent::MoveOrderDecided {
        order: order.clone(),
        coin_flip,
    });

    let mut resolved = [None; 2];
    for (position, player_index) in order.into_iter().enumerate() {
        let Some(MoveChoice::UseMove { move_index }) = battle_state.action_queue[player_index]
        else {
            continue;
        };
        let creature = battle_state.players[player_index].active();
        if creature.is_fainted() {
            continue;
        }
        // The first mover may have stunned the second
        if position > 0 && creature.is_stunned() {
            bus.push(BattleEvent::StunnedBeforeMoving {
                player_index,
                creature: creature.name.clone(),
            });
            continue;
        }
        if execute_move(battle_state, player_index, move_index, rng, &mut bus) {
            resolved[player_index] = Some(move_index);
        }
    }

    adapt_ai_players(battle_state, resolved);
    check_for_faints(battle_state, &mut bus);
    finalize_turn(battle_state, &mut bus);
    bus
}

/// Uses the move in `move_index` of the player's active creature, every
/// attempt of it, followed by any thorn retaliation. Returns false when the
/// move had no target left and never ran.
fn execute_move(
    battle_state: &mut BattleState,
    player_index: usize,
    move_index: usize,
    rng: &mut TurnRng,
    bus: &mut EventBus,
) -> bool {
    let registry = battle_state.registry.clone();
    let attacker_target = PlayerTarget::from_index(player_index);
    let defender_index = attacker_target.opponent().to_index();
    let creature = battle_state.players[player_index].active();
    let template = registry.move_template(creature.moves[move_index]);
    let offensive = template.targeting.is_offensive();

    if offensive && battle_state.players[defender_index].active().is_fainted() {
        return false;
    }

    let commands = vec![
        BattleCommand::EmitEvent(BattleEvent::MoveUsed {
            player_index,
            creature: creature.name.clone(),
            move_name: template.name.clone(),
        }),
        BattleCommand::RecordMoveUse {
            target: attacker_target,
            move_index,
        },
    ];
    execute_command_batch(commands, battle_state, bus);

    let mut connected = false;
    for _ in 0..template.hit_attempts {
        let outcome =
            calculate_attempt_outcome(battle_state, player_index, move_index, connected, rng);
        connected |= outcome.connected;
        execute_command_batch(outcome.commands, battle_state, bus);

        let stop = if offensive {
            battle_state.players[defender_index].active().is_fainted()
        } else {
            battle_state.players[player_index].active().is_fainted()
        };
        if stop {
            break;
        }
    }

    if offensive {
        let commands = calculate_thorn_outcome(battle_state, player_index, connected, rng);
        execute_command_batch(commands, battle_state, bus);
    }
    true
}

/// Checks each AI's prediction against the move the opponent actually ran.
/// A prediction is dropped unjudged when the opponent never got to move.
fn adapt_ai_players(battle_state: &mut BattleState, resolved: [Option<usize>; 2]) {
    for player_index in 0..2 {
        let player = &mut battle_state.players[player_index];
        let Some(assumption) = player.pending_assumption.take() else {
            continue;
        };
        let Some(actual) = resolved[1 - player_index] else {
            debug!(
                "{} keeps its traits: the opponent never moved",
                player.player_name
            );
            continue;
        };
        if let PlayerType::Ai(ai) = &mut player.player_type {
            let adapted = adapt_traits(ai.traits, assumption, Some(actual));
            if adapted != ai.traits {
                debug!(
                    "{} adapts after {:?} (opponent used slot {}): {:?}",
                    player.player_name, assumption, actual, adapted
                );
            }
            ai.traits = adapted;
        }
    }
}

/// Announces fainted active creatures and either sends in the next creature
/// or ends the battle once a side has nobody left.
fn check_for_faints(battle_state: &mut BattleState, bus: &mut EventBus) {
    let mut exhausted = [false; 2];
    let mut switches = Vec::new();

    for (player_index, player) in battle_state.players.iter().enumerate() {
        let active = player.active();
        if !active.is_fainted() {
            continue;
        }
        bus.push(BattleEvent::CreatureFainted {
            player_index,
            creature: active.name.clone(),
        });
        match player.next_available_index() {
            Some(roster_index) => switches.push(BattleCommand::SwitchCreature {
                target: PlayerTarget::from_index(player_index),
                roster_index,
            }),
            None => exhausted[player_index] = true,
        }
    }

    let (game_state, defeated, winner) = match exhausted {
        [false, false] => {
            execute_command_batch(switches, battle_state, bus);
            return;
        }
        [true, true] => (GameState::Draw, vec![0, 1], None),
        [true, false] => (GameState::Player2Win, vec![0], Some(1)),
        [false, true] => (GameState::Player1Win, vec![1], Some(0)),
    };

    execute_command(BattleCommand::SetGameState(game_state), battle_state, bus);
    for player_index in defeated {
        bus.push(BattleEvent::PlayerDefeated { player_index });
    }
    bus.push(BattleEvent::BattleEnded { winner });
    info!(
        "Battle {} ended after {} turn(s): {:?}",
        battle_state.battle_id, battle_state.turn_number, game_state
    );
}

fn finalize_turn(battle_state: &mut BattleState, bus: &mut EventBus) {
    let mut commands = Vec::new();
    if !battle_state.game_state.is_over() {
        commands.push(BattleCommand::IncrementTurnNumber);
        commands.push(BattleCommand::SetGameState(GameState::WaitingForActions));
    }
    commands.push(BattleCommand::ClearActionQueue);
    commands.push(BattleCommand::EmitEvent(BattleEvent::TurnEnded));
    execute_command_batch(commands, battle_state, bus);
}
