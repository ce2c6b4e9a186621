use crate::battle::engine::{
    collect_ai_actions, prepare_turn, ready_for_turn_resolution, resolve_turn, start_battle,
    submit_action,
};
use crate::battle::state::{BattleEvent, BattleState, EventBus, GameState, HealthChange, TurnRng};
use crate::errors::{ActionError, BattleResult};
use crate::player::MoveChoice;
use log::{info, warn};
use serde::Serialize;

/// How many illegal choices a requester may make in a row before the runner gives up.
pub const MAX_INVALID_CHOICES: usize = 5;

/// Receives narration and health changes as the battle unfolds.
pub trait Presenter {
    fn notify_text(&mut self, line: &str, detail: Option<&str>);
    fn notify_health_changed(&mut self, change: &HealthChange);
}

/// Supplies move choices for human-controlled players.
pub trait MoveRequester {
    fn request_move(&mut self, player_index: usize, battle_state: &BattleState) -> MoveChoice;
}

/// Presenter that drops everything, for headless runs.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn notify_text(&mut self, _line: &str, _detail: Option<&str>) {}
    fn notify_health_changed(&mut self, _change: &HealthChange) {}
}

/// How a match ended.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Winner { player_index: usize, player_name: String },
    Draw,
    /// The turn limit was reached first.
    Unfinished,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MoveUseSummary {
    pub move_name: String,
    pub uses: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreatureSummary {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub total_healed: i32,
    pub move_uses: Vec<MoveUseSummary>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub player_name: String,
    pub creatures: Vec<CreatureSummary>,
}

/// End-of-match report.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MatchSummary {
    pub battle_id: String,
    pub outcome: MatchOutcome,
    pub turns: u32,
    pub players: Vec<PlayerSummary>,
}

/// High-level battle management interface that abstracts turn orchestrator complexity
#[derive(Debug)]
pub struct BattleRunner {
    battle_state: BattleState,
    rng: TurnRng,
    accumulated_events: Vec<BattleEvent>,
    started: bool,
}

impl BattleRunner {
    pub fn new(battle_state: BattleState, rng: TurnRng) -> Self {
        Self {
            battle_state,
            rng,
            accumulated_events: Vec::new(),
            started: false,
        }
    }

    pub fn battle_state(&self) -> &BattleState {
        &self.battle_state
    }

    /// Check if the battle has ended
    pub fn is_battle_ended(&self) -> bool {
        self.battle_state.game_state.is_over()
    }

    /// Get the winner if the battle has ended
    pub fn get_winner(&self) -> Option<usize> {
        self.battle_state.winner()
    }

    pub fn get_turn_number(&self) -> u32 {
        self.battle_state.turn_number
    }

    /// Get all events that have occurred in the battle so far
    pub fn get_all_events(&self) -> &[BattleEvent] {
        &self.accumulated_events
    }

    /// Get events since a certain index (for incremental updates)
    pub fn get_events_since(&self, index: usize) -> &[BattleEvent] {
        if index < self.accumulated_events.len() {
            &self.accumulated_events[index..]
        } else {
            &[]
        }
    }

    fn publish(&mut self, bus: EventBus, presenter: &mut dyn Presenter) {
        for event in bus.events() {
            if let Some((line, detail)) = event.lines(&self.battle_state) {
                presenter.notify_text(&line, detail.as_deref());
            }
            if let Some(change) = event.health_change() {
                presenter.notify_health_changed(&change);
            }
        }
        self.accumulated_events.extend_from_slice(bus.events());
    }

    /// Sends out the opening creatures. Called automatically by `play_turn`.
    pub fn start(&mut self, presenter: &mut dyn Presenter) {
        if self.started {
            return;
        }
        self.started = true;
        let bus = start_battle(&mut self.battle_state);
        self.publish(bus, presenter);
    }

    /// Plays one full round: ticks, choices from the AI and the requester,
    /// then resolution.
    pub fn play_turn(
        &mut self,
        presenter: &mut dyn Presenter,
        requester: &mut dyn MoveRequester,
    ) -> BattleResult<()> {
        self.start(presenter);
        if self.is_battle_ended() {
            return Ok(());
        }

        let bus = prepare_turn(&mut self.battle_state, &mut self.rng);
        self.publish(bus, presenter);
        if self.is_battle_ended() {
            return Ok(());
        }

        collect_ai_actions(&mut self.battle_state, &mut self.rng);
        for player_index in 0..2 {
            if self.battle_state.action_queue[player_index].is_none() {
                self.request_human_move(player_index, requester)?;
            }
        }

        if ready_for_turn_resolution(&self.battle_state) {
            let bus = resolve_turn(&mut self.battle_state, &mut self.rng);
            self.publish(bus, presenter);
        }
        Ok(())
    }

    fn request_human_move(
        &mut self,
        player_index: usize,
        requester: &mut dyn MoveRequester,
    ) -> BattleResult<()> {
        for _ in 0..MAX_INVALID_CHOICES {
            let choice = requester.request_move(player_index, &self.battle_state);
            match submit_action(&mut self.battle_state, player_index, choice) {
                Ok(()) => return Ok(()),
                Err(err) => warn!("Rejected {:?} from player {}: {}", choice, player_index, err),
            }
        }
        Err(ActionError::TooManyInvalidChoices(player_index).into())
    }

    /// Plays until someone wins, the match is drawn, or `turn_limit` rounds pass.
    pub fn run_to_completion(
        &mut self,
        presenter: &mut dyn Presenter,
        requester: &mut dyn MoveRequester,
        turn_limit: u32,
    ) -> BattleResult<MatchSummary> {
        self.start(presenter);
        while !self.is_battle_ended() && self.battle_state.turn_number <= turn_limit {
            self.play_turn(presenter, requester)?;
        }
        let summary = self.summary();
        info!(
            "Match {} finished after {} turn(s): {:?}",
            summary.battle_id, summary.turns, summary.outcome
        );
        Ok(summary)
    }

    pub fn summary(&self) -> MatchSummary {
        let state = &self.battle_state;
        let outcome = match state.game_state {
            GameState::Draw => MatchOutcome::Draw,
            _ => match state.winner() {
                Some(player_index) => MatchOutcome::Winner {
                    player_index,
                    player_name: state.players[player_index].player_name.clone(),
                },
                None => MatchOutcome::Unfinished,
            },
        };

        let players = state
            .players
            .iter()
            .map(|player| PlayerSummary {
                player_name: player.player_name.clone(),
                creatures: player
                    .roster
                    .iter()
                    .map(|creature| CreatureSummary {
                        name: creature.name.clone(),
                        health: creature.health(),
                        max_health: creature.max_health,
                        total_healed: creature.total_healed,
                        move_uses: creature
                            .moves
                            .iter()
                            .zip(&creature.move_uses)
                            .map(|(move_id, uses)| MoveUseSummary {
                                move_name: state.registry.move_template(*move_id).name.clone(),
                                uses: *uses,
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        MatchSummary {
            battle_id: state.battle_id.clone(),
            outcome,
            turns: state.turn_number,
            players,
        }
    }
}
