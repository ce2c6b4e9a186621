//! A module for defining AI behaviors for battle opponents.

use crate::battle::scoring::score_move;
use crate::battle::state::{BattleState, TurnRng};
use crate::creature::CreatureInst;
use crate::registry::{Registry, MAX_AI_LEVEL};
use log::debug;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

const TRAIT_FLOOR: f64 = 0.1;
const TRAIT_CEILING: f64 = 0.9;
const INITIAL_BLUNDER_CEILING: f64 = 0.5;

const CORRECT_RISK_RELIEF: f64 = 0.1;
const WRONG_RISK_PENALTY: f64 = 0.2;
const CORRECT_BLUNDER_GAIN: f64 = 0.1;
const WRONG_BLUNDER_PENALTY: f64 = 0.2;
const SAFE_PICK_RELIEF: f64 = 0.02;

const NOVELTY_STEP: f64 = 0.05;
const NOVELTY_BASE_CAP: f64 = 1.5;
const NOVELTY_CAP_PER_LEVEL: f64 = 0.08;

/// Behavioral factors that drift as the AI learns how its opponent plays.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AiTraits {
    /// Chance of playing the safest move instead of punishing a predicted one.
    pub risk_aversion: f64,
    /// Chance of assuming the opponent will try to counter the AI's safest move.
    pub blunder_assumption: f64,
}

/// What the AI expected of the opponent when it picked its move.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assumption {
    /// No prediction; the AI played its best average move.
    Safe,
    /// The opponent was expected to play its own best average move.
    Punish { predicted: usize },
    /// The opponent was expected to counter the AI's best average move.
    CounterCounter { predicted: usize },
    /// Level 0 AI; nothing to learn from.
    Random,
}

/// Per-player AI state, kept between turns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AiState {
    pub level: u8,
    pub traits: AiTraits,
    /// Upper bound of the random discount applied to each scored move pair.
    pub mistake_cap: f64,
    /// Per-move multiplier on average reward; grows while a move goes unused.
    pub novelty: Vec<f64>,
}

impl AiState {
    /// Rolls fresh traits for an AI of `level` (clamped to the maximum level).
    pub fn new(level: u8, move_count: usize, rng: &mut TurnRng) -> Self {
        let traits = AiTraits {
            risk_aversion: rng.uniform(TRAIT_FLOOR, TRAIT_CEILING, "ai risk aversion"),
            blunder_assumption: rng.uniform(
                TRAIT_FLOOR,
                INITIAL_BLUNDER_CEILING,
                "ai blunder assumption",
            ),
        };
        Self::with_traits(level, traits, move_count)
    }

    pub fn with_traits(level: u8, traits: AiTraits, move_count: usize) -> Self {
        let level = level.min(MAX_AI_LEVEL);
        Self {
            level,
            traits,
            mistake_cap: (0.25 - level as f64 / 20.0).max(0.0),
            novelty: vec![1.0; move_count],
        }
    }

    pub fn novelty_cap(&self) -> f64 {
        NOVELTY_BASE_CAP - NOVELTY_CAP_PER_LEVEL * self.level as f64
    }

    /// Called when a new creature comes in; its moves start out neutral.
    pub fn reset_novelty(&mut self, move_count: usize) {
        self.novelty = vec![1.0; move_count];
    }

    /// The chosen move goes back to neutral. The others creep toward the cap,
    /// faster the shorter their cooldown.
    pub fn update_novelty(&mut self, registry: &Registry, creature: &CreatureInst, chosen: usize) {
        let cap = self.novelty_cap();
        if self.novelty.len() != creature.moves.len() {
            self.reset_novelty(creature.moves.len());
        }
        for (slot, novelty) in self.novelty.iter_mut().enumerate() {
            if slot == chosen {
                *novelty = 1.0;
            } else {
                let cooldown = registry.move_template(creature.moves[slot]).cooldown as f64;
                *novelty = (*novelty + NOVELTY_STEP / (cooldown + 1.0)).min(cap);
            }
        }
    }

    fn novelty_for(&self, slot: usize) -> f64 {
        self.novelty.get(slot).copied().unwrap_or(1.0)
    }
}

/// Result of one decision: the move to play, the prediction it rests on and
/// the AI state to keep for the next turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AiDecision {
    pub move_index: usize,
    pub assumption: Assumption,
    pub state: AiState,
}

/// Drifts the traits once the opponent's actual move is known.
///
/// `actual` is the slot the opponent used, or `None` if it did not move.
pub fn adapt_traits(traits: AiTraits, assumption: Assumption, actual: Option<usize>) -> AiTraits {
    match assumption {
        Assumption::Punish { predicted } => {
            let risk_aversion = if actual == Some(predicted) {
                (traits.risk_aversion - CORRECT_RISK_RELIEF).max(TRAIT_FLOOR)
            } else {
                (traits.risk_aversion + WRONG_RISK_PENALTY).min(TRAIT_CEILING)
            };
            AiTraits {
                risk_aversion,
                ..traits
            }
        }
        Assumption::CounterCounter { predicted } => {
            let blunder_assumption = if actual == Some(predicted) {
                (traits.blunder_assumption + CORRECT_BLUNDER_GAIN).min(TRAIT_CEILING)
            } else {
                (traits.blunder_assumption - WRONG_BLUNDER_PENALTY).max(TRAIT_FLOOR)
            };
            AiTraits {
                blunder_assumption,
                ..traits
            }
        }
        Assumption::Safe | Assumption::Random => traits,
    }
}

/// Playing it safe makes the AI slightly bolder next time.
pub fn relieve_after_safe_pick(traits: AiTraits) -> AiTraits {
    AiTraits {
        risk_aversion: (traits.risk_aversion - SAFE_PICK_RELIEF).max(TRAIT_FLOOR),
        ..traits
    }
}

/// A trait for any system that can decide on a battle action.
/// This provides a common interface for different AI difficulties or strategies.
pub trait Behavior {
    /// Inspects the battle state and decides on the next move for the given player.
    /// Returns `None` when the active creature has no legal move.
    fn decide_action(
        &self,
        ai: &AiState,
        player_index: usize,
        battle_state: &BattleState,
        rng: &mut TurnRng,
    ) -> Option<AiDecision>;
}

/// Level 0: any legal move, uniformly.
pub struct RandomAI;

impl Behavior for RandomAI {
    fn decide_action(
        &self,
        ai: &AiState,
        player_index: usize,
        battle_state: &BattleState,
        rng: &mut TurnRng,
    ) -> Option<AiDecision> {
        let creature = battle_state.players[player_index].active();
        let legal = creature.legal_moves(&battle_state.registry);
        if legal.is_empty() {
            return None;
        }
        let pick = rng.range(0, legal.len() as i32 - 1, "random ai move") as usize;
        let move_index = legal[pick];

        let mut state = ai.clone();
        state.update_novelty(&battle_state.registry, creature, move_index);
        Some(AiDecision {
            move_index,
            assumption: Assumption::Random,
            state,
        })
    }
}

/// Scores every pairing of legal moves and reasons about the opponent's reply.
pub struct ScoringAI;

/// Net rewards of every own move against every opponent move.
struct RewardMatrix {
    own_moves: Vec<usize>,
    opponent_moves: Vec<usize>,
    /// `net[i][j]`: own score minus opponent score for `own_moves[i]` against `opponent_moves[j]`.
    net: Vec<Vec<f64>>,
}

impl RewardMatrix {
    fn build(
        registry: &Registry,
        own: &CreatureInst,
        opponent: &CreatureInst,
        mistake_cap: f64,
        rng: &mut TurnRng,
    ) -> Self {
        let own_moves = own.legal_moves(registry);
        let mut opponent_moves = opponent.legal_moves(registry);
        if opponent_moves.is_empty() {
            opponent_moves = (0..opponent.moves.len()).collect();
        }

        let net = own_moves
            .iter()
            .map(|&own_slot| {
                opponent_moves
                    .iter()
                    .map(|&opponent_slot| {
                        let (own_score, opponent_score) =
                            score_move(registry, [own, opponent], [own_slot, opponent_slot]);
                        let mistake = 1.0 - rng.uniform(0.0, mistake_cap, "ai mistake");
                        own_score * mistake - opponent_score * mistake
                    })
                    .collect()
            })
            .collect();

        Self {
            own_moves,
            opponent_moves,
            net,
        }
    }

    /// Best own slot against the opponent slot in column `column`.
    fn counter_to(&self, column: usize) -> usize {
        // Reversed so the earliest slot wins a tie
        let row = (0..self.own_moves.len())
            .rev()
            .max_by_key(|&row| OrderedFloat(self.net[row][column]))
            .unwrap_or(0);
        self.own_moves[row]
    }

    /// Column of the opponent's best reply to the own move in row `row`.
    fn opponent_counter_to(&self, row: usize) -> usize {
        (0..self.opponent_moves.len())
            .rev()
            .max_by_key(|&column| OrderedFloat(-self.net[row][column]))
            .unwrap_or(0)
    }

    /// Column of the opponent move with the best average reward for the opponent.
    fn opponent_best_average(&self) -> usize {
        let rows = self.own_moves.len() as f64;
        (0..self.opponent_moves.len())
            .rev()
            .max_by_key(|&column| {
                let total: f64 = self.net.iter().map(|row| -row[column]).sum();
                OrderedFloat(total / rows)
            })
            .unwrap_or(0)
    }

    /// Rows ranked by average net reward, best first, after novelty.
    fn ranked_rows(&self, ai: &AiState) -> Vec<(usize, f64)> {
        let columns = self.opponent_moves.len() as f64;
        let mut ranked: Vec<(usize, f64)> = self
            .net
            .iter()
            .enumerate()
            .map(|(row, rewards)| {
                let average = rewards.iter().sum::<f64>() / columns;
                let novelty = ai.novelty_for(self.own_moves[row]);
                let adjusted = if average >= 0.0 {
                    average * novelty
                } else {
                    average / novelty
                };
                (row, adjusted)
            })
            .collect();
        ranked.sort_by_key(|(_, reward)| Reverse(OrderedFloat(*reward)));
        ranked
    }
}

/// Picks between the two best safe moves, weighted by their rewards shifted
/// so that the runner-up weighs at least 1.
fn weighted_pick(ranked: &[(usize, f64)], rng: &mut TurnRng) -> usize {
    match ranked {
        [] => 0,
        [(only, _)] => *only,
        [(first, first_reward), (second, second_reward), ..] => {
            let shift = second_reward.abs() + 1.0;
            let first_weight = first_reward + shift;
            let second_weight = second_reward + shift;
            let roll = rng.unit("ai safe pick") * (first_weight + second_weight);
            if roll < first_weight {
                *first
            } else {
                *second
            }
        }
    }
}

impl Behavior for ScoringAI {
    fn decide_action(
        &self,
        ai: &AiState,
        player_index: usize,
        battle_state: &BattleState,
        rng: &mut TurnRng,
    ) -> Option<AiDecision> {
        let registry = &battle_state.registry;
        let own = battle_state.players[player_index].active();
        let opponent = battle_state.players[1 - player_index].active();

        let matrix = RewardMatrix::build(registry, own, opponent, ai.mistake_cap, rng);
        if matrix.own_moves.is_empty() {
            return None;
        }
        let ranked = matrix.ranked_rows(ai);
        let best_row = ranked[0].0;
        let mut state = ai.clone();

        let risk_roll = rng.unit("ai risk roll");
        let (move_index, assumption) = if !opponent.is_stunned()
            && risk_roll > ai.traits.risk_aversion
        {
            let column = matrix.opponent_best_average();
            let predicted = matrix.opponent_moves[column];
            (matrix.counter_to(column), Assumption::Punish { predicted })
        } else if !opponent.is_stunned()
            && rng.unit("ai blunder roll") < ai.traits.blunder_assumption
        {
            let column = matrix.opponent_counter_to(best_row);
            let predicted = matrix.opponent_moves[column];
            (
                matrix.counter_to(column),
                Assumption::CounterCounter { predicted },
            )
        } else {
            state.traits = relieve_after_safe_pick(state.traits);
            let row = weighted_pick(&ranked, rng);
            (matrix.own_moves[row], Assumption::Safe)
        };

        debug!(
            "{} picks slot {} ({:?}); ranked averages {:?}",
            own.name, move_index, assumption, ranked
        );
        state.update_novelty(registry, own, move_index);
        Some(AiDecision {
            move_index,
            assumption,
            state,
        })
    }
}

/// The behavior an AI of `level` plays with.
pub fn behavior_for(level: u8) -> Box<dyn Behavior> {
    if level == 0 {
        Box::new(RandomAI)
    } else {
        Box::new(ScoringAI)
    }
}
