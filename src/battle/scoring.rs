//! Heuristic scores for moves and statuses, used by the AI.
//!
//! Scores are in "points" where dealing a full health bar of damage is worth
//! roughly `DAMAGE_WEIGHT`. Nothing here touches randomness or mutates state,
//! so the same inputs always give the same scores.

use crate::battle::calculators::hit_chance;
use crate::creature::CreatureInst;
use crate::registry::{MoveTemplate, Registry};
use schema::{StatusTemplate, Targeting};

/// Returned for any move expected to knock out its own user.
pub const LETHAL_SELF_DAMAGE_PENALTY: f64 = -1000.0;

const DAMAGE_WEIGHT: f64 = 600.0;
const HEAL_WEIGHT: f64 = 300.0;
const OVERKILL_BONUS: f64 = 5.0;
const ROUND_CAP_DIVISOR: f64 = 5.0;

const TICK_WEIGHT: f64 = 8.0;
const DAMAGE_MOD_WEIGHT: f64 = 4.0;
const SCOPED_DAMAGE_MOD_WEIGHT: f64 = 1.0;
const MODIFIER_CEILING: f64 = 30.0;
const CASTING_TURN_WEIGHT: f64 = 2.0;
const STUN_INFLICT_BONUS: f64 = 120.0;
const STUN_TURN_WEIGHT: f64 = 80.0;
const IMMEDIATE_THORN_WEIGHT: f64 = 5.0;
const SUSTAINED_THORN_WEIGHT: f64 = 2.5;
const EXTINGUISH_STUN_BONUS: f64 = 40.0;

/// The situation a status is being scored in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusContext {
    /// 1.0 if the scoring side moves first, 0.5 on a speed tie, 0.0 otherwise.
    pub faster: f64,
    /// True when the status lands on the scoring side's own creature.
    pub target_self: bool,
    /// True when the other side is using an opponent-targeted move this round.
    pub opponent_attacking: bool,
    /// Multiplier applied to tick damage and damage modifiers.
    pub damage_scale: f64,
    /// Multiplier applied to positive thorn damage.
    pub thorn_scale: f64,
    /// Upper bound for how many turns any effect is counted for.
    pub round_cap: f64,
}

/// Soft cap on aim and defense modifiers, preserving sign.
fn diminish(value: i32) -> f64 {
    MODIFIER_CEILING * (value as f64 / MODIFIER_CEILING).tanh()
}

/// Number of rounds effects are counted for in a matchup: a fifth of the
/// lower health of the two creatures, but at least one.
pub fn round_cap(first: &CreatureInst, second: &CreatureInst) -> f64 {
    (first.health().min(second.health()) as f64 / ROUND_CAP_DIVISOR).max(1.0)
}

/// Value of putting `template` on a creature, from the scoring side's view.
pub fn score_status(template: &StatusTemplate, ctx: &StatusContext) -> f64 {
    // Effects on the scoring side's own creature count the other way round
    let m = if ctx.target_self { -1.0 } else { 1.0 };
    let duration = template.duration.capped(ctx.round_cap);
    let mut score = 0.0;

    score += m * template.tick_damage.average() * ctx.damage_scale * duration * TICK_WEIGHT;

    let damage_mod_weight = if template.damage_mod_scope.is_none() || ctx.target_self {
        DAMAGE_MOD_WEIGHT
    } else {
        SCOPED_DAMAGE_MOD_WEIGHT
    };
    score -= m * template.damage_mod as f64 * ctx.damage_scale * duration * damage_mod_weight;

    let aim = diminish(template.aim_mod);
    let defense = diminish(template.defense_mod);
    score -= m * (aim + defense) * duration;
    if ctx.opponent_attacking {
        // Still in effect for the rest of this round if it lands first
        if ctx.target_self {
            score -= m * ctx.faster * defense * CASTING_TURN_WEIGHT;
        } else {
            score -= m * ctx.faster * aim * CASTING_TURN_WEIGHT;
        }
    }

    if let Some(stun) = template.stun {
        if !ctx.target_self {
            score += STUN_INFLICT_BONUS * ctx.faster;
        }
        score += m * STUN_TURN_WEIGHT * (stun as f64).min(ctx.round_cap);
    }

    let thorn = template.thorn.average();
    let thorn = if thorn > 0.0 { thorn * ctx.thorn_scale } else { thorn };
    if ctx.target_self && ctx.opponent_attacking {
        score -= m * ctx.faster * thorn * IMMEDIATE_THORN_WEIGHT;
    }
    score -= m * thorn * duration * SUSTAINED_THORN_WEIGHT;

    score
}

/// Value of the statuses a move would wash off `holder`.
///
/// Each removed occurrence is worth its template weight times its remaining
/// turns to the holder, and a stun is a burden the holder is glad to lose.
/// Removing the mover's own statuses costs the mover what they were worth.
pub fn score_extinguish(
    registry: &Registry,
    holder: &CreatureInst,
    template: &MoveTemplate,
    holder_is_mover: bool,
    round_cap: f64,
) -> f64 {
    let types = registry.types();
    let mut incoming = vec![template.element];
    if let Some(proc) = template.status {
        incoming.push(registry.status(proc.status).element);
    }
    incoming.retain(|element| types.can_extinguish(*element));
    if incoming.is_empty() {
        return 0.0;
    }

    let value_to_holder: f64 = holder
        .statuses
        .iter()
        .filter(|occurrence| {
            let element = registry.status(occurrence.status).element;
            incoming
                .iter()
                .any(|incoming| types.is_weak_to(element, *incoming))
        })
        .map(|occurrence| {
            let weight = registry.status(occurrence.status).extinguish_scoring;
            let stun_burden = if occurrence.stun.is_some() {
                EXTINGUISH_STUN_BONUS
            } else {
                0.0
            };
            weight * occurrence.remaining.capped(round_cap) - stun_burden
        })
        .sum();

    if holder_is_mover {
        -value_to_holder
    } else {
        value_to_holder
    }
}

fn speed_advantage(own: &MoveTemplate, other: &MoveTemplate) -> f64 {
    match own.speed.cmp(&other.speed) {
        std::cmp::Ordering::Greater => 1.0,
        std::cmp::Ordering::Equal => 0.5,
        std::cmp::Ordering::Less => 0.0,
    }
}

/// Expected thorn the attacker of `defender` takes. Negative values drain.
fn expected_thorn(registry: &Registry, defender: &CreatureInst, attacker: &CreatureInst) -> f64 {
    defender
        .statuses
        .iter()
        .map(|occurrence| {
            let template = registry.status(occurrence.status);
            let thorn = template.thorn.average();
            if thorn > 0.0 {
                thorn
                    * registry
                        .types()
                        .relationship(template.element, &attacker.elements)
            } else {
                thorn
            }
        })
        .sum()
}

/// Score of `own_slot` for `own`, assuming `opponent` answers with `opponent_slot`.
fn score_side(
    registry: &Registry,
    own: &CreatureInst,
    opponent: &CreatureInst,
    own_slot: usize,
    opponent_slot: usize,
) -> f64 {
    if own.is_stunned() {
        return 0.0;
    }
    let types = registry.types();
    let template = registry.move_template(own.moves[own_slot]);
    let opponent_template = registry.move_template(opponent.moves[opponent_slot]);
    let cap = round_cap(own, opponent);
    let faster = speed_advantage(template, opponent_template);
    let opponent_attacking = opponent_template.targeting.is_offensive() && !opponent.is_stunned();
    let hits = template.hit_attempts as f64;
    let heal_limit = (own.max_health - own.health()) as f64;

    let score = match template.targeting {
        Targeting::SelfTargeted => {
            let per_attempt = template.damage.average()
                + own.damage_modifier(registry, template.element, false) as f64;
            let mut healing = -per_attempt * hits;
            if healing < 0.0 && -healing >= own.health() as f64 {
                return LETHAL_SELF_DAMAGE_PENALTY;
            }
            healing = healing.min(heal_limit);
            let health_score = healing * HEAL_WEIGHT / own.max_health as f64;

            let status_score = template
                .status
                .map(|proc| {
                    let status = registry.status(proc.status);
                    let ctx = StatusContext {
                        faster,
                        target_self: true,
                        opponent_attacking,
                        damage_scale: 1.0,
                        thorn_scale: types.relationship(status.element, &opponent.elements),
                        round_cap: cap,
                    };
                    score_status(status, &ctx) * proc.chance as f64 / 100.0
                })
                .unwrap_or(0.0);

            health_score + status_score + score_extinguish(registry, own, template, true, cap)
        }
        Targeting::OpponentTargeted { aim } => {
            let hit_probability =
                (hit_chance(registry, own, opponent, aim) as f64 / 100.0).min(1.0);
            let multiplier = types.relationship(template.element, &opponent.elements);
            let per_hit = (template.damage.average()
                + own.damage_modifier(registry, template.element, true) as f64)
                * multiplier;
            let mut expected = per_hit.max(0.0) * hit_probability * hits;
            if expected >= opponent.health() as f64 {
                expected += OVERKILL_BONUS;
            }
            let damage_score = expected * DAMAGE_WEIGHT / opponent.max_health as f64;

            let thorn = expected_thorn(registry, opponent, own);
            if thorn > 0.0 && thorn >= own.health() as f64 {
                return LETHAL_SELF_DAMAGE_PENALTY;
            }
            let thorn_score = if thorn > 0.0 {
                -thorn * DAMAGE_WEIGHT / own.max_health as f64
            } else {
                (-thorn).min(heal_limit) * hit_probability * HEAL_WEIGHT / own.max_health as f64
            };

            let status_score = template
                .status
                .map(|proc| {
                    let status = registry.status(proc.status);
                    let status_multiplier =
                        types.relationship(status.element, &opponent.elements);
                    let ctx = StatusContext {
                        faster,
                        target_self: false,
                        opponent_attacking,
                        damage_scale: status_multiplier,
                        thorn_scale: 1.0,
                        round_cap: cap,
                    };
                    score_status(status, &ctx)
                        * proc.chance as f64
                        / 100.0
                        * status_multiplier
                        * hit_probability
                        * hits
                })
                .unwrap_or(0.0);

            let extinguish_score =
                score_extinguish(registry, opponent, template, false, cap) * hit_probability;

            damage_score + thorn_score + status_score + extinguish_score
        }
    };

    score * registry.scoring_override(own.species, own.moves[own_slot], opponent.species)
}

/// Scores one pairing of moves for both sides.
///
/// `creatures` and `moves` are indexed the same way; the result holds the
/// score of each side's move given the other's.
pub fn score_move(
    registry: &Registry,
    creatures: [&CreatureInst; 2],
    moves: [usize; 2],
) -> (f64, f64) {
    (
        score_side(registry, creatures[0], creatures[1], moves[0], moves[1]),
        score_side(registry, creatures[1], creatures[0], moves[1], moves[0]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{slot_of, test_registry, TestCreatureBuilder};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_score_move_is_pure() {
        let registry = test_registry();
        let fragonire = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("BURNING")
            .build(&registry);
        let psawarca = TestCreatureBuilder::new("PSAWARCA")
            .with_health(40)
            .with_status("TIDAL SHELL")
            .build(&registry);
        let before = (fragonire.clone(), psawarca.clone());

        for own in 0..fragonire.moves.len() {
            for other in 0..psawarca.moves.len() {
                let first = score_move(&registry, [&fragonire, &psawarca], [own, other]);
                let second = score_move(&registry, [&fragonire, &psawarca], [own, other]);
                assert_eq!(first, second);
            }
        }
        assert_eq!((fragonire, psawarca), before);
    }

    #[test]
    fn test_stunned_side_scores_zero() {
        let registry = test_registry();
        let fragonire = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("SHOCKED")
            .build(&registry);
        let schonips = TestCreatureBuilder::new("SCHONIPS").build(&registry);
        let (stunned, free) = score_move(&registry, [&fragonire, &schonips], [0, 0]);
        assert_eq!(stunned, 0.0);
        assert!(free > 0.0);
    }

    #[test]
    fn test_lethal_self_damage_is_penalised() {
        let registry = test_registry();
        let schonips = TestCreatureBuilder::new("SCHONIPS")
            .with_health(1)
            .build(&registry);
        let shigowi = TestCreatureBuilder::new("SHIGOWI").build(&registry);
        let shed_skin = slot_of(&registry, &schonips, "SHED SKIN");
        let (score, _) = score_move(&registry, [&schonips, &shigowi], [shed_skin, 0]);
        assert_eq!(score, LETHAL_SELF_DAMAGE_PENALTY);
    }

    #[test]
    fn test_attacking_into_lethal_thorn_is_penalised() {
        let registry = test_registry();
        let schonips = TestCreatureBuilder::new("SCHONIPS")
            .with_health(5)
            .build(&registry);
        let fragonire = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("BITING FLAMES")
            .build(&registry);
        let (score, _) = score_move(&registry, [&schonips, &fragonire], [0, 1]);
        assert_eq!(score, LETHAL_SELF_DAMAGE_PENALTY);
    }

    #[test]
    fn test_finishing_blow_scores_higher() {
        let registry = test_registry();
        let fragonire = TestCreatureBuilder::new("FRAGONIRE").build(&registry);
        let healthy = TestCreatureBuilder::new("SCHONIPS").build(&registry);
        let wounded = TestCreatureBuilder::new("SCHONIPS")
            .with_health(5)
            .build(&registry);
        let claw = slot_of(&registry, &fragonire, "DRAGON CLAW");

        let (against_healthy, _) = score_move(&registry, [&fragonire, &healthy], [claw, 0]);
        let (against_wounded, _) = score_move(&registry, [&fragonire, &wounded], [claw, 0]);
        assert!(against_wounded > against_healthy);
    }

    #[test]
    fn test_extinguishing_a_buff_adds_value() {
        let registry = test_registry();
        let psawarca = TestCreatureBuilder::new("PSAWARCA").build(&registry);
        let plain = TestCreatureBuilder::new("FRAGONIRE").build(&registry);
        let warmed = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("WARMING")
            .build(&registry);
        let jet = slot_of(&registry, &psawarca, "WATER JET");
        let warming = slot_of(&registry, &plain, "WARMTH");

        let (plain_score, _) = score_move(&registry, [&psawarca, &plain], [jet, warming]);
        let (warmed_score, _) = score_move(&registry, [&psawarca, &warmed], [jet, warming]);
        assert!(warmed_score > plain_score);

        let template = registry.move_template(psawarca.moves[jet]);
        assert!(score_extinguish(&registry, &warmed, template, false, 10.0) > 0.0);
        assert!(score_extinguish(&registry, &warmed, template, true, 10.0) < 0.0);
    }

    #[test]
    fn test_scoring_override_scales_score() {
        let registry = test_registry();
        let fragonire = TestCreatureBuilder::new("FRAGONIRE").build(&registry);
        let psawarca = TestCreatureBuilder::new("PSAWARCA").build(&registry);
        let schonips = TestCreatureBuilder::new("SCHONIPS").build(&registry);
        let warmth = slot_of(&registry, &fragonire, "WARMTH");
        let tail_slap = slot_of(&registry, &psawarca, "TAIL SLAP");
        let shock_scream = slot_of(&registry, &schonips, "SHOCK SCREAM");

        let (vs_psawarca, _) = score_move(&registry, [&fragonire, &psawarca], [warmth, tail_slap]);
        let (vs_schonips, _) =
            score_move(&registry, [&fragonire, &schonips], [warmth, shock_scream]);
        assert!(vs_schonips > 0.0);
        assert_eq!(vs_psawarca, vs_schonips * 0.25);
    }

    #[test]
    fn test_self_status_scores_opposite_to_inflicted() {
        let registry = test_registry();
        let shocked = registry.status(registry.status_id("SHOCKED").unwrap());
        let ctx = StatusContext {
            faster: 0.0,
            target_self: false,
            opponent_attacking: false,
            damage_scale: 1.0,
            thorn_scale: 1.0,
            round_cap: 10.0,
        };
        let on_opponent = score_status(shocked, &ctx);
        let on_self = score_status(
            shocked,
            &StatusContext {
                target_self: true,
                ..ctx
            },
        );
        assert!(on_opponent > 0.0);
        assert_eq!(on_self, -on_opponent);
    }

    #[test]
    fn test_defense_buff_is_worth_more_when_it_lands_first() {
        let registry = test_registry();
        let airborne = registry.status(registry.status_id("AIRBORNE").unwrap());
        let slow = StatusContext {
            faster: 0.0,
            target_self: true,
            opponent_attacking: true,
            damage_scale: 1.0,
            thorn_scale: 1.0,
            round_cap: 10.0,
        };
        let fast = StatusContext { faster: 1.0, ..slow };
        assert!(score_status(airborne, &fast) > score_status(airborne, &slow));
        assert!(score_status(airborne, &slow) > 0.0);
    }
}
