use crate::battle::commands::{BattleCommand, PlayerTarget};
use crate::battle::state::{BattleEvent, BattleState, HealthSource, TurnRng};
use crate::creature::CreatureInst;
use crate::registry::Registry;
use schema::{DamageRange, Targeting};

/// Hit chance never goes above this, however good the aim.
pub const HIT_CHANCE_CAP: i32 = 120;

/// Applies a type multiplier to a damage amount, truncating toward zero.
pub fn scale_damage(amount: i32, multiplier: f64) -> i32 {
    (amount as f64 * multiplier) as i32
}

/// Chance in percent that an attack with `aim` connects.
pub fn hit_chance(
    registry: &Registry,
    attacker: &CreatureInst,
    defender: &CreatureInst,
    aim: i32,
) -> i32 {
    let chance = aim + attacker.aim_modifier(registry)
        - defender.defense
        - defender.defense_modifier(registry);
    chance.clamp(0, HIT_CHANCE_CAP)
}

/// An attempt connects when the roll lands in the top `hit_chance` values.
pub fn attempt_connects(roll: u32, hit_chance: i32) -> bool {
    roll as i32 > 100 - hit_chance
}

/// Damage of a missed attempt: whatever the roll exceeded the floor by,
/// minus one. Healing moves mirror this against the ceiling.
pub fn graze_amount(roll: i32, range: &DamageRange) -> i32 {
    if range.is_healing() {
        (roll - range.high + 1).min(0)
    } else {
        (roll - range.low - 1).max(0)
    }
}

/// Result of one hit attempt, before it is applied.
#[derive(Debug, Clone)]
pub struct AttemptOutcome {
    pub commands: Vec<BattleCommand>,
    pub connected: bool,
}

fn health_commands(target: PlayerTarget, amount: i32, source: HealthSource) -> Vec<BattleCommand> {
    if amount > 0 {
        vec![BattleCommand::DealDamage {
            target,
            amount,
            source,
        }]
    } else if amount < 0 {
        vec![BattleCommand::Heal {
            target,
            amount: -amount,
            source,
        }]
    } else {
        Vec::new()
    }
}

/// Calculate the outcome of one attempt of the move in `move_index`.
///
/// `connected_before` is whether an earlier attempt of the same move already
/// connected, so effectiveness is only announced once.
pub fn calculate_attempt_outcome(
    state: &BattleState,
    attacker_index: usize,
    move_index: usize,
    connected_before: bool,
    rng: &mut TurnRng,
) -> AttemptOutcome {
    let registry = &state.registry;
    let attacker_target = PlayerTarget::from_index(attacker_index);
    let defender_target = attacker_target.opponent();
    let attacker = state.players[attacker_index].active();
    let defender = state.players[defender_target.to_index()].active();
    let template = registry.move_template(attacker.moves[move_index]);
    let mut commands = Vec::new();

    match template.targeting {
        Targeting::SelfTargeted => {
            let amount = rng.range(template.damage.low, template.damage.high, "self move amount")
                + attacker.damage_modifier(registry, template.element, false);

            if let Some(proc) = template.status {
                if rng.percent("status proc") < proc.chance as u32 {
                    // Extinguish before applying so the new status never strips itself
                    commands.push(BattleCommand::Extinguish {
                        target: attacker_target,
                        element: registry.status(proc.status).element,
                    });
                    commands.push(BattleCommand::ApplyStatus {
                        target: attacker_target,
                        status: proc.status,
                    });
                }
            }
            commands.extend(health_commands(
                attacker_target,
                amount,
                HealthSource::Move(template.name.clone()),
            ));
            commands.push(BattleCommand::Extinguish {
                target: attacker_target,
                element: template.element,
            });

            AttemptOutcome {
                commands,
                connected: true,
            }
        }
        Targeting::OpponentTargeted { aim } => {
            let chance = hit_chance(registry, attacker, defender, aim);
            let roll = rng.percent("hit roll");
            let multiplier = registry
                .types()
                .relationship(template.element, &defender.elements);

            if !attempt_connects(roll, chance) {
                commands.push(BattleCommand::EmitEvent(BattleEvent::MoveMissed {
                    player_index: attacker_index,
                    move_name: template.name.clone(),
                    roll,
                    hit_chance: chance,
                }));
                let graze_roll = rng.range(template.damage.low, template.damage.high, "graze");
                let graze = scale_damage(graze_amount(graze_roll, &template.damage), multiplier);
                commands.extend(health_commands(
                    defender_target,
                    graze,
                    HealthSource::Graze(template.name.clone()),
                ));
                return AttemptOutcome {
                    commands,
                    connected: false,
                };
            }

            commands.push(BattleCommand::EmitEvent(BattleEvent::MoveHit {
                player_index: attacker_index,
                move_name: template.name.clone(),
                roll,
                hit_chance: chance,
            }));
            if !connected_before {
                commands.push(BattleCommand::EmitEvent(
                    BattleEvent::AttackTypeEffectiveness { multiplier },
                ));
            }

            let raw = rng.range(template.damage.low, template.damage.high, "move damage")
                + attacker.damage_modifier(registry, template.element, true);
            let mut amount = scale_damage(raw, multiplier);
            // Modifiers never flip a damaging move into a heal or the reverse
            amount = if template.damage.is_healing() {
                amount.min(0)
            } else {
                amount.max(0)
            };
            commands.extend(health_commands(
                defender_target,
                amount,
                HealthSource::Move(template.name.clone()),
            ));
            if amount > 0 {
                commands.push(BattleCommand::GainRage {
                    target: defender_target,
                });
            }

            if let Some(proc) = template.status {
                let status_element = registry.status(proc.status).element;
                let effective_chance = proc.chance as f64
                    * registry
                        .types()
                        .relationship(status_element, &defender.elements);
                if (rng.percent("status proc") as f64) < effective_chance {
                    commands.push(BattleCommand::Extinguish {
                        target: defender_target,
                        element: status_element,
                    });
                    commands.push(BattleCommand::ApplyStatus {
                        target: defender_target,
                        status: proc.status,
                    });
                }
            }
            commands.push(BattleCommand::Extinguish {
                target: defender_target,
                element: template.element,
            });

            AttemptOutcome {
                commands,
                connected: true,
            }
        }
    }
}

/// Retaliation from the defender's statuses after an opponent-targeted move.
///
/// Positive thorn damages the attacker, scaled by each status element against
/// the attacker. Negative thorn drains the defender's attacker back to health,
/// but only if the move connected at least once.
pub fn calculate_thorn_outcome(
    state: &BattleState,
    attacker_index: usize,
    connected: bool,
    rng: &mut TurnRng,
) -> Vec<BattleCommand> {
    let registry = &state.registry;
    let attacker_target = PlayerTarget::from_index(attacker_index);
    let attacker = state.players[attacker_index].active();
    let defender = state.players[attacker_target.opponent().to_index()].active();

    let mut total = 0;
    for occurrence in &defender.statuses {
        let template = registry.status(occurrence.status);
        if template.thorn.is_zero() {
            continue;
        }
        let mut thorn = rng.range(template.thorn.low, template.thorn.high, "thorn");
        if thorn > 0 {
            let multiplier = registry
                .types()
                .relationship(template.element, &attacker.elements);
            thorn = scale_damage(thorn, multiplier);
        }
        total += thorn;
    }

    if total > 0 || (total < 0 && connected) {
        health_commands(attacker_target, total, HealthSource::Thorn)
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{test_registry, TestCreatureBuilder};
    use rstest::rstest;

    #[rstest]
    #[case(3, 6, 3, 0)]
    #[case(3, 6, 4, 0)]
    #[case(3, 6, 6, 2)]
    #[case(4, 4, 4, 0)]
    #[case(-6, -4, -6, -1)]
    #[case(-6, -4, -4, 0)]
    fn test_graze_amount(
        #[case] low: i32,
        #[case] high: i32,
        #[case] roll: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(graze_amount(roll, &DamageRange::new(low, high)), expected);
    }

    #[rstest]
    #[case(80, 21, true)]
    #[case(80, 20, false)]
    #[case(0, 99, false)]
    #[case(120, 0, true)]
    fn test_attempt_connects(#[case] chance: i32, #[case] roll: u32, #[case] expected: bool) {
        assert_eq!(attempt_connects(roll, chance), expected);
    }

    #[test]
    fn test_hit_chance_is_clamped() {
        let registry = test_registry();
        let attacker = TestCreatureBuilder::new("SCHONIPS").build(&registry);
        let airborne = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("AIRBORNE")
            .with_status("AIRBORNE")
            .with_status("AIRBORNE")
            .build(&registry);
        assert_eq!(hit_chance(&registry, &attacker, &airborne, 80), 0);

        let shocked = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("SHOCKED")
            .build(&registry);
        assert_eq!(hit_chance(&registry, &attacker, &shocked, 115), HIT_CHANCE_CAP);
    }

    #[test]
    fn test_hit_chance_sums_modifiers() {
        let registry = test_registry();
        let soaked = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("SOAKED")
            .build(&registry);
        let braced = TestCreatureBuilder::new("SCHONIPS")
            .with_status("BRACED")
            .build(&registry);
        // 90 aim - 10 soaked - 15 defense - 30 braced
        assert_eq!(hit_chance(&registry, &soaked, &braced, 90), 35);
    }

    #[test]
    fn test_scale_damage_truncates() {
        assert_eq!(scale_damage(6, 0.8), 4);
        assert_eq!(scale_damage(5, 1.2), 6);
        assert_eq!(scale_damage(9, 0.0), 0);
        assert_eq!(scale_damage(-5, 1.2), -6);
    }
}
