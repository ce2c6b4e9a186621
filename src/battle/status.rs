//! Timed status effects on a single creature.
//!
//! Occurrences are stored on the creature in application order. A tick ages
//! every occurrence once: stun counters count down, expired occurrences are
//! removed, and the rest deal (or heal) their tick damage.

use crate::battle::calculators::scale_damage;
use crate::battle::state::TurnRng;
use crate::creature::{CreatureInst, StatusOccurrence};
use crate::registry::{Registry, StatusId};
use schema::Element;

/// What one occurrence did during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEffect {
    Damaged {
        status: StatusId,
        amount: i32,
        previous_health: i32,
    },
    Healed {
        status: StatusId,
        amount: i32,
        previous_health: i32,
    },
    Expired {
        status: StatusId,
    },
}

/// Attaches a new occurrence of `status`. The type multiplier against the
/// holder is computed here and never again.
pub fn apply_status(registry: &Registry, holder: &mut CreatureInst, status: StatusId) {
    let template = registry.status(status);
    let multiplier = registry
        .types()
        .relationship(template.element, &holder.elements);
    holder.statuses.push(StatusOccurrence {
        status,
        remaining: template.duration,
        stun: template.stun,
        multiplier,
    });
}

/// Ages every occurrence on `holder` by one turn.
pub fn tick_statuses(
    registry: &Registry,
    holder: &mut CreatureInst,
    rng: &mut TurnRng,
) -> Vec<TickEffect> {
    let mut effects = Vec::new();
    let mut index = 0;

    while index < holder.statuses.len() {
        let occurrence = &mut holder.statuses[index];
        occurrence.stun = match occurrence.stun {
            Some(0) | None => None,
            Some(turns) => Some(turns - 1),
        };

        let status = occurrence.status;
        if occurrence.remaining.is_expired() {
            holder.statuses.remove(index);
            effects.push(TickEffect::Expired { status });
            continue;
        }
        occurrence.remaining = occurrence.remaining.decremented();
        let multiplier = occurrence.multiplier;

        let tick = registry.status(status).tick_damage;
        let roll = rng.range(tick.low, tick.high, "status tick");
        let previous_health = holder.health();
        if roll > 0 {
            let amount = holder.take_damage(scale_damage(roll, multiplier));
            if amount > 0 {
                effects.push(TickEffect::Damaged {
                    status,
                    amount,
                    previous_health,
                });
            }
        } else if roll < 0 {
            let amount = holder.heal(-roll);
            if amount > 0 {
                effects.push(TickEffect::Healed {
                    status,
                    amount,
                    previous_health,
                });
            }
        }
        index += 1;
    }

    effects
}

/// Removes every occurrence whose element is weak to `incoming`, if
/// `incoming` is able to extinguish at all. Returns what was removed.
pub fn extinguish(
    registry: &Registry,
    holder: &mut CreatureInst,
    incoming: Element,
) -> Vec<StatusId> {
    let types = registry.types();
    if !types.can_extinguish(incoming) {
        return Vec::new();
    }

    let mut removed = Vec::new();
    holder.statuses.retain(|occurrence| {
        let element = registry.status(occurrence.status).element;
        if types.is_weak_to(element, incoming) {
            removed.push(occurrence.status);
            false
        } else {
            true
        }
    });
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::{test_registry, TestCreatureBuilder};
    use pretty_assertions::assert_eq;
    use schema::StatusDuration;

    #[test]
    fn test_three_turn_status_lifecycle() {
        let registry = test_registry();
        let burning = registry.status_id("BURNING").unwrap();
        let mut schonips = TestCreatureBuilder::new("SCHONIPS").build(&registry);
        apply_status(&registry, &mut schonips, burning);
        // BURNING ticks for a fixed 2, so no randomness is consumed
        let mut rng = TurnRng::new_for_test(vec![]);

        for expected_health in [50, 48, 46] {
            let effects = tick_statuses(&registry, &mut schonips, &mut rng);
            assert_eq!(schonips.health(), expected_health);
            assert_eq!(effects.len(), 1);
            assert!(schonips.has_status(burning));
        }

        let effects = tick_statuses(&registry, &mut schonips, &mut rng);
        assert_eq!(effects, vec![TickEffect::Expired { status: burning }]);
        assert_eq!(schonips.health(), 46);
        assert!(schonips.statuses.is_empty());
    }

    #[test]
    fn test_durations_never_increase() {
        let registry = test_registry();
        let mut creature = TestCreatureBuilder::new("PSAWARCA")
            .with_status("SOAKED")
            .with_status("TIDAL SHELL")
            .with_status("BRACED")
            .build(&registry);
        let mut rng = TurnRng::new_for_test(vec![]);

        let turns = |occurrence: &StatusOccurrence| match occurrence.remaining {
            StatusDuration::Turns(n) => n,
            StatusDuration::Unbounded => u8::MAX,
        };
        let mut previous: Vec<(StatusId, u8)> =
            creature.statuses.iter().map(|o| (o.status, turns(o))).collect();
        for _ in 0..4 {
            tick_statuses(&registry, &mut creature, &mut rng);
            for occurrence in &creature.statuses {
                let before = previous
                    .iter()
                    .find(|(id, _)| *id == occurrence.status)
                    .map(|(_, t)| *t)
                    .unwrap();
                assert!(turns(occurrence) <= before);
            }
            previous = creature.statuses.iter().map(|o| (o.status, turns(o))).collect();
        }
        assert!(creature.statuses.is_empty());
    }

    #[test]
    fn test_unbounded_status_survives_ticks() {
        let registry = test_registry();
        let handicap = registry.handicap_status(0).unwrap();
        let mut creature = TestCreatureBuilder::new("SHIGOWI").build(&registry);
        apply_status(&registry, &mut creature, handicap);
        let mut rng = TurnRng::new_for_test(vec![]);

        for _ in 0..10 {
            tick_statuses(&registry, &mut creature, &mut rng);
        }
        assert_eq!(creature.statuses.len(), 1);
        assert_eq!(creature.statuses[0].remaining, StatusDuration::Unbounded);
        assert_eq!(creature.health(), creature.max_health);
    }

    #[test]
    fn test_stun_counter_wears_off_before_duration() {
        let registry = test_registry();
        let mut fragonire = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("SHOCKED")
            .build(&registry);
        let mut rng = TurnRng::new_for_test(vec![]);

        assert!(fragonire.is_stunned());
        tick_statuses(&registry, &mut fragonire, &mut rng);
        assert_eq!(fragonire.statuses[0].stun, Some(0));
        assert!(fragonire.is_stunned());

        tick_statuses(&registry, &mut fragonire, &mut rng);
        assert_eq!(fragonire.statuses[0].stun, None);
        assert!(!fragonire.is_stunned());
        assert_eq!(fragonire.statuses.len(), 1);

        tick_statuses(&registry, &mut fragonire, &mut rng);
        assert!(fragonire.statuses.is_empty());
    }

    #[test]
    fn test_healing_ticks_ignore_multiplier() {
        let registry = test_registry();
        // SNAKE REGENERATION is PHYSICAL; pretend it was cached as a weakness
        let mut schonips = TestCreatureBuilder::new("SCHONIPS")
            .with_health(20)
            .with_status("SNAKE REGENERATION")
            .build(&registry);
        schonips.statuses[0].multiplier = 1.2;
        let mut rng = TurnRng::new_for_test(vec![]);

        let effects = tick_statuses(&registry, &mut schonips, &mut rng);
        assert_eq!(schonips.health(), 24);
        assert_eq!(schonips.total_healed, 4);
        assert!(matches!(effects[0], TickEffect::Healed { amount: 4, .. }));
    }

    #[test]
    fn test_damage_ticks_use_cached_multiplier() {
        let registry = test_registry();
        let burning = registry.status_id("BURNING").unwrap();
        // BLOOD is weak to FIRE
        let mut shigowi = TestCreatureBuilder::new("SHIGOWI").build(&registry);
        apply_status(&registry, &mut shigowi, burning);
        assert_eq!(shigowi.statuses[0].multiplier, 1.2);

        let mut rng = TurnRng::new_for_test(vec![]);
        tick_statuses(&registry, &mut shigowi, &mut rng);
        // 2 * 1.2 truncates to 2
        assert_eq!(shigowi.health(), 54);
    }

    #[test]
    fn test_extinguish_removes_only_weak_statuses() {
        let registry = test_registry();
        let mut fragonire = TestCreatureBuilder::new("FRAGONIRE")
            .with_status("WARMING")
            .with_status("AIRBORNE")
            .with_status("BURNING")
            .build(&registry);

        let removed = extinguish(&registry, &mut fragonire, Element::Water);
        assert_eq!(
            removed,
            vec![
                registry.status_id("WARMING").unwrap(),
                registry.status_id("BURNING").unwrap()
            ]
        );
        assert_eq!(fragonire.statuses.len(), 1);
        assert_eq!(
            fragonire.statuses[0].status,
            registry.status_id("AIRBORNE").unwrap()
        );
    }

    #[test]
    fn test_non_extinguishing_element_removes_nothing() {
        let registry = test_registry();
        let mut shigowi = TestCreatureBuilder::new("SHIGOWI")
            .with_status("MARKED")
            .build(&registry);
        // BLOOD statuses are weak to FIRE, but PHYSICAL cannot extinguish at all
        assert!(extinguish(&registry, &mut shigowi, Element::Physical).is_empty());
        assert_eq!(shigowi.statuses.len(), 1);
        assert_eq!(extinguish(&registry, &mut shigowi, Element::Fire).len(), 1);
    }
}
