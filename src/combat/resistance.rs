//! Resistance damage from a single attack

use crate::core::config::AttackTypeSettings;

/// `min(max_resistance_damage_per_attack * multiplier, final_resistance_damage_cap)`
pub fn resistance_damage(settings: &AttackTypeSettings, multiplier: f64) -> f64 {
    (settings.max_resistance_damage_per_attack * multiplier)
        .min(settings.final_resistance_damage_cap)
        .max(0.0)
}

/// New resistance after `damage`, kept within `[0, starting]`
pub fn apply_damage(current: f64, damage: f64, starting: f64) -> f64 {
    (current - damage).clamp(0.0, starting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WarConfig;
    use crate::core::types::AttackType;
    use proptest::prelude::*;

    #[test]
    fn test_victory_scenario_damage() {
        let config = WarConfig::default();
        let damage = resistance_damage(config.attack(AttackType::GroundBattle), 1.3);
        assert!((damage - 3.9).abs() < 1e-9);
        assert!((apply_damage(100.0, damage, 100.0) - 96.1).abs() < 1e-9);
    }

    #[test]
    fn test_cap_applies() {
        let config = WarConfig::default();
        let damage = resistance_damage(config.attack(AttackType::GroundBattle), 3.0);
        assert_eq!(damage, 5.0);
    }

    #[test]
    fn test_resistance_floors_at_zero() {
        assert_eq!(apply_damage(2.5, 3.9, 100.0), 0.0);
    }

    proptest! {
        #[test]
        fn prop_damage_never_exceeds_cap(multiplier in 0.0f64..10.0, attack in 0usize..5) {
            let config = WarConfig::default();
            let attack = AttackType::all()[attack];
            let settings = config.attack(attack);
            let damage = resistance_damage(settings, multiplier);
            prop_assert!(damage >= 0.0);
            prop_assert!(damage <= settings.final_resistance_damage_cap);
        }

        #[test]
        fn prop_resistance_stays_in_range(current in 0.0f64..100.0, damage in 0.0f64..500.0) {
            let next = apply_damage(current, damage, 100.0);
            prop_assert!((0.0..=100.0).contains(&next));
        }
    }
}
