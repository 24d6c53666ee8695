//! Outcome roller
//!
//! Power ratio → band → roll modifier, then a d100 roll looked up in the
//! attack type's tier table. Bombardment and nuclear strikes skip the ratio
//! step entirely and roll unmodified.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::power::SidePowers;
use crate::core::config::WarConfig;
use crate::core::tiers::{MAX_ROLL, MIN_ROLL};
use crate::core::types::AttackType;

/// Discrete bucket of attacker/defender power ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerRatioBand {
    /// ratio < 0.3
    SeverelyOutgunned,
    /// 0.3 <= ratio < 0.6
    SignificantlyOutgunned,
    /// 0.6 <= ratio < 0.9
    SlightlyOutgunned,
    /// 0.9 <= ratio <= 1.1
    EvenMatch,
    /// 1.1 < ratio <= 2.0
    SlightAdvantage,
    /// 2.0 < ratio <= 4.0
    SignificantAdvantage,
    /// ratio > 4.0
    OverwhelmingAdvantage,
}

impl PowerRatioBand {
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio < 0.3 {
            PowerRatioBand::SeverelyOutgunned
        } else if ratio < 0.6 {
            PowerRatioBand::SignificantlyOutgunned
        } else if ratio < 0.9 {
            PowerRatioBand::SlightlyOutgunned
        } else if ratio <= 1.1 {
            PowerRatioBand::EvenMatch
        } else if ratio <= 2.0 {
            PowerRatioBand::SlightAdvantage
        } else if ratio <= 4.0 {
            PowerRatioBand::SignificantAdvantage
        } else {
            PowerRatioBand::OverwhelmingAdvantage
        }
    }
}

/// Everything the roller decided, kept for the battle log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub band: Option<PowerRatioBand>,
    pub modifier: i32,
    /// None when the outcome was forced and no roll was drawn
    pub raw_roll: Option<u8>,
    pub final_roll: Option<u8>,
    pub tier_name: String,
    pub multiplier: f64,
    /// Automatic decisive victory against an empty defence
    pub forced: bool,
}

/// Whether this battle skips the roll: ratio-modified types against zero defender power
pub fn is_forced(attack_type: AttackType, powers: &SidePowers) -> bool {
    attack_type.uses_power_ratio() && powers.defender <= 0.0
}

/// Band and modifier for this battle. None for pure-roll attack types.
pub fn ratio_modifier(
    config: &WarConfig,
    attack_type: AttackType,
    powers: &SidePowers,
) -> (Option<PowerRatioBand>, i32) {
    if !attack_type.uses_power_ratio() || powers.defender <= 0.0 {
        return (None, 0);
    }
    let band = PowerRatioBand::from_ratio(powers.attacker / powers.defender);
    (Some(band), config.settings().power_ratio_modifiers.modifier(band))
}

/// Outcome for a given raw roll. Pure, so scenarios can be pinned in tests.
pub fn outcome_for_roll(
    config: &WarConfig,
    attack_type: AttackType,
    powers: &SidePowers,
    raw_roll: u8,
) -> RollOutcome {
    let (band, modifier) = ratio_modifier(config, attack_type, powers);
    let final_roll = (i32::from(raw_roll) + modifier).clamp(i32::from(MIN_ROLL), i32::from(MAX_ROLL)) as u8;
    let tier = config.tiers(attack_type).lookup(final_roll);

    RollOutcome {
        band,
        modifier,
        raw_roll: Some(raw_roll),
        final_roll: Some(final_roll),
        tier_name: tier.name.clone(),
        multiplier: tier.multiplier,
        forced: false,
    }
}

/// Roll the battle outcome. Draws nothing from `rng` when the outcome is forced.
pub fn roll_outcome<R: Rng + ?Sized>(
    config: &WarConfig,
    attack_type: AttackType,
    powers: &SidePowers,
    rng: &mut R,
) -> RollOutcome {
    if is_forced(attack_type, powers) {
        let tier = config.tiers(attack_type).highest();
        return RollOutcome {
            band: None,
            modifier: 0,
            raw_roll: None,
            final_roll: None,
            tier_name: tier.name.clone(),
            multiplier: tier.multiplier,
            forced: true,
        };
    }

    let raw_roll = rng.gen_range(MIN_ROLL..=MAX_ROLL);
    outcome_for_roll(config, attack_type, powers, raw_roll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn powers(attacker: f64, defender: f64) -> SidePowers {
        SidePowers { attacker, defender }
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(PowerRatioBand::from_ratio(0.29), PowerRatioBand::SeverelyOutgunned);
        assert_eq!(PowerRatioBand::from_ratio(0.3), PowerRatioBand::SignificantlyOutgunned);
        assert_eq!(PowerRatioBand::from_ratio(0.6), PowerRatioBand::SlightlyOutgunned);
        assert_eq!(PowerRatioBand::from_ratio(0.9), PowerRatioBand::EvenMatch);
        assert_eq!(PowerRatioBand::from_ratio(1.1), PowerRatioBand::EvenMatch);
        assert_eq!(PowerRatioBand::from_ratio(1.11), PowerRatioBand::SlightAdvantage);
        assert_eq!(PowerRatioBand::from_ratio(2.0), PowerRatioBand::SlightAdvantage);
        assert_eq!(PowerRatioBand::from_ratio(4.0), PowerRatioBand::SignificantAdvantage);
        assert_eq!(PowerRatioBand::from_ratio(4.01), PowerRatioBand::OverwhelmingAdvantage);
    }

    #[test]
    fn test_overwhelming_advantage_scenario() {
        // 1000 vs 200 -> ratio 5.0 -> +25; raw 60 -> 85 -> Victory x1.3
        let config = WarConfig::default();
        let outcome = outcome_for_roll(&config, AttackType::GroundBattle, &powers(1000.0, 200.0), 60);
        assert_eq!(outcome.band, Some(PowerRatioBand::OverwhelmingAdvantage));
        assert_eq!(outcome.modifier, 25);
        assert_eq!(outcome.final_roll, Some(85));
        assert_eq!(outcome.tier_name, "Victory");
        assert_eq!(outcome.multiplier, 1.3);
    }

    #[test]
    fn test_final_roll_is_clamped() {
        let config = WarConfig::default();
        let high = outcome_for_roll(&config, AttackType::GroundBattle, &powers(1000.0, 10.0), 95);
        assert_eq!(high.final_roll, Some(100));
        let low = outcome_for_roll(&config, AttackType::GroundBattle, &powers(10.0, 1000.0), 5);
        assert_eq!(low.final_roll, Some(1));
        assert_eq!(low.tier_name, "Utter Failure");
    }

    #[test]
    fn test_bombardment_ignores_power_ratio() {
        let config = WarConfig::default();
        let outcome = outcome_for_roll(&config, AttackType::Bombardment, &powers(10_000.0, 1.0), 60);
        assert_eq!(outcome.band, None);
        assert_eq!(outcome.modifier, 0);
        assert_eq!(outcome.final_roll, Some(60));
        assert_eq!(outcome.tier_name, "Partial Hit");
    }

    #[test]
    fn test_zero_defender_forces_top_tier_without_rolling() {
        let config = WarConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut untouched = rng.clone();

        for &attack in &[AttackType::GroundBattle, AttackType::AirStrike, AttackType::NavalBattle] {
            let outcome = roll_outcome(&config, attack, &powers(50.0, 0.0), &mut rng);
            assert!(outcome.forced);
            assert_eq!(outcome.raw_roll, None);
            assert_eq!(outcome.tier_name, config.tiers(attack).highest().name);
        }
        // No randomness was consumed
        assert_eq!(rng.next_u64(), untouched.next_u64());
    }

    #[test]
    fn test_nuclear_against_zero_defence_still_rolls() {
        let config = WarConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let outcome = roll_outcome(&config, AttackType::NuclearStrike, &powers(1000.0, 0.0), &mut rng);
        assert!(!outcome.forced);
        assert!(outcome.raw_roll.is_some());
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let config = WarConfig::default();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..20 {
            assert_eq!(
                roll_outcome(&config, AttackType::AirStrike, &powers(300.0, 250.0), &mut a),
                roll_outcome(&config, AttackType::AirStrike, &powers(300.0, 250.0), &mut b)
            );
        }
    }
}
