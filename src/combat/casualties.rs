//! Unit losses on both sides of a battle
//!
//! Attacker losses scale inversely with the outcome multiplier and are capped
//! per unit type. Defender losses come from a budget proportional to the
//! resistance damage dealt, split across primary targets and collateral.

use crate::core::config::{AttackTypeSettings, WarConfig};
use crate::core::types::{UnitCounts, UnitType};
use crate::nation::NationMilitary;

/// Absorbs float noise so exact products floor as expected (56.0, not 55)
const FLOOR_EPSILON: f64 = 1e-9;

fn floor_count(value: f64) -> u64 {
    (value + FLOOR_EPSILON).floor().max(0.0) as u64
}

/// `clamp(committed * base_rate * (2 - multiplier), 0, committed * max_rate)`, floored
pub fn attacker_losses(settings: &AttackTypeSettings, committed: &UnitCounts, multiplier: f64) -> UnitCounts {
    committed
        .iter()
        .map(|(&unit, &count)| {
            let rate = settings.attacker_loss_rates.get(unit);
            let count_f = count as f64;
            let cap = count_f * rate.max_rate;
            let raw = count_f * rate.base_rate * (2.0 - multiplier);
            let lost = floor_count(raw.clamp(0.0, cap)).min(count);
            (unit, lost)
        })
        .filter(|(_, lost)| *lost > 0)
        .collect()
}

/// Committed units consumed in full by the attack (missiles, warheads)
pub fn expended_units(settings: &AttackTypeSettings, committed: &UnitCounts) -> UnitCounts {
    committed
        .iter()
        .filter(|(unit, count)| **count > 0 && settings.expended_units.contains(*unit))
        .map(|(&unit, &count)| (unit, count))
        .collect()
}

/// Everything the attacker actually gives up: losses, with expended types removed in full
pub fn attacker_debit(losses: &UnitCounts, expended: &UnitCounts) -> UnitCounts {
    let mut debit = losses.clone();
    for (&unit, &count) in expended {
        let entry = debit.entry(unit).or_insert(0);
        *entry = (*entry).max(count);
    }
    debit
}

/// Units the defender loses per the resistance damage dealt
pub fn defender_loss_pool(config: &WarConfig, resistance_damage: f64) -> f64 {
    (resistance_damage * config.settings().casualties.defender_loss_per_resistance_point).max(0.0)
}

/// Spread the loss pool: `pool * category_share/100 * type_weight/100`, floored,
/// never more than the defender has of that type
pub fn defender_losses(settings: &AttackTypeSettings, pool: f64, defender: &NationMilitary) -> UnitCounts {
    let allocation = &settings.defender_losses;
    let primary_share = allocation.primary_share_percent / 100.0;
    let categories = [
        (primary_share, &allocation.primary_targets),
        (1.0 - primary_share, &allocation.collateral_damage),
    ];

    let mut losses = UnitCounts::new();
    for (share, weights) in categories {
        for (unit, &weight) in weights.iter() {
            if weight <= 0.0 {
                continue;
            }
            let wanted = floor_count(pool * share * weight / 100.0);
            let already = losses.get(&unit).copied().unwrap_or(0);
            let available = defender.get(unit).saturating_sub(already);
            let lost = wanted.min(available);
            if lost > 0 {
                *losses.entry(unit).or_insert(0) += lost;
            }
        }
    }
    losses
}

/// Convenience for single-type lookups in results
pub fn count(units: &UnitCounts, unit: UnitType) -> u64 {
    units.get(&unit).copied().unwrap_or(0)
}
