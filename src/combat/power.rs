//! Combat power: unit counts weighted by configured strength

use serde::{Deserialize, Serialize};

use crate::combat::resources::DefenderSupply;
use crate::core::config::WarConfig;
use crate::core::types::{AttackType, UnitCounts};
use crate::nation::NationMilitary;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SidePowers {
    pub attacker: f64,
    pub defender: f64,
}

/// `Σ units[u] * unit_combat_strengths[u]`
pub fn unit_power(config: &WarConfig, units: &UnitCounts) -> f64 {
    units
        .iter()
        .map(|(&unit, &count)| count as f64 * config.unit(unit).combat_strength)
        .sum::<f64>()
        .max(0.0)
}

pub fn attacker_power(config: &WarConfig, committed: &UnitCounts) -> f64 {
    unit_power(config, committed)
}

/// The defender's standing units that contest this attack type
pub fn defending_force(config: &WarConfig, attack_type: AttackType, military: &NationMilitary) -> UnitCounts {
    military.subset(&config.attack(attack_type).defending_units)
}

/// Defender power after the supply penalty
pub fn defender_power(
    config: &WarConfig,
    attack_type: AttackType,
    military: &NationMilitary,
    supply: &DefenderSupply,
) -> f64 {
    let base = unit_power(config, &defending_force(config, attack_type, military));
    (base * supply.power_factor).max(0.0)
}
