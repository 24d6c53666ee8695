//! Ammo and gasoline accounting for battles
//!
//! The attacker must cover the full cost of the committed force up front
//! (hard precondition). The defender is never blocked; a short defender
//! fights at reduced power instead.

use serde::{Deserialize, Serialize};

use crate::core::config::WarConfig;
use crate::core::error::PreconditionError;
use crate::core::types::{AttackType, Resource, UnitCounts};
use crate::nation::{NationMilitary, NationResources};

/// Absorbs float noise before rounding so exact products round as expected
const ROUNDING_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRequirement {
    pub ammo: u64,
    pub gasoline: u64,
}

impl ResourceRequirement {
    fn from_totals(ammo: f64, gasoline: f64) -> Self {
        Self {
            ammo: round_up(ammo),
            gasoline: round_up(gasoline),
        }
    }

    pub fn as_materials(&self) -> [(Resource, u64); 2] {
        [(Resource::Ammo, self.ammo), (Resource::Gasoline, self.gasoline)]
    }
}

fn round_up(value: f64) -> u64 {
    (value - ROUNDING_EPSILON).ceil().max(0.0) as u64
}

/// Ammo/gasoline the attacker burns: `Σ committed[u] * rate[u]`, rounded up
pub fn attack_requirement(config: &WarConfig, committed: &UnitCounts) -> ResourceRequirement {
    let (ammo, gasoline) = committed.iter().fold((0.0, 0.0), |(ammo, gas), (&unit, &count)| {
        let stats = config.unit(unit);
        (
            ammo + count as f64 * stats.ammo_per_unit,
            gas + count as f64 * stats.gasoline_per_unit,
        )
    });
    ResourceRequirement::from_totals(ammo, gasoline)
}

/// Fail with `InsufficientResources` unless both requirements are covered
pub fn check_attacker_supply(
    resources: &NationResources,
    requirement: &ResourceRequirement,
) -> Result<(), PreconditionError> {
    if resources.has_materials(&requirement.as_materials()) {
        return Ok(());
    }
    Err(PreconditionError::InsufficientResources {
        ammo_required: requirement.ammo,
        ammo_available: resources.get(Resource::Ammo),
        gasoline_required: requirement.gasoline,
        gasoline_available: resources.get(Resource::Gasoline),
    })
}

/// Debit the attacker. Supply must already have passed [`check_attacker_supply`].
pub fn debit_attacker(resources: &mut NationResources, requirement: &ResourceRequirement) {
    let consumed = resources.consume_materials(&requirement.as_materials());
    debug_assert!(consumed, "attacker debited without a supply check");
}

/// What the defender's standing force needs to fight at full strength
pub fn defensive_requirement(
    config: &WarConfig,
    attack_type: AttackType,
    military: &NationMilitary,
) -> ResourceRequirement {
    let standing = military.subset(&config.attack(attack_type).defending_units);
    let (ammo, gasoline) = standing.iter().fold((0.0, 0.0), |(ammo, gas), (&unit, &count)| {
        let stats = config.unit(unit);
        (
            ammo + count as f64 * stats.defensive_ammo_per_unit,
            gas + count as f64 * stats.defensive_gasoline_per_unit,
        )
    });
    ResourceRequirement::from_totals(ammo, gasoline)
}

/// Defender supply check and the resulting power multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenderSupply {
    pub ammo_sufficient: bool,
    pub gasoline_sufficient: bool,
    /// Multiplier applied to defender power, 1.0 when fully supplied
    pub power_factor: f64,
}

pub fn defender_supply(
    config: &WarConfig,
    attack_type: AttackType,
    military: &NationMilitary,
    resources: &NationResources,
) -> DefenderSupply {
    let needed = defensive_requirement(config, attack_type, military);
    let penalties = &config.settings().resource_penalties;

    let ammo_sufficient = resources.get(Resource::Ammo) >= needed.ammo;
    let gasoline_sufficient = resources.get(Resource::Gasoline) >= needed.gasoline;

    let mut power_factor = 1.0;
    if !ammo_sufficient {
        power_factor *= 1.0 - penalties.insufficient_ammo_penalty_percent / 100.0;
    }
    if !gasoline_sufficient {
        power_factor *= 1.0 - penalties.insufficient_gasoline_penalty_percent / 100.0;
    }

    DefenderSupply {
        ammo_sufficient,
        gasoline_sufficient,
        power_factor,
    }
}
