//! Battle log - immutable record of every resolved battle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::combat::impact::CityImpact;
use crate::combat::loot::BattleLoot;
use crate::combat::roller::PowerRatioBand;
use crate::core::types::{AttackType, NationId, UnitCounts, WarId};
use crate::war::state::Conclusion;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleLog {
    pub war_id: WarId,
    /// 1-based, monotonic per war
    pub battle_number: u32,
    pub attacker_id: NationId,
    pub defender_id: NationId,
    pub attack_type: AttackType,
    pub units_committed: UnitCounts,
    pub power_a: f64,
    pub power_b: f64,
    pub power_ratio_band: Option<PowerRatioBand>,
    pub raw_roll: Option<u8>,
    pub roll_modifier: i32,
    pub roll: Option<u8>,
    pub outcome_tier: String,
    pub multiplier: f64,
    pub resistance_damage: f64,
    /// Resistance of the defending nation after the hit
    pub defender_resistance_after: f64,
    pub attacker_losses: UnitCounts,
    pub defender_losses: UnitCounts,
    pub units_expended: UnitCounts,
    pub infrastructure_destroyed: f64,
    pub civilian_casualties: u64,
    pub city_impacts: Vec<CityImpact>,
    pub loot: BattleLoot,
    pub ammo_consumed: u64,
    pub gasoline_consumed: u64,
    pub defender_supplied: bool,
    pub blockade_imposed: bool,
    pub conclusion: Option<Conclusion>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only battle history of one war
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleHistory {
    battles: Vec<BattleLog>,
}

impl BattleHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_battle_number(&self) -> u32 {
        self.battles.len() as u32 + 1
    }

    pub fn record(&mut self, log: BattleLog) {
        debug_assert_eq!(log.battle_number, self.next_battle_number());
        self.battles.push(log);
    }

    pub fn battles(&self) -> &[BattleLog] {
        &self.battles
    }

    pub fn battles_by(&self, nation: NationId) -> impl Iterator<Item = &BattleLog> {
        self.battles.iter().filter(move |b| b.attacker_id == nation)
    }
}
