//! Per-battle loot
//!
//! Loot is only computed here. The war record accrues it per side and the
//! transfer from the loser happens when the war concludes.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::{LootBracket, LootSettings};
use crate::core::types::{AttackType, Resource};
use crate::nation::NationResources;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BattleLoot {
    pub cash: f64,
    pub resources: BTreeMap<Resource, u64>,
}

impl BattleLoot {
    pub fn is_empty(&self) -> bool {
        self.cash <= 0.0 && self.resources.values().all(|&v| v == 0)
    }
}

/// Bracket for this outcome, None when the attack type or tier yields nothing
pub fn loot_bracket<'a>(
    settings: &'a LootSettings,
    attack_type: AttackType,
    tier_name: &str,
) -> Option<&'a LootBracket> {
    if !settings.per_battle_loot_eligible_attack_types.contains(&attack_type) {
        return None;
    }
    settings
        .per_outcome_loot_percent
        .get(tier_name)
        .filter(|bracket| !bracket.is_zero())
}

/// Most cash a single battle may take
pub fn cash_cap(settings: &LootSettings, treasury: f64) -> f64 {
    treasury.max(0.0) * settings.war_victory_nation_cash_loot_max_percent / 100.0
}

/// Most of one resource a single battle may take
pub fn resource_cap(settings: &LootSettings, stockpile: u64) -> u64 {
    (stockpile as f64 * settings.war_victory_nation_resource_loot_max_percent / 100.0).floor() as u64
}

fn draw_percent<R: Rng + ?Sized>(bracket: &LootBracket, rng: &mut R) -> f64 {
    let min = bracket.min_percent.max(0.0);
    let max = bracket.max_percent.max(min);
    rng.gen_range(min..=max)
}

/// Loot one battle yields against `defender`
///
/// `pool = stock * base_pool%`, `loot = pool * uniform(min%, max%)`, then
/// capped by the global max percent of the defender's holdings.
pub fn battle_loot<R: Rng + ?Sized>(
    settings: &LootSettings,
    attack_type: AttackType,
    tier_name: &str,
    defender: &NationResources,
    rng: &mut R,
) -> BattleLoot {
    let Some(bracket) = loot_bracket(settings, attack_type, tier_name) else {
        return BattleLoot::default();
    };
    let pool_share = settings.base_loot_pool_percent_of_defender_treasury / 100.0;

    let treasury = defender.treasury();
    let cash = (treasury * pool_share * draw_percent(bracket, rng) / 100.0)
        .min(cash_cap(settings, treasury))
        .max(0.0);

    let mut resources = BTreeMap::new();
    for &resource in &settings.lootable_resources {
        let stock = defender.get(resource);
        let percent = draw_percent(bracket, rng);
        let amount = (stock as f64 * pool_share * percent / 100.0).floor() as u64;
        let amount = amount.min(resource_cap(settings, stock));
        if amount > 0 {
            resources.insert(resource, amount);
        }
    }

    BattleLoot { cash, resources }
}
