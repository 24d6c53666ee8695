//! War configuration with documented tunables
//!
//! [`WarSettings`] is the raw, serde-facing form loaded from TOML. It is turned
//! into an immutable [`WarConfig`] exactly once, at load time, and that
//! validated object is passed explicitly into every engine call.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::combat::roller::PowerRatioBand;
use crate::core::error::ConfigError;
use crate::core::tiers::{SuccessTier, TierTable};
use crate::core::types::{AttackTable, AttackType, Resource, UnitTable, UnitType};

/// Tolerance for category weights that should sum to 100
const WEIGHT_SUM_TOLERANCE: f64 = 1.0;

/// Longest ceasefire offer window, one year
const MAX_PROPOSAL_DURATION_HOURS: i64 = 24 * 365;

/// Per-unit combat and supply figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Power contributed by one unit
    pub combat_strength: f64,
    /// Ammo burned per committed unit when attacking
    pub ammo_per_unit: f64,
    /// Gasoline burned per committed unit when attacking
    pub gasoline_per_unit: f64,
    /// Ammo a standing unit needs to defend at full strength
    pub defensive_ammo_per_unit: f64,
    /// Gasoline a standing unit needs to defend at full strength
    pub defensive_gasoline_per_unit: f64,
}

impl UnitStats {
    fn new(strength: f64, ammo: f64, gasoline: f64, def_ammo: f64, def_gasoline: f64) -> Self {
        Self {
            combat_strength: strength,
            ammo_per_unit: ammo,
            gasoline_per_unit: gasoline,
            defensive_ammo_per_unit: def_ammo,
            defensive_gasoline_per_unit: def_gasoline,
        }
    }
}

/// Attacker loss rates for one unit type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LossRate {
    /// Fraction of committed units lost at multiplier 1.0
    pub base_rate: f64,
    /// Hard ceiling on the fraction of committed units lost
    pub max_rate: f64,
}

impl LossRate {
    pub fn new(base_rate: f64, max_rate: f64) -> Self {
        Self { base_rate, max_rate }
    }
}

/// How a defender casualty budget is spread across unit types
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderLossAllocation {
    /// Share of the budget (percent) that goes to primary targets; the rest is collateral
    pub primary_share_percent: f64,
    /// Percentage weights across primary unit types (should sum to ~100)
    pub primary_targets: UnitTable<f64>,
    /// Percentage weights across collateral unit types (should sum to ~100)
    pub collateral_damage: UnitTable<f64>,
}

/// Infrastructure and civilian damage ranges for conventional attacks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactRange {
    pub infrastructure_min: f64,
    pub infrastructure_max: f64,
    pub civilian_casualties_min: u64,
    pub civilian_casualties_max: u64,
}

/// Everything that varies by attack type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTypeSettings {
    /// Tactical points spent to launch this attack
    pub action_point_cost: u32,
    /// Unit types the attacker may commit
    pub allowed_units: Vec<UnitType>,
    /// Defender unit types that count toward defender power
    pub defending_units: Vec<UnitType>,
    /// Committed units of these types are consumed in full (missiles, warheads)
    #[serde(default)]
    pub expended_units: Vec<UnitType>,
    /// Whether the attacker must name a target city
    #[serde(default)]
    pub requires_target: bool,
    /// Roll brackets, must tile 1..=100
    pub success_tiers: Vec<SuccessTier>,
    /// Resistance damage at multiplier 1.0
    pub max_resistance_damage_per_attack: f64,
    /// Absolute ceiling on resistance damage from one attack
    pub final_resistance_damage_cap: f64,
    #[serde(default)]
    pub attacker_loss_rates: UnitTable<LossRate>,
    #[serde(default)]
    pub defender_losses: DefenderLossAllocation,
    /// Conventional infrastructure/civilian impact; nuclear strikes use [`NuclearSettings`]
    #[serde(default)]
    pub impact: Option<ImpactRange>,
}

/// Roll modifier per power-ratio band
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerRatioModifiers {
    pub severely_outgunned: i32,
    pub significantly_outgunned: i32,
    pub slightly_outgunned: i32,
    pub even_match: i32,
    pub slight_advantage: i32,
    pub significant_advantage: i32,
    pub overwhelming_advantage: i32,
}

impl PowerRatioModifiers {
    pub fn modifier(&self, band: PowerRatioBand) -> i32 {
        match band {
            PowerRatioBand::SeverelyOutgunned => self.severely_outgunned,
            PowerRatioBand::SignificantlyOutgunned => self.significantly_outgunned,
            PowerRatioBand::SlightlyOutgunned => self.slightly_outgunned,
            PowerRatioBand::EvenMatch => self.even_match,
            PowerRatioBand::SlightAdvantage => self.slight_advantage,
            PowerRatioBand::SignificantAdvantage => self.significant_advantage,
            PowerRatioBand::OverwhelmingAdvantage => self.overwhelming_advantage,
        }
    }
}

impl Default for PowerRatioModifiers {
    fn default() -> Self {
        Self {
            severely_outgunned: -25,
            significantly_outgunned: -15,
            slightly_outgunned: -5,
            even_match: 0,
            slight_advantage: 5,
            significant_advantage: 15,
            overwhelming_advantage: 25,
        }
    }
}

/// War-scoped action currency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TacticalSettings {
    /// Points each side holds when the war is declared
    pub tactical_points_on_war_start: u32,
    /// Ceiling for each side's pool
    pub max_tactical_points: u32,
    /// Points regained per external turn tick
    pub tactical_points_per_turn: u32,
    /// Real-time gap between two attacks by the same nation in the same war
    pub combat_action_cooldown_seconds: i64,
}

impl Default for TacticalSettings {
    fn default() -> Self {
        Self {
            tactical_points_on_war_start: 12,
            max_tactical_points: 24,
            tactical_points_per_turn: 4,
            combat_action_cooldown_seconds: 60,
        }
    }
}

/// Soft penalties for an under-supplied defender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcePenaltySettings {
    pub insufficient_ammo_penalty_percent: f64,
    pub insufficient_gasoline_penalty_percent: f64,
}

impl Default for ResourcePenaltySettings {
    fn default() -> Self {
        Self {
            insufficient_ammo_penalty_percent: 25.0,
            insufficient_gasoline_penalty_percent: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CasualtySettings {
    /// Defender units lost per point of resistance damage dealt
    ///
    /// Calibrated through playtesting. At 50, a 3.9 point ground hit
    /// costs the defender about 195 units spread across target types.
    pub defender_loss_per_resistance_point: f64,
}

impl Default for CasualtySettings {
    fn default() -> Self {
        Self {
            defender_loss_per_resistance_point: 50.0,
        }
    }
}

/// Percent range for per-outcome loot
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LootBracket {
    pub min_percent: f64,
    pub max_percent: f64,
}

impl LootBracket {
    pub fn new(min_percent: f64, max_percent: f64) -> Self {
        Self {
            min_percent,
            max_percent,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.max_percent <= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LootSettings {
    pub per_battle_loot_eligible_attack_types: Vec<AttackType>,
    /// Share of the defender treasury that is up for grabs in one battle
    pub base_loot_pool_percent_of_defender_treasury: f64,
    /// Keyed by success tier name; tiers without an entry yield no loot
    pub per_outcome_loot_percent: BTreeMap<String, LootBracket>,
    /// Stockpiles that can be looted alongside cash
    pub lootable_resources: Vec<Resource>,
    pub war_victory_nation_cash_loot_max_percent: f64,
    pub war_victory_nation_resource_loot_max_percent: f64,
}

impl Default for LootSettings {
    fn default() -> Self {
        let per_outcome_loot_percent = [
            ("Moderate Success", LootBracket::new(1.0, 3.0)),
            ("Victory", LootBracket::new(2.0, 5.0)),
            ("Decisive Victory", LootBracket::new(4.0, 8.0)),
            ("Naval Victory", LootBracket::new(1.0, 3.0)),
            ("Sea Control", LootBracket::new(3.0, 6.0)),
        ]
        .into_iter()
        .map(|(name, bracket)| (name.to_string(), bracket))
        .collect();

        Self {
            per_battle_loot_eligible_attack_types: vec![
                AttackType::GroundBattle,
                AttackType::NavalBattle,
            ],
            base_loot_pool_percent_of_defender_treasury: 10.0,
            per_outcome_loot_percent,
            lootable_resources: vec![
                Resource::Food,
                Resource::Steel,
                Resource::Aluminum,
                Resource::Oil,
            ],
            war_victory_nation_cash_loot_max_percent: 25.0,
            war_victory_nation_resource_loot_max_percent: 20.0,
        }
    }
}

/// City-effect model for nuclear strikes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NuclearSettings {
    pub cities_affected_percentage: f64,
    pub ground_zero_destruction_percentage: f64,
    pub blast_radius_destruction_percentage: f64,
    pub population_reduction_min_percent: f64,
    pub population_reduction_max_percent: f64,
    pub happiness_reduction_points: f64,
    /// Turns a struck city produces no income and cannot build
    pub ruined_state_duration_turns: u32,
    /// Order affected cities by military infrastructure first
    pub prioritize_military_targets: bool,
}

impl Default for NuclearSettings {
    fn default() -> Self {
        Self {
            cities_affected_percentage: 30.0,
            ground_zero_destruction_percentage: 100.0,
            blast_radius_destruction_percentage: 50.0,
            population_reduction_min_percent: 20.0,
            population_reduction_max_percent: 45.0,
            happiness_reduction_points: 25.0,
            ruined_state_duration_turns: 5,
            prioritize_military_targets: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavalSettings {
    /// Naval tiers that put the defending nation under blockade
    pub blockade_qualifying_tiers: Vec<String>,
}

impl Default for NavalSettings {
    fn default() -> Self {
        Self {
            blockade_qualifying_tiers: vec!["Naval Victory".into(), "Sea Control".into()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CeasefireSettings {
    /// How long a proposal stays open before it lapses
    pub proposal_duration_hours: i64,
}

impl Default for CeasefireSettings {
    fn default() -> Self {
        Self {
            proposal_duration_hours: 48,
        }
    }
}

/// Raw war settings as stored in TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarSettings {
    pub version: u32,
    /// Resistance both sides start a war with
    pub starting_resistance: f64,
    /// Nation-wide action points both nations are reset to when a war concludes.
    /// Distinct from war-scoped tactical points.
    pub action_points_on_war_conclusion: Option<u32>,
    pub units: UnitTable<UnitStats>,
    pub power_ratio_modifiers: PowerRatioModifiers,
    pub tactical: TacticalSettings,
    pub resource_penalties: ResourcePenaltySettings,
    pub casualties: CasualtySettings,
    pub loot: LootSettings,
    pub nuclear: NuclearSettings,
    pub naval: NavalSettings,
    pub ceasefire: CeasefireSettings,
    pub attack_types: AttackTable<AttackTypeSettings>,
}

impl Default for WarSettings {
    fn default() -> Self {
        Self {
            version: 1,
            starting_resistance: 100.0,
            action_points_on_war_conclusion: Some(10),
            units: default_units(),
            power_ratio_modifiers: PowerRatioModifiers::default(),
            tactical: TacticalSettings::default(),
            resource_penalties: ResourcePenaltySettings::default(),
            casualties: CasualtySettings::default(),
            loot: LootSettings::default(),
            nuclear: NuclearSettings::default(),
            naval: NavalSettings::default(),
            ceasefire: CeasefireSettings::default(),
            attack_types: default_attack_types(),
        }
    }
}

fn default_units() -> UnitTable<UnitStats> {
    UnitTable {
        soldiers: UnitStats::new(1.0, 0.01, 0.0, 0.005, 0.0),
        tanks: UnitStats::new(40.0, 0.5, 1.0, 0.25, 0.5),
        artillery: UnitStats::new(25.0, 1.0, 0.2, 0.5, 0.1),
        aircraft: UnitStats::new(60.0, 1.0, 2.0, 0.5, 1.0),
        ships: UnitStats::new(120.0, 2.0, 4.0, 1.0, 2.0),
        missiles: UnitStats::new(150.0, 0.0, 0.0, 0.0, 0.0),
        nukes: UnitStats::new(1000.0, 0.0, 0.0, 0.0, 0.0),
    }
}

fn weights(pairs: &[(UnitType, f64)]) -> UnitTable<f64> {
    let mut table = UnitTable::default();
    for &(unit, weight) in pairs {
        *table.get_mut(unit) = weight;
    }
    table
}

fn loss_rates(pairs: &[(UnitType, f64, f64)]) -> UnitTable<LossRate> {
    let mut table = UnitTable::default();
    for &(unit, base, max) in pairs {
        *table.get_mut(unit) = LossRate::new(base, max);
    }
    table
}

fn default_attack_types() -> AttackTable<AttackTypeSettings> {
    use UnitType::*;

    AttackTable {
        ground_battle: AttackTypeSettings {
            action_point_cost: 3,
            allowed_units: vec![Soldiers, Tanks, Artillery],
            defending_units: vec![Soldiers, Tanks, Artillery],
            expended_units: vec![],
            requires_target: false,
            success_tiers: vec![
                SuccessTier::new("Utter Failure", 1, 20, 0.2),
                SuccessTier::new("Pyrrhic Victory", 21, 45, 0.7),
                SuccessTier::new("Moderate Success", 46, 75, 1.0),
                SuccessTier::new("Victory", 76, 90, 1.3),
                SuccessTier::new("Decisive Victory", 91, 100, 1.6),
            ],
            max_resistance_damage_per_attack: 3.0,
            final_resistance_damage_cap: 5.0,
            attacker_loss_rates: loss_rates(&[
                (Soldiers, 0.08, 0.5),
                (Tanks, 0.04, 0.25),
                (Artillery, 0.03, 0.2),
            ]),
            defender_losses: DefenderLossAllocation {
                primary_share_percent: 70.0,
                primary_targets: weights(&[(Soldiers, 60.0), (Tanks, 40.0)]),
                collateral_damage: weights(&[(Artillery, 60.0), (Aircraft, 40.0)]),
            },
            impact: Some(ImpactRange {
                infrastructure_min: 5.0,
                infrastructure_max: 25.0,
                civilian_casualties_min: 100,
                civilian_casualties_max: 1_000,
            }),
        },
        air_strike: AttackTypeSettings {
            action_point_cost: 4,
            allowed_units: vec![Aircraft],
            defending_units: vec![Aircraft],
            expended_units: vec![],
            requires_target: false,
            success_tiers: vec![
                SuccessTier::new("Repelled", 1, 25, 0.3),
                SuccessTier::new("Contested Skies", 26, 55, 0.8),
                SuccessTier::new("Successful Strike", 56, 85, 1.2),
                SuccessTier::new("Air Superiority", 86, 100, 1.5),
            ],
            max_resistance_damage_per_attack: 2.5,
            final_resistance_damage_cap: 4.0,
            attacker_loss_rates: loss_rates(&[(Aircraft, 0.05, 0.3)]),
            defender_losses: DefenderLossAllocation {
                primary_share_percent: 60.0,
                primary_targets: weights(&[(Aircraft, 100.0)]),
                collateral_damage: weights(&[(Tanks, 50.0), (Soldiers, 50.0)]),
            },
            impact: Some(ImpactRange {
                infrastructure_min: 10.0,
                infrastructure_max: 40.0,
                civilian_casualties_min: 200,
                civilian_casualties_max: 1_500,
            }),
        },
        naval_battle: AttackTypeSettings {
            action_point_cost: 4,
            allowed_units: vec![Ships],
            defending_units: vec![Ships],
            expended_units: vec![],
            requires_target: false,
            success_tiers: vec![
                SuccessTier::new("Defeat", 1, 25, 0.3),
                SuccessTier::new("Skirmish", 26, 55, 0.8),
                SuccessTier::new("Naval Victory", 56, 85, 1.2),
                SuccessTier::new("Sea Control", 86, 100, 1.5),
            ],
            max_resistance_damage_per_attack: 2.5,
            final_resistance_damage_cap: 4.0,
            attacker_loss_rates: loss_rates(&[(Ships, 0.04, 0.25)]),
            defender_losses: DefenderLossAllocation {
                primary_share_percent: 80.0,
                primary_targets: weights(&[(Ships, 100.0)]),
                collateral_damage: weights(&[(Aircraft, 100.0)]),
            },
            impact: Some(ImpactRange {
                infrastructure_min: 0.0,
                infrastructure_max: 10.0,
                civilian_casualties_min: 0,
                civilian_casualties_max: 200,
            }),
        },
        bombardment: AttackTypeSettings {
            action_point_cost: 5,
            allowed_units: vec![Artillery, Missiles],
            defending_units: vec![Soldiers, Tanks, Artillery],
            expended_units: vec![Missiles],
            requires_target: false,
            success_tiers: vec![
                SuccessTier::new("Off Target", 1, 30, 0.4),
                SuccessTier::new("Partial Hit", 31, 70, 1.0),
                SuccessTier::new("Direct Hit", 71, 100, 1.4),
            ],
            max_resistance_damage_per_attack: 2.0,
            final_resistance_damage_cap: 3.0,
            attacker_loss_rates: loss_rates(&[(Artillery, 0.02, 0.1)]),
            defender_losses: DefenderLossAllocation {
                primary_share_percent: 50.0,
                primary_targets: weights(&[(Artillery, 50.0), (Tanks, 50.0)]),
                collateral_damage: weights(&[(Soldiers, 100.0)]),
            },
            impact: Some(ImpactRange {
                infrastructure_min: 20.0,
                infrastructure_max: 60.0,
                civilian_casualties_min: 500,
                civilian_casualties_max: 3_000,
            }),
        },
        nuclear_strike: AttackTypeSettings {
            action_point_cost: 10,
            allowed_units: vec![Nukes],
            defending_units: vec![Missiles],
            expended_units: vec![Nukes],
            requires_target: false,
            success_tiers: vec![
                SuccessTier::new("Partial Yield", 1, 30, 0.8),
                SuccessTier::new("Detonation", 31, 85, 1.0),
                SuccessTier::new("Devastating Detonation", 86, 100, 1.3),
            ],
            max_resistance_damage_per_attack: 10.0,
            final_resistance_damage_cap: 15.0,
            attacker_loss_rates: UnitTable::default(),
            defender_losses: DefenderLossAllocation {
                primary_share_percent: 60.0,
                primary_targets: weights(&[(Soldiers, 40.0), (Tanks, 30.0), (Artillery, 30.0)]),
                collateral_damage: weights(&[(Aircraft, 50.0), (Ships, 50.0)]),
            },
            impact: None,
        },
    }
}

/// Validated, immutable war configuration
///
/// Only obtainable through [`WarConfig::new`] or the loaders, so every tier
/// table it holds covers 1..=100 without gaps or overlaps.
#[derive(Debug, Clone)]
pub struct WarConfig {
    settings: WarSettings,
    tiers: AttackTable<TierTable>,
}

impl WarConfig {
    pub fn new(settings: WarSettings) -> Result<Self, ConfigError> {
        let tiers = AttackTable::try_build(|attack| {
            TierTable::build(attack, &settings.attack_types.get(attack).success_tiers)
        })?;
        validate(&settings, &tiers)?;
        Ok(Self { settings, tiers })
    }

    /// Load and validate a config from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate a config from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: WarSettings = toml::from_str(content)?;
        Self::new(settings)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.settings)?)
    }

    pub fn settings(&self) -> &WarSettings {
        &self.settings
    }

    pub fn version(&self) -> u32 {
        self.settings.version
    }

    pub fn attack(&self, attack: AttackType) -> &AttackTypeSettings {
        self.settings.attack_types.get(attack)
    }

    pub fn tiers(&self, attack: AttackType) -> &TierTable {
        self.tiers.get(attack)
    }

    /// How long a ceasefire offer stays open
    pub fn proposal_duration(&self) -> Duration {
        Duration::hours(self.settings.ceasefire.proposal_duration_hours)
    }

    pub fn unit(&self, unit: UnitType) -> &UnitStats {
        self.settings.units.get(unit)
    }
}

impl Default for WarConfig {
    fn default() -> Self {
        // Covered by test_default_settings_validate
        Self::new(WarSettings::default()).expect("built-in war settings are valid")
    }
}

fn check_percent(field: &str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ConfigError::setting(field, format!("{} is outside 0..=100", value)));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::setting(field, format!("{} must be a non-negative number", value)));
    }
    Ok(())
}

fn warn_weight_sum(field: &str, table: &UnitTable<f64>) {
    let sum: f64 = table.iter().map(|(_, w)| *w).sum();
    if sum > 0.0 && (sum - 100.0).abs() > WEIGHT_SUM_TOLERANCE {
        tracing::warn!(field, sum, "loss allocation weights do not sum to 100");
    }
}

fn validate(settings: &WarSettings, tiers: &AttackTable<TierTable>) -> Result<(), ConfigError> {
    if !settings.starting_resistance.is_finite() || settings.starting_resistance <= 0.0 {
        return Err(ConfigError::setting("starting_resistance", "must be positive"));
    }

    let tactical = &settings.tactical;
    if tactical.max_tactical_points == 0 {
        return Err(ConfigError::setting("tactical.max_tactical_points", "must be positive"));
    }
    if tactical.tactical_points_on_war_start > tactical.max_tactical_points {
        return Err(ConfigError::setting(
            "tactical.tactical_points_on_war_start",
            "exceeds max_tactical_points",
        ));
    }
    if tactical.combat_action_cooldown_seconds < 0 {
        return Err(ConfigError::setting(
            "tactical.combat_action_cooldown_seconds",
            "must not be negative",
        ));
    }

    for (unit, stats) in settings.units.iter() {
        let field = format!("units.{}", unit);
        check_non_negative(&format!("{}.combat_strength", field), stats.combat_strength)?;
        check_non_negative(&format!("{}.ammo_per_unit", field), stats.ammo_per_unit)?;
        check_non_negative(&format!("{}.gasoline_per_unit", field), stats.gasoline_per_unit)?;
        check_non_negative(&format!("{}.defensive_ammo_per_unit", field), stats.defensive_ammo_per_unit)?;
        check_non_negative(
            &format!("{}.defensive_gasoline_per_unit", field),
            stats.defensive_gasoline_per_unit,
        )?;
    }

    for (attack, attack_settings) in settings.attack_types.iter() {
        let field = format!("attack_types.{}", attack);
        if attack_settings.allowed_units.is_empty() {
            return Err(ConfigError::setting(format!("{}.allowed_units", field), "is empty"));
        }
        if let Some(unit) = attack_settings
            .expended_units
            .iter()
            .find(|u| !attack_settings.allowed_units.contains(u))
        {
            return Err(ConfigError::setting(
                format!("{}.expended_units", field),
                format!("{} is not an allowed unit", unit),
            ));
        }
        check_non_negative(
            &format!("{}.max_resistance_damage_per_attack", field),
            attack_settings.max_resistance_damage_per_attack,
        )?;
        check_non_negative(
            &format!("{}.final_resistance_damage_cap", field),
            attack_settings.final_resistance_damage_cap,
        )?;

        for (unit, rate) in attack_settings.attacker_loss_rates.iter() {
            let rate_field = format!("{}.attacker_loss_rates.{}", field, unit);
            check_non_negative(&format!("{}.base_rate", rate_field), rate.base_rate)?;
            if !(0.0..=1.0).contains(&rate.max_rate) {
                return Err(ConfigError::setting(
                    format!("{}.max_rate", rate_field),
                    "must lie within 0..=1",
                ));
            }
        }

        let losses = &attack_settings.defender_losses;
        check_percent(&format!("{}.defender_losses.primary_share_percent", field), losses.primary_share_percent)?;
        for (unit, weight) in losses.primary_targets.iter().chain(losses.collateral_damage.iter()) {
            check_percent(&format!("{}.defender_losses.{}", field, unit), *weight)?;
        }
        warn_weight_sum(&format!("{}.defender_losses.primary_targets", field), &losses.primary_targets);
        warn_weight_sum(&format!("{}.defender_losses.collateral_damage", field), &losses.collateral_damage);

        if let Some(impact) = &attack_settings.impact {
            check_non_negative(&format!("{}.impact.infrastructure_min", field), impact.infrastructure_min)?;
            check_non_negative(&format!("{}.impact.infrastructure_max", field), impact.infrastructure_max)?;
            if impact.infrastructure_min > impact.infrastructure_max {
                return Err(ConfigError::setting(format!("{}.impact", field), "infrastructure_min exceeds max"));
            }
            if impact.civilian_casualties_min > impact.civilian_casualties_max {
                return Err(ConfigError::setting(
                    format!("{}.impact", field),
                    "civilian_casualties_min exceeds max",
                ));
            }
        }
    }

    let penalties = &settings.resource_penalties;
    check_percent("resource_penalties.insufficient_ammo_penalty_percent", penalties.insufficient_ammo_penalty_percent)?;
    check_percent(
        "resource_penalties.insufficient_gasoline_penalty_percent",
        penalties.insufficient_gasoline_penalty_percent,
    )?;
    check_non_negative(
        "casualties.defender_loss_per_resistance_point",
        settings.casualties.defender_loss_per_resistance_point,
    )?;

    let loot = &settings.loot;
    check_percent(
        "loot.base_loot_pool_percent_of_defender_treasury",
        loot.base_loot_pool_percent_of_defender_treasury,
    )?;
    check_percent("loot.war_victory_nation_cash_loot_max_percent", loot.war_victory_nation_cash_loot_max_percent)?;
    check_percent(
        "loot.war_victory_nation_resource_loot_max_percent",
        loot.war_victory_nation_resource_loot_max_percent,
    )?;
    for (tier, bracket) in &loot.per_outcome_loot_percent {
        let field = format!("loot.per_outcome_loot_percent.{}", tier);
        check_percent(&field, bracket.min_percent)?;
        check_percent(&field, bracket.max_percent)?;
        if bracket.min_percent > bracket.max_percent {
            return Err(ConfigError::setting(field, "min_percent exceeds max_percent"));
        }
        if !tiers.iter().any(|(_, table)| table.get(tier).is_some()) {
            tracing::warn!(tier = %tier, "loot bracket names a tier no attack type defines");
        }
    }

    let nuclear = &settings.nuclear;
    check_percent("nuclear.cities_affected_percentage", nuclear.cities_affected_percentage)?;
    check_percent("nuclear.ground_zero_destruction_percentage", nuclear.ground_zero_destruction_percentage)?;
    check_percent("nuclear.blast_radius_destruction_percentage", nuclear.blast_radius_destruction_percentage)?;
    check_percent("nuclear.population_reduction_min_percent", nuclear.population_reduction_min_percent)?;
    check_percent("nuclear.population_reduction_max_percent", nuclear.population_reduction_max_percent)?;
    if nuclear.population_reduction_min_percent > nuclear.population_reduction_max_percent {
        return Err(ConfigError::setting(
            "nuclear.population_reduction_min_percent",
            "exceeds population_reduction_max_percent",
        ));
    }
    check_non_negative("nuclear.happiness_reduction_points", nuclear.happiness_reduction_points)?;

    let naval_tiers = tiers.get(AttackType::NavalBattle);
    if let Some(tier) = settings
        .naval
        .blockade_qualifying_tiers
        .iter()
        .find(|t| naval_tiers.get(t).is_none())
    {
        return Err(ConfigError::setting(
            "naval.blockade_qualifying_tiers",
            format!("'{}' is not a naval_battle tier", tier),
        ));
    }

    if !(1..=MAX_PROPOSAL_DURATION_HOURS).contains(&settings.ceasefire.proposal_duration_hours) {
        return Err(ConfigError::setting(
            "ceasefire.proposal_duration_hours",
            format!("must lie within 1..={}", MAX_PROPOSAL_DURATION_HOURS),
        ));
    }

    Ok(())
}
