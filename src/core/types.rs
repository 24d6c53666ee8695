//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for nations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NationId(pub u32);

impl fmt::Display for NationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "nation#{}", self.0)
    }
}

/// Unique identifier for wars
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarId(pub u32);

impl fmt::Display for WarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "war#{}", self.0)
    }
}

/// Unique identifier for ceasefire proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u32);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "proposal#{}", self.0)
    }
}

/// Unique identifier for cities (unique within a nation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CityId(pub u32);

/// Global turn counter driven by the external scheduler
pub type Turn = u64;

/// Unit counts keyed by unit type
pub type UnitCounts = BTreeMap<UnitType, u64>;

/// Military unit categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Soldiers,
    Tanks,
    Artillery,
    Aircraft,
    Ships,
    Missiles,
    Nukes,
}

impl UnitType {
    pub fn all() -> &'static [UnitType] {
        &[
            UnitType::Soldiers,
            UnitType::Tanks,
            UnitType::Artillery,
            UnitType::Aircraft,
            UnitType::Ships,
            UnitType::Missiles,
            UnitType::Nukes,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitType::Soldiers => "soldiers",
            UnitType::Tanks => "tanks",
            UnitType::Artillery => "artillery",
            UnitType::Aircraft => "aircraft",
            UnitType::Ships => "ships",
            UnitType::Missiles => "missiles",
            UnitType::Nukes => "nukes",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The kinds of attack a nation can launch in a war
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    GroundBattle,
    AirStrike,
    NavalBattle,
    Bombardment,
    NuclearStrike,
}

impl AttackType {
    pub fn all() -> &'static [AttackType] {
        &[
            AttackType::GroundBattle,
            AttackType::AirStrike,
            AttackType::NavalBattle,
            AttackType::Bombardment,
            AttackType::NuclearStrike,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttackType::GroundBattle => "ground_battle",
            AttackType::AirStrike => "air_strike",
            AttackType::NavalBattle => "naval_battle",
            AttackType::Bombardment => "bombardment",
            AttackType::NuclearStrike => "nuclear_strike",
        }
    }

    /// Whether the attacker/defender power ratio modifies the roll.
    ///
    /// Bombardment and nuclear strikes are pure rolls.
    pub fn uses_power_ratio(&self) -> bool {
        matches!(
            self,
            AttackType::GroundBattle | AttackType::AirStrike | AttackType::NavalBattle
        )
    }
}

impl fmt::Display for AttackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttackType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AttackType::all()
            .iter()
            .copied()
            .find(|t| t.name() == s.trim().to_lowercase())
            .ok_or_else(|| format!("unknown attack type: {}", s))
    }
}

/// Stockpiled resources (treasury money is tracked separately)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Ammo,
    Gasoline,
    Food,
    Steel,
    Aluminum,
    Oil,
    Uranium,
}

/// One value per unit type, addressable by name in config files
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct UnitTable<T> {
    pub soldiers: T,
    pub tanks: T,
    pub artillery: T,
    pub aircraft: T,
    pub ships: T,
    pub missiles: T,
    pub nukes: T,
}

impl<T> UnitTable<T> {
    pub fn get(&self, unit: UnitType) -> &T {
        match unit {
            UnitType::Soldiers => &self.soldiers,
            UnitType::Tanks => &self.tanks,
            UnitType::Artillery => &self.artillery,
            UnitType::Aircraft => &self.aircraft,
            UnitType::Ships => &self.ships,
            UnitType::Missiles => &self.missiles,
            UnitType::Nukes => &self.nukes,
        }
    }

    pub fn get_mut(&mut self, unit: UnitType) -> &mut T {
        match unit {
            UnitType::Soldiers => &mut self.soldiers,
            UnitType::Tanks => &mut self.tanks,
            UnitType::Artillery => &mut self.artillery,
            UnitType::Aircraft => &mut self.aircraft,
            UnitType::Ships => &mut self.ships,
            UnitType::Missiles => &mut self.missiles,
            UnitType::Nukes => &mut self.nukes,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (UnitType, &T)> {
        UnitType::all().iter().map(move |&u| (u, self.get(u)))
    }
}

/// One value per attack type. Every attack type must be present in config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackTable<T> {
    pub ground_battle: T,
    pub air_strike: T,
    pub naval_battle: T,
    pub bombardment: T,
    pub nuclear_strike: T,
}

impl<T> AttackTable<T> {
    pub fn get(&self, attack: AttackType) -> &T {
        match attack {
            AttackType::GroundBattle => &self.ground_battle,
            AttackType::AirStrike => &self.air_strike,
            AttackType::NavalBattle => &self.naval_battle,
            AttackType::Bombardment => &self.bombardment,
            AttackType::NuclearStrike => &self.nuclear_strike,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (AttackType, &T)> {
        AttackType::all().iter().map(move |&a| (a, self.get(a)))
    }

    /// Build a table by evaluating `f` for every attack type, failing on the first error
    pub fn try_build<E>(mut f: impl FnMut(AttackType) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            ground_battle: f(AttackType::GroundBattle)?,
            air_strike: f(AttackType::AirStrike)?,
            naval_battle: f(AttackType::NavalBattle)?,
            bombardment: f(AttackType::Bombardment)?,
            nuclear_strike: f(AttackType::NuclearStrike)?,
        })
    }
}
