//! Per-nation unit counts

use serde::{Deserialize, Serialize};

use crate::core::types::{UnitCounts, UnitType};

/// Standing military of one nation. Counts are unsigned and debits saturate,
/// so a count can never go negative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationMilitary {
    units: UnitCounts,
}

impl NationMilitary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style helper for setting a unit count
    pub fn with(mut self, unit: UnitType, count: u64) -> Self {
        self.set(unit, count);
        self
    }

    pub fn get(&self, unit: UnitType) -> u64 {
        self.units.get(&unit).copied().unwrap_or(0)
    }

    pub fn set(&mut self, unit: UnitType, count: u64) {
        if count == 0 {
            self.units.remove(&unit);
        } else {
            self.units.insert(unit, count);
        }
    }

    pub fn add(&mut self, unit: UnitType, count: u64) {
        let current = self.get(unit);
        self.set(unit, current.saturating_add(count));
    }

    /// Remove units, returns the amount actually removed
    pub fn remove(&mut self, unit: UnitType, count: u64) -> u64 {
        let current = self.get(unit);
        let removed = count.min(current);
        self.set(unit, current - removed);
        removed
    }

    /// Remove every count in `losses`
    pub fn apply_losses(&mut self, losses: &UnitCounts) {
        for (&unit, &count) in losses {
            self.remove(unit, count);
        }
    }

    /// Whether every committed count is available
    pub fn can_commit(&self, committed: &UnitCounts) -> bool {
        committed.iter().all(|(&unit, &count)| self.get(unit) >= count)
    }

    /// Counts of the given unit types only
    pub fn subset(&self, units: &[UnitType]) -> UnitCounts {
        units
            .iter()
            .map(|&u| (u, self.get(u)))
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_military_add_remove() {
        let mut military = NationMilitary::new().with(UnitType::Soldiers, 100);

        assert_eq!(military.remove(UnitType::Soldiers, 30), 30);
        assert_eq!(military.get(UnitType::Soldiers), 70);

        // Can't go below zero
        assert_eq!(military.remove(UnitType::Soldiers, 500), 70);
        assert_eq!(military.get(UnitType::Soldiers), 0);
        assert_eq!(military.remove(UnitType::Tanks, 5), 0);
    }

    #[test]
    fn test_can_commit_checks_every_type() {
        let military = NationMilitary::new()
            .with(UnitType::Soldiers, 100)
            .with(UnitType::Tanks, 4);

        let ok: UnitCounts = [(UnitType::Soldiers, 100), (UnitType::Tanks, 4)].into();
        let too_many: UnitCounts = [(UnitType::Soldiers, 10), (UnitType::Tanks, 5)].into();
        assert!(military.can_commit(&ok));
        assert!(!military.can_commit(&too_many));
    }

    #[test]
    fn test_subset_skips_empty_types() {
        let military = NationMilitary::new()
            .with(UnitType::Soldiers, 10)
            .with(UnitType::Ships, 3);
        let subset = military.subset(&[UnitType::Soldiers, UnitType::Tanks]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset[&UnitType::Soldiers], 10);
    }
}
