//! Nation treasury and resource stockpiles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::Resource;

/// Money plus integer stockpiles. Nothing here can go negative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationResources {
    treasury: f64,
    stockpiles: BTreeMap<Resource, u64>,
}

impl NationResources {
    pub fn new(treasury: f64) -> Self {
        Self {
            treasury: treasury.max(0.0),
            stockpiles: BTreeMap::new(),
        }
    }

    pub fn with(mut self, resource: Resource, amount: u64) -> Self {
        self.stockpiles.insert(resource, amount);
        self
    }

    pub fn treasury(&self) -> f64 {
        self.treasury
    }

    pub fn credit_treasury(&mut self, amount: f64) {
        self.treasury += amount.max(0.0);
    }

    /// Withdraw money, returns the amount actually withdrawn
    pub fn debit_treasury(&mut self, amount: f64) -> f64 {
        let withdrawn = amount.max(0.0).min(self.treasury);
        self.treasury -= withdrawn;
        withdrawn
    }

    /// Get current amount of a resource
    pub fn get(&self, resource: Resource) -> u64 {
        self.stockpiles.get(&resource).copied().unwrap_or(0)
    }

    pub fn add(&mut self, resource: Resource, amount: u64) {
        let entry = self.stockpiles.entry(resource).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Try to remove resources, returns amount actually removed
    pub fn remove(&mut self, resource: Resource, amount: u64) -> u64 {
        if let Some(entry) = self.stockpiles.get_mut(&resource) {
            let removed = amount.min(*entry);
            *entry -= removed;
            removed
        } else {
            0
        }
    }

    /// Check if every requirement is covered
    pub fn has_materials(&self, requirements: &[(Resource, u64)]) -> bool {
        requirements.iter().all(|(res, amount)| self.get(*res) >= *amount)
    }

    /// Consume all requirements or nothing, returns true if successful
    pub fn consume_materials(&mut self, requirements: &[(Resource, u64)]) -> bool {
        if !self.has_materials(requirements) {
            return false;
        }
        for (res, amount) in requirements {
            self.remove(*res, *amount);
        }
        true
    }
}
