//! Nations as seen by the war engine: military, resources and cities
//!
//! Nation CRUD lives outside this crate. These records are the slice of a
//! nation that battles read and mutate.

pub mod city;
pub mod military;
pub mod resources;

pub use city::City;
pub use military::NationMilitary;
pub use resources::NationResources;

use serde::{Deserialize, Serialize};

use crate::core::types::NationId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nation {
    pub id: NationId,
    pub name: String,
    pub military: NationMilitary,
    pub resources: NationResources,
    pub cities: Vec<City>,
    /// Nation-wide action points, separate from war-scoped tactical points
    pub action_points: u32,
}

impl Nation {
    pub fn new(id: NationId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            military: NationMilitary::new(),
            resources: NationResources::default(),
            cities: Vec::new(),
            action_points: 0,
        }
    }

    pub fn with_military(mut self, military: NationMilitary) -> Self {
        self.military = military;
        self
    }

    pub fn with_resources(mut self, resources: NationResources) -> Self {
        self.resources = resources;
        self
    }

    pub fn with_city(mut self, city: City) -> Self {
        self.cities.push(city);
        self
    }

    /// Resolve a target reference (city name, case-insensitive, or numeric city id)
    pub fn find_city(&self, target: &str) -> Option<usize> {
        let target = target.trim();
        let by_id = target.parse::<u32>().ok();
        self.cities.iter().position(|c| {
            c.name.eq_ignore_ascii_case(target) || by_id.is_some_and(|id| c.id.0 == id)
        })
    }
}
