//! Cities - the targets of infrastructure and nuclear damage

use serde::{Deserialize, Serialize};

use crate::core::types::{CityId, Turn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub infrastructure: f64,
    pub population: u64,
    /// 0..=100
    pub happiness: f64,
    /// Bases, airfields, ports. Preferred nuclear targets when configured.
    pub has_military_infrastructure: bool,
    /// While positive the city produces no income and cannot build
    pub ruined_turns_remaining: u32,
    #[serde(default)]
    last_recovered_turn: Option<Turn>,
}

impl City {
    pub fn new(id: CityId, name: &str, infrastructure: f64, population: u64) -> Self {
        Self {
            id,
            name: name.to_string(),
            infrastructure: infrastructure.max(0.0),
            population,
            happiness: 75.0,
            has_military_infrastructure: false,
            ruined_turns_remaining: 0,
            last_recovered_turn: None,
        }
    }

    pub fn with_military_infrastructure(mut self) -> Self {
        self.has_military_infrastructure = true;
        self
    }

    pub fn is_ruined(&self) -> bool {
        self.ruined_turns_remaining > 0
    }

    pub fn produces_income(&self) -> bool {
        !self.is_ruined()
    }

    pub fn can_build(&self) -> bool {
        !self.is_ruined()
    }

    /// Destroy up to `amount` infrastructure, returns what was destroyed
    pub fn destroy_infrastructure(&mut self, amount: f64) -> f64 {
        let destroyed = amount.max(0.0).min(self.infrastructure);
        self.infrastructure -= destroyed;
        destroyed
    }

    /// Kill up to `amount` civilians, returns the actual count
    pub fn kill_civilians(&mut self, amount: u64) -> u64 {
        let killed = amount.min(self.population);
        self.population -= killed;
        killed
    }

    pub fn reduce_happiness(&mut self, points: f64) -> f64 {
        let lost = points.max(0.0).min(self.happiness);
        self.happiness -= lost;
        lost
    }

    /// Put the city in the ruined state. A longer existing ruin is kept.
    pub fn ruin(&mut self, turns: u32) {
        self.ruined_turns_remaining = self.ruined_turns_remaining.max(turns);
    }

    /// Count one turn of recovery. Repeated calls for the same turn are no-ops.
    pub fn recover(&mut self, turn: Turn) -> bool {
        if self.last_recovered_turn.is_some_and(|last| turn <= last) {
            return false;
        }
        self.last_recovered_turn = Some(turn);
        if self.ruined_turns_remaining == 0 {
            return false;
        }
        self.ruined_turns_remaining -= 1;
        true
    }
}
