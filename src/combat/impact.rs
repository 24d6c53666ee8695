//! Infrastructure and civilian impact on the defender's cities
//!
//! Conventional attacks hit one city with a rolled amount of infrastructure
//! and civilian damage. Nuclear strikes use the city-effect model: a
//! ground-zero city, blast-radius cities, population loss, unhappiness and a
//! ruined state that lasts several turns.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

use crate::core::config::{ImpactRange, NuclearSettings};
use crate::core::types::CityId;
use crate::nation::City;

/// Effect of one strike on one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityImpact {
    pub city_id: CityId,
    pub city_name: String,
    pub ground_zero: bool,
    pub infrastructure_destroyed: f64,
    pub civilian_casualties: u64,
    pub happiness_lost: f64,
    pub ruined_turns: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactReport {
    pub infrastructure_destroyed: f64,
    pub civilian_casualties: u64,
    pub cities: Vec<CityImpact>,
}

impl ImpactReport {
    fn record(&mut self, impact: CityImpact) {
        self.infrastructure_destroyed += impact.infrastructure_destroyed;
        self.civilian_casualties += impact.civilian_casualties;
        self.cities.push(impact);
    }
}

/// City a conventional attack lands on: the named target, else the most developed city
pub fn conventional_target(cities: &[City], target: Option<usize>) -> Option<usize> {
    target.filter(|&i| i < cities.len()).or_else(|| {
        cities
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| {
                a.infrastructure
                    .total_cmp(&b.infrastructure)
                    .then_with(|| ib.cmp(ia))
            })
            .map(|(i, _)| i)
    })
}

/// Roll and apply conventional damage to a single city
pub fn conventional_impact<R: Rng + ?Sized>(
    range: &ImpactRange,
    cities: &mut [City],
    target: Option<usize>,
    rng: &mut R,
) -> ImpactReport {
    let infrastructure = rng.gen_range(range.infrastructure_min..=range.infrastructure_max);
    let civilians = rng.gen_range(range.civilian_casualties_min..=range.civilian_casualties_max);

    let mut report = ImpactReport::default();
    let Some(index) = conventional_target(cities, target) else {
        return report;
    };
    let city = &mut cities[index];
    report.record(CityImpact {
        city_id: city.id,
        city_name: city.name.clone(),
        ground_zero: false,
        infrastructure_destroyed: city.destroy_infrastructure(infrastructure),
        civilian_casualties: city.kill_civilians(civilians),
        happiness_lost: 0.0,
        ruined_turns: 0,
    });
    report
}

/// `ceil(city_count * cities_affected_percentage / 100)`, at most `city_count`
pub fn affected_city_count(city_count: usize, settings: &NuclearSettings) -> usize {
    let wanted = (city_count as f64 * settings.cities_affected_percentage / 100.0 - 1e-9).ceil();
    (wanted.max(0.0) as usize).min(city_count)
}

/// Strike order. Ground zero first (the named target when given), then the rest:
/// military sites first by population when prioritized, otherwise shuffled.
pub fn nuclear_selection_order<R: Rng + ?Sized>(
    cities: &[City],
    target: Option<usize>,
    settings: &NuclearSettings,
    rng: &mut R,
) -> Vec<usize> {
    let mut rest: Vec<usize> = (0..cities.len()).filter(|&i| Some(i) != target).collect();

    if settings.prioritize_military_targets {
        rest.sort_by_key(|&i| {
            let city = &cities[i];
            (Reverse(city.has_military_infrastructure), Reverse(city.population), city.id)
        });
    } else {
        rest.shuffle(rng);
    }

    let mut order = Vec::with_capacity(cities.len());
    if let Some(t) = target.filter(|&i| i < cities.len()) {
        order.push(t);
    }
    order.extend(rest);
    order
}

/// Apply the nuclear city-effect model
pub fn nuclear_impact<R: Rng + ?Sized>(
    settings: &NuclearSettings,
    cities: &mut [City],
    target: Option<usize>,
    rng: &mut R,
) -> ImpactReport {
    let mut report = ImpactReport::default();
    let affected = affected_city_count(cities.len(), settings);
    if affected == 0 {
        return report;
    }

    let order = nuclear_selection_order(cities, target, settings, rng);
    for (rank, &index) in order.iter().take(affected).enumerate() {
        let ground_zero = rank == 0;
        let destruction = if ground_zero {
            settings.ground_zero_destruction_percentage
        } else {
            settings.blast_radius_destruction_percentage
        };
        let population_percent = rng.gen_range(
            settings.population_reduction_min_percent..=settings.population_reduction_max_percent,
        );

        let city = &mut cities[index];
        let infrastructure = city.infrastructure * destruction / 100.0;
        let civilians = (city.population as f64 * population_percent / 100.0).floor() as u64;

        let impact = CityImpact {
            city_id: city.id,
            city_name: city.name.clone(),
            ground_zero,
            infrastructure_destroyed: city.destroy_infrastructure(infrastructure),
            civilian_casualties: city.kill_civilians(civilians),
            happiness_lost: city.reduce_happiness(settings.happiness_reduction_points),
            ruined_turns: settings.ruined_state_duration_turns,
        };
        city.ruin(settings.ruined_state_duration_turns);
        report.record(impact);
    }

    tracing::debug!(
        cities_hit = report.cities.len(),
        infrastructure = report.infrastructure_destroyed,
        casualties = report.civilian_casualties,
        "nuclear impact applied"
    );
    report
}
