//! Integration tests for battle resolution through the engine
//!
//! These tests drive `WarEngine::initiate_battle` end to end:
//! - rejected orders leave wars and nations untouched
//! - seeded runs are reproducible
//! - naval wins blockade, nuclear strikes ruin cities
//! - battles in different wars that share a nation can run in parallel

use std::sync::Arc;
use std::thread;

use chrono::{Duration, TimeZone, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use war_engine::core::clock::ManualClock;
use war_engine::core::config::{TacticalSettings, WarConfig, WarSettings};
use war_engine::core::error::{ErrorKind, PreconditionError, WarError};
use war_engine::core::types::{AttackType, CityId, NationId, Resource, UnitCounts, UnitType, WarId};
use war_engine::nation::{City, Nation, NationMilitary, NationResources};
use war_engine::war::{BattleRequest, WarEngine};

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()))
}

fn nation(id: u32, military: NationMilitary) -> Nation {
    Nation::new(NationId(id), &format!("Nation {}", id))
        .with_military(military)
        .with_resources(
            NationResources::new(500_000.0)
                .with(Resource::Ammo, 20_000)
                .with(Resource::Gasoline, 20_000)
                .with(Resource::Food, 40_000),
        )
        .with_city(City::new(CityId(id * 10 + 1), "Capital", 2_000.0, 500_000))
        .with_city(City::new(CityId(id * 10 + 2), "Port", 900.0, 120_000).with_military_infrastructure())
}

fn army() -> NationMilitary {
    NationMilitary::new()
        .with(UnitType::Soldiers, 10_000)
        .with(UnitType::Tanks, 200)
        .with(UnitType::Aircraft, 100)
        .with(UnitType::Ships, 40)
        .with(UnitType::Nukes, 3)
}

fn engine_with_war(defender_military: NationMilitary) -> (WarEngine, Arc<ManualClock>, WarConfig, WarId) {
    let clock = clock();
    let engine = WarEngine::new(clock.clone());
    let config = WarConfig::default();
    engine.register_nation(nation(1, army())).unwrap();
    engine.register_nation(nation(2, defender_military)).unwrap();
    let war = engine.declare_war(&config, NationId(1), NationId(2)).unwrap();
    (engine, clock, config, war.id)
}

fn request(war_id: WarId, attack_type: AttackType, units: &[(UnitType, u64)]) -> BattleRequest {
    BattleRequest {
        war_id,
        attacker_id: NationId(1),
        attack_type,
        units_committed: units.iter().copied().collect::<UnitCounts>(),
        selected_target: None,
    }
}

#[test]
fn test_insufficient_resources_changes_nothing() {
    let (engine, _clock, config, war_id) = engine_with_war(army());
    let poor = Nation::new(NationId(3), "Poor").with_military(army());
    engine.register_nation(poor).unwrap();
    let war = engine.declare_war(&config, NationId(3), NationId(2)).unwrap();

    let before_war = engine.war(war.id).unwrap();
    let before_attacker = engine.nation(NationId(3)).unwrap();
    let before_defender = engine.nation(NationId(2)).unwrap();

    let mut order = request(war.id, AttackType::GroundBattle, &[(UnitType::Tanks, 100)]);
    order.attacker_id = NationId(3);
    let err = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap_err();

    assert!(matches!(
        err,
        WarError::Precondition(PreconditionError::InsufficientResources {
            ammo_required: 50,
            gasoline_required: 100,
            ..
        })
    ));
    assert_eq!(engine.war(war.id).unwrap(), before_war);
    assert_eq!(engine.nation(NationId(3)).unwrap(), before_attacker);
    assert_eq!(engine.nation(NationId(2)).unwrap(), before_defender);
    assert!(engine.battle_history(war.id).unwrap().is_empty());
    // The other war is unaffected as well
    assert!(engine.battle_history(war_id).unwrap().is_empty());
}

#[test]
fn test_committing_more_than_owned_is_rejected() {
    let (engine, _clock, config, war_id) = engine_with_war(army());
    let order = request(war_id, AttackType::GroundBattle, &[(UnitType::Soldiers, 10_001)]);
    let err = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(3))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(engine.tactical_points(war_id, NationId(1)).unwrap(), 12);
}

#[test]
fn test_tactical_points_run_out() {
    let (engine, clock, config, war_id) = engine_with_war(army());
    let mut rng = ChaCha8Rng::seed_from_u64(10);
    let order = request(war_id, AttackType::GroundBattle, &[(UnitType::Soldiers, 100)]);

    for _ in 0..4 {
        engine.initiate_battle(&config, &order, &mut rng).unwrap();
        clock.advance(Duration::seconds(61));
    }
    let err = engine.initiate_battle(&config, &order, &mut rng).unwrap_err();
    assert!(matches!(
        err,
        WarError::Precondition(PreconditionError::InsufficientTacticalPoints {
            required: 3,
            available: 0
        })
    ));

    assert!(engine.advance_turn(&config, war_id, 1).unwrap());
    assert!(!engine.advance_turn(&config, war_id, 1).unwrap());
    assert_eq!(engine.tactical_points(war_id, NationId(1)).unwrap(), 4);
    assert!(engine.initiate_battle(&config, &order, &mut rng).is_ok());
}

#[test]
fn test_same_seed_same_battles() {
    let run = |seed: u64| {
        let (engine, clock, config, war_id) = engine_with_war(army());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut logs = Vec::new();
        for attack in [AttackType::GroundBattle, AttackType::AirStrike, AttackType::NavalBattle] {
            let units: &[(UnitType, u64)] = match attack {
                AttackType::GroundBattle => &[(UnitType::Soldiers, 3_000), (UnitType::Tanks, 50)],
                AttackType::AirStrike => &[(UnitType::Aircraft, 40)],
                _ => &[(UnitType::Ships, 20)],
            };
            let mut log = engine.initiate_battle(&config, &request(war_id, attack, units), &mut rng).unwrap();
            log.timestamp = Utc.timestamp_opt(0, 0).unwrap();
            logs.push(log);
            clock.advance(Duration::seconds(61));
        }
        (logs, engine.nation(NationId(2)).unwrap())
    };

    assert_eq!(run(2024), run(2024));
}

#[test]
fn test_empty_defence_is_a_decisive_victory() {
    let (engine, _clock, config, war_id) = engine_with_war(NationMilitary::new());
    let order = request(war_id, AttackType::GroundBattle, &[(UnitType::Soldiers, 500)]);
    let log = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(1))
        .unwrap();

    assert_eq!(log.power_b, 0.0);
    assert_eq!(log.raw_roll, None);
    assert_eq!(log.outcome_tier, "Decisive Victory");
    // min(3 * 1.6, 5)
    assert!((log.resistance_damage - 4.8).abs() < 1e-9);
    assert!((engine.resistance(war_id, NationId(2)).unwrap() - 95.2).abs() < 1e-9);
    assert!(log.loot.cash > 0.0);
    assert!(log.defender_losses.is_empty());
}

#[test]
fn test_naval_victory_blockades_defender() {
    let (engine, clock, config, war_id) = engine_with_war(NationMilitary::new().with(UnitType::Soldiers, 100));
    let order = request(war_id, AttackType::NavalBattle, &[(UnitType::Ships, 10)]);
    let log = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(6))
        .unwrap();

    // No ships to contest the sea, so Sea Control is forced
    assert_eq!(log.outcome_tier, "Sea Control");
    assert!(log.blockade_imposed);
    assert!(engine.blockade_status(NationId(2)).unwrap());
    assert!(!engine.blockade_status(NationId(1)).unwrap());

    clock.advance(Duration::hours(1));
    engine.surrender(&config, war_id, NationId(2)).unwrap();
    assert!(!engine.blockade_status(NationId(2)).unwrap());
}

#[test]
fn test_nuclear_strike_ruins_cities_and_spends_warheads() {
    let (engine, _clock, config, war_id) = engine_with_war(army());
    let mut order = request(war_id, AttackType::NuclearStrike, &[(UnitType::Nukes, 1)]);
    order.selected_target = Some("capital".into());
    let log = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(12))
        .unwrap();

    assert_eq!(log.units_expended.get(&UnitType::Nukes), Some(&1));
    assert_eq!(engine.nation(NationId(1)).unwrap().military.get(UnitType::Nukes), 2);

    // 30% of 2 cities rounds up to 1: only ground zero
    assert_eq!(log.city_impacts.len(), 1);
    assert!(log.city_impacts[0].ground_zero);
    assert_eq!(log.city_impacts[0].city_id, CityId(21));

    let defender = engine.nation(NationId(2)).unwrap();
    assert_eq!(defender.cities[0].infrastructure, 0.0);
    assert!(defender.cities[0].is_ruined());
    assert!(!defender.cities[1].is_ruined());

    for turn in 1..=5 {
        engine.recover_ruined_cities(NationId(2), turn).unwrap();
        // Same turn twice counts once
        engine.recover_ruined_cities(NationId(2), turn).unwrap();
    }
    assert!(!engine.nation(NationId(2)).unwrap().cities[0].is_ruined());
}

#[test]
fn test_unknown_target_is_rejected() {
    let (engine, _clock, config, war_id) = engine_with_war(army());
    let mut order = request(war_id, AttackType::AirStrike, &[(UnitType::Aircraft, 10)]);
    order.selected_target = Some("Atlantis".into());
    let err = engine
        .initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(12))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_parallel_wars_sharing_a_nation() {
    let clock = clock();
    let engine = Arc::new(WarEngine::new(clock.clone()));
    let config = Arc::new(WarConfig::default());
    for id in 1..=5 {
        engine.register_nation(nation(id, army())).unwrap();
    }
    // Nation 1 fights everyone else
    let wars: Vec<WarId> = (2..=5)
        .map(|id| engine.declare_war(&config, NationId(1), NationId(id)).unwrap().id)
        .collect();

    let handles: Vec<_> = wars
        .iter()
        .enumerate()
        .map(|(i, &war_id)| {
            let engine = Arc::clone(&engine);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                let mut rng = ChaCha8Rng::seed_from_u64(i as u64);
                let order = request(war_id, AttackType::GroundBattle, &[(UnitType::Soldiers, 1_000)]);
                engine.initiate_battle(&config, &order, &mut rng)
            })
        })
        .collect();

    let logs: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    // Every war saw exactly one battle and the shared attacker paid for all four
    for &war_id in &wars {
        assert_eq!(engine.battle_history(war_id).unwrap().len(), 1);
    }
    let spent: u64 = logs.iter().map(|l| l.ammo_consumed).sum();
    assert_eq!(spent, 40);
    assert_eq!(
        engine.nation(NationId(1)).unwrap().resources.get(Resource::Ammo),
        20_000 - spent
    );
    let lost: u64 = logs
        .iter()
        .map(|l| l.attacker_losses.get(&UnitType::Soldiers).copied().unwrap_or(0))
        .sum();
    assert_eq!(engine.nation(NationId(1)).unwrap().military.get(UnitType::Soldiers), 10_000 - lost);
}

#[test]
fn test_concurrent_orders_in_one_war_are_serialized() {
    // No cooldown, so only the tactical point pools limit each side
    let config = Arc::new(
        WarConfig::new(WarSettings {
            tactical: TacticalSettings {
                combat_action_cooldown_seconds: 0,
                ..TacticalSettings::default()
            },
            ..WarSettings::default()
        })
        .unwrap(),
    );
    let engine = Arc::new(WarEngine::new(clock()));
    engine.register_nation(nation(1, army())).unwrap();
    engine.register_nation(nation(2, army())).unwrap();
    let war_id = engine.declare_war(&config, NationId(1), NationId(2)).unwrap().id;

    let handles: Vec<_> = (0..12u64)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let config = Arc::clone(&config);
            thread::spawn(move || {
                let mut order = request(war_id, AttackType::GroundBattle, &[(UnitType::Soldiers, 100)]);
                order.attacker_id = NationId(1 + (i % 2) as u32);
                engine.initiate_battle(&config, &order, &mut ChaCha8Rng::seed_from_u64(i))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // 12 starting points at 3 per ground battle: four battles per side
    let mut numbers: Vec<u32> = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|log| log.battle_number)
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<u32>>());
    for err in results.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            err,
            WarError::Precondition(PreconditionError::InsufficientTacticalPoints { required: 3, .. })
        ));
    }

    let history = engine.battle_history(war_id).unwrap();
    assert_eq!(history.len(), 8);
    for side in [NationId(1), NationId(2)] {
        let fought = engine.battles_by(war_id, side).unwrap();
        assert_eq!(fought.len(), 4);
        assert!(fought.iter().all(|log| log.attacker_id == side));
        assert_eq!(engine.tactical_points(war_id, side).unwrap(), 12 - 3 * fought.len() as u32);
    }
    assert!(engine.war(war_id).unwrap().is_active());
    assert_eq!(
        engine.battles_by(war_id, NationId(9)).unwrap_err().kind(),
        ErrorKind::Validation
    );
}
