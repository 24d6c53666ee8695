//! War Engine CLI
//!
//! Validates war configs, prints the default config and runs seeded headless
//! wars between two sample nations.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use war_engine::core::clock::ManualClock;
use war_engine::core::config::WarConfig;
use war_engine::core::error::Result;
use war_engine::core::types::{AttackType, CityId, NationId, Resource, UnitCounts, UnitType};
use war_engine::nation::{City, Nation, NationMilitary, NationResources};
use war_engine::war::{BattleLog, BattleRequest, War, WarEngine};

#[derive(Parser, Debug)]
#[command(name = "war-engine")]
#[command(about = "Resolve battles and run war lifecycles from a TOML war config")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load and validate a war config
    Validate { path: PathBuf },

    /// Print the built-in war config as TOML
    DefaultConfig,

    /// Run a seeded war between two sample nations
    Simulate {
        /// War config to use instead of the built-in one
        #[arg(long)]
        config: Option<PathBuf>,

        /// Random seed for deterministic runs
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum battles before stopping
        #[arg(long, default_value_t = 40)]
        battles: u32,

        /// Attack type used by the aggressor
        #[arg(long, default_value = "ground_battle")]
        attack_type: AttackType,

        /// Output format: json or text
        #[arg(long, default_value = "json")]
        format: String,
    },
}

#[derive(Serialize)]
struct SimulationReport {
    seed: u64,
    config_version: u32,
    battles: Vec<BattleLog>,
    rejected: u32,
    war: War,
    aggressor: Nation,
    defender: Nation,
}

fn sample_nation(id: u32, name: &str) -> Nation {
    let military = NationMilitary::new()
        .with(UnitType::Soldiers, 20_000)
        .with(UnitType::Tanks, 400)
        .with(UnitType::Artillery, 300)
        .with(UnitType::Aircraft, 150)
        .with(UnitType::Ships, 60)
        .with(UnitType::Missiles, 20)
        .with(UnitType::Nukes, 2);
    let resources = NationResources::new(2_000_000.0)
        .with(Resource::Ammo, 50_000)
        .with(Resource::Gasoline, 50_000)
        .with(Resource::Food, 100_000)
        .with(Resource::Steel, 40_000)
        .with(Resource::Aluminum, 20_000)
        .with(Resource::Oil, 30_000);

    let base = id * 10;
    Nation::new(NationId(id), name)
        .with_military(military)
        .with_resources(resources)
        .with_city(City::new(CityId(base + 1), &format!("{} Capital", name), 3_000.0, 900_000))
        .with_city(City::new(CityId(base + 2), &format!("{} Harbor", name), 1_500.0, 300_000).with_military_infrastructure())
        .with_city(City::new(CityId(base + 3), &format!("{} Fields", name), 800.0, 120_000))
}

/// A quarter of every allowed unit type the nation still has, nukes one at a time
fn commitment(config: &WarConfig, attack_type: AttackType, nation: &Nation) -> UnitCounts {
    config
        .attack(attack_type)
        .allowed_units
        .iter()
        .map(|&unit| {
            let available = nation.military.get(unit);
            let count = match unit {
                UnitType::Nukes => available.min(1),
                _ => (available / 4).max(available.min(1)),
            };
            (unit, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect()
}

fn simulate(config: &WarConfig, seed: u64, max_battles: u32, attack_type: AttackType) -> Result<SimulationReport> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_else(Utc::now);
    let clock = Arc::new(ManualClock::new(start));
    let engine = WarEngine::new(clock.clone());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let aggressor = engine.register_nation(sample_nation(1, "Aurelia"))?;
    let defender = engine.register_nation(sample_nation(2, "Borealis"))?;
    let war = engine.declare_war(config, aggressor, defender)?;

    let cooldown = config.settings().tactical.combat_action_cooldown_seconds.max(0) + 1;
    let mut battles = Vec::new();
    let mut rejected = 0;

    for turn in 1..=u64::from(max_battles) {
        if !engine.war(war.id)?.is_active() {
            break;
        }
        engine.advance_turn(config, war.id, turn)?;
        engine.recover_ruined_cities(aggressor, turn)?;
        engine.recover_ruined_cities(defender, turn)?;
        clock.advance(Duration::seconds(cooldown));

        // Aggressor presses with the chosen attack type, the defender answers on the ground
        for (attacker_id, target_id, kind) in [
            (aggressor, defender, attack_type),
            (defender, aggressor, AttackType::GroundBattle),
        ] {
            let attacker = engine.nation(attacker_id)?;
            let target = engine.nation(target_id)?;
            let request = BattleRequest {
                war_id: war.id,
                attacker_id,
                attack_type: kind,
                units_committed: commitment(config, kind, &attacker),
                selected_target: config
                    .attack(kind)
                    .requires_target
                    .then(|| target.cities.first().map(|c| c.name.clone()))
                    .flatten(),
            };
            match engine.initiate_battle(config, &request, &mut rng) {
                Ok(log) => battles.push(log),
                Err(_) => rejected += 1,
            }
            if !engine.war(war.id)?.is_active() {
                break;
            }
        }
    }

    Ok(SimulationReport {
        seed,
        config_version: config.version(),
        battles,
        rejected,
        war: engine.war(war.id)?,
        aggressor: engine.nation(aggressor)?,
        defender: engine.nation(defender)?,
    })
}

fn print_text(report: &SimulationReport) {
    println!("War Simulation");
    println!("==============");
    println!("Seed: {}", report.seed);
    println!("Config version: {}", report.config_version);
    println!();
    for log in &report.battles {
        println!(
            "#{:>3} {} -> {} {:<14} roll {:>3} {:<22} dmg {:>5.2} resistance {:>6.2}",
            log.battle_number,
            log.attacker_id,
            log.defender_id,
            log.attack_type.name(),
            log.roll.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
            log.outcome_tier,
            log.resistance_damage,
            log.defender_resistance_after,
        );
    }
    println!();
    println!("Rejected orders: {}", report.rejected);
    println!(
        "Resistance: {} {:.2} / {} {:.2}",
        report.war.attacker_id, report.war.resistance.attacker, report.war.defender_id, report.war.resistance.defender
    );
    match &report.war.conclusion {
        Some(conclusion) => println!("Outcome: {:?} ({})", conclusion.conclusion_type, conclusion.reason),
        None => println!("Outcome: still at war"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("war_engine=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Validate { path } => {
            let config = WarConfig::load_from_toml(&path)?;
            println!("{}: valid (version {})", path.display(), config.version());
        }
        Command::DefaultConfig => {
            print!("{}", WarConfig::default().to_toml()?);
        }
        Command::Simulate {
            config,
            seed,
            battles,
            attack_type,
            format,
        } => {
            let config = match config {
                Some(path) => WarConfig::load_from_toml(&path)?,
                None => WarConfig::default(),
            };
            let seed = seed.unwrap_or_else(rand::random);
            let report = simulate(&config, seed, battles, attack_type)?;

            match format.as_str() {
                "text" => print_text(&report),
                "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                other => {
                    eprintln!("Unknown format '{}', defaulting to json", other);
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
            }
        }
    }
    Ok(())
}
