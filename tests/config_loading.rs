//! Integration tests for loading war configs from TOML files

use std::fs;
use std::path::PathBuf;

use war_engine::core::config::WarConfig;
use war_engine::core::error::{ConfigError, ErrorKind, WarError};
use war_engine::core::types::AttackType;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("war-engine-{}-{}.toml", std::process::id(), name))
}

#[test]
fn test_load_default_config_from_file() {
    let path = temp_path("default");
    fs::write(&path, WarConfig::default().to_toml().unwrap()).unwrap();

    let loaded = WarConfig::load_from_toml(&path).unwrap();
    assert_eq!(loaded.settings(), WarConfig::default().settings());
    assert_eq!(loaded.tiers(AttackType::NavalBattle).lookup(90).name, "Sea Control");

    fs::remove_file(&path).ok();
}

#[test]
fn test_overlapping_tiers_rejected_at_load() {
    let text = WarConfig::default().to_toml().unwrap();
    let mut value: toml::Value = toml::from_str(&text).unwrap();
    // Pyrrhic Victory 21..=45 now starts inside Utter Failure 1..=20
    value["attack_types"]["ground_battle"]["success_tiers"][1]["min_roll"] = toml::Value::Integer(20);
    let broken = toml::to_string(&value).unwrap();

    let err = WarConfig::parse_toml(&broken).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::TierOverlap {
            attack_type: AttackType::GroundBattle,
            ..
        }
    ));
}

#[test]
fn test_tunables_override_from_file() {
    let path = temp_path("tunables");
    fs::write(
        &path,
        r#"
        action_points_on_war_conclusion = 6

        [casualties]
        defender_loss_per_resistance_point = 20.0

        [ceasefire]
        proposal_duration_hours = 12

        [nuclear]
        cities_affected_percentage = 100.0
        prioritize_military_targets = false
        "#,
    )
    .unwrap();

    let config = WarConfig::load_from_toml(&path).unwrap();
    let settings = config.settings();
    assert_eq!(settings.action_points_on_war_conclusion, Some(6));
    assert_eq!(settings.casualties.defender_loss_per_resistance_point, 20.0);
    assert_eq!(settings.ceasefire.proposal_duration_hours, 12);
    assert_eq!(settings.nuclear.cities_affected_percentage, 100.0);
    assert!(!settings.nuclear.prioritize_military_targets);
    // Untouched sections keep their defaults
    assert_eq!(settings.nuclear.ruined_state_duration_turns, 5);
    assert_eq!(settings.tactical.combat_action_cooldown_seconds, 60);

    fs::remove_file(&path).ok();
}

#[test]
fn test_missing_file_is_a_config_error() {
    let err = WarConfig::load_from_toml(&temp_path("does-not-exist")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
    assert_eq!(WarError::from(err).kind(), ErrorKind::ConfigValidation);
}

#[test]
fn test_malformed_toml_is_a_parse_error() {
    let err = WarConfig::parse_toml("starting_resistance = \"lots\"").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_invalid_values_rejected() {
    let err = WarConfig::parse_toml(
        r#"
        [resource_penalties]
        insufficient_ammo_penalty_percent = 140.0
        "#,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSetting { .. }));
}

#[test]
fn test_infinite_impact_range_rejected_at_load() {
    let text = WarConfig::default().to_toml().unwrap();
    let mut value: toml::Value = toml::from_str(&text).unwrap();
    value["attack_types"]["ground_battle"]["impact"]["infrastructure_max"] = toml::Value::Float(f64::INFINITY);
    let broken = toml::to_string(&value).unwrap();

    let err = WarConfig::parse_toml(&broken).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidSetting { .. }));
}
