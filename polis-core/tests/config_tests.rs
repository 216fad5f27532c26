use polis_core::{ApiConfig, ControllerConfig, DefaultsConfig, LogLevel, ReconcilerConfig};

#[test]
fn default_config_has_sane_reconciler_tuning() {
    let config = ControllerConfig::default();

    assert_eq!(config.reconciler.default_sync_interval_seconds, 30);
    assert_eq!(config.reconciler.external_call_timeout_seconds, 10);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn default_config_passes_validation() {
    assert!(ControllerConfig::default().validate().is_ok());
}

#[test]
fn validate_rejects_zero_sync_interval() {
    let mut config = ControllerConfig::default();
    config.reconciler.default_sync_interval_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_external_call_timeout() {
    let mut config = ControllerConfig::default();
    config.reconciler.external_call_timeout_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn validate_rejects_zero_health_port() {
    let mut config = ControllerConfig::default();
    config.api.health_port = 0;
    assert!(config.validate().is_err());
}

#[test]
fn config_round_trips_through_json() {
    let config = ControllerConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: ControllerConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(
        parsed.reconciler.default_sync_interval_seconds,
        config.reconciler.default_sync_interval_seconds
    );
}

#[test]
fn config_round_trips_through_yaml() {
    let config = ControllerConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();
    let parsed: ControllerConfig = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(parsed.api.health_port, config.api.health_port);
}

#[test]
fn config_round_trips_through_toml() {
    let config = ControllerConfig::default();
    let toml_str = toml::to_string(&config).unwrap();
    let parsed: ControllerConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(parsed.defaults.scale_up_max_delta, config.defaults.scale_up_max_delta);
}

#[test]
fn load_from_file_rejects_unknown_extension() {
    let dir = std::env::temp_dir().join("polis-core-config-test.unknown");
    std::fs::write(&dir, "irrelevant").unwrap();
    let result = ControllerConfig::load_from_file(dir.to_str().unwrap());
    std::fs::remove_file(&dir).ok();
    assert!(result.is_err());
}

#[test]
fn save_then_load_round_trip_via_yaml_file() {
    let path = std::env::temp_dir().join("polis-core-config-test.yaml");
    let config = ControllerConfig::default();
    config.save_to_file(path.to_str().unwrap()).unwrap();

    let loaded = ControllerConfig::load_from_file(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(
        loaded.reconciler.default_sync_interval_seconds,
        config.reconciler.default_sync_interval_seconds
    );
}

#[test]
fn defaults_config_has_matching_up_and_down_cooldowns() {
    let defaults = DefaultsConfig::default();
    assert_eq!(defaults.scale_up_cooldown_seconds, defaults.scale_down_cooldown_seconds);
}

#[test]
fn reconciler_config_default_matches_controller_default() {
    assert_eq!(
        ReconcilerConfig::default().shutdown_grace_seconds,
        ControllerConfig::default().reconciler.shutdown_grace_seconds
    );
}

#[test]
fn api_config_default_binds_all_interfaces() {
    let api = ApiConfig::default();
    assert_eq!(api.host, "0.0.0.0");
    assert_eq!(api.health_port, 8080);
}
