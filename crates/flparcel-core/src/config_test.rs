use std::collections::HashMap;
use std::env::VarError;
use std::path::PathBuf;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn config_with(var: &str, value: &str) -> Result<AppConfig, ConfigError> {
    let mut map = HashMap::new();
    map.insert(var, value);
    build_app_config(lookup_from_map(&map))
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "FLPARCEL_ENV"));
}

#[test]
fn build_app_config_uses_defaults_for_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 10);
    assert_eq!(cfg.max_attempts, 3);
    assert_eq!(cfg.retry_backoff_base_ms, 500);
    assert_eq!(cfg.user_agent, "flparcel/0.1 (parcel-lookup)");
    assert_eq!(cfg.max_concurrent_lookups, 4);
    assert_eq!(cfg.max_concurrent_per_county, 2);
    assert!(cfg.county_overrides_path.is_none());
}

#[test]
fn request_timeout_secs_override() {
    let cfg = config_with("FLPARCEL_REQUEST_TIMEOUT_SECS", "25").unwrap();
    assert_eq!(cfg.request_timeout_secs, 25);
}

#[test]
fn request_timeout_secs_zero_is_rejected() {
    let result = config_with("FLPARCEL_REQUEST_TIMEOUT_SECS", "0");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FLPARCEL_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(FLPARCEL_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_attempts_override() {
    let cfg = config_with("FLPARCEL_MAX_ATTEMPTS", "5").unwrap();
    assert_eq!(cfg.max_attempts, 5);
}

#[test]
fn max_attempts_invalid() {
    let result = config_with("FLPARCEL_MAX_ATTEMPTS", "not-a-number");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FLPARCEL_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(FLPARCEL_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn max_attempts_zero_is_rejected() {
    let result = config_with("FLPARCEL_MAX_ATTEMPTS", "0");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FLPARCEL_MAX_ATTEMPTS"),
        "expected InvalidEnvVar(FLPARCEL_MAX_ATTEMPTS), got: {result:?}"
    );
}

#[test]
fn retry_backoff_base_ms_invalid() {
    let result = config_with("FLPARCEL_RETRY_BACKOFF_BASE_MS", "-1");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FLPARCEL_RETRY_BACKOFF_BASE_MS"),
        "expected InvalidEnvVar(FLPARCEL_RETRY_BACKOFF_BASE_MS), got: {result:?}"
    );
}

#[test]
fn user_agent_override() {
    let cfg = config_with("FLPARCEL_USER_AGENT", "custom-agent/2.0").unwrap();
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}

#[test]
fn max_concurrent_lookups_zero_is_rejected() {
    let result = config_with("FLPARCEL_MAX_CONCURRENT_LOOKUPS", "0");
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "FLPARCEL_MAX_CONCURRENT_LOOKUPS"),
        "expected InvalidEnvVar(FLPARCEL_MAX_CONCURRENT_LOOKUPS), got: {result:?}"
    );
}

#[test]
fn max_concurrent_per_county_override() {
    let cfg = config_with("FLPARCEL_MAX_CONCURRENT_PER_COUNTY", "1").unwrap();
    assert_eq!(cfg.max_concurrent_per_county, 1);
}

#[test]
fn county_overrides_path_is_read_when_set() {
    let cfg = config_with("FLPARCEL_COUNTY_OVERRIDES_PATH", "./config/counties.yaml").unwrap();
    assert_eq!(
        cfg.county_overrides_path,
        Some(PathBuf::from("./config/counties.yaml"))
    );
}

#[test]
fn blank_county_overrides_path_is_ignored() {
    let cfg = config_with("FLPARCEL_COUNTY_OVERRIDES_PATH", "   ").unwrap();
    assert!(cfg.county_overrides_path.is_none());
}
