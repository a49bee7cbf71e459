use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("FLPARCEL_ENV", "development"))?;
    let log_level = or_default("FLPARCEL_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("FLPARCEL_REQUEST_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "FLPARCEL_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }

    let max_attempts = parse_u32("FLPARCEL_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(invalid(
            "FLPARCEL_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }

    let retry_backoff_base_ms = parse_u64("FLPARCEL_RETRY_BACKOFF_BASE_MS", "500")?;
    let user_agent = or_default("FLPARCEL_USER_AGENT", "flparcel/0.1 (parcel-lookup)");

    let max_concurrent_lookups = parse_usize("FLPARCEL_MAX_CONCURRENT_LOOKUPS", "4")?;
    if max_concurrent_lookups == 0 {
        return Err(invalid(
            "FLPARCEL_MAX_CONCURRENT_LOOKUPS",
            "must be at least 1".to_string(),
        ));
    }

    let max_concurrent_per_county = parse_usize("FLPARCEL_MAX_CONCURRENT_PER_COUNTY", "2")?;
    if max_concurrent_per_county == 0 {
        return Err(invalid(
            "FLPARCEL_MAX_CONCURRENT_PER_COUNTY",
            "must be at least 1".to_string(),
        ));
    }

    let county_overrides_path = lookup("FLPARCEL_COUNTY_OVERRIDES_PATH")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from);

    Ok(AppConfig {
        env,
        log_level,
        request_timeout_secs,
        max_attempts,
        retry_backoff_base_ms,
        user_agent,
        max_concurrent_lookups,
        max_concurrent_per_county,
        county_overrides_path,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "FLPARCEL_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
