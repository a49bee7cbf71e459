//! Per-county dispatch overrides loaded from a YAML file.
//!
//! ```yaml
//! counties:
//!   pinellas:
//!     timeout_secs: 20
//!     max_attempts: 4
//!     max_concurrent: 1
//!   manatee:
//!     base_url: "https://gis.example.org/arcgis/rest/services/Parcels/MapServer"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::county::CountyKey;
use crate::ConfigError;

/// Settings that replace the registry defaults for one county. Every key is
/// optional; absent keys keep the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountyOverride {
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub backoff_base_ms: Option<u64>,
    pub max_concurrent: Option<usize>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CountyOverrides {
    #[serde(default)]
    pub counties: BTreeMap<CountyKey, CountyOverride>,
}

/// Load and validate county overrides from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_county_overrides(path: &Path) -> Result<CountyOverrides, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::OverridesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_county_overrides(&content)
}

/// Parse and validate county overrides from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML or fails validation.
pub fn parse_county_overrides(content: &str) -> Result<CountyOverrides, ConfigError> {
    let overrides: CountyOverrides =
        serde_yaml::from_str(content).map_err(ConfigError::OverridesFileParse)?;

    validate_overrides(&overrides)?;

    Ok(overrides)
}

fn validate_overrides(overrides: &CountyOverrides) -> Result<(), ConfigError> {
    for (county, entry) in &overrides.counties {
        if entry.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(format!(
                "{county}: timeout_secs must be at least 1"
            )));
        }
        if entry.max_attempts == Some(0) {
            return Err(ConfigError::Validation(format!(
                "{county}: max_attempts must be at least 1"
            )));
        }
        if entry.max_concurrent == Some(0) {
            return Err(ConfigError::Validation(format!(
                "{county}: max_concurrent must be at least 1"
            )));
        }
        if let Some(url) = &entry.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Validation(format!(
                    "{county}: base_url must be an http(s) URL, got '{url}'"
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "overrides_test.rs"]
mod tests;
