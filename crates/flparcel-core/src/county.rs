use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Florida counties known to the parcel adapter.
///
/// Knowing a county does not mean lookups are available for it; that is
/// decided by the county's profile status in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountyKey {
    Hillsborough,
    Pinellas,
    Manatee,
    Pasco,
    Sarasota,
}

impl CountyKey {
    pub const ALL: [CountyKey; 5] = [
        CountyKey::Hillsborough,
        CountyKey::Pinellas,
        CountyKey::Manatee,
        CountyKey::Pasco,
        CountyKey::Sarasota,
    ];

    /// Display name, e.g. `"Hillsborough"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CountyKey::Hillsborough => "Hillsborough",
            CountyKey::Pinellas => "Pinellas",
            CountyKey::Manatee => "Manatee",
            CountyKey::Pasco => "Pasco",
            CountyKey::Sarasota => "Sarasota",
        }
    }

    /// Lowercase key used in configuration files and on the command line.
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            CountyKey::Hillsborough => "hillsborough",
            CountyKey::Pinellas => "pinellas",
            CountyKey::Manatee => "manatee",
            CountyKey::Pasco => "pasco",
            CountyKey::Sarasota => "sarasota",
        }
    }
}

impl std::fmt::Display for CountyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CountyKey {
    type Err = CoreError;

    /// Accepts the county name in any case, with or without a trailing
    /// `"County"`, e.g. `"pinellas"` or `"Pinellas County"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        let name = lower
            .strip_suffix("county")
            .map_or(lower.as_str(), str::trim_end);

        CountyKey::ALL
            .into_iter()
            .find(|key| key.slug() == name)
            .ok_or_else(|| CoreError::UnknownCounty(s.trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(
            "PINELLAS".parse::<CountyKey>().unwrap(),
            CountyKey::Pinellas
        );
        assert_eq!(
            "  manatee ".parse::<CountyKey>().unwrap(),
            CountyKey::Manatee
        );
    }

    #[test]
    fn parses_trailing_county_suffix() {
        assert_eq!(
            "Hillsborough County".parse::<CountyKey>().unwrap(),
            CountyKey::Hillsborough
        );
    }

    #[test]
    fn rejects_unknown_county() {
        let err = "Orange".parse::<CountyKey>().unwrap_err();
        assert!(matches!(err, CoreError::UnknownCounty(ref name) if name == "Orange"));
    }

    #[test]
    fn display_uses_title_case_name() {
        assert_eq!(CountyKey::Sarasota.to_string(), "Sarasota");
    }

    #[test]
    fn serde_uses_lowercase_slug() {
        let json = serde_json::to_string(&CountyKey::Pasco).unwrap();
        assert_eq!(json, "\"pasco\"");
    }
}
