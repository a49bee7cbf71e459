//! County profile registry.
//!
//! Everything county-specific lives in [`CountyProfile`] data: the identifier
//! pattern, the service endpoint, and the field map. The normalizer, the
//! dispatcher, and the mapper read these fields and never branch on which
//! county they are serving.

use std::collections::BTreeMap;
use std::time::Duration;

use flparcel_core::{AppConfig, CanonicalField, CountyKey, CountyOverrides, FieldKind};

use crate::error::LookupError;
use crate::profiles;

/// Characters allowed in one identifier segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Digit,
    Alphanumeric,
}

impl CharClass {
    #[must_use]
    pub fn allows(self, c: char) -> bool {
        match self {
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Alphanumeric => c.is_ascii_alphanumeric(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub len: usize,
    pub chars: CharClass,
}

impl Segment {
    #[must_use]
    pub const fn digits(len: usize) -> Self {
        Self {
            len,
            chars: CharClass::Digit,
        }
    }

    #[must_use]
    pub const fn alphanumeric(len: usize) -> Self {
        Self {
            len,
            chars: CharClass::Alphanumeric,
        }
    }
}

/// Which rendering of the identifier the county service stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryIdStyle {
    /// Segments concatenated, e.g. `1926050000000000`.
    Compact,
    /// Segments joined with the display separators, e.g. `03-32-16-11737-001-0010`.
    Segmented,
}

/// Expected shape of a county's parcel identifier.
#[derive(Debug, Clone, Copy)]
pub struct IdPattern {
    pub segments: &'static [Segment],
    /// Separator placed between segment `i` and `i + 1` when displaying.
    /// Always `segments.len() - 1` long.
    pub joiners: &'static [char],
    pub query_style: QueryIdStyle,
    /// Human-readable format hint, e.g. `"XX-XX-XX-XXXXX-XXX-XXXX"`.
    pub hint: &'static str,
}

/// Separators a user may type between segments.
pub const ACCEPTED_SEPARATORS: [char; 2] = ['-', '.'];

impl IdPattern {
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.segments.iter().map(|s| s.len).sum()
    }
}

/// Rule for turning a source attribute into a canonical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Trimmed text; numbers are rendered as text.
    Trim,
    /// Whole number.
    Integer,
    /// Plain decimal number.
    Decimal,
    /// Money amount; `$`, `,` and whitespace are stripped before parsing.
    Currency,
    /// Leading number of a measurement such as `"0.25 AC"`.
    Measure,
    /// Epoch milliseconds or a calendar date string.
    Date,
}

impl Coercion {
    /// Kind of value this coercion produces.
    #[must_use]
    pub fn kind(self) -> FieldKind {
        match self {
            Coercion::Trim => FieldKind::Text,
            Coercion::Integer => FieldKind::Integer,
            Coercion::Decimal | Coercion::Currency | Coercion::Measure => FieldKind::Decimal,
            Coercion::Date => FieldKind::Date,
        }
    }
}

/// Where a field map attribute is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOrigin {
    /// The parcel layer's feature attributes.
    Layer,
    /// The related table fetched through `queryRelatedRecords`.
    Related,
}

/// One entry of a county field map.
///
/// When several rules name the same canonical field, the first one whose
/// attribute is present wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: CanonicalField,
    pub attribute: &'static str,
    pub coercion: Coercion,
    pub origin: AttributeOrigin,
}

impl FieldRule {
    #[must_use]
    pub const fn layer(field: CanonicalField, attribute: &'static str, coercion: Coercion) -> Self {
        Self {
            field,
            attribute,
            coercion,
            origin: AttributeOrigin::Layer,
        }
    }

    #[must_use]
    pub const fn related(
        field: CanonicalField,
        attribute: &'static str,
        coercion: Coercion,
    ) -> Self {
        Self {
            field,
            attribute,
            coercion,
            origin: AttributeOrigin::Related,
        }
    }
}

/// A related table joined to the parcel layer by object id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelatedTable {
    pub relationship_id: u32,
    /// Feature attribute holding the object id used to query the relationship.
    pub object_id_attribute: &'static str,
}

/// Base URL of an ArcGIS `MapServer` plus the parcel layer id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub layer_id: u32,
}

impl ServiceEndpoint {
    #[must_use]
    pub fn new(base_url: impl Into<String>, layer_id: u32) -> Self {
        Self {
            base_url: base_url.into(),
            layer_id,
        }
    }

    /// URL of the layer resource, e.g. `.../MapServer/7`.
    #[must_use]
    pub fn layer_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.layer_id)
    }
}

/// Timeout, retry, and concurrency budget for one county's service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub max_concurrent: usize,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            max_concurrent: 2,
        }
    }
}

impl DispatchPolicy {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.request_timeout_secs),
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.retry_backoff_base_ms),
            max_concurrent: config.max_concurrent_per_county.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountyStatus {
    Active,
    Unsupported { reason: &'static str },
}

/// Immutable per-county configuration.
#[derive(Debug, Clone)]
pub struct CountyProfile {
    pub key: CountyKey,
    pub status: CountyStatus,
    pub id_pattern: IdPattern,
    /// Layer attribute compared against the identifier in the `where` clause.
    pub id_attribute: &'static str,
    pub endpoint: Option<ServiceEndpoint>,
    pub field_map: &'static [FieldRule],
    pub related: Option<RelatedTable>,
    /// Property appraiser detail page; `{parcel_id}` is replaced with the
    /// display form of the identifier. Used when no attribute supplies one.
    pub property_card_template: Option<&'static str>,
    pub policy: DispatchPolicy,
}

impl CountyProfile {
    /// Attributes requested from the given origin, in field-map order,
    /// without duplicates.
    #[must_use]
    pub fn out_fields(&self, origin: AttributeOrigin) -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        if origin == AttributeOrigin::Layer {
            fields.push(self.id_attribute);
            if let Some(related) = &self.related {
                fields.push(related.object_id_attribute);
            }
        }
        for rule in self.field_map.iter().filter(|r| r.origin == origin) {
            if !fields.contains(&rule.attribute) {
                fields.push(rule.attribute);
            }
        }
        fields
    }
}

/// A profile that is active and has a service endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ActiveCounty<'a> {
    pub profile: &'a CountyProfile,
    pub endpoint: &'a ServiceEndpoint,
}

/// Read-only table of county profiles, built once at startup.
#[derive(Debug, Clone)]
pub struct CountyRegistry {
    profiles: BTreeMap<CountyKey, CountyProfile>,
}

impl CountyRegistry {
    /// Builds the registry of Florida counties with `defaults` as every
    /// county's dispatch policy.
    #[must_use]
    pub fn florida(defaults: DispatchPolicy) -> Self {
        Self::from_profiles(profiles::florida(defaults))
    }

    #[must_use]
    pub fn from_profiles(profiles: Vec<CountyProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.key, p)).collect(),
        }
    }

    /// Applies per-county overrides. Consumes the registry so overrides can
    /// only be applied before it is shared.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &CountyOverrides) -> Self {
        for (key, entry) in &overrides.counties {
            let Some(profile) = self.profiles.get_mut(key) else {
                continue;
            };
            if let Some(secs) = entry.timeout_secs {
                profile.policy.timeout = Duration::from_secs(secs);
            }
            if let Some(attempts) = entry.max_attempts {
                profile.policy.max_attempts = attempts.max(1);
            }
            if let Some(ms) = entry.backoff_base_ms {
                profile.policy.backoff_base = Duration::from_millis(ms);
            }
            if let Some(n) = entry.max_concurrent {
                profile.policy.max_concurrent = n.max(1);
            }
            if let Some(url) = &entry.base_url {
                if let Some(endpoint) = profile.endpoint.as_mut() {
                    endpoint.base_url.clone_from(url);
                }
            }
            tracing::debug!(county = %key, policy = ?profile.policy, "applied county override");
        }
        self
    }

    /// Looks up an active county.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnsupportedCounty`] if the county has no
    /// profile, is marked unsupported, or has no service endpoint.
    pub fn get(&self, key: CountyKey) -> Result<ActiveCounty<'_>, LookupError> {
        let unsupported = |reason: &str| LookupError::UnsupportedCounty {
            county: key.to_string(),
            reason: reason.to_string(),
        };

        let profile = self
            .profiles
            .get(&key)
            .ok_or_else(|| unsupported("no county profile"))?;

        if let CountyStatus::Unsupported { reason } = profile.status {
            return Err(unsupported(reason));
        }

        let endpoint = profile
            .endpoint
            .as_ref()
            .ok_or_else(|| unsupported("no service endpoint configured"))?;

        Ok(ActiveCounty { profile, endpoint })
    }

    /// Profile for `key` regardless of status.
    #[must_use]
    pub fn profile(&self, key: CountyKey) -> Option<&CountyProfile> {
        self.profiles.get(&key)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &CountyProfile> {
        self.profiles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> CountyRegistry {
        CountyRegistry::florida(DispatchPolicy::default())
    }

    #[test]
    fn active_counties_resolve() {
        let registry = registry();
        for key in [
            CountyKey::Hillsborough,
            CountyKey::Pinellas,
            CountyKey::Manatee,
        ] {
            let active = registry.get(key).expect("county should be active");
            assert_eq!(active.profile.key, key);
        }
    }

    #[test]
    fn pasco_and_sarasota_are_unsupported() {
        let registry = registry();
        for key in [CountyKey::Pasco, CountyKey::Sarasota] {
            let err = registry.get(key).unwrap_err();
            assert!(
                matches!(err, LookupError::UnsupportedCounty { ref county, .. } if *county == key.to_string()),
                "got: {err:?}"
            );
        }
    }

    #[test]
    fn every_known_county_has_a_profile() {
        let registry = registry();
        for key in CountyKey::ALL {
            assert!(registry.profile(key).is_some(), "{key} has no profile");
        }
    }

    #[test]
    fn field_map_coercions_match_field_kinds() {
        for profile in registry().profiles() {
            for rule in profile.field_map {
                assert_eq!(
                    rule.coercion.kind(),
                    rule.field.kind(),
                    "{}: {} via {:?}",
                    profile.key,
                    rule.field,
                    rule.coercion
                );
            }
        }
    }

    #[test]
    fn id_patterns_are_well_formed() {
        for profile in registry().profiles() {
            let pattern = &profile.id_pattern;
            assert!(!pattern.segments.is_empty(), "{}", profile.key);
            assert_eq!(
                pattern.joiners.len(),
                pattern.segments.len() - 1,
                "{}",
                profile.key
            );
            assert!(pattern.segments.iter().all(|s| s.len > 0), "{}", profile.key);
        }
    }

    #[test]
    fn related_rules_require_related_table() {
        for profile in registry().profiles() {
            let uses_related = profile
                .field_map
                .iter()
                .any(|r| r.origin == AttributeOrigin::Related);
            assert!(
                !uses_related || profile.related.is_some(),
                "{} reads related attributes without a related table",
                profile.key
            );
        }
    }

    #[test]
    fn active_profiles_have_endpoints() {
        for profile in registry().profiles() {
            if profile.status == CountyStatus::Active {
                assert!(profile.endpoint.is_some(), "{}", profile.key);
            }
        }
    }

    #[test]
    fn out_fields_start_with_id_attribute_and_skip_duplicates() {
        let registry = registry();
        let profile = registry.profile(CountyKey::Pinellas).unwrap();
        let fields = profile.out_fields(AttributeOrigin::Layer);
        assert_eq!(fields[0], profile.id_attribute);
        let mut deduped = fields.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), fields.len());
    }

    #[test]
    fn overrides_replace_policy_and_base_url() {
        let overrides = flparcel_core::overrides::parse_county_overrides(
            "counties:\n  manatee:\n    timeout_secs: 30\n    max_attempts: 5\n    base_url: http://127.0.0.1:9999/\n",
        )
        .unwrap();
        let registry = registry().with_overrides(&overrides);
        let active = registry.get(CountyKey::Manatee).unwrap();
        assert_eq!(active.profile.policy.timeout, Duration::from_secs(30));
        assert_eq!(active.profile.policy.max_attempts, 5);
        assert_eq!(active.endpoint.layer_url(), "http://127.0.0.1:9999/22");

        let untouched = registry.get(CountyKey::Pinellas).unwrap();
        assert_eq!(untouched.profile.policy, DispatchPolicy::default());
    }

    #[test]
    fn overrides_do_not_activate_unsupported_county() {
        let overrides = flparcel_core::overrides::parse_county_overrides(
            "counties:\n  pasco:\n    base_url: http://127.0.0.1:9999\n",
        )
        .unwrap();
        let registry = registry().with_overrides(&overrides);
        assert!(registry.get(CountyKey::Pasco).is_err());
    }
}
