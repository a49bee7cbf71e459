//! The parcel lookup pipeline.
//!
//! One lookup moves through three stages: the identifier is validated against
//! the county pattern, the county service is queried under its dispatch
//! policy, and the single matching feature is mapped to a canonical record.
//! Any stage can end the lookup with a [`LookupError`]; nothing is returned
//! partially.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use flparcel_core::{CountyKey, ParcelRecord};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::client::ArcGisClient;
use crate::error::{ErrorClass, LookupError, UpstreamCause};
use crate::identifier::ParcelIdentifier;
use crate::mapper::map_record;
use crate::registry::{ActiveCounty, CountyRegistry};
use crate::types::{Attributes, RawParcel};

const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 4;

/// One entry of a batch lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupRequest {
    pub county: String,
    pub parcel_id: String,
}

impl LookupRequest {
    #[must_use]
    pub fn new(county: impl Into<String>, parcel_id: impl Into<String>) -> Self {
        Self {
            county: county.into(),
            parcel_id: parcel_id.into(),
        }
    }
}

/// Resolves parcel identifiers to canonical records across counties.
///
/// Lookups share nothing mutable except the per-county request permits, so a
/// single instance can serve concurrent callers. Dropping a lookup future
/// cancels only that lookup.
#[derive(Debug)]
pub struct ParcelLookup {
    registry: CountyRegistry,
    client: ArcGisClient,
    permits: HashMap<CountyKey, Arc<Semaphore>>,
    max_concurrent_lookups: usize,
}

impl ParcelLookup {
    #[must_use]
    pub fn new(registry: CountyRegistry, client: ArcGisClient) -> Self {
        let permits = registry
            .profiles()
            .map(|p| (p.key, Arc::new(Semaphore::new(p.policy.max_concurrent.max(1)))))
            .collect();
        Self {
            registry,
            client,
            permits,
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }

    /// Caps how many lookups of a batch run at once.
    #[must_use]
    pub fn with_max_concurrent_lookups(mut self, n: usize) -> Self {
        self.max_concurrent_lookups = n.max(1);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &CountyRegistry {
        &self.registry
    }

    /// Looks up a parcel by county name and identifier as the user typed them.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::UnsupportedCounty`] for a county name outside
    /// the registry, otherwise whatever [`ParcelLookup::lookup_county`] returns.
    pub async fn lookup(&self, county: &str, raw_id: &str) -> Result<ParcelRecord, LookupError> {
        let key: CountyKey = county.parse().map_err(|_| LookupError::UnsupportedCounty {
            county: county.trim().to_owned(),
            reason: "unknown county".to_owned(),
        })?;
        self.lookup_county(key, raw_id).await
    }

    /// Looks up a parcel in a known county.
    ///
    /// Unsupported counties and invalid identifiers fail before any network
    /// call.
    ///
    /// # Errors
    ///
    /// - [`LookupError::UnsupportedCounty`] if the county is not active.
    /// - [`LookupError::InvalidIdentifier`] if `raw_id` does not match the
    ///   county pattern.
    /// - [`LookupError::NotFound`] / [`LookupError::AmbiguousMatch`] when the
    ///   service returns zero or several features.
    /// - [`LookupError::UpstreamTimeout`] / [`LookupError::UpstreamError`]
    ///   when the service fails after retries.
    /// - [`LookupError::MappingError`] when a returned value cannot be read.
    pub async fn lookup_county(
        &self,
        key: CountyKey,
        raw_id: &str,
    ) -> Result<ParcelRecord, LookupError> {
        let county = self.registry.get(key)?;
        let id = ParcelIdentifier::parse(county.profile, raw_id)?;
        tracing::debug!(county = %key, parcel_id = %id.normalized(), "identifier validated");

        let raw = self.dispatch(county, &id).await.inspect_err(|e| {
            if e.class() == ErrorClass::BusinessOutcome {
                tracing::info!(
                    county = %key,
                    parcel_id = %id.normalized(),
                    outcome = %e,
                    "no single parcel matched"
                );
            }
        })?;
        tracing::debug!(county = %key, parcel_id = %id.normalized(), "feature dispatched");

        let record = map_record(county.profile, &id, &raw)?;
        tracing::debug!(county = %key, parcel_id = %id.normalized(), "record mapped");
        tracing::info!(county = %key, parcel_id = %id.display(), "parcel lookup succeeded");
        Ok(record)
    }

    /// Runs a batch of lookups with bounded concurrency.
    ///
    /// Results come back in request order, one per request. A failed entry
    /// does not affect the others.
    pub async fn lookup_many(
        &self,
        requests: &[LookupRequest],
    ) -> Vec<Result<ParcelRecord, LookupError>> {
        stream::iter(requests)
            .map(|req| self.lookup(&req.county, &req.parcel_id))
            .buffered(self.max_concurrent_lookups.max(1))
            .collect()
            .await
    }

    /// Queries the county service and, when the county has a related table,
    /// the related row. Holds one county permit for the whole exchange.
    async fn dispatch(
        &self,
        county: ActiveCounty<'_>,
        id: &ParcelIdentifier,
    ) -> Result<RawParcel, LookupError> {
        let key = county.profile.key;
        let _permit = match self.permits.get(&key) {
            Some(semaphore) => Some(semaphore.acquire().await.map_err(|_| {
                LookupError::UpstreamError {
                    county: key,
                    cause: UpstreamCause::Transport("dispatcher shut down".to_owned()),
                    attempts: 0,
                }
            })?),
            None => None,
        };

        let set = self.client.query_features(county, id).await?;
        let mut features = set.features;
        let layer = match features.len() {
            0 => {
                return Err(LookupError::NotFound {
                    county: key,
                    parcel_id: id.normalized().to_owned(),
                })
            }
            1 => features.remove(0).attributes,
            n => {
                return Err(LookupError::AmbiguousMatch {
                    county: key,
                    parcel_id: id.normalized().to_owned(),
                    candidate_count: n,
                })
            }
        };

        let related = match &county.profile.related {
            Some(table) => match object_id(&layer, table.object_id_attribute) {
                Some(oid) => {
                    let row = self.client.query_related(county, table, &oid).await?;
                    if row.is_none() {
                        tracing::warn!(
                            county = %key,
                            object_id = %oid,
                            "no related record for parcel"
                        );
                    }
                    row
                }
                None => {
                    tracing::warn!(
                        county = %key,
                        attribute = table.object_id_attribute,
                        "feature has no object id; related fields will be unknown"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(RawParcel {
            layer,
            related,
            fetched_at: Utc::now(),
        })
    }
}

fn object_id(attributes: &Attributes, attribute: &str) -> Option<String> {
    match attributes.get(attribute)? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::registry::DispatchPolicy;

    fn lookup() -> ParcelLookup {
        ParcelLookup::new(
            CountyRegistry::florida(DispatchPolicy::default()),
            ArcGisClient::with_default_user_agent().unwrap(),
        )
    }

    #[tokio::test]
    async fn unknown_county_is_unsupported() {
        let err = lookup().lookup("Orange", "1234567890").await.unwrap_err();
        assert_eq!(
            err,
            LookupError::UnsupportedCounty {
                county: "Orange".to_owned(),
                reason: "unknown county".to_owned(),
            }
        );
    }

    #[tokio::test]
    async fn unsupported_county_fails_before_validation() {
        let err = lookup().lookup("Sarasota", "not-an-id").await.unwrap_err();
        assert!(matches!(err, LookupError::UnsupportedCounty { ref county, .. } if county == "Sarasota"));
    }

    #[tokio::test]
    async fn invalid_identifier_fails_before_dispatch() {
        let err = lookup().lookup("Hillsborough", "19-26-05-0000").await.unwrap_err();
        assert!(matches!(err, LookupError::InvalidIdentifier { .. }));
    }

    #[test]
    fn object_id_reads_numbers_and_strings() {
        let attrs = match json!({"A": 4411, "B": " 12 ", "C": "", "D": null}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(object_id(&attrs, "A").as_deref(), Some("4411"));
        assert_eq!(object_id(&attrs, "B").as_deref(), Some("12"));
        assert_eq!(object_id(&attrs, "C"), None);
        assert_eq!(object_id(&attrs, "D"), None);
        assert_eq!(object_id(&attrs, "E"), None);
    }

    #[test]
    fn every_profile_gets_permits() {
        let lookup = lookup();
        for key in CountyKey::ALL {
            assert!(lookup.permits.contains_key(&key), "{key}");
        }
    }
}
