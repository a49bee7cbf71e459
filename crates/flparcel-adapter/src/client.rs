//! HTTP client for county ArcGIS feature services.
//!
//! Wraps `reqwest` with the ArcGIS conventions the adapter relies on: attribute
//! queries against a layer's `query` resource, related-table lookups through
//! `queryRelatedRecords`, and error bodies delivered with HTTP 200. Every
//! request runs under the county's [`DispatchPolicy`] timeout and retry budget.

use std::time::Duration;

use flparcel_core::CountyKey;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::{FetchError, LookupError, UpstreamCause};
use crate::identifier::ParcelIdentifier;
use crate::registry::{ActiveCounty, AttributeOrigin, DispatchPolicy, RelatedTable};
use crate::retry::retry_with_backoff;
use crate::types::{Attributes, FeatureSet, RelatedRecordsResponse, ServiceErrorEnvelope};

const DEFAULT_USER_AGENT: &str = "flparcel/0.1 (parcel-lookup)";

/// Shared HTTP client for every county service.
///
/// Cheap to clone; the connection pool is shared between clones.
#[derive(Debug, Clone)]
pub struct ArcGisClient {
    client: Client,
}

impl ArcGisClient {
    /// Creates a client that identifies itself with `user_agent`.
    ///
    /// No overall timeout is set here; each request carries its county's.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the underlying client cannot be built.
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Creates a client with the default user agent.
    ///
    /// # Errors
    ///
    /// Returns a [`reqwest::Error`] if the underlying client cannot be built.
    pub fn with_default_user_agent() -> Result<Self, reqwest::Error> {
        Self::new(DEFAULT_USER_AGENT)
    }

    /// Queries the county's parcel layer for features whose id attribute
    /// equals the identifier's query value.
    ///
    /// # Errors
    ///
    /// - [`LookupError::UpstreamTimeout`] if every attempt timed out.
    /// - [`LookupError::UpstreamError`] on HTTP, service, or body errors.
    pub(crate) async fn query_features(
        &self,
        county: ActiveCounty<'_>,
        id: &ParcelIdentifier,
    ) -> Result<FeatureSet, LookupError> {
        let url = feature_query_url(county, id)?;
        tracing::debug!(county = %county.profile.key, url = %url, "querying parcel layer");
        self.fetch(county.profile.key, &county.profile.policy, &url)
            .await
    }

    /// Fetches the related-table row for one feature.
    ///
    /// Returns `None` if the relationship has no record for `object_id`.
    ///
    /// # Errors
    ///
    /// Same as [`ArcGisClient::query_features`].
    pub(crate) async fn query_related(
        &self,
        county: ActiveCounty<'_>,
        related: &RelatedTable,
        object_id: &str,
    ) -> Result<Option<Attributes>, LookupError> {
        let key = county.profile.key;
        let url = related_query_url(county, related, object_id)?;
        tracing::debug!(county = %key, url = %url, "querying related records");
        let response: RelatedRecordsResponse =
            self.fetch(key, &county.profile.policy, &url).await?;

        let mut records = response
            .related_record_groups
            .into_iter()
            .flat_map(|group| group.related_records);
        let first = records.next();
        let extra = records.count();
        if extra > 0 {
            tracing::warn!(
                county = %key,
                object_id,
                count = extra + 1,
                "multiple related records; using the first"
            );
        }
        Ok(first.map(|record| record.attributes))
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        county: CountyKey,
        policy: &DispatchPolicy,
        url: &Url,
    ) -> Result<T, LookupError> {
        let timeout = policy.timeout;
        retry_with_backoff(county, policy, move || self.get_json(url, timeout)).await
    }

    /// One GET attempt: checks the HTTP status, rejects empty bodies, and
    /// surfaces ArcGIS error envelopes before decoding `T`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<T, FetchError> {
        let response = self.client.get(url.clone()).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(FetchError::MalformedBody("empty body".to_owned()));
        }

        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedBody(format!("not JSON: {e}")))?;
        check_service_error(&value)?;

        serde_json::from_value(value)
            .map_err(|e| FetchError::MalformedBody(format!("unexpected shape: {e}")))
    }
}

fn check_service_error(body: &serde_json::Value) -> Result<(), FetchError> {
    if body.get("error").is_none() {
        return Ok(());
    }
    let envelope: ServiceErrorEnvelope = serde_json::from_value(body.clone())
        .map_err(|e| FetchError::MalformedBody(format!("unreadable error envelope: {e}")))?;
    Err(FetchError::Service {
        code: envelope.error.code,
        message: envelope.error.message,
    })
}

/// `where` clause matching one attribute exactly. Single quotes in the value
/// are doubled.
fn equals_clause(attribute: &str, value: &str) -> String {
    format!("{attribute} = '{}'", value.replace('\'', "''"))
}

fn resource_url(county: ActiveCounty<'_>, resource: &str) -> Result<Url, LookupError> {
    let raw = format!("{}/{resource}", county.endpoint.layer_url());
    Url::parse(&raw).map_err(|e| LookupError::UpstreamError {
        county: county.profile.key,
        cause: UpstreamCause::InvalidEndpoint(format!("'{raw}': {e}")),
        attempts: 0,
    })
}

/// Builds the layer `query` URL for one identifier.
pub(crate) fn feature_query_url(
    county: ActiveCounty<'_>,
    id: &ParcelIdentifier,
) -> Result<Url, LookupError> {
    let profile = county.profile;
    let mut url = resource_url(county, "query")?;
    url.query_pairs_mut()
        .append_pair(
            "where",
            &equals_clause(profile.id_attribute, id.query_value()),
        )
        .append_pair("outFields", &profile.out_fields(AttributeOrigin::Layer).join(","))
        .append_pair("returnGeometry", "false")
        .append_pair("f", "json");
    Ok(url)
}

/// Builds the `queryRelatedRecords` URL for one feature.
pub(crate) fn related_query_url(
    county: ActiveCounty<'_>,
    related: &RelatedTable,
    object_id: &str,
) -> Result<Url, LookupError> {
    let fields = county.profile.out_fields(AttributeOrigin::Related);
    let out_fields = if fields.is_empty() {
        "*".to_owned()
    } else {
        fields.join(",")
    };
    let mut url = resource_url(county, "queryRelatedRecords")?;
    url.query_pairs_mut()
        .append_pair("objectIds", object_id)
        .append_pair("relationshipId", &related.relationship_id.to_string())
        .append_pair("outFields", &out_fields)
        .append_pair("returnGeometry", "false")
        .append_pair("f", "json");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CountyRegistry, ServiceEndpoint};

    fn registry() -> CountyRegistry {
        CountyRegistry::florida(DispatchPolicy::default())
    }

    fn query_param(url: &Url, name: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn manatee_query_url_uses_compact_id() {
        let registry = registry();
        let county = registry.get(CountyKey::Manatee).unwrap();
        let id = ParcelIdentifier::parse(county.profile, "1234567890").unwrap();
        let url = feature_query_url(county, &id).unwrap();

        assert!(url.path().ends_with("/MapServer/22/query"), "{url}");
        assert_eq!(query_param(&url, "where").as_deref(), Some("PIN = '1234567890'"));
        assert_eq!(query_param(&url, "f").as_deref(), Some("json"));
        assert_eq!(query_param(&url, "returnGeometry").as_deref(), Some("false"));
        let out_fields = query_param(&url, "outFields").unwrap();
        assert!(out_fields.starts_with("PIN,"), "{out_fields}");
        assert!(out_fields.contains("JUST_VALUE"));
    }

    #[test]
    fn pinellas_query_url_uses_dashed_id_and_requests_object_id() {
        let registry = registry();
        let county = registry.get(CountyKey::Pinellas).unwrap();
        let id = ParcelIdentifier::parse(county.profile, "033216117370010010").unwrap();
        let url = feature_query_url(county, &id).unwrap();

        assert_eq!(
            query_param(&url, "where").as_deref(),
            Some("PGIS.PGIS.AccelaParcels.PARCELID = '03-32-16-11737-001-0010'")
        );
        let out_fields = query_param(&url, "outFields").unwrap();
        assert!(out_fields.contains("PGIS.PGIS.Parcels.OBJECTID"));
        assert!(!out_fields.contains("OWNERNAME"), "related attributes belong to the related query");
    }

    #[test]
    fn related_query_url_carries_relationship() {
        let registry = registry();
        let county = registry.get(CountyKey::Pinellas).unwrap();
        let related = county.profile.related.unwrap();
        let url = related_query_url(county, &related, "4411").unwrap();

        assert!(url.path().ends_with("/MapServer/1/queryRelatedRecords"), "{url}");
        assert_eq!(query_param(&url, "objectIds").as_deref(), Some("4411"));
        assert_eq!(query_param(&url, "relationshipId").as_deref(), Some("0"));
        assert!(query_param(&url, "outFields").unwrap().contains("OWNERNAME"));
    }

    #[test]
    fn equals_clause_escapes_single_quotes() {
        assert_eq!(equals_clause("PIN", "O'BRIEN"), "PIN = 'O''BRIEN'");
    }

    #[test]
    fn invalid_base_url_is_an_upstream_error_without_attempts() {
        let mut profile = registry().profile(CountyKey::Manatee).unwrap().clone();
        profile.endpoint = Some(ServiceEndpoint::new("not a url", 22));
        let registry = CountyRegistry::from_profiles(vec![profile]);
        let county = registry.get(CountyKey::Manatee).unwrap();
        let id = ParcelIdentifier::parse(county.profile, "1234567890").unwrap();

        let err = feature_query_url(county, &id).unwrap_err();
        assert!(matches!(
            err,
            LookupError::UpstreamError {
                cause: UpstreamCause::InvalidEndpoint(_),
                attempts: 0,
                ..
            }
        ));
    }

    #[test]
    fn service_error_envelope_is_detected() {
        let body = serde_json::json!({"error": {"code": 500, "message": "Unable to complete operation."}});
        assert!(matches!(
            check_service_error(&body),
            Err(FetchError::Service { code: 500, .. })
        ));
        assert!(check_service_error(&serde_json::json!({"features": []})).is_ok());
    }
}
