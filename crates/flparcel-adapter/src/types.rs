//! ArcGIS REST response types.
//!
//! Only the parts of the `query` and `queryRelatedRecords` responses the
//! adapter reads are modeled. Feature attributes stay as a JSON map because
//! every county names them differently; the field map decides what to read.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Attribute bag of one feature or related record.
pub(crate) type Attributes = serde_json::Map<String, serde_json::Value>;

/// Body of a layer `query` response with `f=json`.
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureSet {
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    /// Absent when the layer returns geometry only.
    #[serde(default)]
    pub attributes: Attributes,
}

/// Body of a `queryRelatedRecords` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelatedRecordsResponse {
    #[serde(default)]
    pub related_record_groups: Vec<RelatedRecordGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelatedRecordGroup {
    #[serde(default)]
    pub related_records: Vec<Feature>,
}

/// Error envelope ArcGIS returns with HTTP 200: `{"error": {"code", "message"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorEnvelope {
    pub error: ServiceErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ServiceErrorBody {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Attributes fetched for a single matched parcel, before mapping.
#[derive(Debug, Clone)]
pub(crate) struct RawParcel {
    pub layer: Attributes,
    /// The related table row, when the county has one and it returned a record.
    pub related: Option<Attributes>,
    pub fetched_at: DateTime<Utc>,
}
