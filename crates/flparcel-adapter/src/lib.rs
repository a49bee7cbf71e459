//! Multi-county parcel data adapter.
//!
//! [`ParcelLookup`] is the entry point: it validates an identifier against the
//! county's pattern, queries the county's ArcGIS feature service, and maps the
//! returned attributes into a canonical [`flparcel_core::ParcelRecord`].

mod client;
pub mod error;
mod identifier;
pub mod lookup;
mod mapper;
mod profiles;
pub mod registry;
mod retry;
mod types;

pub use client::ArcGisClient;
pub use error::{ErrorClass, LookupError, UpstreamCause};
pub use lookup::{LookupRequest, ParcelLookup};
pub use registry::{
    ActiveCounty, AttributeOrigin, CharClass, Coercion, CountyProfile, CountyRegistry,
    CountyStatus, DispatchPolicy, FieldRule, IdPattern, QueryIdStyle, RelatedTable, Segment,
    ServiceEndpoint,
};
