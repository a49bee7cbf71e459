use flparcel_core::{CanonicalField, CountyKey};
use thiserror::Error;

/// How a caller should treat a [`LookupError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad county or identifier from the user. Report the offending value.
    UserInput,
    /// The lookup ran and the answer is "no single parcel". Not an incident.
    BusinessOutcome,
    /// The county service was unreachable or failed after retries.
    Upstream,
    /// The county service answered with data the field map cannot read.
    SchemaDrift,
}

/// What went wrong talking to a county service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamCause {
    /// Non-2xx HTTP status.
    Status(u16),
    /// HTTP 200 carrying an ArcGIS `{"error": {...}}` body.
    Service { code: i64, message: String },
    /// Connection, TLS, or protocol failure.
    Transport(String),
    /// HTTP 200 whose body is empty or not a feature collection.
    MalformedBody(String),
    /// The configured endpoint does not form a valid URL.
    InvalidEndpoint(String),
}

impl std::fmt::Display for UpstreamCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpstreamCause::Status(code) => write!(f, "HTTP status {code}"),
            UpstreamCause::Service { code, message } => {
                write!(f, "service error {code}: {message}")
            }
            UpstreamCause::Transport(msg) => write!(f, "transport error: {msg}"),
            UpstreamCause::MalformedBody(msg) => write!(f, "malformed response body: {msg}"),
            UpstreamCause::InvalidEndpoint(msg) => write!(f, "invalid endpoint: {msg}"),
        }
    }
}

/// Terminal outcome of a failed [`crate::ParcelLookup`] call.
///
/// A lookup either yields a complete record or exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("invalid {county} parcel identifier '{raw}': {reason}")]
    InvalidIdentifier {
        county: CountyKey,
        raw: String,
        reason: String,
    },

    #[error("county '{county}' is not supported: {reason}")]
    UnsupportedCounty { county: String, reason: String },

    #[error("parcel {parcel_id} not found in {county} County")]
    NotFound { county: CountyKey, parcel_id: String },

    #[error("parcel {parcel_id} matched {candidate_count} features in {county} County")]
    AmbiguousMatch {
        county: CountyKey,
        parcel_id: String,
        candidate_count: usize,
    },

    #[error("{county} County service timed out (attempt {attempt} of {max_attempts})")]
    UpstreamTimeout {
        county: CountyKey,
        attempt: u32,
        max_attempts: u32,
    },

    #[error("{county} County service failed after {attempts} attempt(s): {cause}")]
    UpstreamError {
        county: CountyKey,
        cause: UpstreamCause,
        attempts: u32,
    },

    #[error("{county} County returned an unusable value for {field}: {cause}")]
    MappingError {
        county: CountyKey,
        field: CanonicalField,
        cause: String,
    },
}

impl LookupError {
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            LookupError::InvalidIdentifier { .. } | LookupError::UnsupportedCounty { .. } => {
                ErrorClass::UserInput
            }
            LookupError::NotFound { .. } | LookupError::AmbiguousMatch { .. } => {
                ErrorClass::BusinessOutcome
            }
            LookupError::UpstreamTimeout { .. } | LookupError::UpstreamError { .. } => {
                ErrorClass::Upstream
            }
            LookupError::MappingError { .. } => ErrorClass::SchemaDrift,
        }
    }

    /// The county the lookup was for, as the caller named it.
    #[must_use]
    pub fn county(&self) -> String {
        match self {
            LookupError::UnsupportedCounty { county, .. } => county.clone(),
            LookupError::InvalidIdentifier { county, .. }
            | LookupError::NotFound { county, .. }
            | LookupError::AmbiguousMatch { county, .. }
            | LookupError::UpstreamTimeout { county, .. }
            | LookupError::UpstreamError { county, .. }
            | LookupError::MappingError { county, .. } => county.to_string(),
        }
    }
}

/// A single failed request to a county service, before retry accounting.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("service error {code}: {message}")]
    Service { code: i64, message: String },

    #[error("malformed response body: {0}")]
    MalformedBody(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err)
        }
    }
}

impl FetchError {
    /// Converts the last error of an exhausted (or non-retriable) attempt
    /// sequence into the public error, carrying the attempt accounting.
    pub(crate) fn into_lookup_error(
        self,
        county: CountyKey,
        attempts: u32,
        max_attempts: u32,
    ) -> LookupError {
        let cause = match self {
            FetchError::Timeout => {
                return LookupError::UpstreamTimeout {
                    county,
                    attempt: attempts,
                    max_attempts,
                }
            }
            FetchError::Transport(e) => UpstreamCause::Transport(e.to_string()),
            FetchError::Status(code) => UpstreamCause::Status(code),
            FetchError::Service { code, message } => UpstreamCause::Service { code, message },
            FetchError::MalformedBody(msg) => UpstreamCause::MalformedBody(msg),
        };
        LookupError::UpstreamError {
            county,
            cause,
            attempts,
        }
    }
}
