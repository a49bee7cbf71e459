pub mod app_config;
pub mod config;
pub mod county;
pub mod overrides;
pub mod record;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use county::CountyKey;
pub use overrides::{load_county_overrides, CountyOverride, CountyOverrides};
pub use record::{
    Assessment, CanonicalField, Field, FieldKind, FieldValue, KindMismatch, LastSale,
    MailingAddress, Ownership, ParcelRecord, ParcelRecordBuilder, Site, Zoning,
    PARCEL_RECORD_SCHEMA_VERSION,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown county: {0}")]
    UnknownCounty(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read county overrides file {path}: {source}")]
    OverridesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse county overrides file: {0}")]
    OverridesFileParse(#[source] serde_yaml::Error),

    #[error("county overrides validation failed: {0}")]
    Validation(String),
}
