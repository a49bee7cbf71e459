use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, read once at startup.
///
/// The timeout, retry, and concurrency values are defaults; individual
/// counties may override them through the file at `county_overrides_path`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
    pub max_concurrent_lookups: usize,
    pub max_concurrent_per_county: usize,
    pub county_overrides_path: Option<PathBuf>,
}
