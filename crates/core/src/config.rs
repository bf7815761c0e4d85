use crate::error::{ReportError, ReportResult};
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `METAREPORT__`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaConfig {
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_insights_ttl_secs")]
    pub insights_ttl_secs: u64,
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

// Default functions
fn default_graph_url() -> String {
    "https://graph.facebook.com".to_string()
}
fn default_api_version() -> String {
    "v18.0".to_string()
}
fn default_request_timeout_ms() -> u64 {
    30_000
}
fn default_page_limit() -> u32 {
    500
}
fn default_max_retries() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}
fn default_insights_ttl_secs() -> u64 {
    300
}
fn default_max_entries() -> usize {
    10_000
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            graph_url: default_graph_url(),
            api_version: default_api_version(),
            access_token: None,
            request_timeout_ms: default_request_timeout_ms(),
            page_limit: default_page_limit(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            insights_ttl_secs: default_insights_ttl_secs(),
            max_entries: default_max_entries(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> ReportResult<Self> {
        Self::from_environment(config::Environment::with_prefix("METAREPORT"))
    }

    fn from_environment(env: config::Environment) -> ReportResult<Self> {
        config::Config::builder()
            .add_source(env.separator("__").try_parsing(true))
            .build()
            .and_then(|config| config.try_deserialize())
            .map_err(|e| ReportError::Config(e.to_string()))
    }
}
