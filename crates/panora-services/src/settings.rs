use std::time::Duration;

use panora_core::constants::{DEFAULT_ENRICHMENT_TIMEOUT_MS, DEFAULT_PRESIGNED_URL_TTL_SECS};
use panora_core::{Config, LocalDelivery};

/// Service-level knobs derived from [`Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub max_file_size: usize,
    pub local_delivery: LocalDelivery,
    /// Base of same-service URLs, without a trailing slash.
    pub public_base_url: String,
    pub presigned_url_ttl: Duration,
    pub enrichment_timeout: Duration,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            max_file_size: 10 * 1024 * 1024,
            local_delivery: LocalDelivery::default(),
            public_base_url: "http://localhost:3000".to_string(),
            presigned_url_ttl: Duration::from_secs(DEFAULT_PRESIGNED_URL_TTL_SECS),
            enrichment_timeout: Duration::from_millis(DEFAULT_ENRICHMENT_TIMEOUT_MS),
        }
    }
}

impl From<&Config> for CatalogSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_file_size: config.max_file_size_bytes(),
            local_delivery: config.local_delivery(),
            public_base_url: config.public_base_url().trim_end_matches('/').to_string(),
            presigned_url_ttl: Duration::from_secs(config.presigned_url_ttl_secs()),
            enrichment_timeout: Duration::from_millis(config.enrichment_timeout_ms()),
        }
    }
}
