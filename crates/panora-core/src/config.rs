//! Configuration module
//!
//! Settings are read from the environment (optionally seeded from a `.env`
//! file) once at process start. The active storage backend is chosen here and
//! never changes for the life of the process.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_ENRICHMENT_TIMEOUT_MS, DEFAULT_PRESIGNED_URL_TTL_SECS, DEFAULT_S3_REGION,
};
use crate::storage_types::StorageBackend;

const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_FILE_SIZE_MB: usize = 10;
const BYTES_PER_MB: usize = 1024 * 1024;

/// How assets held by the local filesystem backend are handed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocalDelivery {
    /// Stream the bytes directly in the response.
    #[default]
    Stream,
    /// Return a same-service URL pointing at the local-download endpoint.
    Handoff,
}

impl FromStr for LocalDelivery {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stream" => Ok(LocalDelivery::Stream),
            "handoff" | "url" => Ok(LocalDelivery::Handoff),
            _ => Err(anyhow::anyhow!("Invalid local delivery mode: {}", s)),
        }
    }
}

impl Display for LocalDelivery {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            LocalDelivery::Stream => write!(f, "stream"),
            LocalDelivery::Handoff => write!(f, "handoff"),
        }
    }
}

/// Process-level settings shared by every entry point
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    /// `json` switches the log output to one JSON object per line.
    pub log_format: String,
}

/// Image catalog configuration
#[derive(Clone, Debug)]
pub struct AssetServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: String,
    // Retrieval configuration
    pub local_delivery: LocalDelivery,
    pub public_base_url: String,
    pub presigned_url_ttl_secs: u64,
    pub enrichment_timeout_ms: u64,
    // Upload limits
    pub max_file_size_mb: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AssetServiceConfig>);

impl Config {
    fn inner(&self) -> &AssetServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = AssetServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AssetServiceConfig::from_lookup(lookup)?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> &str {
        &self.inner().s3_region
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> &str {
        &self.inner().local_storage_path
    }

    pub fn local_delivery(&self) -> LocalDelivery {
        self.inner().local_delivery
    }

    pub fn public_base_url(&self) -> &str {
        &self.inner().public_base_url
    }

    pub fn presigned_url_ttl_secs(&self) -> u64 {
        self.inner().presigned_url_ttl_secs
    }

    pub fn enrichment_timeout_ms(&self) -> u64 {
        self.inner().enrichment_timeout_ms
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.inner().max_file_size_bytes()
    }
}

impl AssetServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            environment,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            log_format: lookup("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>()?,
            None => StorageBackend::Local,
        };

        let local_delivery = match lookup("LOCAL_DELIVERY") {
            Some(value) => value.parse::<LocalDelivery>()?,
            None => LocalDelivery::default(),
        };

        let max_file_size_mb = lookup("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = AssetServiceConfig {
            base,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: lookup("S3_BUCKET")
                .or_else(|| lookup("BUCKET_NAME"))
                .filter(|s| !s.trim().is_empty()),
            s3_region: lookup("S3_REGION")
                .or_else(|| lookup("AWS_REGION"))
                .unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH").unwrap_or_else(|| ".".to_string()),
            local_delivery,
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
            presigned_url_ttl_secs: lookup("PRESIGNED_URL_TTL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PRESIGNED_URL_TTL_SECS),
            enrichment_timeout_ms: lookup("ENRICHMENT_TIMEOUT_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ENRICHMENT_TIMEOUT_MS),
            max_file_size_mb,
        };

        Ok(config)
    }

    /// Upload limit in bytes, saturating; `validate` rejects limits that overflow.
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Reject settings the process cannot run with.
    ///
    /// A missing bucket is not rejected here: the S3 backend starts degraded
    /// and fails each request with a misconfiguration error instead.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.presigned_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_TTL_SECS must be greater than zero"
            ));
        }

        if self.enrichment_timeout_ms == 0 {
            return Err(anyhow::anyhow!(
                "ENRICHMENT_TIMEOUT_MS must be greater than zero"
            ));
        }

        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.max_file_size_mb.checked_mul(BYTES_PER_MB).is_none() {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB is too large"));
        }

        if self.storage_backend == StorageBackend::Local
            && self.local_storage_path.trim().is_empty()
        {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must not be empty when using local storage backend"
            ));
        }

        Ok(())
    }
}
