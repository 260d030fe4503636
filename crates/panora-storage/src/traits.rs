//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::keys;
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use panora_core::AppError;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The backend has no such capability (e.g. signed links on local disk).
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl StorageError {
    /// Whether retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::UploadFailed(_)
                | StorageError::DownloadFailed(_)
                | StorageError::DeleteFailed(_)
                | StorageError::BackendError(_)
                | StorageError::IoError(_)
        )
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(_) => AppError::image_not_found(),
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::ConfigError(msg) | StorageError::Unsupported(msg) => {
                AppError::Misconfigured(msg)
            }
            other => AppError::BackendUnavailable(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Lazily-read object body. Dropping it stops the underlying read.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Storage abstraction trait
///
/// Both backends (S3, local filesystem) implement this trait so the services
/// never branch on the concrete backend for writes and deletes.
///
/// **Key format:** see the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key` and return its location
    /// (a filesystem path or an object URL).
    async fn store(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Open the object as a stream of `Bytes` chunks.
    async fn retrieve(&self, storage_key: &str) -> StorageResult<ByteStream>;

    /// Read the whole object into memory.
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Generate a time-limited URL granting read access to the object.
    ///
    /// Backends without that capability return `StorageError::Unsupported`.
    async fn retrieve_link(&self, storage_key: &str, expires_in: Duration)
        -> StorageResult<String>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Storage key for a new upload of `filename` in this backend's namespace.
    fn key_for(&self, file_id: Uuid, filename: &str) -> String {
        keys::generate_storage_key(self.backend_type(), file_id, filename)
    }
}
