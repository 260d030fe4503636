#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use panora_core::Config;
use std::sync::Arc;

/// The subset of configuration a storage backend needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub local_storage_path: String,
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
}

impl From<&Config> for StorageSettings {
    fn from(config: &Config) -> Self {
        Self {
            backend: config.storage_backend(),
            local_storage_path: config.local_storage_path().to_string(),
            s3_bucket: config.s3_bucket().map(String::from),
            s3_region: config.s3_region().to_string(),
            s3_endpoint: config.s3_endpoint().map(String::from),
        }
    }
}

/// Create the process-wide storage backend.
///
/// Called once at startup; the returned handle is shared by every service.
pub async fn create_storage(settings: &StorageSettings) -> StorageResult<Arc<dyn Storage>> {
    match settings.backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage = S3Storage::new(
                settings.s3_bucket.clone(),
                settings.s3_region.clone(),
                settings.s3_endpoint.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            if settings.local_storage_path.trim().is_empty() {
                return Err(StorageError::ConfigError(
                    "LOCAL_STORAGE_PATH not configured".to_string(),
                ));
            }
            let storage = LocalStorage::new(&settings.local_storage_path).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(backend: StorageBackend, path: &str) -> StorageSettings {
        StorageSettings {
            backend,
            local_storage_path: path.to_string(),
            s3_bucket: None,
            s3_region: "ap-southeast-1".to_string(),
            s3_endpoint: None,
        }
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn test_create_local_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("root");
        let storage = create_storage(&settings(
            StorageBackend::Local,
            path.to_str().unwrap(),
        ))
        .await
        .unwrap();

        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert!(path.is_dir());
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn test_empty_local_path_rejected() {
        let result = create_storage(&settings(StorageBackend::Local, " ")).await;
        assert!(matches!(result, Err(StorageError::ConfigError(_))));
    }

    #[cfg(feature = "storage-s3")]
    #[tokio::test]
    async fn test_s3_without_bucket_starts_degraded() {
        let storage = create_storage(&settings(StorageBackend::S3, "."))
            .await
            .unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::S3);
    }
}
