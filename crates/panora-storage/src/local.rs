use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage instance rooted at `base_path`.
    ///
    /// Keys are resolved relative to the root, so `uploads/images/x.png`
    /// lands in `{base_path}/uploads/images/x.png`.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys containing path traversal sequences that could escape the
    /// base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        // Existing files may be symlinks; make sure they still resolve inside the root.
        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Hidden sibling the bytes are written to before the final rename.
    fn staging_path(path: &Path) -> PathBuf {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()))
    }

    async fn write_staged(staging: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(staging).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to create file {}: {}",
                staging.display(),
                e
            ))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", staging.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", staging.display(), e))
        })?;

        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        // Readers only ever observe the old file or the complete new one.
        let staging = Self::staging_path(&path);
        if let Err(e) = Self::write_staged(&staging, &data).await {
            let _ = fs::remove_file(&staging).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&staging, &path).await {
            let _ = fs::remove_file(&staging).await;
            return Err(StorageError::UploadFailed(format!(
                "Failed to move file into place {}: {}",
                path.display(),
                e
            )));
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(path.display().to_string())
    }

    async fn retrieve(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to open file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let key = storage_key.to_string();
        let path_display = path.display().to_string();
        let stream = tokio_util::io::ReaderStream::new(file).map(move |result| {
            result.map_err(|e| {
                tracing::error!(
                    path = %path_display,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Local storage stream download error"
                );
                StorageError::DownloadFailed(format!("Failed to read chunk: {}", e))
            })
        });

        Ok(Box::pin(stream))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DownloadFailed(format!(
                    "Failed to read file {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn retrieve_link(
        &self,
        storage_key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(storage_key)?;
        Err(StorageError::Unsupported(
            "Local storage cannot issue signed links".to_string(),
        ))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            Err(e) => {
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
