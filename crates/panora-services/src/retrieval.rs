//! Retrieval strategy: decide how a client gets an asset's bytes.
//!
//! | Backend | `LOCAL_DELIVERY` | Result                                  |
//! |---------|------------------|-----------------------------------------|
//! | local   | `stream`         | bytes streamed with download headers    |
//! | local   | `handoff`        | same-service `local-download` URL       |
//! | s3      | (ignored)        | presigned GET URL, bytes never proxied  |

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use panora_core::constants::LOCAL_DOWNLOAD_PATH;
use panora_core::{AppError, ImageAsset, LocalDelivery, StorageBackend};
use panora_storage::{ByteStream, Storage, StorageError};
use uuid::Uuid;

/// A lazily-read asset body with the headers a download response needs.
pub struct AssetStream {
    pub content_type: String,
    pub content_disposition: String,
    pub content_length: Option<u64>,
    pub body: ByteStream,
}

impl AssetStream {
    /// Drain the body into memory.
    pub async fn into_bytes(self) -> Result<Vec<u8>, AppError> {
        let chunks: Vec<_> = self.body.try_collect().await.map_err(AppError::from)?;
        Ok(chunks.concat())
    }
}

impl fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetStream")
            .field("content_type", &self.content_type)
            .field("content_disposition", &self.content_disposition)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum Retrieval {
    Stream(AssetStream),
    /// `expires_at` is `None` for same-service links, which do not expire.
    Link {
        url: String,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// `attachment; filename="..."`, plus an RFC 5987 `filename*` when the
/// name is not plain ASCII.
pub fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    if fallback == filename {
        format!("attachment; filename=\"{}\"", fallback)
    } else {
        format!(
            "attachment; filename=\"{}\"; filename*=UTF-8''{}",
            fallback,
            urlencoding::encode(filename)
        )
    }
}

#[derive(Clone)]
pub struct RetrievalService {
    storage: Arc<dyn Storage>,
    local_delivery: LocalDelivery,
    public_base_url: String,
    link_ttl: Duration,
}

impl RetrievalService {
    pub fn new(
        storage: Arc<dyn Storage>,
        local_delivery: LocalDelivery,
        public_base_url: impl Into<String>,
        link_ttl: Duration,
    ) -> Self {
        Self {
            storage,
            local_delivery,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            link_ttl,
        }
    }

    /// URL of the same-service endpoint that streams a local asset.
    pub fn handoff_url(&self, id: Uuid) -> String {
        format!("{}{}/{}", self.public_base_url, LOCAL_DOWNLOAD_PATH, id)
    }

    /// An asset tagged for another backend than the active one cannot be
    /// served: its key means nothing here.
    fn ensure_backend(&self, image: &ImageAsset) -> Result<(), AppError> {
        let active = self.storage.backend_type();
        if image.storage_backend != active {
            tracing::error!(
                image_id = %image.id,
                asset_backend = %image.storage_backend,
                active_backend = %active,
                "Asset is stored on a backend this process is not configured for"
            );
            return Err(AppError::Misconfigured(format!(
                "Asset is stored on the {} backend but {} is active",
                image.storage_backend, active
            )));
        }
        Ok(())
    }

    /// Decide between streaming and a link for a live asset.
    #[tracing::instrument(skip(self, image), fields(image_id = %image.id, backend = %image.storage_backend))]
    pub async fn resolve(&self, image: &ImageAsset) -> Result<Retrieval, AppError> {
        self.ensure_backend(image)?;

        match (image.storage_backend, self.local_delivery) {
            (StorageBackend::Local, LocalDelivery::Stream) => {
                Ok(Retrieval::Stream(self.open_stream(image).await?))
            }
            (StorageBackend::Local, LocalDelivery::Handoff) => Ok(Retrieval::Link {
                url: self.handoff_url(image.id),
                expires_at: None,
            }),
            (StorageBackend::S3, _) => {
                let url = self.presigned_url(image).await?;
                let expires_at = chrono::Duration::from_std(self.link_ttl)
                    .ok()
                    .map(|ttl| Utc::now() + ttl);
                Ok(Retrieval::Link { url, expires_at })
            }
        }
    }

    /// Open the asset's bytes as a stream, whatever the delivery mode.
    ///
    /// Backs the `local-download` endpoint and administrative downloads.
    pub async fn open_stream(&self, image: &ImageAsset) -> Result<AssetStream, AppError> {
        self.ensure_backend(image)?;

        let body = self
            .storage
            .retrieve(&image.storage_key)
            .await
            .map_err(|e| self.log_storage_error(image, "retrieve", e))?;

        Ok(AssetStream {
            content_type: image.file_type.clone(),
            content_disposition: content_disposition(&image.name),
            content_length: u64::try_from(image.size).ok(),
            body,
        })
    }

    /// A URL for presentation. Local assets always get the handoff URL.
    pub async fn link_for(&self, image: &ImageAsset) -> Result<String, AppError> {
        self.ensure_backend(image)?;

        match image.storage_backend {
            StorageBackend::Local => Ok(self.handoff_url(image.id)),
            StorageBackend::S3 => self.presigned_url(image).await,
        }
    }

    async fn presigned_url(&self, image: &ImageAsset) -> Result<String, AppError> {
        self.storage
            .retrieve_link(&image.storage_key, self.link_ttl)
            .await
            .map_err(|e| self.log_storage_error(image, "retrieve_link", e))
    }

    fn log_storage_error(&self, image: &ImageAsset, operation: &str, err: StorageError) -> AppError {
        match err {
            StorageError::NotFound(_) => tracing::warn!(
                image_id = %image.id,
                storage_key = %image.storage_key,
                operation,
                "Blob missing for live asset"
            ),
            ref other => tracing::error!(
                error = %other,
                transient = other.is_transient(),
                image_id = %image.id,
                storage_key = %image.storage_key,
                operation,
                "Storage operation failed"
            ),
        }
        AppError::from(err)
    }
}
