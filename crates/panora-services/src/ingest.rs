//! Upload pipeline: validate → store → persist

use std::sync::Arc;

use panora_core::{AppError, ImageAsset, NewImageAsset};
use panora_db::ImageRepositoryTrait;
use panora_processing::ImageValidator;
use panora_storage::Storage;
use uuid::Uuid;

/// An upload as delivered by the multipart front end.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub data: Vec<u8>,
    pub filename: String,
    /// Content type claimed by the client; the detected format wins.
    pub content_type: Option<String>,
    /// Size claimed by the client; the payload length wins.
    pub declared_size: Option<u64>,
}

impl UploadedImage {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            data,
            filename: filename.into(),
            content_type: None,
            declared_size: None,
        }
    }
}

pub struct IngestService {
    repository: Arc<dyn ImageRepositoryTrait>,
    storage: Arc<dyn Storage>,
    validator: ImageValidator,
}

impl IngestService {
    pub fn new(
        repository: Arc<dyn ImageRepositoryTrait>,
        storage: Arc<dyn Storage>,
        max_file_size: usize,
    ) -> Self {
        Self {
            repository,
            storage,
            validator: ImageValidator::new(max_file_size),
        }
    }

    /// Validate, store and record one image.
    ///
    /// The blob is written before the record. If the record cannot be
    /// created the blob is deleted again; a failed cleanup is logged with
    /// the orphaned key.
    #[tracing::instrument(skip(self, upload), fields(filename = %upload.filename, size_bytes = upload.data.len()))]
    pub async fn ingest(&self, upload: UploadedImage) -> Result<ImageAsset, AppError> {
        let UploadedImage {
            data,
            filename,
            content_type,
            declared_size,
        } = upload;

        let name = filename.trim().to_string();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Filename is required".to_string()));
        }

        if let Some(declared) = declared_size {
            if declared != data.len() as u64 {
                tracing::debug!(
                    declared_size = declared,
                    actual_size = data.len(),
                    "Declared upload size differs from payload length"
                );
            }
        }

        let validator = self.validator.clone();
        let (data, verdict) = tokio::task::spawn_blocking(move || {
            let verdict = validator.validate(&data);
            (data, verdict)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Failed to process image: {}", e)))?;

        let metadata = verdict.map_err(|e| {
            tracing::info!(reason = %e, "Upload rejected");
            AppError::from(e)
        })?;

        if let Some(ref declared) = content_type {
            if !declared.eq_ignore_ascii_case(metadata.content_type()) {
                tracing::debug!(
                    declared_content_type = %declared,
                    detected_content_type = metadata.content_type(),
                    "Declared content type differs from detected format"
                );
            }
        }

        let width = i32::try_from(metadata.width)
            .map_err(|_| AppError::ValidationFailed("Image width is too large".to_string()))?;
        let height = i32::try_from(metadata.height)
            .map_err(|_| AppError::ValidationFailed("Image height is too large".to_string()))?;
        let size = i64::try_from(metadata.size_bytes)
            .map_err(|_| AppError::ValidationFailed("Image is too large".to_string()))?;

        let file_id = Uuid::new_v4();
        let storage_key = self.storage.key_for(file_id, &name);

        let location = self
            .storage
            .store(&storage_key, data, metadata.content_type())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, storage_key = %storage_key, "Failed to store upload");
                AppError::from(e)
            })?;

        tracing::debug!(storage_key = %storage_key, location = %location, "Upload stored");

        let new_image = NewImageAsset {
            name,
            size,
            width,
            height,
            file_type: metadata.content_type().to_string(),
            storage_key: storage_key.clone(),
            storage_backend: self.storage.backend_type(),
        };

        match self.repository.create(new_image).await {
            Ok(image) => {
                tracing::info!(
                    image_id = %image.id,
                    storage_key = %image.storage_key,
                    width = image.width,
                    height = image.height,
                    size_bytes = image.size,
                    "Image uploaded"
                );
                Ok(image)
            }
            Err(err) => {
                tracing::error!(error = %err, storage_key = %storage_key, "Failed to record upload; removing stored blob");
                if let Err(cleanup_err) = self.storage.delete(&storage_key).await {
                    tracing::error!(
                        error = %cleanup_err,
                        storage_key = %storage_key,
                        "Failed to remove orphaned blob"
                    );
                }
                Err(err)
            }
        }
    }
}
