use std::sync::Arc;

use panora_core::{AppError, DeleteResult};
use panora_db::ImageRepositoryTrait;
use panora_storage::{Storage, StorageError};
use uuid::Uuid;

/// Removes the blob, then marks the record deleted.
///
/// A blob that is already gone does not stop the soft delete, so re-running
/// after a crash between the two steps converges. Any other storage failure
/// leaves the record untouched.
pub struct DeletionService {
    repository: Arc<dyn ImageRepositoryTrait>,
    storage: Arc<dyn Storage>,
}

impl DeletionService {
    pub fn new(repository: Arc<dyn ImageRepositoryTrait>, storage: Arc<dyn Storage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    #[tracing::instrument(skip(self), fields(image_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<DeleteResult, AppError> {
        let image = self.repository.find_live(id).await?;

        let active = self.storage.backend_type();
        if image.storage_backend != active {
            tracing::error!(
                asset_backend = %image.storage_backend,
                active_backend = %active,
                "Refusing to delete an asset stored on an inactive backend"
            );
            return Err(AppError::Misconfigured(format!(
                "Asset is stored on the {} backend but {} is active",
                image.storage_backend, active
            )));
        }

        match self.storage.delete(&image.storage_key).await {
            Ok(()) => {}
            Err(StorageError::NotFound(_)) => {
                tracing::warn!(
                    storage_key = %image.storage_key,
                    "Blob already absent; marking record deleted"
                );
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    transient = e.is_transient(),
                    storage_key = %image.storage_key,
                    "Failed to delete blob"
                );
                return Err(e.into());
            }
        }

        self.repository.soft_delete(id).await?;

        tracing::info!(storage_key = %image.storage_key, "Image deleted");
        Ok(DeleteResult { success: true, id })
    }
}
