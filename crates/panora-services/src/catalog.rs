//! Image catalog facade
//!
//! One entry point per operation a front end exposes. Every read is scoped
//! to live assets except [`ImageCatalog::get_any`].

use std::sync::Arc;

use panora_core::{
    AppError, BookmarkCounts, Config, DeleteResult, ImageAsset, ImageAssetResponse,
    ImageListQuery, ImagePage, ListedImage, StorageBackend,
};
use panora_db::ImageRepositoryTrait;
use panora_storage::Storage;
use uuid::Uuid;

use crate::deletion::DeletionService;
use crate::ingest::{IngestService, UploadedImage};
use crate::listing::ListingService;
use crate::retrieval::{AssetStream, Retrieval, RetrievalService};
use crate::settings::CatalogSettings;

pub struct ImageCatalog {
    repository: Arc<dyn ImageRepositoryTrait>,
    ingest: IngestService,
    retrieval: RetrievalService,
    listing: ListingService,
    deletion: DeletionService,
}

impl ImageCatalog {
    pub fn new(
        config: &Config,
        repository: Arc<dyn ImageRepositoryTrait>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self::with_settings(CatalogSettings::from(config), repository, storage)
    }

    pub fn with_settings(
        settings: CatalogSettings,
        repository: Arc<dyn ImageRepositoryTrait>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let retrieval = RetrievalService::new(
            storage.clone(),
            settings.local_delivery,
            settings.public_base_url,
            settings.presigned_url_ttl,
        );

        Self {
            ingest: IngestService::new(repository.clone(), storage.clone(), settings.max_file_size),
            listing: ListingService::new(
                repository.clone(),
                retrieval.clone(),
                settings.enrichment_timeout,
            ),
            deletion: DeletionService::new(repository.clone(), storage),
            retrieval,
            repository,
        }
    }

    pub async fn upload(&self, upload: UploadedImage) -> Result<ImageAssetResponse, AppError> {
        self.ingest.ingest(upload).await.map(ImageAssetResponse::from)
    }

    pub async fn get(&self, id: Uuid) -> Result<ImageAssetResponse, AppError> {
        self.repository.find_live(id).await.map(ImageAssetResponse::from)
    }

    /// Administrative lookup; soft-deleted records are returned too.
    pub async fn get_any(&self, id: Uuid) -> Result<ImageAsset, AppError> {
        self.repository
            .find_any(id)
            .await?
            .ok_or_else(AppError::image_not_found)
    }

    pub async fn bookmark(&self, id: Uuid, bookmarked: bool) -> Result<ImageAssetResponse, AppError> {
        let image = self.repository.update_bookmark(id, bookmarked).await?;
        tracing::info!(image_id = %id, bookmarked, "Bookmark updated");
        Ok(image.into())
    }

    pub async fn list(&self, query: &ImageListQuery) -> Result<ImagePage<ListedImage>, AppError> {
        self.listing.list(query).await
    }

    /// Bytes or a link for a live asset, per the retrieval strategy.
    pub async fn retrieve(&self, id: Uuid) -> Result<Retrieval, AppError> {
        let image = self.repository.find_live(id).await?;
        self.retrieval.resolve(&image).await
    }

    /// Target of the handoff URL: streams a live local asset.
    pub async fn local_download(&self, id: Uuid) -> Result<AssetStream, AppError> {
        let image = self.repository.find_live(id).await?;
        if image.storage_backend != StorageBackend::Local {
            return Err(AppError::InvalidInput(
                "Image is not stored on the local backend".to_string(),
            ));
        }
        self.retrieval.open_stream(&image).await
    }

    /// Stream a live asset from whichever backend holds it.
    pub async fn download(&self, id: Uuid) -> Result<AssetStream, AppError> {
        let image = self.repository.find_live(id).await?;
        self.retrieval.open_stream(&image).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<DeleteResult, AppError> {
        self.deletion.delete(id).await
    }

    pub async fn analytics(&self) -> Result<BookmarkCounts, AppError> {
        self.repository.counts_by_bookmark().await
    }
}
