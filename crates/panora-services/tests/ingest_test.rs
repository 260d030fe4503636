//! Upload pipeline tests.

mod helpers;

use std::sync::Arc;

use async_trait::async_trait;
use panora_core::models::{BookmarkCounts, ImageListQuery, ImagePage, NewImageAsset};
use panora_core::{AppError, ImageAsset, LocalDelivery, StorageBackend};
use panora_db::{ImageRepositoryTrait, InMemoryImageRepository};
use panora_services::{CatalogSettings, ImageCatalog, Storage, UploadedImage};
use uuid::Uuid;

use helpers::fixtures::{gif, jpeg, png, upload};
use helpers::{local_app, MockStorage};

#[tokio::test]
async fn test_upload_records_detected_metadata() {
    let app = local_app(LocalDelivery::Stream).await;
    let data = jpeg(400, 150);

    let image = app
        .catalog
        .upload(UploadedImage {
            data: data.clone(),
            filename: "Summer Banner.jpg".to_string(),
            content_type: Some("image/png".to_string()),
            declared_size: Some(1),
        })
        .await
        .unwrap();

    assert_eq!(image.name, "Summer Banner.jpg");
    assert_eq!((image.width, image.height), (400, 150));
    assert_eq!(image.file_type, "image/jpeg");
    assert_eq!(image.size, data.len() as i64);
    assert!(!image.bookmarked);
    assert!(image.storage_key.starts_with("uploads/images/"));
    assert!(image.storage_key.ends_with("-Summer_Banner.jpg"));

    let stored = app.storage.download(&image.storage_key).await.unwrap();
    assert_eq!(stored, data);

    let record = app.catalog.get_any(image.id).await.unwrap();
    assert_eq!(record.storage_backend, StorageBackend::Local);
}

#[tokio::test]
async fn test_rejected_uploads_store_nothing() {
    let app = local_app(LocalDelivery::Stream).await;

    let cases = vec![
        (png(1999, 1000), "Aspect ratio must be at least 2:1."),
        (png(99, 40), "Image dimensions too small. Minimum 100x50 pixels."),
        (gif(400, 150), "Invalid image format. Only JPEG and PNG are allowed."),
    ];

    for (data, reason) in cases {
        let err = app.catalog.upload(upload("bad.png", data)).await.unwrap_err();
        assert!(
            matches!(err, AppError::ValidationFailed(ref msg) if msg == reason),
            "unexpected error: {:?}",
            err
        );
    }

    let err = app
        .catalog
        .upload(upload("noise.jpg", b"not an image at all".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationFailed(_)));

    assert!(app.repository.is_empty());
    assert!(!app.storage.base_path().join("uploads").exists());
}

#[tokio::test]
async fn test_upload_without_filename_is_invalid() {
    let app = local_app(LocalDelivery::Stream).await;
    let err = app.catalog.upload(upload("  ", jpeg(400, 150))).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_upload_to_remote_backend_uses_remote_namespace() {
    let storage = Arc::new(MockStorage::remote());
    let repository = InMemoryImageRepository::new();
    let catalog = ImageCatalog::with_settings(
        CatalogSettings::default(),
        Arc::new(repository.clone()),
        storage.clone() as Arc<dyn Storage>,
    );

    let image = catalog.upload(upload("wide.png", png(300, 100))).await.unwrap();

    assert!(image.storage_key.starts_with("images/"));
    assert!(storage.contains(&image.storage_key));
    assert_eq!(
        repository.find_live(image.id).await.unwrap().storage_backend,
        StorageBackend::S3
    );
}

/// Repository whose inserts always fail; everything else is delegated.
struct RejectingRepository {
    inner: InMemoryImageRepository,
}

#[async_trait]
impl ImageRepositoryTrait for RejectingRepository {
    async fn create(&self, _new_image: NewImageAsset) -> Result<ImageAsset, AppError> {
        Err(AppError::Internal("insert failed".to_string()))
    }

    async fn find_live(&self, id: Uuid) -> Result<ImageAsset, AppError> {
        self.inner.find_live(id).await
    }

    async fn find_any(&self, id: Uuid) -> Result<Option<ImageAsset>, AppError> {
        self.inner.find_any(id).await
    }

    async fn update_bookmark(&self, id: Uuid, bookmarked: bool) -> Result<ImageAsset, AppError> {
        self.inner.update_bookmark(id, bookmarked).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        self.inner.soft_delete(id).await
    }

    async fn query_page(&self, query: &ImageListQuery) -> Result<ImagePage<ImageAsset>, AppError> {
        self.inner.query_page(query).await
    }

    async fn counts_by_bookmark(&self) -> Result<BookmarkCounts, AppError> {
        self.inner.counts_by_bookmark().await
    }
}

#[tokio::test]
async fn test_failed_record_removes_stored_blob() {
    let storage = Arc::new(MockStorage::remote());
    let catalog = ImageCatalog::with_settings(
        CatalogSettings::default(),
        Arc::new(RejectingRepository {
            inner: InMemoryImageRepository::new(),
        }),
        storage.clone() as Arc<dyn Storage>,
    );

    let err = catalog
        .upload(upload("wide.jpg", jpeg(400, 150)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Internal(_)));
    assert_eq!(storage.blob_count(), 0);
}

#[tokio::test]
async fn test_degraded_remote_backend_fails_upload_as_misconfigured() {
    let storage = panora_storage::S3Storage::new(None, "ap-southeast-1".to_string(), None).unwrap();
    let repository = InMemoryImageRepository::new();
    let catalog = ImageCatalog::with_settings(
        CatalogSettings::default(),
        Arc::new(repository.clone()),
        Arc::new(storage),
    );

    let err = catalog
        .upload(upload("wide.jpg", jpeg(400, 150)))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Misconfigured(_)));
    assert!(repository.is_empty());
}
