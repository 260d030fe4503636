//! Deletion orchestration tests.

mod helpers;

use panora_core::{AppError, ImageListQuery, LocalDelivery};
use panora_services::{CatalogSettings, Storage};

use helpers::fixtures::{jpeg, upload};
use helpers::{local_app, mock_app, MockStorage};

#[tokio::test]
async fn test_delete_removes_blob_then_hides_record() {
    let app = local_app(LocalDelivery::Stream).await;
    let image = app.catalog.upload(upload("bye.jpg", jpeg(400, 150))).await.unwrap();

    let result = app.catalog.delete(image.id).await.unwrap();
    assert!(result.success);
    assert_eq!(result.id, image.id);

    assert!(!app.storage.exists(&image.storage_key).await.unwrap());
    assert!(matches!(
        app.catalog.get(image.id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        app.catalog.bookmark(image.id, true).await,
        Err(AppError::NotFound(_))
    ));
    assert!(app.catalog.get_any(image.id).await.unwrap().deleted_at.is_some());

    let err = app.catalog.delete(image.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Image not found"));
}

#[tokio::test]
async fn test_delete_converges_when_blob_already_gone() {
    let app = mock_app(MockStorage::remote(), CatalogSettings::default());
    let image = app.catalog.upload(upload("half.jpg", jpeg(400, 150))).await.unwrap();
    app.storage.remove(&image.storage_key);

    app.catalog.delete(image.id).await.unwrap();

    let page = app.catalog.list(&ImageListQuery::default()).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn test_backend_failure_leaves_record_live() {
    let app = mock_app(MockStorage::remote(), CatalogSettings::default());
    let image = app.catalog.upload(upload("stuck.jpg", jpeg(400, 150))).await.unwrap();
    app.storage.fail_deletes();

    let err = app.catalog.delete(image.id).await.unwrap_err();
    assert!(matches!(err, AppError::BackendUnavailable(_)));

    assert!(app.catalog.get(image.id).await.is_ok());
    assert!(app.storage.contains(&image.storage_key));
}
