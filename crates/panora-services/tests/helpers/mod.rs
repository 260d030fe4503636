//! Shared fixtures for the service integration tests.
//!
//! Run with: `cargo test -p panora-services`

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use std::sync::Arc;
use std::time::Duration;

use panora_core::LocalDelivery;
use panora_db::InMemoryImageRepository;
use panora_services::{CatalogSettings, ImageCatalog};
use panora_storage::{LocalStorage, Storage};
use tempfile::TempDir;

pub use storage::MockStorage;

/// Catalog over an in-memory repository and a real local backend in a temp dir.
pub struct LocalTestApp {
    pub catalog: ImageCatalog,
    pub repository: InMemoryImageRepository,
    pub storage: Arc<LocalStorage>,
    pub _temp_dir: TempDir,
}

pub fn settings(local_delivery: LocalDelivery) -> CatalogSettings {
    CatalogSettings {
        local_delivery,
        public_base_url: "http://localhost:3000".to_string(),
        enrichment_timeout: Duration::from_millis(200),
        ..CatalogSettings::default()
    }
}

pub async fn local_app(local_delivery: LocalDelivery) -> LocalTestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let storage = Arc::new(
        LocalStorage::new(temp_dir.path())
            .await
            .expect("Failed to create local storage"),
    );
    let repository = InMemoryImageRepository::new();

    let catalog = ImageCatalog::with_settings(
        settings(local_delivery),
        Arc::new(repository.clone()),
        storage.clone() as Arc<dyn Storage>,
    );

    LocalTestApp {
        catalog,
        repository,
        storage,
        _temp_dir: temp_dir,
    }
}

/// Catalog over an in-memory repository and a scriptable mock backend.
pub struct MockTestApp {
    pub catalog: ImageCatalog,
    pub repository: InMemoryImageRepository,
    pub storage: Arc<MockStorage>,
}

pub fn mock_app(storage: MockStorage, settings: CatalogSettings) -> MockTestApp {
    let storage = Arc::new(storage);
    let repository = InMemoryImageRepository::new();

    let catalog = ImageCatalog::with_settings(
        settings,
        Arc::new(repository.clone()),
        storage.clone() as Arc<dyn Storage>,
    );

    MockTestApp {
        catalog,
        repository,
        storage,
    }
}
