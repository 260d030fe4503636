//! Panora Core Library
//!
//! Domain models, error types, configuration and the storage backend tag
//! shared by every Panora crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AssetServiceConfig, BaseConfig, Config, LocalDelivery};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
// Storage, StorageError and StorageResult live in panora-storage
pub use models::{
    BookmarkCounts, BookmarkFilter, DeleteResult, ImageAsset, ImageAssetResponse, ImageListQuery,
    ImagePage, ListedImage, NewImageAsset, PageWindow,
};
