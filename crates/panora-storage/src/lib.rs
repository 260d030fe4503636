//! Panora Storage Library
//!
//! Storage abstraction for image blobs with a local filesystem backend and an
//! S3-compatible object store backend.
//!
//! # Storage key format
//!
//! Each backend owns its own namespace:
//!
//! - **Local filesystem**: `uploads/images/{uuid}-{filename}`
//! - **Object store**: `images/{uuid}-{filename}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageSettings};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use panora_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
