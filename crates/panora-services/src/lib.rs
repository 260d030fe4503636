//! Panora Services Layer
//!
//! Orchestration on top of the validator, the storage backend and the
//! metadata repository: ingestion, retrieval, listing, deletion, and the
//! [`ImageCatalog`] facade the binary and any HTTP front end call into.

pub mod catalog;
pub mod deletion;
pub mod ingest;
pub mod listing;
pub mod retrieval;
pub mod settings;

pub use catalog::ImageCatalog;
pub use deletion::DeletionService;
pub use ingest::{IngestService, UploadedImage};
pub use listing::ListingService;
pub use retrieval::{content_disposition, AssetStream, Retrieval, RetrievalService};
pub use settings::CatalogSettings;

pub use panora_storage::keys::sanitize_filename;
pub use panora_storage::{create_storage, Storage, StorageError, StorageSettings};
