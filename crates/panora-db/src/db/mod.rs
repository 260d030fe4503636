//! Database repositories for data access layer
//
// Image metadata repository (trait + PostgreSQL implementation)
pub mod image;
//
// Connection pool and migrations
pub mod pool;
//
// In-memory implementation with the same semantics, for tests
#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;

pub use image::{create_image_repository, escape_like, ImageRepositoryTrait, PostgresImageRepository};
#[cfg(any(test, feature = "test-helpers"))]
pub use memory::InMemoryImageRepository;
pub use pool::{run_migrations, setup_database};
