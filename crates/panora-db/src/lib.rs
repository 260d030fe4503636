//! Panora DB Library
//!
//! Metadata repository for image assets: the trait the services depend on,
//! its PostgreSQL implementation and the connection/migration bootstrap.

pub mod db;

pub use db::{
    create_image_repository, escape_like, run_migrations, setup_database, ImageRepositoryTrait,
    PostgresImageRepository,
};
#[cfg(any(test, feature = "test-helpers"))]
pub use db::InMemoryImageRepository;
