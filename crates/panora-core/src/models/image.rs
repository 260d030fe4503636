use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage_types::StorageBackend;

/// Persisted image record.
///
/// Everything except `bookmarked`, `updated_at` and `deleted_at` is fixed at
/// ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub file_type: String,
    pub storage_key: String,
    pub storage_backend: StorageBackend,
    pub bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ImageAsset {
    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }

    pub fn to_response(&self) -> ImageAssetResponse {
        ImageAssetResponse::from(self)
    }
}

/// Fields supplied by ingestion; the repository assigns id and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImageAsset {
    pub name: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub file_type: String,
    pub storage_key: String,
    pub storage_backend: StorageBackend,
}

/// External representation of an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAssetResponse {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub file_type: String,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
    pub bookmarked: bool,
}

impl From<&ImageAsset> for ImageAssetResponse {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            size: asset.size,
            width: asset.width,
            height: asset.height,
            file_type: asset.file_type.clone(),
            storage_key: asset.storage_key.clone(),
            created_at: asset.created_at,
            bookmarked: asset.bookmarked,
        }
    }
}

impl From<ImageAsset> for ImageAssetResponse {
    fn from(asset: ImageAsset) -> Self {
        Self::from(&asset)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
    pub id: Uuid,
}
