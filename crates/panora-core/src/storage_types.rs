use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Exactly one backend is active per process, but every persisted asset
/// records the backend that wrote it so reads never guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(
    feature = "sqlx",
    sqlx(type_name = "storage_backend", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    S3,
    Local,
}

impl StorageBackend {
    /// Infer the backend from the shape of a storage key.
    ///
    /// Only used for rows written before the backend tag was persisted:
    /// local keys always start with `uploads/`.
    pub fn infer_from_key(storage_key: &str) -> Self {
        if storage_key.starts_with("uploads/") {
            StorageBackend::Local
        } else {
            StorageBackend::S3
        }
    }
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "local" => Ok(StorageBackend::Local),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::S3 => write!(f, "s3"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_from_key() {
        assert_eq!(
            StorageBackend::infer_from_key("uploads/images/abc-photo.png"),
            StorageBackend::Local
        );
        assert_eq!(
            StorageBackend::infer_from_key("images/abc-photo.png"),
            StorageBackend::S3
        );
        assert_eq!(StorageBackend::infer_from_key(""), StorageBackend::S3);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("S3".parse::<StorageBackend>().unwrap(), StorageBackend::S3);
        assert_eq!(
            " local ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert!("nfs".parse::<StorageBackend>().is_err());
        assert_eq!(StorageBackend::Local.to_string(), "local");
    }
}
