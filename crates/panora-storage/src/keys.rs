//! Shared key generation for storage backends.
//!
//! Key format: `uploads/images/{uuid}-{filename}` on the local filesystem,
//! `images/{uuid}-{filename}` in the object store.

use panora_core::constants::{LOCAL_KEY_PREFIX, REMOTE_KEY_PREFIX};
use panora_core::StorageBackend;
use uuid::Uuid;

const MAX_FILENAME_LENGTH: usize = 255;

/// Generate a storage key for `filename` in the namespace of `backend`.
///
/// The uuid keeps keys unique even when two uploads share a filename.
pub fn generate_storage_key(backend: StorageBackend, file_id: Uuid, filename: &str) -> String {
    let prefix = match backend {
        StorageBackend::Local => LOCAL_KEY_PREFIX,
        StorageBackend::S3 => REMOTE_KEY_PREFIX,
    };
    format!("{}/{}-{}", prefix, file_id, sanitize_filename(filename))
}

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Directory components are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_` and `..` runs are collapsed. Names shorter than three characters become `file`.
pub fn sanitize_filename(filename: &str) -> String {
    let filename_only = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    let mut sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    while sanitized.contains("..") {
        sanitized = sanitized.replace("..", ".");
    }

    if sanitized.trim_matches(|c: char| c == '.' || c == '_').is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_use_backend_namespace() {
        let id = Uuid::nil();
        assert_eq!(
            generate_storage_key(StorageBackend::Local, id, "banner.jpg"),
            "uploads/images/00000000-0000-0000-0000-000000000000-banner.jpg"
        );
        assert_eq!(
            generate_storage_key(StorageBackend::S3, id, "banner.jpg"),
            "images/00000000-0000-0000-0000-000000000000-banner.jpg"
        );
    }

    #[test]
    fn test_keys_infer_back_to_their_backend() {
        let id = Uuid::new_v4();
        for backend in [StorageBackend::Local, StorageBackend::S3] {
            let key = generate_storage_key(backend, id, "photo.png");
            assert_eq!(StorageBackend::infer_from_key(&key), backend);
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("image.png"), "image.png");
        assert_eq!(sanitize_filename("my-file_1.jpg"), "my-file_1.jpg");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\wide shot.jpg"), "wide_shot.jpg");
        assert_eq!(sanitize_filename("a..b.png"), "a.b.png");
        assert_eq!(sanitize_filename(".."), "file");
        assert_eq!(sanitize_filename("x"), "file");
        assert_eq!(sanitize_filename("été.png"), "_t_.png");
    }
}
