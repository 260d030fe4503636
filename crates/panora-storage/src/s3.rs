use crate::traits::{ByteStream, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use std::time::Duration;

const MISSING_BUCKET: &str = "Bucket name not configured";

/// S3 storage implementation
///
/// Built without a bucket the backend stays up in a degraded state: every
/// read or write fails with `ConfigError` and deletes are skipped.
#[derive(Clone, Debug)]
pub struct S3Storage {
    store: Option<AmazonS3>,
    bucket: Option<String>,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name; `None` yields a degraded backend
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(
        bucket: Option<String>,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let Some(bucket_name) = bucket.clone() else {
            tracing::error!(
                region = %region,
                "S3 bucket is not configured; uploads and downloads will fail until S3_BUCKET is set"
            );
            return Ok(S3Storage {
                store: None,
                bucket: None,
                region,
                endpoint_url,
            });
        };

        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket_name);

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store: Some(store),
            bucket,
            region,
            endpoint_url,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    fn client(&self) -> StorageResult<&AmazonS3> {
        self.store
            .as_ref()
            .ok_or_else(|| StorageError::ConfigError(MISSING_BUCKET.to_string()))
    }

    fn bucket_name(&self) -> &str {
        self.bucket.as_deref().unwrap_or("")
    }

    /// Public URL of an object, used as the location returned by `store`.
    ///
    /// For AWS S3: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, path-style under the endpoint URL
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket_name(), key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket_name(),
                self.region,
                key
            )
        }
    }

    fn map_read_error(&self, storage_key: &str, err: ObjectStoreError) -> StorageError {
        match err {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        }
    }
}

/// Object attributes for an upload; the content type is served back on
/// presigned GETs.
fn put_options(content_type: &str) -> PutOptions {
    let mut attributes = Attributes::new();
    if !content_type.is_empty() {
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
    }
    PutOptions {
        attributes,
        ..Default::default()
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn store(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let store = self.client()?;
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store
            .put_opts(&location, PutPayload::from(bytes), put_options(content_type))
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket_name(),
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket_name(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(storage_key))
    }

    async fn retrieve(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let store = self.client()?;
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = store.get(&location).await;
        let result = result.map_err(|e| self.map_read_error(storage_key, e))?;

        let bucket = self.bucket_name().to_string();
        let key = storage_key.to_string();

        let stream = result.into_stream().map(move |res| match res {
            Ok(bytes) => Ok(bytes),
            Err(e) => {
                tracing::error!(
                    bucket = %bucket,
                    key = %key,
                    error = %e,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 stream download error"
                );
                Err(StorageError::DownloadFailed(e.to_string()))
            }
        });

        Ok(Box::pin(stream))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let store = self.client()?;
        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = store.get(&location).await;
        let result = result.map_err(|e| {
            let err = self.map_read_error(storage_key, e);
            if !matches!(err, StorageError::NotFound(_)) {
                tracing::error!(
                    error = %err,
                    bucket = %self.bucket_name(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
            }
            err
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket_name(),
            key = %storage_key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn retrieve_link(
        &self,
        storage_key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        let store = self.client()?;
        let location = Path::from(storage_key.to_string());
        let url_result: ObjectResult<_> = store.signed_url(Method::GET, &location, expires_in).await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let Some(store) = self.store.as_ref() else {
            tracing::warn!(
                key = %storage_key,
                "S3 bucket is not configured; skipping blob delete"
            );
            return Ok(());
        };

        let start = std::time::Instant::now();
        let location = Path::from(storage_key.to_string());

        let result: ObjectResult<_> = store.delete(&location).await;

        result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket_name(),
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(other.to_string())
            }
        })?;

        tracing::info!(
            bucket = %self.bucket_name(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let store = self.client()?;
        let location = Path::from(storage_key.to_string());
        match store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(all(test, feature = "storage-s3"))]
mod tests {
    use super::*;

    fn unconfigured() -> S3Storage {
        S3Storage::new(None, "ap-southeast-1".to_string(), None).unwrap()
    }

    #[tokio::test]
    async fn test_missing_bucket_fails_reads_and_writes() {
        let storage = unconfigured();
        assert!(!storage.is_configured());

        let result = storage
            .store("images/a-banner.png", b"data".to_vec(), "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::ConfigError(ref m)) if m == MISSING_BUCKET));

        assert!(matches!(
            storage.download("images/a-banner.png").await,
            Err(StorageError::ConfigError(_))
        ));
        assert!(matches!(
            storage
                .retrieve_link("images/a-banner.png", Duration::from_secs(60))
                .await,
            Err(StorageError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_bucket_delete_is_noop() {
        let storage = unconfigured();
        assert!(storage.delete("images/a-banner.png").await.is_ok());
    }

    #[test]
    fn test_put_options_carry_content_type() {
        let options = put_options("image/jpeg");
        let content_type: &str = options
            .attributes
            .get(&Attribute::ContentType)
            .map(AsRef::<str>::as_ref)
            .unwrap();
        assert_eq!(content_type, "image/jpeg");

        assert!(put_options("").attributes.get(&Attribute::ContentType).is_none());
    }

    #[test]
    fn test_generate_url() {
        let storage = S3Storage::new(
            Some("gallery".to_string()),
            "eu-west-1".to_string(),
            Some("http://localhost:9000/".to_string()),
        )
        .unwrap();
        assert_eq!(
            storage.generate_url("images/a.png"),
            "http://localhost:9000/gallery/images/a.png"
        );
        assert_eq!(storage.backend_type(), StorageBackend::S3);
        assert_eq!(
            storage.key_for(uuid::Uuid::nil(), "a b.png"),
            "images/00000000-0000-0000-0000-000000000000-a_b.png"
        );
    }
}
