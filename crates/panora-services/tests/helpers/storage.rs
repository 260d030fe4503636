use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use panora_core::StorageBackend;
use panora_storage::{ByteStream, Storage, StorageError, StorageResult};

/// In-memory backend whose failures can be scripted per key.
pub struct MockStorage {
    backend: StorageBackend,
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    failing_links: Mutex<HashSet<String>>,
    slow_links: Mutex<HashSet<String>>,
    fail_deletes: AtomicBool,
}

impl MockStorage {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            blobs: Mutex::new(HashMap::new()),
            failing_links: Mutex::new(HashSet::new()),
            slow_links: Mutex::new(HashSet::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn remote() -> Self {
        Self::new(StorageBackend::S3)
    }

    pub fn put(&self, key: &str, data: &[u8]) {
        self.blobs
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(key)
    }

    pub fn blob_count(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn remove(&self, key: &str) {
        self.blobs.lock().unwrap().remove(key);
    }

    pub fn fail_link_for(&self, key: &str) {
        self.failing_links.lock().unwrap().insert(key.to_string());
    }

    pub fn slow_link_for(&self, key: &str) {
        self.slow_links.lock().unwrap().insert(key.to_string());
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn signed_url(key: &str, ttl: Duration) -> String {
        format!("https://bucket.mock/{}?expires={}", key, ttl.as_secs())
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn store(&self, storage_key: &str, data: Vec<u8>, _content_type: &str) -> StorageResult<String> {
        self.blobs
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data);
        Ok(format!("mock://{}", storage_key))
    }

    async fn retrieve(&self, storage_key: &str) -> StorageResult<ByteStream> {
        let data = self.download(storage_key).await?;
        let chunks: Vec<StorageResult<Bytes>> = data
            .chunks(64)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.blobs
            .lock()
            .unwrap()
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn retrieve_link(&self, storage_key: &str, expires_in: Duration) -> StorageResult<String> {
        if self.backend == StorageBackend::Local {
            return Err(StorageError::Unsupported("signed links".to_string()));
        }
        if self.failing_links.lock().unwrap().contains(storage_key) {
            return Err(StorageError::BackendError("signing failed".to_string()));
        }
        let slow = self.slow_links.lock().unwrap().contains(storage_key);
        if slow {
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(Self::signed_url(storage_key, expires_in))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::DeleteFailed("connection reset".to_string()));
        }
        match self.blobs.lock().unwrap().remove(storage_key) {
            Some(_) => Ok(()),
            None => Err(StorageError::NotFound(storage_key.to_string())),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.contains(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}
