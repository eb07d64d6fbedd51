//! In-process blob storage.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::storage::{BlobMeta, BlobStorage, Disposition};

use super::{file_name_of, validate_key};

#[derive(Debug, Clone)]
struct StoredBlob {
    data: Bytes,
    last_modified: DateTime<Utc>,
}

/// Blob storage held in a concurrent map. References use the `memory://`
/// scheme and are only meaningful inside the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStorage {
    blobs: Arc<DashMap<String, StoredBlob>>,
}

impl MemoryBlobStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the modification time of a stored blob.
    pub fn set_last_modified(&self, key: &str, at: DateTime<Utc>) {
        if let Some(mut blob) = self.blobs.get_mut(key) {
            blob.last_modified = at;
        }
    }

    /// Check whether a blob exists.
    pub fn contains(&self, key: &str) -> bool {
        self.blobs.contains_key(key)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Check whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        Ok(format!(
            "memory://{key}?op=upload&content_type={content_type}&ttl={}",
            expires_in.as_secs()
        ))
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: Disposition,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        Ok(format!(
            "memory://{key}?op=download&disposition={}&filename={}&ttl={}",
            disposition.as_str(),
            file_name_of(key),
            expires_in.as_secs()
        ))
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        validate_key(key)?;
        self.blobs.insert(
            key.to_string(),
            StoredBlob {
                data,
                last_modified: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.blobs
            .get(key)
            .map(|b| b.data.clone())
            .ok_or_else(|| AppError::not_found(format!("Blob not found: {key}")))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.blobs.remove(key);
        Ok(())
    }

    async fn head(&self, key: &str) -> AppResult<Option<BlobMeta>> {
        Ok(self.blobs.get(key).map(|b| BlobMeta {
            key: key.to_string(),
            size_bytes: b.data.len() as u64,
            last_modified: b.last_modified,
        }))
    }

    async fn list_all(&self) -> AppResult<Vec<BlobMeta>> {
        let mut out: Vec<BlobMeta> = self
            .blobs
            .iter()
            .map(|entry| BlobMeta {
                key: entry.key().clone(),
                size_bytes: entry.value().data.len() as u64,
                last_modified: entry.value().last_modified,
            })
            .collect();
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}
