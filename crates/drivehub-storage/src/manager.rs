//! Blob storage manager that dispatches to the configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use drivehub_core::config::storage::StorageConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::storage::{BlobMeta, BlobStorage, Disposition};

/// Central handle to the configured blob backend.
#[derive(Debug, Clone)]
pub struct BlobStorageManager {
    /// The inner provider.
    inner: Arc<dyn BlobStorage>,
}

impl BlobStorageManager {
    /// Create a new manager from configuration.
    pub async fn new(config: &StorageConfig) -> AppResult<Self> {
        let inner: Arc<dyn BlobStorage> = match config.provider.as_str() {
            "local" => {
                info!(root = %config.local.root_path, "Initializing local blob storage");
                Arc::new(
                    crate::providers::LocalBlobStorage::new(
                        &config.local.root_path,
                        &config.local.public_base_url,
                    )
                    .await?,
                )
            }
            "memory" => {
                info!("Initializing in-memory blob storage");
                Arc::new(crate::providers::MemoryBlobStorage::new())
            }
            #[cfg(feature = "s3")]
            "s3" => Arc::new(crate::providers::S3BlobStorage::new(&config.s3).await?),
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local, memory, s3"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Create a manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn BlobStorage>) -> Self {
        Self { inner: provider }
    }
}

#[async_trait]
impl BlobStorage for BlobStorageManager {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        self.inner.presign_upload(key, content_type, expires_in).await
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: Disposition,
        expires_in: Duration,
    ) -> AppResult<String> {
        self.inner.presign_download(key, disposition, expires_in).await
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn head(&self, key: &str) -> AppResult<Option<BlobMeta>> {
        self.inner.head(key).await
    }

    async fn list_all(&self) -> AppResult<Vec<BlobMeta>> {
        self.inner.list_all().await
    }
}
