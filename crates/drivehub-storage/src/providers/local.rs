//! Local filesystem blob storage.
//!
//! Upload and download references point at `public_base_url`, where the
//! transport layer is expected to serve and accept bytes for the key.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::fs;
use tracing::debug;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::storage::{BlobMeta, BlobStorage, Disposition};

use super::{file_name_of, validate_key};

/// Local filesystem blob storage.
#[derive(Debug, Clone)]
pub struct LocalBlobStorage {
    /// Root directory for all stored blobs.
    root: PathBuf,
    /// Base URL for issued references.
    public_base_url: String,
}

impl LocalBlobStorage {
    /// Create a new local provider rooted at the given path.
    pub async fn new(root_path: &str, public_base_url: &str) -> AppResult<Self> {
        let root = PathBuf::from(root_path);
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a key to an absolute path within the root.
    fn resolve(&self, key: &str) -> AppResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    fn reference(&self, key: &str, query: &str, expires_in: Duration) -> String {
        let expires = Utc::now()
            .timestamp()
            .saturating_add(i64::try_from(expires_in.as_secs()).unwrap_or(i64::MAX));
        format!("{}/{key}?{query}&expires={expires}", self.public_base_url)
    }

    fn meta_of(key: String, meta: &std::fs::Metadata) -> BlobMeta {
        let last_modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        BlobMeta {
            key,
            size_bytes: meta.len(),
            last_modified,
        }
    }
}

#[async_trait]
impl BlobStorage for LocalBlobStorage {
    fn provider_type(&self) -> &str {
        "local"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.root.is_dir())
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        Ok(self.reference(
            key,
            &format!("op=upload&content_type={content_type}"),
            expires_in,
        ))
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: Disposition,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        Ok(self.reference(
            key,
            &format!(
                "op=download&disposition={}&filename={}",
                disposition.as_str(),
                file_name_of(key)
            ),
            expires_in,
        ))
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let path = self.resolve(key)?;
        self.ensure_parent(&path).await?;
        fs::write(&path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to write blob: {key}"),
                e,
            )
        })?;
        debug!(key, bytes = data.len(), "Wrote blob");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let path = self.resolve(key)?;
        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Blob not found: {key}"))
            } else {
                AppError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    format!("Failed to read blob: {key}"),
                    e,
                )
            }
        })?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to delete blob: {key}"),
                e,
            )),
        }
    }

    async fn head(&self, key: &str) -> AppResult<Option<BlobMeta>> {
        let path = self.resolve(key)?;
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(Self::meta_of(key.to_string(), &meta))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::with_source(
                ErrorKind::UpstreamUnavailable,
                format!("Failed to stat blob: {key}"),
                e,
            )),
        }
    }

    async fn list_all(&self) -> AppResult<Vec<BlobMeta>> {
        let mut out = Vec::new();
        let mut pending = vec![self.root.clone()];

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let meta = entry.metadata().await?;
                let path = entry.path();
                if meta.is_dir() {
                    pending.push(path);
                    continue;
                }
                let Ok(relative) = path.strip_prefix(&self.root) else {
                    continue;
                };
                let key = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                out.push(Self::meta_of(key, &meta));
            }
        }

        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }
}
