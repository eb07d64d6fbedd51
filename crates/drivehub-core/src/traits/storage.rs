//! Blob storage trait for the backend holding file bytes.
//!
//! File bytes are addressed only by opaque keys. The resource store keeps
//! the key on each FILE resource; everything else about the bytes lives
//! behind this trait.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::result::AppResult;

/// Metadata about a stored object.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BlobMeta {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modified timestamp.
    pub last_modified: DateTime<Utc>,
}

/// How a download reference asks the client to present the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Save as a file.
    #[default]
    Attachment,
    /// Render in the browser.
    Inline,
}

impl Disposition {
    /// Header value for `Content-Disposition`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

/// Trait for blob storage backends.
///
/// Implementations exist for the local filesystem, an in-process map,
/// and S3. The trait is defined here in `drivehub-core` and implemented in
/// `drivehub-storage`.
#[async_trait]
pub trait BlobStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "s3").
    fn provider_type(&self) -> &str;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Issue a reference the client can use to upload bytes for `key`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String>;

    /// Issue a reference the client can use to download the bytes at `key`.
    async fn presign_download(
        &self,
        key: &str,
        disposition: Disposition,
        expires_in: Duration,
    ) -> AppResult<String>;

    /// Write bytes directly under `key`, replacing any existing object.
    async fn put(&self, key: &str, data: Bytes) -> AppResult<()>;

    /// Read the bytes stored under `key`.
    async fn get(&self, key: &str) -> AppResult<Bytes>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Fetch object metadata, or `None` if no object exists at `key`.
    async fn head(&self, key: &str) -> AppResult<Option<BlobMeta>>;

    /// List every stored object. Implementations page through the backend
    /// internally.
    async fn list_all(&self) -> AppResult<Vec<BlobMeta>>;
}
