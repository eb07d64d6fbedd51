//! Download service.
//!
//! Files are served by presigned reference. Folders are not archived here:
//! the manifest lists every file below the folder with its path relative to
//! it, and the transport layer streams the archive.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use drivehub_auth::PermissionResolver;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_core::traits::{BlobStorage, Disposition};
use drivehub_database::ResourceStore;
use drivehub_storage::BlobStorageManager;

use crate::context::RequestContext;
use crate::folder::FolderService;

/// Presigned download reference for one file.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DownloadLink {
    /// File id.
    pub resource_id: Uuid,
    /// Presigned reference.
    pub url: String,
    /// Reference lifetime.
    pub expires_in_seconds: u64,
}

/// One file in a folder archive.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ManifestEntry {
    /// Blob key holding the bytes.
    pub storage_key: String,
    /// Path inside the archive, relative to the folder.
    pub path: String,
    /// Recorded size in bytes.
    pub size: i64,
}

/// Everything needed to assemble a folder archive.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FolderManifest {
    /// Folder id.
    pub folder_id: Uuid,
    /// Suggested archive file name.
    pub archive_name: String,
    /// Files in breadth-first order.
    pub entries: Vec<ManifestEntry>,
}

/// Produces download references.
#[derive(Debug, Clone)]
pub struct DownloadService {
    resources: Arc<dyn ResourceStore>,
    permissions: Arc<PermissionResolver>,
    storage: Arc<BlobStorageManager>,
    presign_expiry: Duration,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        permissions: Arc<PermissionResolver>,
        storage: Arc<BlobStorageManager>,
        presign_expiry: Duration,
    ) -> Self {
        Self {
            resources,
            permissions,
            storage,
            presign_expiry,
        }
    }

    /// Presigned reference for a file the caller can read.
    pub async fn download_link(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        disposition: Disposition,
    ) -> AppResult<DownloadLink> {
        let resource = self
            .resources
            .find_by_id(resource_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Resource {resource_id} not found")))?;
        self.permissions.verify_read(&resource, ctx.user_id).await?;

        if resource.is_folder() {
            return Err(AppError::invalid_operation(
                "Folders are downloaded through their manifest",
            ));
        }
        let key = resource.storage_key.as_deref().ok_or_else(|| {
            AppError::invalid_operation(format!("Resource {resource_id} has no stored content"))
        })?;

        let url = self
            .storage
            .presign_download(key, disposition, self.presign_expiry)
            .await?;
        debug!(
            user_id = %ctx.user_id,
            resource_id = %resource.id,
            disposition = disposition.as_str(),
            "Download link issued"
        );

        Ok(DownloadLink {
            resource_id: resource.id,
            url,
            expires_in_seconds: self.presign_expiry.as_secs(),
        })
    }

    /// Lists every non-deleted file below a folder the caller can read.
    pub async fn folder_manifest(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<FolderManifest> {
        let folder = FolderService::load_folder(self.resources.as_ref(), folder_id).await?;
        self.permissions.verify_read(&folder, ctx.user_id).await?;

        let mut entries = Vec::new();
        let mut prefixes: HashMap<Uuid, String> = HashMap::from([(folder.id, String::new())]);
        let mut queue = VecDeque::from([folder.id]);

        while let Some(current) = queue.pop_front() {
            let prefix = prefixes.get(&current).cloned().unwrap_or_default();
            for child in self.resources.find_children(current, false).await? {
                let path = format!("{prefix}{}", child.name);
                if child.is_folder() {
                    if prefixes.insert(child.id, format!("{path}/")).is_none() {
                        queue.push_back(child.id);
                    }
                } else if let Some(storage_key) = child.storage_key {
                    entries.push(ManifestEntry {
                        storage_key,
                        path,
                        size: child.size,
                    });
                }
            }
        }

        if entries.is_empty() {
            return Err(AppError::not_found("Folder is empty"));
        }

        Ok(FolderManifest {
            folder_id: folder.id,
            archive_name: format!("{}.zip", folder.name),
            entries,
        })
    }
}
