//! Upload service: initiation, confirmation, and content replacement.
//!
//! Bytes never pass through initiation: the client receives a presigned
//! reference, uploads directly to blob storage, then confirms. The FILE
//! resource exists only after confirmation.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use drivehub_auth::PermissionResolver;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::BlobStorage;
use drivehub_database::ResourceStore;
use drivehub_entity::{Delta, Resource};
use drivehub_storage::BlobStorageManager;

use super::paths::{BulkPathResolver, BulkResolution, PlannedUpload, UploadFile, rewrite_key_for};
use crate::context::RequestContext;
use crate::folder::{FolderService, TreeCache};
use crate::quota::QuotaTracker;
use crate::validation::{folder_segments, validate_name};

/// Request to start a single upload.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InitUploadRequest {
    /// Destination folder.
    pub parent_id: Uuid,
    /// The file.
    #[serde(flatten)]
    pub file: UploadFile,
}

/// Result of a single upload initiation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InitUploadResponse {
    /// Where to upload.
    pub upload: PlannedUpload,
    /// Folders created for the relative path.
    pub delta: Delta,
}

/// Request to start many uploads under one destination.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InitUploadBulkRequest {
    /// Destination folder.
    pub parent_id: Uuid,
    /// Files to upload.
    pub files: Vec<UploadFile>,
}

/// Request to register an uploaded object as a FILE resource.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ConfirmUploadRequest {
    /// Id reserved at initiation.
    pub resource_id: Uuid,
    /// Folder the file goes in.
    pub parent_id: Uuid,
    /// File name.
    pub name: String,
    /// Declared size in bytes.
    pub size: i64,
    /// Blob key the object was uploaded to.
    pub storage_key: String,
}

/// Coordinates uploads between the resource store and blob storage.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
    /// Permission resolver.
    permissions: Arc<PermissionResolver>,
    /// Quota tracker.
    quota: Arc<QuotaTracker>,
    /// Tree snapshot cache.
    tree_cache: Arc<TreeCache>,
    /// Blob storage.
    storage: Arc<BlobStorageManager>,
    /// Folder path resolver.
    resolver: BulkPathResolver,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        permissions: Arc<PermissionResolver>,
        quota: Arc<QuotaTracker>,
        tree_cache: Arc<TreeCache>,
        storage: Arc<BlobStorageManager>,
        resolver: BulkPathResolver,
    ) -> Self {
        Self {
            resources,
            permissions,
            quota,
            tree_cache,
            storage,
            resolver,
        }
    }

    /// Starts a single upload.
    pub async fn init_upload(
        &self,
        ctx: &RequestContext,
        req: InitUploadRequest,
    ) -> AppResult<InitUploadResponse> {
        let mut resolution = self
            .init_upload_bulk(
                ctx,
                InitUploadBulkRequest {
                    parent_id: req.parent_id,
                    files: vec![req.file],
                },
            )
            .await?;
        let upload = resolution
            .uploads
            .pop()
            .ok_or_else(|| AppError::internal("Upload plan is empty"))?;
        Ok(InitUploadResponse {
            upload,
            delta: resolution.delta,
        })
    }

    /// Starts uploads for every file in the batch.
    pub async fn init_upload_bulk(
        &self,
        ctx: &RequestContext,
        req: InitUploadBulkRequest,
    ) -> AppResult<BulkResolution> {
        if req.files.is_empty() {
            return Err(AppError::invalid_operation("No files to upload"));
        }
        let mut total: i64 = 0;
        for file in &req.files {
            validate_name(&file.file_name)?;
            if let Some(path) = &file.relative_path {
                folder_segments(path)?;
            }
            if file.size < 0 {
                return Err(AppError::invalid_operation(format!(
                    "Size of '{}' cannot be negative",
                    file.file_name
                )));
            }
            total = total.saturating_add(file.size);
        }

        self.quota.ensure_capacity(ctx.user_id, total).await?;

        let parent = FolderService::load_folder(self.resources.as_ref(), req.parent_id).await?;
        self.permissions.verify_write(&parent, ctx.user_id).await?;

        let resolution = self
            .resolver
            .resolve(ctx.user_id, parent.id, &req.files)
            .await?;

        if !resolution.delta.added.is_empty() {
            self.tree_cache.invalidate([ctx.user_id, parent.owner_id]).await;
        }

        info!(
            user_id = %ctx.user_id,
            parent_id = %parent.id,
            files = resolution.uploads.len(),
            folders_created = resolution.delta.added.len(),
            bytes = total,
            "Upload initiated"
        );

        Ok(resolution)
    }

    /// Registers an uploaded object as a FILE resource.
    pub async fn confirm_upload(
        &self,
        ctx: &RequestContext,
        req: ConfirmUploadRequest,
    ) -> AppResult<Resource> {
        validate_name(&req.name)?;
        let parent = FolderService::load_folder(self.resources.as_ref(), req.parent_id).await?;
        self.permissions.verify_write(&parent, ctx.user_id).await?;

        if !req.storage_key.starts_with(&ctx.storage_prefix()) {
            return Err(AppError::invalid_operation(
                "Storage key does not belong to the caller",
            ));
        }

        let meta = match self.storage.head(&req.storage_key).await {
            Ok(Some(meta)) => meta,
            Ok(None) => {
                return Err(AppError::invalid_operation(
                    "File verification failed: object not found",
                ));
            }
            Err(e) if e.is(ErrorKind::UpstreamUnavailable) => return Err(e),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::UpstreamUnavailable,
                    "File verification failed",
                    e,
                ));
            }
        };
        if i64::try_from(meta.size_bytes).ok() != Some(req.size) {
            warn!(
                storage_key = %req.storage_key,
                declared = req.size,
                stored = meta.size_bytes,
                "Uploaded size differs from declared size"
            );
        }

        let file = Resource::new_file(
            req.resource_id,
            req.name.trim(),
            parent.id,
            ctx.user_id,
            req.size,
            req.storage_key,
        );
        self.resources.insert(&file).await?;
        self.quota.record_usage(ctx.user_id, file.size).await?;
        self.tree_cache.invalidate([ctx.user_id, parent.owner_id]).await;

        info!(
            user_id = %ctx.user_id,
            resource_id = %file.id,
            parent_id = %parent.id,
            size = file.size,
            "Upload confirmed"
        );

        Ok(file)
    }

    /// Replaces the bytes of an existing file. The blob is overwritten in
    /// place unless another resource shares its key, in which case the
    /// bytes go to a new key recorded on this resource.
    pub async fn update_resource_content(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        data: Bytes,
    ) -> AppResult<Resource> {
        let mut resource = self
            .resources
            .find_by_id(resource_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Resource {resource_id} not found")))?;
        let key = match (&resource.storage_key, resource.is_file()) {
            (Some(key), true) => key.clone(),
            _ => {
                return Err(AppError::invalid_operation(format!(
                    "Resource {resource_id} is not a file with stored content"
                )));
            }
        };
        self.permissions.verify_write(&resource, ctx.user_id).await?;

        // Copies share keys; a shared blob is never written in place.
        let target_key = if self.resources.is_key_shared(&key, resource.id).await? {
            let fresh = rewrite_key_for(resource.owner_id, resource.id, &resource.name, &key);
            debug!(
                resource_id = %resource.id,
                old_key = %key,
                new_key = %fresh,
                "Storage key shared, writing content to a new key"
            );
            fresh
        } else {
            key
        };

        let new_size = i64::try_from(data.len()).unwrap_or(i64::MAX);
        self.storage.put(&target_key, data).await?;

        let diff = new_size - resource.size;
        resource.size = new_size;
        resource.storage_key = Some(target_key);
        resource.updated_at = Utc::now();
        self.resources.save(&resource).await?;
        self.quota.adjust(resource.owner_id, diff).await?;
        self.tree_cache
            .invalidate([ctx.user_id, resource.owner_id])
            .await;

        info!(
            user_id = %ctx.user_id,
            resource_id = %resource.id,
            size = new_size,
            "File content updated"
        );

        Ok(resource)
    }
}
