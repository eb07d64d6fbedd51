//! Folder creation and listing with access enforcement.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use drivehub_auth::PermissionResolver;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::ResourceStore;
use drivehub_entity::Resource;

use super::cache::TreeCache;
use crate::context::RequestContext;
use crate::validation::validate_name;

/// Request to create a new folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name.
    pub name: String,
    /// Parent folder ID.
    pub parent_id: Uuid,
}

/// Manages folder creation and listing.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
    /// Permission resolver.
    permissions: Arc<PermissionResolver>,
    /// Tree snapshot cache.
    tree_cache: Arc<TreeCache>,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        permissions: Arc<PermissionResolver>,
        tree_cache: Arc<TreeCache>,
    ) -> Self {
        Self {
            resources,
            permissions,
            tree_cache,
        }
    }

    /// Loads a non-deleted folder or fails with NotFound / InvalidOperation.
    pub(crate) async fn load_folder(
        resources: &dyn ResourceStore,
        folder_id: Uuid,
    ) -> AppResult<Resource> {
        let folder = resources
            .find_by_id(folder_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        if !folder.is_folder() {
            return Err(AppError::invalid_operation(format!(
                "Resource {folder_id} is not a folder"
            )));
        }
        Ok(folder)
    }

    /// Creates a new folder under `req.parent_id`.
    pub async fn create_folder(
        &self,
        ctx: &RequestContext,
        req: CreateFolderRequest,
    ) -> AppResult<Resource> {
        validate_name(&req.name)?;

        let parent = Self::load_folder(self.resources.as_ref(), req.parent_id).await?;
        self.permissions.verify_write(&parent, ctx.user_id).await?;

        let folder = Resource::new_folder(req.name.trim(), Some(parent.id), ctx.user_id);
        self.resources.insert(&folder).await?;

        self.tree_cache
            .invalidate([ctx.user_id, parent.owner_id])
            .await;

        info!(
            user_id = %ctx.user_id,
            folder_id = %folder.id,
            parent_id = %parent.id,
            name = %folder.name,
            "Folder created"
        );

        Ok(folder)
    }

    /// Lists the non-deleted children of a folder the caller can read.
    pub async fn get_folder_contents(
        &self,
        ctx: &RequestContext,
        folder_id: Uuid,
    ) -> AppResult<Vec<Resource>> {
        let folder = Self::load_folder(self.resources.as_ref(), folder_id).await?;
        self.permissions.verify_read(&folder, ctx.user_id).await?;
        self.resources.find_children(folder.id, false).await
    }
}
