//! Move and delete.
//!
//! Per-node write checks drop failing candidates from a batch instead of
//! failing the whole request. Only the target and cycle checks reject.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use drivehub_auth::PermissionResolver;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::ResourceStore;
use drivehub_entity::{Delta, Resource};

use crate::context::RequestContext;
use crate::folder::walk::ancestor_ids;
use crate::folder::{FolderService, TreeCache};
use crate::quota::QuotaTracker;

/// Request to move resources under a new parent.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MoveRequest {
    /// Resources to move.
    pub resource_ids: Vec<Uuid>,
    /// Destination folder.
    pub target_parent_id: Uuid,
}

/// Applies structural mutations to the resource forest.
#[derive(Debug, Clone)]
pub struct MutationService {
    /// Resource store.
    pub(super) resources: Arc<dyn ResourceStore>,
    /// Permission resolver.
    pub(super) permissions: Arc<PermissionResolver>,
    /// Quota tracker, consulted by copy.
    pub(super) quota: Arc<QuotaTracker>,
    /// Tree snapshot cache.
    pub(super) tree_cache: Arc<TreeCache>,
    /// Ancestor walk cap for the cycle guard.
    max_depth: usize,
}

impl MutationService {
    /// Creates a new mutation service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        permissions: Arc<PermissionResolver>,
        quota: Arc<QuotaTracker>,
        tree_cache: Arc<TreeCache>,
        max_depth: usize,
    ) -> Self {
        Self {
            resources,
            permissions,
            quota,
            tree_cache,
            max_depth,
        }
    }

    /// Loads the destination folder and checks the caller may write into it.
    pub(super) async fn load_target(
        &self,
        ctx: &RequestContext,
        target_id: Uuid,
    ) -> AppResult<Resource> {
        let target = FolderService::load_folder(self.resources.as_ref(), target_id).await?;
        self.permissions.verify_write(&target, ctx.user_id).await?;
        Ok(target)
    }

    /// Moves the requested resources under `req.target_parent_id`.
    ///
    /// Rejects the whole request when the target is one of the moved
    /// resources or lies below one of them. Otherwise resources that are
    /// deleted, roots, already under the target, or not writable by the
    /// caller are skipped. Returns the moved resources as `updated`.
    pub async fn move_resources(&self, ctx: &RequestContext, req: MoveRequest) -> AppResult<Delta> {
        let target = self.load_target(ctx, req.target_parent_id).await?;

        let requested: HashSet<Uuid> = req.resource_ids.iter().copied().collect();
        if requested.contains(&target.id) {
            return Err(AppError::invalid_operation(
                "Cannot move a folder into itself",
            ));
        }
        let ancestors = ancestor_ids(self.resources.as_ref(), &target, self.max_depth).await?;
        if ancestors.iter().any(|id| requested.contains(id)) {
            return Err(AppError::invalid_operation(
                "Cannot move a folder into its own descendant",
            ));
        }

        let candidates = self.resources.find_many(&req.resource_ids).await?;
        let now = Utc::now();
        let mut moved = Vec::new();
        let mut touched_owners = vec![ctx.user_id, target.owner_id];

        for mut resource in candidates {
            if resource.is_deleted
                || resource.is_root()
                || resource.parent_id == Some(target.id)
            {
                continue;
            }
            if !self.permissions.can_write(&resource, ctx.user_id).await? {
                debug!(resource_id = %resource.id, "Move skipped: no write access");
                continue;
            }
            resource.parent_id = Some(target.id);
            resource.updated_at = now;
            self.resources.save(&resource).await?;
            touched_owners.push(resource.owner_id);
            moved.push(resource);
        }

        self.tree_cache.invalidate(touched_owners).await;

        info!(
            user_id = %ctx.user_id,
            target_id = %target.id,
            requested = req.resource_ids.len(),
            moved = moved.len(),
            "Resources moved"
        );

        Ok(Delta::updated(moved))
    }

    /// Soft-deletes one resource. Descendants keep their own flags.
    pub async fn delete_resource(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<Delta> {
        let resource = self
            .resources
            .find_by_id(resource_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Resource {resource_id} not found")))?;
        if resource.is_root() {
            return Err(AppError::invalid_operation("Cannot delete a root folder"));
        }
        self.permissions.verify_write(&resource, ctx.user_id).await?;

        self.resources
            .soft_delete_many(&[resource.id], Utc::now())
            .await?;
        self.tree_cache
            .invalidate([ctx.user_id, resource.owner_id])
            .await;

        info!(user_id = %ctx.user_id, resource_id = %resource.id, "Resource deleted");
        Ok(Delta::deleted(vec![resource.id]))
    }

    /// Soft-deletes every requested resource the caller may write.
    /// Missing, already deleted, root, and unwritable ids are dropped.
    pub async fn delete_resources_bulk(
        &self,
        ctx: &RequestContext,
        resource_ids: &[Uuid],
    ) -> AppResult<Delta> {
        let candidates = self.resources.find_many(resource_ids).await?;
        let mut ids = Vec::new();
        let mut touched_owners = vec![ctx.user_id];

        for resource in candidates {
            if resource.is_deleted || resource.is_root() {
                continue;
            }
            if !self.permissions.can_write(&resource, ctx.user_id).await? {
                continue;
            }
            touched_owners.push(resource.owner_id);
            ids.push(resource.id);
        }

        if ids.is_empty() {
            return Ok(Delta::default());
        }

        let marked = self.resources.soft_delete_many(&ids, Utc::now()).await?;
        self.tree_cache.invalidate(touched_owners).await;

        info!(
            user_id = %ctx.user_id,
            requested = resource_ids.len(),
            deleted = marked,
            "Resources deleted"
        );

        Ok(Delta::deleted(ids))
    }
}
