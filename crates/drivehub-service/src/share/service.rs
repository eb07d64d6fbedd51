//! Share service: grants read or editor access on a resource to another user.
//!
//! Grants live on the resource itself. Descendants inherit them through the
//! ancestor walk in the permission resolver, so nothing is copied downward.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use drivehub_auth::PermissionResolver;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::{ResourceStore, UserStore};
use drivehub_entity::{AccessLevel, Grant, Resource};

use crate::context::RequestContext;
use crate::folder::TreeCache;

/// Request to share a resource with a user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShareRequest {
    /// Resource to share.
    pub resource_id: Uuid,
    /// Username of the grantee.
    pub username: String,
    /// Level to grant; read when omitted.
    #[serde(default)]
    pub access_level: Option<AccessLevel>,
}

/// What a share request changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareOutcome {
    /// A new grant was appended.
    Shared,
    /// An existing grant had its level replaced.
    Updated,
    /// The grantee already held this level.
    AlreadyShared,
}

/// Manages share grants.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
    /// User store.
    users: Arc<dyn UserStore>,
    /// Permission resolver.
    permissions: Arc<PermissionResolver>,
    /// Tree snapshot cache.
    tree_cache: Arc<TreeCache>,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        users: Arc<dyn UserStore>,
        permissions: Arc<PermissionResolver>,
        tree_cache: Arc<TreeCache>,
    ) -> Self {
        Self {
            resources,
            users,
            permissions,
            tree_cache,
        }
    }

    async fn load_owned(&self, ctx: &RequestContext, resource_id: Uuid) -> AppResult<Resource> {
        let resource = self
            .resources
            .find_by_id(resource_id)
            .await?
            .filter(|r| !r.is_deleted)
            .ok_or_else(|| AppError::not_found(format!("Resource {resource_id} not found")))?;
        self.permissions.verify_owner(&resource, ctx.user_id)?;
        Ok(resource)
    }

    /// Grants `req.username` access to a resource the caller owns.
    pub async fn share_resource(
        &self,
        ctx: &RequestContext,
        req: ShareRequest,
    ) -> AppResult<ShareOutcome> {
        let mut resource = self.load_owned(ctx, req.resource_id).await?;

        let target = self
            .users
            .find_by_username(req.username.trim())
            .await?
            .ok_or_else(|| AppError::not_found(format!("User '{}' not found", req.username)))?;
        if target.id == ctx.user_id {
            return Err(AppError::invalid_operation(
                "Cannot share a resource with yourself",
            ));
        }

        let level = req.access_level.unwrap_or_default();
        let outcome = match resource
            .shared_with
            .iter_mut()
            .find(|g| g.user_id == target.id)
        {
            Some(grant) if grant.access_level == level => ShareOutcome::AlreadyShared,
            Some(grant) => {
                grant.access_level = level;
                ShareOutcome::Updated
            }
            None => {
                resource
                    .shared_with
                    .push(Grant::new(target.id, target.username.clone(), level));
                ShareOutcome::Shared
            }
        };

        if outcome != ShareOutcome::AlreadyShared {
            resource.updated_at = Utc::now();
            self.resources.save(&resource).await?;
            self.tree_cache
                .invalidate([resource.owner_id, target.id])
                .await;
        }

        info!(
            resource_id = %resource.id,
            grantee = %target.id,
            access_level = %level.as_str(),
            outcome = ?outcome,
            "Resource shared"
        );

        Ok(outcome)
    }

    /// Removes the grant for `username`. Returns whether one was removed.
    pub async fn unshare_resource(
        &self,
        ctx: &RequestContext,
        resource_id: Uuid,
        username: &str,
    ) -> AppResult<bool> {
        let mut resource = self.load_owned(ctx, resource_id).await?;

        let before = resource.shared_with.len();
        let mut removed_for = None;
        resource.shared_with.retain(|g| {
            if g.username == username {
                removed_for = Some(g.user_id);
                false
            } else {
                true
            }
        });
        if resource.shared_with.len() == before {
            return Ok(false);
        }

        resource.updated_at = Utc::now();
        self.resources.save(&resource).await?;
        self.tree_cache
            .invalidate(std::iter::once(resource.owner_id).chain(removed_for))
            .await;

        info!(resource_id = %resource.id, username = %username, "Resource unshared");
        Ok(true)
    }

    /// Every non-deleted resource carrying a grant for the caller.
    pub async fn get_shared_resources(&self, ctx: &RequestContext) -> AppResult<Vec<Resource>> {
        let mut shared = self.resources.find_shared_with(ctx.user_id).await?;
        shared.retain(|r| !r.is_deleted);
        Ok(shared)
    }
}
