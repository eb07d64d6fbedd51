//! Recursive copy.
//!
//! The whole plan is computed before any write so the quota check can
//! reject the request with nothing persisted. Clones share storage keys
//! with their sources; blob bytes are never duplicated.

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::{Delta, Resource};

use super::mutation::MutationService;
use crate::context::RequestContext;
use crate::folder::walk::collect_subtree;

/// Request to copy resources under a folder.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CopyRequest {
    /// Resources to copy.
    pub resource_ids: Vec<Uuid>,
    /// Destination folder.
    pub target_parent_id: Uuid,
}

impl MutationService {
    /// Copies readable sources and their non-deleted descendants under the
    /// target. Copies are owned by the caller. Returns them as `added`.
    pub async fn copy_resources(&self, ctx: &RequestContext, req: CopyRequest) -> AppResult<Delta> {
        let target = self.load_target(ctx, req.target_parent_id).await?;

        let mut sources = Vec::new();
        for resource in self.resources.find_many(&req.resource_ids).await? {
            if resource.is_deleted {
                continue;
            }
            if self.permissions.can_read(&resource, ctx.user_id).await? {
                sources.push(resource);
            }
        }
        if sources.is_empty() {
            return Ok(Delta::default());
        }

        let source_ids: Vec<Uuid> = sources.iter().map(|r| r.id).collect();
        let plan = collect_subtree(self.resources.as_ref(), sources, false).await?;
        let total = plan_bytes(&plan);

        self.quota.ensure_capacity(ctx.user_id, total).await?;

        let copies = clone_plan(&plan, &source_ids, target.id, ctx.user_id)?;
        self.resources.insert_many(&copies).await?;
        self.quota.record_usage(ctx.user_id, total).await?;
        self.tree_cache.invalidate([ctx.user_id, target.owner_id]).await;

        info!(
            user_id = %ctx.user_id,
            target_id = %target.id,
            sources = source_ids.len(),
            copied = copies.len(),
            bytes = total,
            "Resources copied"
        );

        Ok(Delta::added(copies))
    }
}

/// Summed size of the FILE nodes in a plan, saturating at `i64::MAX`.
fn plan_bytes(plan: &[Resource]) -> i64 {
    plan.iter()
        .filter(|r| r.is_file())
        .map(|r| r.size)
        .fold(0i64, i64::saturating_add)
}

/// Clones a breadth-first plan. Sources go under `target_id`; every other
/// node goes under the clone of its original parent, which the ordering
/// guarantees was produced first.
fn clone_plan(
    plan: &[Resource],
    source_ids: &[Uuid],
    target_id: Uuid,
    owner_id: Uuid,
) -> AppResult<Vec<Resource>> {
    let mut new_ids: HashMap<Uuid, Uuid> = HashMap::with_capacity(plan.len());
    let mut copies = Vec::with_capacity(plan.len());

    for original in plan {
        let parent_id = if source_ids.contains(&original.id) {
            target_id
        } else {
            original
                .parent_id
                .and_then(|p| new_ids.get(&p).copied())
                .ok_or_else(|| {
                    AppError::internal(format!(
                        "Copy plan visited {} before its parent",
                        original.id
                    ))
                })?
        };
        let copy = original.duplicate(parent_id, owner_id);
        new_ids.insert(original.id, copy.id);
        copies.push(copy);
    }

    Ok(copies)
}
