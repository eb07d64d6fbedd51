//! Tree assembly: a user's whole tree as a flat, cache-backed snapshot.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use drivehub_core::result::AppResult;
use drivehub_database::ResourceStore;
use drivehub_entity::{TreeNode, TreeSnapshot};

use super::cache::TreeCache;
use super::walk::collect_subtree;
use crate::context::RequestContext;

/// Builds flattened tree snapshots rooted at a user's root folder.
#[derive(Debug, Clone)]
pub struct TreeService {
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
    /// Snapshot cache.
    tree_cache: Arc<TreeCache>,
}

impl TreeService {
    /// Creates a new tree service.
    pub fn new(resources: Arc<dyn ResourceStore>, tree_cache: Arc<TreeCache>) -> Self {
        Self {
            resources,
            tree_cache,
        }
    }

    /// Returns the caller's whole tree.
    ///
    /// Deleted nodes are dropped one by one. Their non-deleted descendants
    /// are still emitted and keep pointing at the missing parent.
    pub async fn get_tree(&self, ctx: &RequestContext) -> AppResult<TreeSnapshot> {
        if let Some(snapshot) = self.tree_cache.get(ctx.user_id).await {
            debug!(user_id = %ctx.user_id, nodes = snapshot.len(), "Tree served from cache");
            return Ok(snapshot);
        }

        let started = Instant::now();
        let root = match self.resources.find_by_id(ctx.root_id).await? {
            Some(root) if !root.is_deleted => root,
            _ => return Ok(TreeSnapshot::empty()),
        };

        let nodes: Vec<TreeNode> = collect_subtree(self.resources.as_ref(), vec![root], true)
            .await?
            .iter()
            .filter(|r| !r.is_deleted)
            .map(TreeNode::from)
            .collect();
        let snapshot = TreeSnapshot { nodes };

        info!(
            user_id = %ctx.user_id,
            nodes = snapshot.len(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Tree assembled"
        );

        self.tree_cache.put(ctx.user_id, &snapshot).await;
        Ok(snapshot)
    }
}
