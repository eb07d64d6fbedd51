//! Permanent removal of soft-deleted subtrees.
//!
//! Deletion only marks the requested node. Here every marked node takes its
//! whole subtree with it, whatever the descendants' own flags say.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_core::traits::BlobStorage;
use drivehub_entity::Resource;
use drivehub_service::folder::walk::collect_subtree;

use crate::sweep::Sweep;

/// Counts from one purge run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Marked nodes whose subtree was removed.
    pub subtrees_purged: u64,
    /// Resources permanently removed.
    pub resources_removed: u64,
    /// FILE bytes released from owners' usage.
    pub bytes_released: i64,
    /// Blobs deleted because nothing references them any more.
    pub blobs_deleted: u64,
    /// Blob deletions that failed.
    pub blob_failures: u64,
    /// Owners whose usage could not be lowered after their files were removed.
    pub release_failures: u64,
    /// Subtrees that could not be purged this run.
    pub failed_subtrees: u64,
}

impl Sweep {
    /// Purges every soft-deleted node together with its full subtree.
    pub async fn purge_deleted(&self) -> AppResult<PurgeReport> {
        let marked = self.resources.find_deleted().await?;
        let mut report = PurgeReport::default();
        let mut purged: HashSet<Uuid> = HashSet::new();

        for root in marked {
            if purged.contains(&root.id) {
                continue;
            }
            let root_id = root.id;
            match self.purge_subtree(root, &mut purged, &mut report).await {
                Ok(()) => report.subtrees_purged += 1,
                Err(e) => {
                    warn!(resource_id = %root_id, error = %e, "Subtree purge failed");
                    report.failed_subtrees += 1;
                }
            }
        }

        info!(
            subtrees = report.subtrees_purged,
            resources = report.resources_removed,
            bytes = report.bytes_released,
            blobs = report.blobs_deleted,
            blob_failures = report.blob_failures,
            release_failures = report.release_failures,
            failed = report.failed_subtrees,
            "Purge of deleted resources complete"
        );

        Ok(report)
    }

    async fn purge_subtree(
        &self,
        root: Resource,
        purged: &mut HashSet<Uuid>,
        report: &mut PurgeReport,
    ) -> AppResult<()> {
        let subtree: Vec<Resource> = collect_subtree(self.resources.as_ref(), vec![root], true)
            .await?
            .into_iter()
            .filter(|r| !purged.contains(&r.id))
            .collect();

        let mut ids = Vec::with_capacity(subtree.len());
        let mut released: HashMap<Uuid, i64> = HashMap::new();
        let mut keys = BTreeSet::new();
        for resource in subtree {
            if resource.is_file() {
                *released.entry(resource.owner_id).or_default() += resource.size;
                if let Some(key) = resource.storage_key {
                    keys.insert(key);
                }
            }
            ids.push(resource.id);
        }

        let removed = self.resources.hard_delete_many(&ids).await?;
        purged.extend(ids);
        report.resources_removed += removed;

        // The nodes are gone, so a failed release cannot be retried by a
        // later run and is reported for manual reconciliation.
        for (owner_id, bytes) in released {
            match self.quota.release_usage(owner_id, bytes).await {
                Ok(()) => report.bytes_released += bytes,
                Err(e) => {
                    warn!(
                        owner_id = %owner_id,
                        bytes,
                        error = %e,
                        "Usage release failed; storage_used is now overstated"
                    );
                    report.release_failures += 1;
                }
            }
        }

        let keys: Vec<String> = keys.into_iter().collect();
        let still_referenced = self.resources.find_referenced_keys(&keys).await?;
        for key in keys.iter().filter(|k| !still_referenced.contains(*k)) {
            match self.storage.delete(key).await {
                Ok(()) => {
                    debug!(storage_key = %key, "Blob deleted");
                    report.blobs_deleted += 1;
                }
                Err(e) => {
                    warn!(storage_key = %key, error = %e, "Blob deletion failed");
                    report.blob_failures += 1;
                }
            }
        }

        Ok(())
    }
}
