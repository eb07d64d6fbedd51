//! Removal of blobs no resource references.
//!
//! Uploads are written before they are confirmed, so a fresh unreferenced
//! blob may still be claimed. Only blobs older than the retention window
//! are removed.

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use drivehub_core::result::AppResult;
use drivehub_core::traits::BlobStorage;

use crate::sweep::Sweep;

/// Counts from one orphan-blob run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrphanReport {
    /// Blobs examined.
    pub scanned: u64,
    /// Unreferenced blobs younger than the retention window.
    pub retained: u64,
    /// Blobs deleted.
    pub deleted: u64,
    /// Blob deletions that failed.
    pub failures: u64,
}

impl Sweep {
    /// Deletes unreferenced blobs last modified before `now - retention`.
    pub async fn purge_orphan_blobs(&self, retention: Duration) -> AppResult<OrphanReport> {
        let cutoff = Utc::now() - retention;
        let blobs = self.storage.list_all().await?;
        let referenced = self.resources.list_storage_keys().await?;
        let mut report = OrphanReport::default();

        for blob in blobs {
            report.scanned += 1;
            if referenced.contains(&blob.key) {
                continue;
            }
            if blob.last_modified >= cutoff {
                report.retained += 1;
                continue;
            }
            match self.storage.delete(&blob.key).await {
                Ok(()) => {
                    debug!(storage_key = %blob.key, "Orphan blob deleted");
                    report.deleted += 1;
                }
                Err(e) => {
                    warn!(storage_key = %blob.key, error = %e, "Orphan blob deletion failed");
                    report.failures += 1;
                }
            }
        }

        info!(
            scanned = report.scanned,
            deleted = report.deleted,
            retained = report.retained,
            failures = report.failures,
            "Orphan blob purge complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use uuid::Uuid;

    use drivehub_core::config::QuotaConfig;
    use drivehub_database::{MemoryResourceStore, MemoryUserStore, ResourceStore};
    use drivehub_entity::Resource;
    use drivehub_service::QuotaTracker;
    use drivehub_storage::{BlobStorageManager, MemoryBlobStorage};

    use super::*;

    #[tokio::test]
    async fn test_only_old_unreferenced_blobs_are_removed() {
        let resources = Arc::new(MemoryResourceStore::new());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let quota = Arc::new(QuotaTracker::new(
            Arc::new(MemoryUserStore::new()),
            QuotaConfig::default(),
        ));
        let sweep = Sweep::new(
            resources.clone(),
            quota,
            Arc::new(BlobStorageManager::from_provider(blobs.clone())),
        );

        let owner = Uuid::new_v4();
        let file = Resource::new_file(Uuid::new_v4(), "kept", Uuid::new_v4(), owner, 1, "u/kept");
        resources.insert(&file).await.unwrap();

        for key in ["u/kept", "u/old-orphan", "u/fresh-orphan"] {
            blobs.put(key, Bytes::from_static(b"x")).await.unwrap();
        }
        let long_ago = Utc::now() - Duration::hours(48);
        blobs.set_last_modified("u/kept", long_ago);
        blobs.set_last_modified("u/old-orphan", long_ago);

        let report = sweep.purge_orphan_blobs(Duration::hours(24)).await.unwrap();

        assert_eq!(
            report,
            OrphanReport {
                scanned: 3,
                retained: 1,
                deleted: 1,
                failures: 0,
            }
        );
        assert!(blobs.contains("u/kept"));
        assert!(blobs.contains("u/fresh-orphan"));
        assert!(!blobs.contains("u/old-orphan"));
    }
}
