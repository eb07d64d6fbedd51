//! The sweep and its collaborators.

use std::sync::Arc;

use drivehub_database::ResourceStore;
use drivehub_service::QuotaTracker;
use drivehub_storage::BlobStorageManager;

/// Background pass that makes deletions permanent.
///
/// Both passes tolerate partial state left by earlier failures: anything
/// missed is picked up on the next run.
#[derive(Debug, Clone)]
pub struct Sweep {
    /// Resource store.
    pub(crate) resources: Arc<dyn ResourceStore>,
    /// Quota tracker, for releasing purged bytes.
    pub(crate) quota: Arc<QuotaTracker>,
    /// Blob storage.
    pub(crate) storage: Arc<BlobStorageManager>,
}

impl Sweep {
    /// Create a new sweep.
    pub fn new(
        resources: Arc<dyn ResourceStore>,
        quota: Arc<QuotaTracker>,
        storage: Arc<BlobStorageManager>,
    ) -> Self {
        Self {
            resources,
            quota,
            storage,
        }
    }
}
