//! Service registry: every use case wired over one set of collaborators.
//!
//! This is the handle the transport layer holds. It carries no request
//! state; every field is safe to share across concurrent requests.

use std::sync::Arc;
use std::time::Duration;

use drivehub_auth::PermissionResolver;
use drivehub_cache::CacheManager;
use drivehub_core::config::AppConfig;
use drivehub_core::traits::TokenVerifier;
use drivehub_database::{ResourceStore, UserStore};
use drivehub_storage::BlobStorageManager;

use crate::download::DownloadService;
use crate::folder::{FolderService, TreeCache, TreeService};
use crate::quota::QuotaTracker;
use crate::resource::MutationService;
use crate::share::ShareService;
use crate::upload::{BulkPathResolver, UploadService};
use crate::user::{IdentityResolver, UserService};

/// All application services.
#[derive(Debug, Clone)]
pub struct Services {
    /// Bearer token to caller.
    pub identity: Arc<IdentityResolver>,
    /// Registration and profile.
    pub users: Arc<UserService>,
    /// Folder creation and listing.
    pub folders: Arc<FolderService>,
    /// Whole-tree snapshots.
    pub tree: Arc<TreeService>,
    /// Grants.
    pub shares: Arc<ShareService>,
    /// Move, copy, delete.
    pub mutations: Arc<MutationService>,
    /// Upload initiation and confirmation.
    pub uploads: Arc<UploadService>,
    /// Download links and manifests.
    pub downloads: Arc<DownloadService>,
    /// Access checks, shared with every service above.
    pub permissions: Arc<PermissionResolver>,
    /// Plan ceilings and usage.
    pub quota: Arc<QuotaTracker>,
    /// Tree snapshot cache.
    pub tree_cache: Arc<TreeCache>,
}

impl Services {
    /// Wires every service over the given stores and backends.
    pub fn new(
        config: &AppConfig,
        resources: Arc<dyn ResourceStore>,
        users: Arc<dyn UserStore>,
        cache: Arc<CacheManager>,
        storage: Arc<BlobStorageManager>,
        verifier: Arc<dyn TokenVerifier>,
    ) -> Self {
        let max_depth = config.tree.max_depth;
        let presign_expiry = Duration::from_secs(config.storage.presign_expiry_seconds);

        let tree_cache = Arc::new(TreeCache::new(
            cache,
            Duration::from_secs(config.cache.tree_ttl_seconds),
        ));
        let permissions = Arc::new(PermissionResolver::new(resources.clone(), max_depth));
        let quota = Arc::new(QuotaTracker::new(users.clone(), config.quota.clone()));
        let resolver = BulkPathResolver::new(resources.clone(), storage.clone(), presign_expiry);

        Self {
            identity: Arc::new(IdentityResolver::new(verifier, users.clone())),
            users: Arc::new(UserService::new(users.clone(), resources.clone())),
            folders: Arc::new(FolderService::new(
                resources.clone(),
                permissions.clone(),
                tree_cache.clone(),
            )),
            tree: Arc::new(TreeService::new(resources.clone(), tree_cache.clone())),
            shares: Arc::new(ShareService::new(
                resources.clone(),
                users,
                permissions.clone(),
                tree_cache.clone(),
            )),
            mutations: Arc::new(MutationService::new(
                resources.clone(),
                permissions.clone(),
                quota.clone(),
                tree_cache.clone(),
                max_depth,
            )),
            uploads: Arc::new(UploadService::new(
                resources.clone(),
                permissions.clone(),
                quota.clone(),
                tree_cache.clone(),
                storage.clone(),
                resolver,
            )),
            downloads: Arc::new(DownloadService::new(
                resources,
                permissions.clone(),
                storage,
                presign_expiry,
            )),
            permissions,
            quota,
            tree_cache,
        }
    }
}
