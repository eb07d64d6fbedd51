//! Shared test helpers for service integration tests.
//!
//! Every service is wired over the in-memory resource and user stores, the
//! moka-backed cache, and the in-memory blob store.

#![allow(dead_code)]

use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use drivehub_auth::{JwtDecoder, PermissionResolver};
use drivehub_cache::CacheManager;
use drivehub_cache::memory::MemoryCacheProvider;
use drivehub_core::config::AppConfig;
use drivehub_core::config::cache::MemoryCacheConfig;
use drivehub_core::traits::BlobStorage;
use drivehub_database::{MemoryResourceStore, MemoryUserStore, ResourceStore, UserStore};
use drivehub_entity::{Plan, Resource};
use drivehub_service::folder::CreateFolderRequest;
use drivehub_service::upload::ConfirmUploadRequest;
use drivehub_service::user::RegisterUserRequest;
use drivehub_service::{
    DownloadService, FolderService, IdentityResolver, MutationService, QuotaTracker,
    RequestContext, Services, ShareService, TreeCache, TreeService, UploadService, UserService,
};
use drivehub_storage::{BlobStorageManager, MemoryBlobStorage};

/// Normal-plan ceiling used by tests.
pub const NORMAL_LIMIT: u64 = 10_000;
/// Pro-plan ceiling used by tests.
pub const PRO_LIMIT: u64 = 1_000_000;

/// Test application context.
pub struct TestApp {
    pub config: AppConfig,
    pub resources: Arc<MemoryResourceStore>,
    pub users: Arc<MemoryUserStore>,
    pub blobs: Arc<MemoryBlobStorage>,
    pub storage: Arc<BlobStorageManager>,
    pub tree_cache: Arc<TreeCache>,
    pub permissions: Arc<PermissionResolver>,
    pub quota: Arc<QuotaTracker>,
    pub identity: Arc<IdentityResolver>,
    pub user_service: Arc<UserService>,
    pub folder_service: Arc<FolderService>,
    pub tree_service: Arc<TreeService>,
    pub share_service: Arc<ShareService>,
    pub mutation_service: Arc<MutationService>,
    pub upload_service: Arc<UploadService>,
    pub download_service: Arc<DownloadService>,
}

impl TestApp {
    /// Create a fresh application with empty stores.
    pub fn new() -> Self {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "database": { "url": "postgres://unused/drivehub_test" },
            "quota": {
                "normal_limit_bytes": NORMAL_LIMIT,
                "pro_limit_bytes": PRO_LIMIT,
            },
            "tree": { "max_depth": 64 },
            "storage": { "provider": "memory", "presign_expiry_seconds": 3600 },
        }))
        .expect("Failed to build test config");

        let resources = Arc::new(MemoryResourceStore::new());
        let users = Arc::new(MemoryUserStore::new());
        let blobs = Arc::new(MemoryBlobStorage::new());
        let storage = Arc::new(BlobStorageManager::from_provider(blobs.clone()));
        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&MemoryCacheConfig::default()),
        )));

        let services = Services::new(
            &config,
            resources.clone(),
            users.clone(),
            cache,
            storage.clone(),
            Arc::new(JwtDecoder::new(&config.auth)),
        );

        Self {
            config,
            resources,
            users,
            blobs,
            storage,
            tree_cache: services.tree_cache,
            permissions: services.permissions,
            quota: services.quota,
            identity: services.identity,
            user_service: services.users,
            folder_service: services.folders,
            tree_service: services.tree,
            share_service: services.shares,
            mutation_service: services.mutations,
            upload_service: services.uploads,
            download_service: services.downloads,
        }
    }

    /// Register a user and return their request context.
    pub async fn register(&self, username: &str, plan: Plan) -> RequestContext {
        let user = self
            .user_service
            .register(RegisterUserRequest {
                username: username.to_string(),
                plan,
            })
            .await
            .expect("Failed to register user");
        RequestContext::for_user(&user)
    }

    /// Create a folder as `ctx`.
    pub async fn folder(&self, ctx: &RequestContext, parent_id: Uuid, name: &str) -> Resource {
        self.folder_service
            .create_folder(
                ctx,
                CreateFolderRequest {
                    name: name.to_string(),
                    parent_id,
                },
            )
            .await
            .expect("Failed to create folder")
    }

    /// Put `size` bytes in blob storage and confirm them as a file.
    pub async fn file(
        &self,
        ctx: &RequestContext,
        parent_id: Uuid,
        name: &str,
        size: usize,
    ) -> Resource {
        let resource_id = Uuid::new_v4();
        let storage_key = format!("{}/{resource_id}/{name}", ctx.user_id);
        self.storage
            .put(&storage_key, Bytes::from(vec![b'x'; size]))
            .await
            .expect("Failed to store blob");
        self.upload_service
            .confirm_upload(
                ctx,
                ConfirmUploadRequest {
                    resource_id,
                    parent_id,
                    name: name.to_string(),
                    size: size as i64,
                    storage_key,
                },
            )
            .await
            .expect("Failed to confirm upload")
    }

    /// Current storage usage of a user.
    pub async fn used(&self, user_id: Uuid) -> i64 {
        self.users
            .find_by_id(user_id)
            .await
            .expect("Failed to load user")
            .expect("User missing")
            .storage_used
    }

    /// Load a resource by id, deleted or not.
    pub async fn get(&self, id: Uuid) -> Option<Resource> {
        self.resources
            .find_by_id(id)
            .await
            .expect("Failed to load resource")
    }
}
