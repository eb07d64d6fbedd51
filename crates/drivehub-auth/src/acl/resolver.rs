//! Effective permission resolver.
//!
//! A grant placed on a folder covers everything below it: every check walks
//! upward from the resource, one parent per store read, until it finds the
//! owner, a grant for the user, or the root.
//!
//! Resolution per level:
//! 1. Owner of the node: allowed.
//! 2. A grant for the user on the node: allowed for reads; for writes the
//!    grant decides (editor allows, read denies) and the walk stops.
//! 3. Otherwise continue with the parent.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::ResourceStore;
use drivehub_entity::Resource;

/// The capability being checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// View the resource and its contents.
    Read,
    /// Modify the resource or create children under it.
    Write,
}

/// Resolves read and write capability by ascending the parent chain.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    /// Store used to fetch ancestors.
    resources: Arc<dyn ResourceStore>,
    /// Maximum number of ancestors visited before giving up.
    max_depth: usize,
}

impl PermissionResolver {
    /// Creates a new resolver.
    pub fn new(resources: Arc<dyn ResourceStore>, max_depth: usize) -> Self {
        Self {
            resources,
            max_depth,
        }
    }

    /// Whether `user_id` may read `resource`.
    pub async fn can_read(&self, resource: &Resource, user_id: Uuid) -> AppResult<bool> {
        self.resolve(resource, user_id, Capability::Read).await
    }

    /// Whether `user_id` may write `resource`.
    pub async fn can_write(&self, resource: &Resource, user_id: Uuid) -> AppResult<bool> {
        self.resolve(resource, user_id, Capability::Write).await
    }

    /// Walks from `resource` toward the root and decides `capability`.
    pub async fn resolve(
        &self,
        resource: &Resource,
        user_id: Uuid,
        capability: Capability,
    ) -> AppResult<bool> {
        let mut visited = HashSet::new();
        let mut current = resource.clone();

        loop {
            if current.owner_id == user_id {
                return Ok(true);
            }

            if let Some(grant) = current.grant_for(user_id) {
                return Ok(match capability {
                    Capability::Read => true,
                    Capability::Write => grant.access_level.can_write(),
                });
            }

            let Some(parent_id) = current.parent_id else {
                return Ok(false);
            };

            if !visited.insert(current.id) || visited.len() > self.max_depth {
                warn!(
                    resource_id = %resource.id,
                    at = %current.id,
                    depth = visited.len(),
                    "Ancestor walk aborted: cycle or depth cap"
                );
                return Ok(false);
            }

            match self.resources.find_by_id(parent_id).await? {
                Some(parent) => current = parent,
                None => return Ok(false),
            }
        }
    }

    /// Fails with AccessDenied unless `user_id` may read `resource`.
    pub async fn verify_read(&self, resource: &Resource, user_id: Uuid) -> AppResult<()> {
        if self.can_read(resource, user_id).await? {
            Ok(())
        } else {
            Err(AppError::access_denied(format!(
                "No read access to resource {}",
                resource.id
            )))
        }
    }

    /// Fails with AccessDenied unless `user_id` may write `resource`.
    pub async fn verify_write(&self, resource: &Resource, user_id: Uuid) -> AppResult<()> {
        if self.can_write(resource, user_id).await? {
            Ok(())
        } else {
            Err(AppError::access_denied(format!(
                "No write access to resource {}",
                resource.id
            )))
        }
    }

    /// Fails with AccessDenied unless `user_id` owns `resource`.
    pub fn verify_owner(&self, resource: &Resource, user_id: Uuid) -> AppResult<()> {
        if resource.owner_id == user_id {
            Ok(())
        } else {
            Err(AppError::access_denied(format!(
                "Only the owner can manage resource {}",
                resource.id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivehub_core::ErrorKind;
    use drivehub_database::MemoryResourceStore;
    use drivehub_entity::{AccessLevel, Grant};

    struct Fixture {
        store: Arc<MemoryResourceStore>,
        resolver: PermissionResolver,
        owner: Uuid,
        root: Resource,
        folder: Resource,
        file: Resource,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryResourceStore::new());
        let owner = Uuid::new_v4();
        let root = Resource::new_folder("My Drive", None, owner);
        let folder = Resource::new_folder("Projects", Some(root.id), owner);
        let file = Resource::new_file(Uuid::new_v4(), "plan.md", folder.id, owner, 10, "k");
        store
            .insert_many(&[root.clone(), folder.clone(), file.clone()])
            .await
            .unwrap();
        let resolver = PermissionResolver::new(store.clone(), 64);
        Fixture {
            store,
            resolver,
            owner,
            root,
            folder,
            file,
        }
    }

    async fn share(f: &Fixture, resource: &Resource, user: Uuid, level: AccessLevel) {
        let mut updated = f.store.find_by_id(resource.id).await.unwrap().unwrap();
        updated.shared_with.push(Grant::new(user, "guest", level));
        f.store.save(&updated).await.unwrap();
    }

    #[tokio::test]
    async fn test_owner_can_read_and_write() {
        let f = fixture().await;
        assert!(f.resolver.can_read(&f.file, f.owner).await.unwrap());
        assert!(f.resolver.can_write(&f.file, f.owner).await.unwrap());
        assert!(f.resolver.verify_owner(&f.root, f.owner).is_ok());
    }

    #[tokio::test]
    async fn test_stranger_is_denied() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();
        assert!(!f.resolver.can_read(&f.file, stranger).await.unwrap());
        let err = f.resolver.verify_write(&f.file, stranger).await.unwrap_err();
        assert!(err.is(ErrorKind::AccessDenied));
    }

    #[tokio::test]
    async fn test_editor_grant_on_ancestor_allows_write() {
        let f = fixture().await;
        let guest = Uuid::new_v4();
        share(&f, &f.root, guest, AccessLevel::Editor).await;
        assert!(f.resolver.can_write(&f.file, guest).await.unwrap());
        assert!(f.resolver.can_read(&f.file, guest).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_grant_on_ancestor_denies_write() {
        let f = fixture().await;
        let guest = Uuid::new_v4();
        share(&f, &f.folder, guest, AccessLevel::Read).await;
        assert!(f.resolver.can_read(&f.file, guest).await.unwrap());
        assert!(!f.resolver.can_write(&f.file, guest).await.unwrap());
    }

    #[tokio::test]
    async fn test_nearest_grant_decides_write() {
        let f = fixture().await;
        let guest = Uuid::new_v4();
        share(&f, &f.root, guest, AccessLevel::Editor).await;
        share(&f, &f.folder, guest, AccessLevel::Read).await;
        assert!(!f.resolver.can_write(&f.file, guest).await.unwrap());
    }

    #[tokio::test]
    async fn test_grant_does_not_propagate_upward() {
        let f = fixture().await;
        let guest = Uuid::new_v4();
        share(&f, &f.file, guest, AccessLevel::Editor).await;
        assert!(!f.resolver.can_read(&f.folder, guest).await.unwrap());
        assert!(!f.resolver.can_read(&f.root, guest).await.unwrap());
    }

    #[tokio::test]
    async fn test_cycle_terminates() {
        let store = Arc::new(MemoryResourceStore::new());
        let owner = Uuid::new_v4();
        let mut a = Resource::new_folder("a", None, owner);
        let b = Resource::new_folder("b", Some(a.id), owner);
        a.parent_id = Some(b.id);
        store.insert_many(&[a.clone(), b]).await.unwrap();

        let resolver = PermissionResolver::new(store, 64);
        assert!(!resolver.can_read(&a, Uuid::new_v4()).await.unwrap());
    }
}
