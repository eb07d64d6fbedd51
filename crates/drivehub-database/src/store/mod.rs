//! Store traits shared by the PostgreSQL and in-memory backends.
//!
//! Every operation is single-document or single-batch atomic. Nothing here
//! spans a multi-document transaction, so callers that chain several calls
//! must tolerate partial state after a failure.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use drivehub_core::result::AppResult;
use drivehub_entity::{Resource, User};

/// A `(parent_id, name)` pair identifying a folder slot.
pub type FolderKey = (Uuid, String);

/// Persistent collection of resource nodes forming one tree per user root.
#[async_trait]
pub trait ResourceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch a resource by id, deleted or not.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>>;

    /// Fetch every resource whose id is in `ids`, once per id. Missing ids
    /// are skipped.
    async fn find_many(&self, ids: &[Uuid]) -> AppResult<Vec<Resource>>;

    /// List direct children of `parent_id`.
    async fn find_children(&self, parent_id: Uuid, include_deleted: bool)
    -> AppResult<Vec<Resource>>;

    /// List direct children of every parent in `parent_ids` in one read.
    async fn find_children_of(
        &self,
        parent_ids: &[Uuid],
        include_deleted: bool,
    ) -> AppResult<Vec<Resource>>;

    /// Look up non-deleted folders matching any of the given
    /// `(parent_id, name)` keys in one read.
    async fn find_folders_by_keys(&self, keys: &[FolderKey]) -> AppResult<Vec<Resource>>;

    /// List every resource carrying the soft-delete marker.
    async fn find_deleted(&self) -> AppResult<Vec<Resource>>;

    /// List non-deleted resources carrying a grant for `user_id`.
    async fn find_shared_with(&self, user_id: Uuid) -> AppResult<Vec<Resource>>;

    /// Return the subset of `keys` still referenced by some resource.
    async fn find_referenced_keys(&self, keys: &[String]) -> AppResult<HashSet<String>>;

    /// Whether any resource other than `except`, deleted or not, references `key`.
    async fn is_key_shared(&self, key: &str, except: Uuid) -> AppResult<bool>;

    /// Return every storage key referenced by any resource.
    async fn list_storage_keys(&self) -> AppResult<HashSet<String>>;

    /// Insert one resource.
    async fn insert(&self, resource: &Resource) -> AppResult<()>;

    /// Insert many resources in one batch.
    async fn insert_many(&self, resources: &[Resource]) -> AppResult<()>;

    /// Replace a stored resource with `resource`.
    async fn save(&self, resource: &Resource) -> AppResult<()>;

    /// Mark exactly the given resources deleted. Returns the number marked.
    async fn soft_delete_many(&self, ids: &[Uuid], at: DateTime<Utc>) -> AppResult<u64>;

    /// Permanently remove the given resources. Returns the number removed.
    async fn hard_delete_many(&self, ids: &[Uuid]) -> AppResult<u64>;
}

/// Persistent collection of users and their storage accounting.
#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Users whose username starts with `prefix`, ignoring case, ordered by
    /// username and capped at `limit`.
    async fn search_by_prefix(&self, prefix: &str, limit: usize) -> AppResult<Vec<User>>;

    /// Insert a new user. A taken username is a conflict.
    async fn insert(&self, user: &User) -> AppResult<()>;

    /// Add `delta` bytes (possibly negative) to `storage_used`, flooring the
    /// result at zero. Returns the new value, or `None` if the user is gone.
    async fn adjust_storage_used(&self, user_id: Uuid, delta: i64) -> AppResult<Option<i64>>;
}
