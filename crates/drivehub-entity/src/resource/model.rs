//! Resource entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::grant::Grant;
use super::kind::ResourceType;

/// A node in a user's ownership tree, either a file or a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Resource {
    /// Unique resource identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// File or folder.
    pub resource_type: ResourceType,
    /// Parent folder (null only for a user's root).
    pub parent_id: Option<Uuid>,
    /// The owner. Never reassigned after creation.
    pub owner_id: Uuid,
    /// Size in bytes (0 for folders).
    pub size: i64,
    /// When the resource was created.
    pub created_at: DateTime<Utc>,
    /// When the resource was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub is_deleted: bool,
    /// When the resource was soft-deleted.
    pub deleted_at: Option<DateTime<Utc>>,
    /// Ordered share grants.
    #[sqlx(json)]
    pub shared_with: Vec<Grant>,
    /// Blob key (files only).
    pub storage_key: Option<String>,
}

impl Resource {
    /// Build a new folder owned by `owner_id`.
    pub fn new_folder(name: impl Into<String>, parent_id: Option<Uuid>, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            resource_type: ResourceType::Folder,
            parent_id,
            owner_id,
            size: 0,
            created_at: now,
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
            shared_with: Vec::new(),
            storage_key: None,
        }
    }

    /// Build a new file with a pre-allocated id and storage key.
    pub fn new_file(
        id: Uuid,
        name: impl Into<String>,
        parent_id: Uuid,
        owner_id: Uuid,
        size: i64,
        storage_key: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name: name.into(),
            resource_type: ResourceType::File,
            parent_id: Some(parent_id),
            owner_id,
            size,
            created_at: now,
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
            shared_with: Vec::new(),
            storage_key: Some(storage_key.into()),
        }
    }

    /// Check if this is a root folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this resource is a folder.
    pub fn is_folder(&self) -> bool {
        self.resource_type == ResourceType::Folder
    }

    /// Check if this resource is a file.
    pub fn is_file(&self) -> bool {
        self.resource_type == ResourceType::File
    }

    /// Find the grant targeting `user_id`, if any.
    pub fn grant_for(&self, user_id: Uuid) -> Option<&Grant> {
        self.shared_with.iter().find(|g| g.user_id == user_id)
    }

    /// Clone this node under a new parent for a new owner. The copy gets a
    /// fresh id, fresh timestamps and no grants; the storage key is shared.
    pub fn duplicate(&self, parent_id: Uuid, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            resource_type: self.resource_type,
            parent_id: Some(parent_id),
            owner_id,
            size: self.size,
            created_at: now,
            updated_at: now,
            is_deleted: false,
            deleted_at: None,
            shared_with: Vec::new(),
            storage_key: self.storage_key.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::grant::AccessLevel;

    #[test]
    fn test_duplicate_keeps_key_and_structure_fields() {
        let owner = Uuid::new_v4();
        let mut file = Resource::new_file(Uuid::new_v4(), "a.txt", Uuid::new_v4(), owner, 42, "k/a");
        file.shared_with
            .push(Grant::new(Uuid::new_v4(), "bob", AccessLevel::Read));

        let caller = Uuid::new_v4();
        let target = Uuid::new_v4();
        let copy = file.duplicate(target, caller);

        assert_ne!(copy.id, file.id);
        assert_eq!(copy.owner_id, caller);
        assert_eq!(copy.parent_id, Some(target));
        assert_eq!(copy.storage_key.as_deref(), Some("k/a"));
        assert_eq!(copy.size, 42);
        assert!(copy.shared_with.is_empty());
        assert_eq!(file.owner_id, owner);
    }

    #[test]
    fn test_grant_for() {
        let bob = Uuid::new_v4();
        let mut folder = Resource::new_folder("Docs", None, Uuid::new_v4());
        assert!(folder.is_root());
        assert!(folder.grant_for(bob).is_none());
        folder
            .shared_with
            .push(Grant::new(bob, "bob", AccessLevel::Editor));
        assert_eq!(folder.grant_for(bob).map(|g| g.access_level), Some(AccessLevel::Editor));
    }
}
