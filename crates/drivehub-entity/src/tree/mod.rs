//! Flattened tree snapshots produced by the tree assembler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::{Grant, Resource, ResourceType};

/// One resource in a flattened tree. Ids are rendered as opaque strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// File or folder.
    pub resource_type: ResourceType,
    /// Parent id (null for the root).
    pub parent_id: Option<String>,
    /// Owner id.
    pub owner_id: String,
    /// Size in bytes.
    pub size: i64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
    /// Share grants.
    pub shared_with: Vec<Grant>,
    /// Blob key (files only).
    pub storage_key: Option<String>,
}

impl From<&Resource> for TreeNode {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id.to_string(),
            name: r.name.clone(),
            resource_type: r.resource_type,
            parent_id: r.parent_id.map(|p| p.to_string()),
            owner_id: r.owner_id.to_string(),
            size: r.size,
            created_at: r.created_at,
            updated_at: r.updated_at,
            shared_with: r.shared_with.clone(),
            storage_key: r.storage_key.clone(),
        }
    }
}

/// A user's whole tree in breadth-first order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeSnapshot {
    /// The flattened nodes.
    pub nodes: Vec<TreeNode>,
}

impl TreeSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the snapshot has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a node by id.
    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}
