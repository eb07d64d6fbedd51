//! Change sets returned by mutations for client-side cache reconciliation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::resource::Resource;

/// Resources added, updated, and deleted by a mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Newly created resources.
    pub added: Vec<Resource>,
    /// Resources whose fields changed.
    pub updated: Vec<Resource>,
    /// Ids of resources marked deleted.
    pub deleted: Vec<Uuid>,
}

impl Delta {
    /// A delta listing only added resources.
    pub fn added(added: Vec<Resource>) -> Self {
        Self {
            added,
            ..Self::default()
        }
    }

    /// A delta listing only updated resources.
    pub fn updated(updated: Vec<Resource>) -> Self {
        Self {
            updated,
            ..Self::default()
        }
    }

    /// A delta listing only deleted ids.
    pub fn deleted(deleted: Vec<Uuid>) -> Self {
        Self {
            deleted,
            ..Self::default()
        }
    }

    /// Check whether nothing changed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.deleted.is_empty()
    }
}
