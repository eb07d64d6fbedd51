//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::plan::Plan;

/// A registered user and their storage accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// The user's root folder.
    pub root_id: Uuid,
    /// Storage plan.
    pub plan: Plan,
    /// Bytes used by the user's non-deleted files.
    pub storage_used: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
