//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use drivehub_entity::{Plan, User};

/// Context for the current authenticated request.
///
/// Produced by identity resolution and passed into service methods so that
/// every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The username.
    pub username: String,
    /// The user's plan when the request was received.
    pub plan: Plan,
    /// The user's root folder.
    pub root_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for `user`.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            plan: user.plan,
            root_id: user.root_id,
            request_time: Utc::now(),
        }
    }

    /// Prefix every storage key created by this caller must start with.
    pub fn storage_prefix(&self) -> String {
        format!("{}/", self.user_id)
    }
}
