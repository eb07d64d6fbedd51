//! User provisioning: account plus root folder.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::{ResourceStore, UserStore};
use drivehub_entity::{Plan, Resource, User};

use crate::context::RequestContext;

/// Name given to every user's root folder.
pub const ROOT_FOLDER_NAME: &str = "My Drive";

/// Most users a username search returns.
pub const SEARCH_LIMIT: usize = 5;

/// A user as shown when picking a share target.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserMatch {
    /// User id.
    pub id: Uuid,
    /// Username.
    pub username: String,
}

/// Request to register a new user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RegisterUserRequest {
    /// Desired username.
    pub username: String,
    /// Storage plan.
    #[serde(default)]
    pub plan: Plan,
}

/// Creates users and looks them up.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Resource store.
    resources: Arc<dyn ResourceStore>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(users: Arc<dyn UserStore>, resources: Arc<dyn ResourceStore>) -> Self {
        Self { users, resources }
    }

    /// Registers a user and creates their root folder.
    pub async fn register(&self, req: RegisterUserRequest) -> AppResult<User> {
        let username = req.username.trim();
        if username.is_empty() {
            return Err(AppError::invalid_operation("Username cannot be empty"));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Username '{username}' already exists"
            )));
        }

        let user_id = Uuid::new_v4();
        let root = Resource::new_folder(ROOT_FOLDER_NAME, None, user_id);
        self.resources.insert(&root).await?;

        let user = User {
            id: user_id,
            username: username.to_string(),
            root_id: root.id,
            plan: req.plan,
            storage_used: 0,
            created_at: Utc::now(),
        };

        if let Err(e) = self.users.insert(&user).await {
            if let Err(cleanup) = self.resources.hard_delete_many(&[root.id]).await {
                warn!(root_id = %root.id, error = %cleanup, "Failed to remove root of failed registration");
            }
            return Err(e);
        }

        info!(user_id = %user.id, username = %user.username, plan = %user.plan, "User registered");
        Ok(user)
    }

    /// Gets the caller's current record.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Finds other users whose username starts with `query`, for choosing
    /// whom to share with. The caller never appears in the results.
    pub async fn search_users(&self, ctx: &RequestContext, query: &str) -> AppResult<Vec<UserMatch>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_operation("Search query cannot be empty"));
        }
        let found = self.users.search_by_prefix(query, SEARCH_LIMIT + 1).await?;
        Ok(found
            .into_iter()
            .filter(|u| u.id != ctx.user_id)
            .take(SEARCH_LIMIT)
            .map(|u| UserMatch {
                id: u.id,
                username: u.username,
            })
            .collect())
    }
}
