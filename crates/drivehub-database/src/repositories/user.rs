//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_entity::User;

use crate::store::UserStore;

/// Repository for users backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    async fn search_by_prefix(&self, prefix: &str, limit: usize) -> AppResult<Vec<User>> {
        let pattern = format!("{}%", escape_like(prefix));
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username ILIKE $1 ESCAPE '\\' \
             ORDER BY username ASC LIMIT $2",
        )
        .bind(&pattern)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search users", e))
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, root_id, plan, storage_used, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(user.root_id)
        .bind(user.plan)
        .bind(user.storage_used)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("users_username_key") =>
            {
                AppError::conflict(format!("Username '{}' already exists", user.username))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create user", e),
        })?;
        Ok(())
    }

    async fn adjust_storage_used(&self, user_id: Uuid, delta: i64) -> AppResult<Option<i64>> {
        sqlx::query_scalar::<_, i64>(
            "UPDATE users SET storage_used = GREATEST(storage_used + $2, 0) \
             WHERE id = $1 RETURNING storage_used",
        )
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update storage usage", e)
        })
    }
}

/// Escape `LIKE` wildcards so user input only ever matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
