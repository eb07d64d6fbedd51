//! Quota tracker.
//!
//! Ceilings are checked before any write in upload initiation and copy and
//! never re-checked afterwards. Usage is an incremental aggregate: raised
//! on confirmed uploads and copies, lowered (floored at zero) by purges.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use drivehub_core::config::QuotaConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::UserStore;
use drivehub_entity::{Plan, User};

/// Enforces plan ceilings and maintains `storage_used`.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    /// User store.
    users: Arc<dyn UserStore>,
    /// Plan ceilings.
    config: QuotaConfig,
}

impl QuotaTracker {
    /// Creates a new quota tracker.
    pub fn new(users: Arc<dyn UserStore>, config: QuotaConfig) -> Self {
        Self { users, config }
    }

    /// Byte ceiling for `plan`.
    pub fn limit_for(&self, plan: Plan) -> i64 {
        let limit = match plan {
            Plan::Normal => self.config.normal_limit_bytes,
            Plan::Pro => self.config.pro_limit_bytes,
        };
        i64::try_from(limit).unwrap_or(i64::MAX)
    }

    /// Fails with QuotaExceeded if `additional` bytes would push the user
    /// past their ceiling. Returns the freshly loaded user.
    pub async fn ensure_capacity(&self, user_id: Uuid, additional: i64) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))?;

        let limit = self.limit_for(user.plan);
        let projected = user.storage_used.saturating_add(additional.max(0));
        if projected > limit {
            warn!(
                user_id = %user_id,
                used = user.storage_used,
                additional,
                limit,
                "Storage quota exceeded"
            );
            return Err(AppError::quota_exceeded(format!(
                "Storage quota exceeded: {} + {} bytes exceeds the {} limit of {} bytes",
                user.storage_used, additional, user.plan, limit
            )));
        }
        Ok(user)
    }

    /// Adds `bytes` to the user's usage.
    pub async fn record_usage(&self, user_id: Uuid, bytes: i64) -> AppResult<()> {
        self.adjust(user_id, bytes).await
    }

    /// Subtracts `bytes` from the user's usage, flooring at zero.
    pub async fn release_usage(&self, user_id: Uuid, bytes: i64) -> AppResult<()> {
        self.adjust(user_id, -bytes).await
    }

    /// Applies a signed change to the user's usage, flooring at zero.
    pub async fn adjust(&self, user_id: Uuid, delta: i64) -> AppResult<()> {
        if delta == 0 {
            return Ok(());
        }
        match self.users.adjust_storage_used(user_id, delta).await? {
            Some(used) => debug!(user_id = %user_id, delta, used, "Storage usage updated"),
            None => warn!(user_id = %user_id, delta, "Usage update for unknown user"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivehub_core::ErrorKind;
    use drivehub_database::MemoryUserStore;

    async fn tracker_with_user(plan: Plan, used: i64) -> (QuotaTracker, Uuid) {
        let users = Arc::new(MemoryUserStore::new());
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            root_id: Uuid::new_v4(),
            plan,
            storage_used: used,
            created_at: Utc::now(),
        };
        users.insert(&user).await.unwrap();
        let config = QuotaConfig {
            normal_limit_bytes: 1_000,
            pro_limit_bytes: 10_000,
        };
        (QuotaTracker::new(users, config), user.id)
    }

    #[tokio::test]
    async fn test_exact_fit_is_allowed() {
        let (tracker, id) = tracker_with_user(Plan::Normal, 400).await;
        assert!(tracker.ensure_capacity(id, 600).await.is_ok());
        let err = tracker.ensure_capacity(id, 601).await.unwrap_err();
        assert!(err.is(ErrorKind::QuotaExceeded));
    }

    #[tokio::test]
    async fn test_pro_plan_has_higher_ceiling() {
        let (tracker, id) = tracker_with_user(Plan::Pro, 0).await;
        assert!(tracker.ensure_capacity(id, 5_000).await.is_ok());
        assert_eq!(tracker.limit_for(Plan::Normal), 1_000);
    }

    #[tokio::test]
    async fn test_release_floors_at_zero() {
        let (tracker, id) = tracker_with_user(Plan::Normal, 100).await;
        tracker.release_usage(id, 500).await.unwrap();
        let user = tracker.ensure_capacity(id, 0).await.unwrap();
        assert_eq!(user.storage_used, 0);
    }
}
