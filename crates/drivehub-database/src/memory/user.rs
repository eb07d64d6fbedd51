//! In-memory user store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_entity::User;

use crate::store::UserStore;

/// User store keyed by id with a username index.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<DashMap<Uuid, User>>,
    by_username: Arc<DashMap<String, Uuid>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let Some(id) = self.by_username.get(username).map(|e| *e.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn search_by_prefix(&self, prefix: &str, limit: usize) -> AppResult<Vec<User>> {
        let prefix = prefix.to_lowercase();
        let mut found: Vec<User> = self
            .users
            .iter()
            .filter(|entry| entry.value().username.to_lowercase().starts_with(&prefix))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.username.cmp(&b.username));
        found.truncate(limit);
        Ok(found)
    }

    async fn insert(&self, user: &User) -> AppResult<()> {
        match self.by_username.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::conflict(format!(
                "Username '{}' already exists",
                user.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                self.users.insert(user.id, user.clone());
                Ok(())
            }
        }
    }

    async fn adjust_storage_used(&self, user_id: Uuid, delta: i64) -> AppResult<Option<i64>> {
        Ok(self.users.get_mut(&user_id).map(|mut entry| {
            let user = entry.value_mut();
            user.storage_used = user.storage_used.saturating_add(delta).max(0);
            user.storage_used
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use drivehub_entity::Plan;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            root_id: Uuid::new_v4(),
            plan: Plan::Normal,
            storage_used: 0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryUserStore::new();
        store.insert(&user("alice")).await.unwrap();
        let err = store.insert(&user("alice")).await.unwrap_err();
        assert!(err.is(drivehub_core::ErrorKind::Conflict));
    }

    #[tokio::test]
    async fn test_search_by_prefix_ignores_case_and_caps_results() {
        let store = MemoryUserStore::new();
        for name in ["alice", "Alan", "albert", "bob"] {
            store.insert(&user(name)).await.unwrap();
        }

        let names: Vec<String> = store
            .search_by_prefix("AL", 2)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["Alan", "albert"]);
        assert!(store.search_by_prefix("z", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_used_floors_at_zero() {
        let store = MemoryUserStore::new();
        let alice = user("alice");
        store.insert(&alice).await.unwrap();

        assert_eq!(store.adjust_storage_used(alice.id, 100).await.unwrap(), Some(100));
        assert_eq!(store.adjust_storage_used(alice.id, -250).await.unwrap(), Some(0));
        assert_eq!(store.adjust_storage_used(Uuid::new_v4(), 5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_storage_used_saturates_instead_of_overflowing() {
        let store = MemoryUserStore::new();
        let alice = user("alice");
        store.insert(&alice).await.unwrap();

        store.adjust_storage_used(alice.id, i64::MAX - 10).await.unwrap();
        assert_eq!(
            store.adjust_storage_used(alice.id, 100).await.unwrap(),
            Some(i64::MAX)
        );
        assert_eq!(
            store.adjust_storage_used(alice.id, i64::MIN).await.unwrap(),
            Some(0)
        );
    }
}
