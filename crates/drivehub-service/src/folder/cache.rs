//! Best-effort cache of per-user tree snapshots.
//!
//! The resource store stays authoritative. Every cache failure is logged
//! and swallowed here so callers never see it.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use drivehub_cache::CacheManager;
use drivehub_cache::keys;
use drivehub_core::traits::CacheProvider;
use drivehub_entity::TreeSnapshot;

/// Reads, writes, and invalidates tree snapshots.
#[derive(Debug, Clone)]
pub struct TreeCache {
    /// Underlying cache.
    cache: Arc<CacheManager>,
    /// Snapshot lifetime.
    ttl: Duration,
}

impl TreeCache {
    /// Creates a new tree cache.
    pub fn new(cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Cached snapshot for `user_id`, if present and readable.
    pub async fn get(&self, user_id: Uuid) -> Option<TreeSnapshot> {
        match self
            .cache
            .get_json::<TreeSnapshot>(&keys::tree_snapshot(user_id))
            .await
        {
            Ok(hit) => hit,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Tree cache read failed");
                None
            }
        }
    }

    /// Store a snapshot for `user_id`.
    pub async fn put(&self, user_id: Uuid, snapshot: &TreeSnapshot) {
        if let Err(e) = self
            .cache
            .set_json(&keys::tree_snapshot(user_id), snapshot, self.ttl)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Tree cache write failed");
        }
    }

    /// Drop the snapshots of every listed user.
    pub async fn invalidate<I>(&self, user_ids: I)
    where
        I: IntoIterator<Item = Uuid>,
    {
        let unique: BTreeSet<Uuid> = user_ids.into_iter().collect();
        for user_id in unique {
            match self.cache.delete(&keys::tree_snapshot(user_id)).await {
                Ok(()) => debug!(user_id = %user_id, "Tree cache invalidated"),
                Err(e) => {
                    warn!(user_id = %user_id, error = %e, "Tree cache invalidation failed")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use drivehub_core::error::AppError;
    use drivehub_core::result::AppResult;

    #[derive(Debug)]
    struct BrokenCache;

    #[async_trait]
    impl CacheProvider for BrokenCache {
        async fn get(&self, _key: &str) -> AppResult<Option<String>> {
            Err(AppError::cache("down"))
        }
        async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> AppResult<()> {
            Err(AppError::cache("down"))
        }
        async fn delete(&self, _key: &str) -> AppResult<()> {
            Err(AppError::cache("down"))
        }
        async fn health_check(&self) -> AppResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let cache = TreeCache::new(
            Arc::new(CacheManager::from_provider(Arc::new(BrokenCache))),
            Duration::from_secs(300),
        );
        let user = Uuid::new_v4();
        cache.put(user, &TreeSnapshot::empty()).await;
        assert!(cache.get(user).await.is_none());
        cache.invalidate([user, user]).await;
    }
}
