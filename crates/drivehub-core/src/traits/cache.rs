//! Snapshot cache contract.

use std::time::Duration;

use async_trait::async_trait;

use crate::result::AppResult;

/// Read-through cache consulted before the resource store.
///
/// Values are JSON strings. Callers treat every error as a miss: the
/// resource store is authoritative and a cache outage must never fail a
/// request.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Fetch `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Store `value` under `key` for `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> AppResult<()>;

    /// Drop `key`. Dropping an absent key is not an error.
    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Whether the backend answers.
    async fn health_check(&self) -> AppResult<bool>;

    /// Fetch and decode a JSON value.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Encode `value` as JSON and store it for `ttl`.
    async fn set_json<T: serde::Serialize + Send + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> AppResult<()>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw, ttl).await
    }
}
