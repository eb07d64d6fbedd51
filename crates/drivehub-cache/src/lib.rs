//! # drivehub-cache
//!
//! Backends for the per-user tree snapshot cache: an in-process moka
//! cache and Redis. `cache.provider` picks one at startup.

pub mod keys;
#[cfg(feature = "memory")]
pub mod memory;
pub mod provider;
#[cfg(feature = "redis-backend")]
pub mod redis;

pub use provider::CacheManager;
