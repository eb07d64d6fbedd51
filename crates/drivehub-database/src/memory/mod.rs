//! In-memory stores backed by `DashMap`.
//!
//! Used by the test suite and single-node deployments. Semantics match the
//! PostgreSQL repositories, including child ordering (folders first, then
//! by name) and the storage floor at zero.

pub mod resource;
pub mod user;

pub use resource::MemoryResourceStore;
pub use user::MemoryUserStore;
