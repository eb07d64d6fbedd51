//! # drivehub-database
//!
//! Store traits for resources and users, PostgreSQL repositories
//! implementing them, and in-memory stores with identical semantics.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::{MemoryResourceStore, MemoryUserStore};
pub use repositories::{ResourceRepository, UserRepository};
pub use store::{FolderKey, ResourceStore, UserStore};
