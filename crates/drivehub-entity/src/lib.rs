//! # drivehub-entity
//!
//! Domain entity models for DriveHub. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod delta;
pub mod resource;
pub mod tree;
pub mod user;

pub use delta::Delta;
pub use resource::{AccessLevel, Grant, Resource, ResourceType};
pub use tree::{TreeNode, TreeSnapshot};
pub use user::{Plan, User};
