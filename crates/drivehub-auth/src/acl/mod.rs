//! Access checks with grant inheritance down the resource tree.

pub mod resolver;

pub use resolver::{Capability, PermissionResolver};
