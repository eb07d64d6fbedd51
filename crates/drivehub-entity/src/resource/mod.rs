//! Resource domain entities.

pub mod grant;
pub mod kind;
pub mod model;

pub use grant::{AccessLevel, Grant};
pub use kind::ResourceType;
pub use model::Resource;
