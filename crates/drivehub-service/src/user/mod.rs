//! User provisioning and identity resolution.

pub mod identity;
pub mod service;

pub use identity::IdentityResolver;
pub use service::{RegisterUserRequest, UserMatch, UserService};
