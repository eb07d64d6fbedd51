//! # drivehub-auth
//!
//! Authorization and authentication for DriveHub.
//!
//! ## Modules
//!
//! - `acl`: read/write/owner checks resolved by walking the ancestor chain
//!   for share grants
//! - `jwt`: bearer token issuance and verification

pub mod acl;
pub mod jwt;

pub use acl::{Capability, PermissionResolver};
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
