//! # drivehub-core
//!
//! Core crate for DriveHub. Contains the collaborator traits (cache, blob
//! storage, token verification), configuration schemas, and the unified
//! error system.
//!
//! This crate has **no** internal dependencies on other DriveHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
