//! Collaborator traits defined in `drivehub-core` and implemented by other crates.

pub mod cache;
pub mod storage;
pub mod token;

pub use cache::CacheProvider;
pub use storage::{BlobMeta, BlobStorage, Disposition};
pub use token::TokenVerifier;
