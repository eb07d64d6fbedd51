//! # drivehub-storage
//!
//! Blob storage provider implementations for DriveHub. Supports the local
//! filesystem, an in-process map, and S3-compatible object stores.

pub mod manager;
pub mod providers;

pub use manager::BlobStorageManager;
pub use providers::{LocalBlobStorage, MemoryBlobStorage};
