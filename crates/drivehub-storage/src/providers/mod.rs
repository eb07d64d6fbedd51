//! Blob storage provider implementations.

pub mod local;
pub mod memory;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalBlobStorage;
pub use memory::MemoryBlobStorage;
#[cfg(feature = "s3")]
pub use s3::S3BlobStorage;

use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;

/// Reject keys that could escape the storage namespace.
pub(crate) fn validate_key(key: &str) -> AppResult<()> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|seg| seg == "..") {
        return Err(AppError::invalid_operation(format!(
            "Invalid storage key: '{key}'"
        )));
    }
    Ok(())
}

/// Last path segment of a key, used as the download file name.
pub(crate) fn file_name_of(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}
