//! Download references and folder archive manifests.

pub mod service;

pub use service::{DownloadLink, DownloadService, FolderManifest, ManifestEntry};
