//! Folder listing, tree assembly, and the tree snapshot cache.

pub mod cache;
pub mod service;
pub mod tree;
pub mod walk;

pub use cache::TreeCache;
pub use service::{CreateFolderRequest, FolderService};
pub use tree::TreeService;
