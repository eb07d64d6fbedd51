//! # drivehub-service
//!
//! Business logic service layer for DriveHub. Each service orchestrates
//! the resource and user stores, the tree cache, blob storage, and the
//! permission resolver to implement application-level use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod download;
pub mod folder;
pub mod quota;
pub mod registry;
pub mod resource;
pub mod share;
pub mod upload;
pub mod user;
pub mod validation;

pub use context::RequestContext;
pub use download::DownloadService;
pub use folder::{FolderService, TreeCache, TreeService};
pub use quota::QuotaTracker;
pub use registry::Services;
pub use resource::MutationService;
pub use share::ShareService;
pub use upload::{BulkPathResolver, UploadService};
pub use user::{IdentityResolver, UserService};
