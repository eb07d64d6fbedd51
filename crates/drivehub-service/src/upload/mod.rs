//! Upload initiation, confirmation, and content replacement.

pub mod paths;
pub mod service;

pub use paths::{BulkPathResolver, BulkResolution, PlannedUpload, UploadFile};
pub use service::{
    ConfirmUploadRequest, InitUploadBulkRequest, InitUploadRequest, InitUploadResponse,
    UploadService,
};
