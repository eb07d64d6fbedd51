//! Scheduled sweep for DriveHub.
//!
//! This crate provides:
//! - The sweep: permanent removal of soft-deleted subtrees and of blobs no
//!   resource references
//! - A cron scheduler that runs both passes on configurable schedules

pub mod jobs;
pub mod scheduler;
pub mod sweep;

pub use jobs::{OrphanReport, PurgeReport};
pub use scheduler::CronScheduler;
pub use sweep::Sweep;
