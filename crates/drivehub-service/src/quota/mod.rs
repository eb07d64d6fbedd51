//! Per-plan storage ceilings and usage accounting.

pub mod tracker;

pub use tracker::QuotaTracker;
