//! Sweep passes.

pub mod orphan;
pub mod purge;

pub use orphan::OrphanReport;
pub use purge::PurgeReport;
