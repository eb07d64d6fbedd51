//! Share grants on resources.

pub mod service;

pub use service::{ShareOutcome, ShareRequest, ShareService};
