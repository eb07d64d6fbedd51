//! User domain entities.

pub mod model;
pub mod plan;

pub use model::User;
pub use plan::Plan;
