//! Mutation engine: move, copy, and delete over the resource forest.

pub mod copy;
pub mod mutation;

pub use copy::CopyRequest;
pub use mutation::{MoveRequest, MutationService};
