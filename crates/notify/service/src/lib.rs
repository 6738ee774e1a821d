//! Notification Service Layer
//!
//! Batch dispatch pipeline: bounded-concurrency delivery, outcome
//! aggregation, invalid-token pruning and status finalization.

mod aggregate;
mod dispatch;
mod error;
mod finalize;
mod prune;
mod queue;

#[cfg(test)]
mod testing;

pub use aggregate::*;
pub use dispatch::*;
pub use error::*;
pub use finalize::*;
pub use prune::*;
pub use queue::*;
