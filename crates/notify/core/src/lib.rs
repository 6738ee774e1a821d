//! Notification Core Types
//!
//! Domain types for the push notification batch dispatch pipeline.

mod batch;
mod device;
mod job;
mod outcome;
mod payload;
mod status;

pub use batch::*;
pub use device::*;
pub use job::*;
pub use outcome::*;
pub use payload::*;
pub use status::*;
