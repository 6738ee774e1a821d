//! Push Delivery
//!
//! Multicast push delivery against the provider's batch endpoint.

mod multicast;
mod traits;
mod wire;

pub use multicast::*;
pub use traits::*;
pub use wire::*;
