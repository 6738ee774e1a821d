//! Push delivery traits.

use notify_core::{BatchOutcome, NotificationPayload};

/// Low-level multicast sender.
///
/// Implementations never fail: a call that receives no usable provider
/// response reports the whole batch as failed.
#[trait_variant::make(Send)]
pub trait Pusher: Send + Sync {
    /// Deliver `payload` to every token in `batch` with a single provider call.
    async fn send(&self, batch: &[String], payload: &NotificationPayload) -> BatchOutcome;
}
