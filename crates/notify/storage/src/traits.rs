//! Storage traits.

use notify_core::{DeviceToken, NotificationStatus, Platform};

/// Device registry operations.
pub trait DeviceRegistry: Send + Sync {
    /// Register a token, replacing any previous token for the subscriber/platform pair.
    fn register(&self, device: &DeviceToken) -> color_eyre::eyre::Result<()>;

    /// Get tokens owned by the given subscribers.
    fn tokens_for_subscribers(&self, subscriber_ids: &[&str]) -> color_eyre::eyre::Result<Vec<String>>;

    /// Get every registered token.
    fn all_tokens(&self) -> color_eyre::eyre::Result<Vec<String>>;

    /// Get the device registered for a subscriber on a platform.
    fn get_device(
        &self,
        subscriber_id: &str,
        platform: Platform,
    ) -> color_eyre::eyre::Result<Option<DeviceToken>>;

    /// Delete every record whose token is in `tokens`. Returns the number deleted.
    fn delete_tokens(&self, tokens: &[&str]) -> color_eyre::eyre::Result<usize>;
}

/// Notification status operations.
pub trait StatusStore: Send + Sync {
    /// Store a new Pending status record.
    fn create_pending(&self, status: &NotificationStatus) -> color_eyre::eyre::Result<()>;

    /// Write final counts and mark Done.
    ///
    /// Only a Pending record is updated; returns whether a write happened.
    fn finalize(
        &self,
        job_id: &str,
        successful_count: i64,
        failed_count: i64,
    ) -> color_eyre::eyre::Result<bool>;

    /// Get a status record by job ID.
    fn get_status(&self, job_id: &str) -> color_eyre::eyre::Result<Option<NotificationStatus>>;
}

/// Combined storage trait.
pub trait AllStorage: DeviceRegistry + StatusStore {}

impl<T> AllStorage for T where T: DeviceRegistry + StatusStore {}
