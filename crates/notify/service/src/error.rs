//! Dispatch errors.

/// Errors surfaced to job submitters.
///
/// Per-batch delivery failures never appear here; they are counted.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The job has an empty recipient list.
    #[error("no device token found")]
    NoRecipients,

    /// The Pending status record could not be created.
    #[error("failed to record notification status: {0:#}")]
    Submit(color_eyre::eyre::Report),

    /// The terminal status write failed.
    #[error("failed to finalize notification status: {0:#}")]
    Finalize(color_eyre::eyre::Report),
}
