//! Notification job.

use std::num::NonZeroUsize;

use crate::{DEFAULT_BATCH_SIZE, NotificationPayload, batch_count, clamp_batch_size, split};

/// One logical notification-send request covering a full recipient list.
///
/// Immutable once built; the dispatcher takes ownership on submission.
#[derive(Debug, Clone)]
pub struct NotificationJob {
    id: String,
    payload: NotificationPayload,
    tokens: Vec<String>,
    batch_size: NonZeroUsize,
}

impl NotificationJob {
    /// Create a job with a fresh identifier and the default batch size.
    pub fn new(payload: NotificationPayload, tokens: Vec<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), payload, tokens)
    }

    /// Create a job with a caller-supplied identifier.
    pub fn with_id(id: impl Into<String>, payload: NotificationPayload, tokens: Vec<String>) -> Self {
        Self {
            id: id.into(),
            payload,
            tokens,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the batch size, clamped to the provider's multicast limit.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = clamp_batch_size(batch_size);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn payload(&self) -> &NotificationPayload {
        &self.payload
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub fn has_recipients(&self) -> bool {
        !self.tokens.is_empty()
    }

    /// Number of batches this job will be split into.
    pub fn batch_count(&self) -> usize {
        batch_count(self.tokens.len(), self.batch_size)
    }

    /// Split the recipient list into provider-sized batches.
    pub fn batches(&self) -> Vec<Vec<String>> {
        split(&self.tokens, self.batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_MULTICAST_TOKENS, NotificationCategory};

    fn payload() -> NotificationPayload {
        NotificationPayload::new("title", "body", NotificationCategory::General)
    }

    #[test]
    fn test_job_defaults() {
        let job = NotificationJob::new(payload(), vec!["a".into(), "b".into()]);
        assert_eq!(job.batch_size().get(), MAX_MULTICAST_TOKENS);
        assert_eq!(job.batch_count(), 1);
        assert!(job.has_recipients());
        assert!(uuid::Uuid::parse_str(job.id()).is_ok());
    }

    #[test]
    fn test_job_batch_size_clamped() {
        let tokens: Vec<String> = (0..1200).map(|i| i.to_string()).collect();
        let job = NotificationJob::with_id("job-1", payload(), tokens).with_batch_size(5000);

        assert_eq!(job.id(), "job-1");
        assert_eq!(job.batch_size().get(), MAX_MULTICAST_TOKENS);
        assert_eq!(job.batch_count(), 3);
        assert_eq!(job.batches().len(), 3);
    }

    #[test]
    fn test_job_without_recipients() {
        let job = NotificationJob::new(payload(), Vec::new());
        assert!(!job.has_recipients());
        assert_eq!(job.batch_count(), 0);
    }
}
