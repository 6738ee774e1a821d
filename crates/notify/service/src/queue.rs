//! Concurrency-limited dispatch queue.

use std::sync::Arc;

use notify_core::{BatchOutcome, NotificationPayload};
use notify_push::Pusher;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;

/// Default number of provider calls in flight.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Runs one task per batch, bounding the number of in-flight provider calls.
///
/// The limiter is built eagerly so the queue is ready before first use.
#[derive(Debug)]
pub struct DispatchQueue {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl DispatchQueue {
    /// Create a queue allowing `concurrency` outstanding calls (minimum 1).
    pub fn new(concurrency: usize) -> Self {
        let concurrency = concurrency.max(1);

        Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Send every batch and forward each outcome to `outcomes`.
    ///
    /// Returns once every batch has settled. Batches settle in any order and a
    /// failed batch never cancels its siblings. Exactly one outcome is sent per
    /// batch; a task that dies without reporting is counted as a failed batch.
    pub async fn dispatch<P>(
        &self,
        job_id: &str,
        pusher: Arc<P>,
        payload: Arc<NotificationPayload>,
        batches: Vec<Vec<String>>,
        outcomes: mpsc::Sender<BatchOutcome>,
    ) -> usize
    where
        P: Pusher + 'static,
    {
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        let mut settled = vec![false; batches.len()];
        let mut tasks = JoinSet::new();

        for (index, batch) in batches.into_iter().enumerate() {
            let semaphore = Arc::clone(&self.semaphore);
            let pusher = Arc::clone(&pusher);
            let payload = Arc::clone(&payload);
            let outcomes = outcomes.clone();
            let job_id = job_id.to_string();

            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => pusher.send(&batch, &payload).await,
                    Err(_) => BatchOutcome::failed(batch.len()),
                };

                if outcome.total() != batch.len() {
                    tracing::warn!(
                        job_id = %job_id,
                        batch = index,
                        batch_size = batch.len(),
                        accounted = outcome.total(),
                        "batch outcome does not cover every token"
                    );
                }

                tracing::debug!(
                    job_id = %job_id,
                    batch = index,
                    batch_size = batch.len(),
                    success = outcome.success_count,
                    failure = outcome.failure_count,
                    invalid = outcome.invalid_tokens.len(),
                    "batch settled"
                );

                if outcomes.send(outcome).await.is_err() {
                    tracing::error!(job_id = %job_id, batch = index, "outcome receiver dropped");
                }

                index
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(index) => settled[index] = true,
                Err(e) => tracing::error!(job_id = %job_id, error = %e, "batch task aborted"),
            }
        }

        for (index, _) in settled.iter().enumerate().filter(|(_, done)| !**done) {
            tracing::warn!(job_id = %job_id, batch = index, "counting unreported batch as failed");
            if outcomes.send(BatchOutcome::failed(sizes[index])).await.is_err() {
                tracing::error!(job_id = %job_id, batch = index, "outcome receiver dropped");
            }
        }

        sizes.len()
    }
}
