//! Job orchestration.

use std::fmt;
use std::sync::Arc;

use color_eyre::eyre::WrapErr as _;
use notify_core::{JobTotals, NotificationJob, NotificationPayload, NotificationStatus, clamp_batch_size};
use notify_push::Pusher;
use notify_storage::AllStorage;
use tokio::task::JoinHandle;

use crate::{DispatchError, DispatchQueue, Pruner, ResultAggregator, StatusFinalizer};

/// Lifecycle of one job inside the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Submitted,
    Splitting,
    Dispatching,
    Draining,
    Pruning,
    Finalized,
}

impl fmt::Display for JobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobPhase::Submitted => "submitted",
            JobPhase::Splitting => "splitting",
            JobPhase::Dispatching => "dispatching",
            JobPhase::Draining => "draining",
            JobPhase::Pruning => "pruning",
            JobPhase::Finalized => "finalized",
        };
        f.write_str(name)
    }
}

/// Final result of a job run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job_id: String,
    pub batches: usize,
    pub totals: JobTotals,
    /// Registry records removed for permanently invalid tokens.
    pub pruned: usize,
}

/// Handle to a job queued in the background.
#[derive(Debug)]
pub struct SubmittedJob {
    pub job_id: String,
    pub recipients: usize,
    pub batches: usize,
    pub handle: JoinHandle<Result<JobReport, DispatchError>>,
}

/// Push notification batch dispatcher.
pub struct DispatchService<S, P> {
    store: S,
    pusher: Arc<P>,
    queue: Arc<DispatchQueue>,
    batch_size: usize,
}

impl<S: Clone, P> Clone for DispatchService<S, P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            pusher: Arc::clone(&self.pusher),
            queue: Arc::clone(&self.queue),
            batch_size: self.batch_size,
        }
    }
}

impl<S, P> DispatchService<S, P>
where
    S: AllStorage + Clone + 'static,
    P: Pusher + 'static,
{
    /// Create a dispatcher. The pusher is constructed by the caller.
    pub fn new(store: S, pusher: P, queue: DispatchQueue) -> Self {
        Self {
            store,
            pusher: Arc::new(pusher),
            queue: Arc::new(queue),
            batch_size: notify_core::MAX_MULTICAST_TOKENS,
        }
    }

    /// Batch size applied to jobs built by [`Self::new_job`].
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = clamp_batch_size(batch_size).get();
        self
    }

    /// Effective batch size, after clamping to the provider limit.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Build a job using the configured batch size.
    pub fn new_job(&self, payload: NotificationPayload, tokens: Vec<String>) -> NotificationJob {
        NotificationJob::new(payload, tokens).with_batch_size(self.batch_size)
    }

    /// Resolve recipient tokens; every registered token when `subscriber_ids` is empty.
    pub fn resolve_recipients(&self, subscriber_ids: &[String]) -> color_eyre::eyre::Result<Vec<String>> {
        if subscriber_ids.is_empty() {
            return self.store.all_tokens().wrap_err("failed to load device tokens");
        }

        let ids: Vec<&str> = subscriber_ids.iter().map(String::as_str).collect();
        self.store
            .tokens_for_subscribers(&ids)
            .wrap_err("failed to load subscriber tokens")
    }

    /// Record a Pending status for `job` and queue it.
    ///
    /// Rejects an empty recipient list before anything is written.
    pub fn accept(&self, job: NotificationJob) -> Result<SubmittedJob, DispatchError> {
        if !job.has_recipients() {
            return Err(DispatchError::NoRecipients);
        }

        self.store
            .create_pending(&NotificationStatus::pending(&job))
            .map_err(DispatchError::Submit)?;

        self.submit(job)
    }

    /// Queue `job` for background dispatch.
    pub fn submit(&self, job: NotificationJob) -> Result<SubmittedJob, DispatchError> {
        if !job.has_recipients() {
            return Err(DispatchError::NoRecipients);
        }

        let job_id = job.id().to_string();
        let recipients = job.tokens().len();
        let batches = job.batch_count();

        tracing::info!(job_id = %job_id, recipients, batches, "notification job queued");

        let service = self.clone();
        let handle = tokio::spawn(async move {
            let result = service.run(job).await;
            if let Err(e) = &result {
                tracing::error!(error = %e, "notification job failed");
            }
            result
        });

        Ok(SubmittedJob {
            job_id,
            recipients,
            batches,
            handle,
        })
    }

    /// Run the full pipeline for `job` and wait for it to finish.
    pub async fn run(&self, job: NotificationJob) -> Result<JobReport, DispatchError> {
        let job_id = job.id().to_string();
        tracing::debug!(job_id = %job_id, phase = %JobPhase::Submitted, "job phase");

        if !job.has_recipients() {
            return Err(DispatchError::NoRecipients);
        }

        tracing::debug!(job_id = %job_id, phase = %JobPhase::Splitting, "job phase");
        let batches = job.batches();
        let payload = Arc::new(job.payload().clone());

        tracing::debug!(
            job_id = %job_id,
            phase = %JobPhase::Dispatching,
            batches = batches.len(),
            concurrency = self.queue.concurrency(),
            "job phase"
        );
        let (outcomes, aggregator) = ResultAggregator::channel(self.queue.concurrency());
        let (dispatched, aggregation) = tokio::join!(
            async {
                let count = self
                    .queue
                    .dispatch(&job_id, Arc::clone(&self.pusher), payload, batches, outcomes)
                    .await;
                tracing::debug!(job_id = %job_id, phase = %JobPhase::Draining, "job phase");
                count
            },
            aggregator.run()
        );

        tracing::debug!(
            job_id = %job_id,
            phase = %JobPhase::Pruning,
            invalid = aggregation.invalid_tokens.len(),
            "job phase"
        );
        let pruner = Pruner::new(self.store.clone());
        let invalid_tokens = aggregation.invalid_tokens;
        let pruned = match tokio::task::spawn_blocking(move || pruner.prune(&invalid_tokens))
            .await
            .wrap_err("pruning task panicked")
            .and_then(|pruned| pruned)
        {
            Ok(pruned) => pruned,
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %format!("{e:#}"), "pruning failed");
                0
            }
        };

        let finalizer = StatusFinalizer::new(self.store.clone());
        let totals = aggregation.totals;
        let finalize_id = job_id.clone();
        tokio::task::spawn_blocking(move || finalizer.finalize(&finalize_id, &totals))
            .await
            .wrap_err("finalize task panicked")
            .and_then(|written| written)
            .map_err(DispatchError::Finalize)?;
        tracing::debug!(job_id = %job_id, phase = %JobPhase::Finalized, "job phase");

        Ok(JobReport {
            job_id,
            batches: dispatched,
            totals,
            pruned,
        })
    }
}
