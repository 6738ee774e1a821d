//! Status finalization.

use color_eyre::eyre::WrapErr as _;
use notify_core::JobTotals;
use notify_storage::StatusStore;

/// Writes a job's terminal status.
#[derive(Debug, Clone)]
pub struct StatusFinalizer<S> {
    store: S,
}

impl<S: StatusStore> StatusFinalizer<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist final counts and mark the job Done.
    ///
    /// Returns false when no Pending record existed for `job_id`.
    pub fn finalize(&self, job_id: &str, totals: &JobTotals) -> color_eyre::eyre::Result<bool> {
        let written = self
            .store
            .finalize(job_id, totals.success as i64, totals.failure as i64)
            .wrap_err_with(|| format!("failed to finalize job {}", job_id))?;

        if written {
            tracing::info!(
                job_id = %job_id,
                total = totals.total(),
                success = totals.success,
                failure = totals.failure,
                "notification job finalized"
            );
        } else {
            tracing::warn!(job_id = %job_id, "no pending status record to finalize");
        }

        Ok(written)
    }
}
