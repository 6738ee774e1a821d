//! Per-batch outcomes and job totals.

/// Result of one multicast call. Produced once per batch, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    /// Tokens the provider reported as permanently invalid.
    pub invalid_tokens: Vec<String>,
}

impl BatchOutcome {
    /// Whole batch counted as failed; used when no provider response was received.
    pub fn failed(batch_len: usize) -> Self {
        Self {
            success_count: 0,
            failure_count: batch_len,
            invalid_tokens: Vec::new(),
        }
    }

    /// Number of tokens this outcome accounts for.
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }
}

/// Running totals for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct JobTotals {
    pub success: usize,
    pub failure: usize,
}

impl JobTotals {
    /// Fold a batch outcome into the totals.
    pub fn record(&mut self, outcome: &BatchOutcome) {
        self.success += outcome.success_count;
        self.failure += outcome.failure_count;
    }

    pub fn total(&self) -> usize {
        self.success + self.failure
    }
}
