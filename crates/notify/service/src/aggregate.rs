//! Result aggregation.

use std::collections::BTreeSet;

use notify_core::{BatchOutcome, JobTotals};
use tokio::sync::mpsc;

/// Job-level totals folded from per-batch outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub totals: JobTotals,
    /// Union of every batch's permanently invalid tokens.
    pub invalid_tokens: BTreeSet<String>,
    /// Number of outcomes folded.
    pub batches: usize,
}

impl Aggregation {
    /// Fold one outcome. Commutative: completion order does not matter.
    pub fn record(&mut self, outcome: BatchOutcome) {
        self.totals.record(&outcome);
        self.invalid_tokens.extend(outcome.invalid_tokens);
        self.batches += 1;
    }
}

/// Sole owner of a job's totals while its batches are in flight.
#[derive(Debug)]
pub struct ResultAggregator {
    outcomes: mpsc::Receiver<BatchOutcome>,
}

impl ResultAggregator {
    /// Create an aggregator and the sender batch tasks report through.
    pub fn channel(capacity: usize) -> (mpsc::Sender<BatchOutcome>, Self) {
        let (tx, outcomes) = mpsc::channel(capacity.max(1));
        (tx, Self { outcomes })
    }

    /// Consume outcomes until every sender is dropped.
    pub async fn run(mut self) -> Aggregation {
        let mut aggregation = Aggregation::default();

        while let Some(outcome) = self.outcomes.recv().await {
            aggregation.record(outcome);
        }

        aggregation
    }
}
