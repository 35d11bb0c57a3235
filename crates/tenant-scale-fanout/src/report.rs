//! Result of one fan-out round.

use std::time::Duration;
use tenant_scale_core::{AggregateError, Snapshot};

/// Everything a round produced.
///
/// `values` holds the value of every worker whose unit of work returned
/// `Ok`, independent of the outcome policy. `remapped` records every
/// permission denial that the policy published as success, keyed by worker,
/// with the rendered error, so the raw result of those calls is still
/// available after the round.
#[derive(Debug, Clone)]
pub struct RoundReport<K, V, E> {
    pub(crate) values: Snapshot<K, V>,
    pub(crate) remapped: Snapshot<K, String>,
    pub(crate) outcome: Result<(), AggregateError<K, E>>,
    pub(crate) workers: usize,
    pub(crate) elapsed: Duration,
}

impl<K: Ord, V, E> RoundReport<K, V, E> {
    /// Values produced by successful units of work.
    pub fn values(&self) -> &Snapshot<K, V> {
        &self.values
    }

    /// Denials published as success, with their rendered errors.
    pub fn remapped(&self) -> &Snapshot<K, String> {
        &self.remapped
    }

    /// The aggregated outcome of every worker.
    pub fn outcome(&self) -> &Result<(), AggregateError<K, E>> {
        &self.outcome
    }

    /// Returns true if no worker failed.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The failures of this round, if any.
    pub fn failures(&self) -> Option<&AggregateError<K, E>> {
        self.outcome.as_ref().err()
    }

    /// Number of workers spawned.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Wall time from the first spawn to the last drained outcome.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the produced values, or the aggregated failure.
    pub fn into_result(self) -> Result<Snapshot<K, V>, AggregateError<K, E>> {
        self.outcome.map(|()| self.values)
    }
}
