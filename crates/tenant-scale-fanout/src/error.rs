//! Orchestration errors for fan-out rounds.

use tenant_scale_core::CollectorError;

/// A round that could not be started.
///
/// These are raised before any worker is spawned. Failures of the workers
/// themselves are reported through the round's
/// [`AggregateError`](tenant_scale_core::AggregateError).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FanOutError<K> {
    /// The same key was supplied twice.
    #[error("key {key} appears more than once in the round")]
    DuplicateKey {
        /// The repeated key.
        key: K,
    },
    /// A cross-check round found no key other than this one.
    #[error("failed to find a key other than {key} in the snapshot")]
    NoOtherKey {
        /// The key left without a counterpart.
        key: K,
    },
}

impl<K> From<CollectorError<K>> for FanOutError<K> {
    fn from(err: CollectorError<K>) -> Self {
        match err {
            CollectorError::DuplicateKey { key } => FanOutError::DuplicateKey { key },
        }
    }
}
