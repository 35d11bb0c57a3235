//! Per-key outcome collection.

use crate::cell::{result_cell, Pending, Publisher};
use crate::error::{AggregateError, Cause, WorkerError};
use crate::Key;
use hashbrown::hash_map::{Entry, HashMap};
use parking_lot::Mutex;

/// Errors raised while registering slots.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectorError<K> {
    /// A slot for this key already exists.
    #[error("an outcome slot for {key} is already registered")]
    DuplicateKey {
        /// The key that was registered twice.
        key: K,
    },
}

/// Collects exactly one outcome per registered key.
///
/// The orchestrator registers one [`Slot`] per worker and hands the slot to
/// that worker. Once every worker is done, [`drain_all`](Self::drain_all)
/// turns all outcomes into a single result: `Ok(())` if every worker
/// succeeded, otherwise an [`AggregateError`] naming each failed key.
///
/// Registering the same key twice is rejected with
/// [`CollectorError::DuplicateKey`]; the existing slot is left untouched.
///
/// # Examples
///
/// ```
/// use tenant_scale_core::ErrorCollector;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let collector: ErrorCollector<&str, String> = ErrorCollector::new();
///
/// collector.register("user0").unwrap().publish(Ok(()));
/// collector.register("user1").unwrap().publish(Err("volume not found".to_string()));
///
/// let err = collector.drain_all().await.unwrap_err();
/// assert_eq!(err.keys().collect::<Vec<_>>(), [&"user1"]);
/// # }
/// ```
#[derive(Debug)]
pub struct ErrorCollector<K, E> {
    slots: Mutex<HashMap<K, Pending<Result<(), Cause<E>>>>>,
}

impl<K: Key, E> ErrorCollector<K, E> {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a slot for `key` and returns its write side.
    pub fn register(&self, key: K) -> Result<Slot<K, E>, CollectorError<K>> {
        let mut slots = self.slots.lock();
        match slots.entry(key) {
            Entry::Occupied(entry) => Err(CollectorError::DuplicateKey {
                key: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                let (publisher, pending) = result_cell();
                let key = entry.key().clone();
                entry.insert(pending);
                Ok(Slot { key, publisher })
            }
        }
    }

    /// Number of registered, not yet drained slots.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns true if no slot is waiting to be drained.
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    /// Waits for every registered slot and combines the outcomes.
    ///
    /// Slots are taken out under the lock and awaited outside it, in ascending
    /// key order. Every slot is awaited even after a failure has been seen. A
    /// slot whose worker went away without publishing is reported as
    /// [`Cause::Unpublished`]. Afterwards the collector is empty.
    pub async fn drain_all(&self) -> Result<(), AggregateError<K, E>> {
        let mut slots: Vec<_> = std::mem::take(&mut *self.slots.lock())
            .into_iter()
            .collect();
        slots.sort_by(|(a, _), (b, _)| a.cmp(b));

        let total = slots.len();
        let mut failures = Vec::new();
        for (key, pending) in slots {
            match pending.wait().await {
                Some(Ok(())) => {}
                Some(Err(cause)) => failures.push(WorkerError::new(key, cause)),
                None => failures.push(WorkerError::new(key, Cause::Unpublished)),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregateError::new(failures, total))
        }
    }
}

impl<K: Key, E> Default for ErrorCollector<K, E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Write side of one registered key.
///
/// Owned by exactly one worker; [`publish`](Self::publish) consumes it.
#[derive(Debug)]
pub struct Slot<K, E> {
    key: K,
    publisher: Publisher<Result<(), Cause<E>>>,
}

impl<K, E> Slot<K, E> {
    /// The key this slot was registered for.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Publishes this worker's outcome.
    pub fn publish(self, outcome: Result<(), E>) {
        self.publisher.publish(outcome.map_err(Cause::Failed));
    }

    /// Publishes a failure with an explicit cause.
    ///
    /// Used by outcome policies that fail a worker for a reason other than
    /// the error its work returned.
    pub fn fail(self, cause: Cause<E>) {
        self.publisher.publish(Err(cause));
    }
}
