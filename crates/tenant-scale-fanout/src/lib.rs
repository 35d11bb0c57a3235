//! Parallel fan-out rounds with per-key outcome collection.
//!
//! A round runs one unit of work per key in its own task, waits for every
//! task, and reports a single outcome: success if every worker succeeded,
//! otherwise an [`AggregateError`](tenant_scale_core::AggregateError) naming
//! each failed key. Values produced by successful workers are collected into
//! a [`Snapshot`](tenant_scale_core::Snapshot) that later rounds can read.
//!
//! # How It Works
//!
//! 1. One outcome slot is registered per key before anything is spawned
//! 2. Each worker runs its unit of work, stores its value, then publishes
//! 3. The round joins every task and drains all slots
//! 4. The [`OutcomePolicy`] decides whether a denial counts as success
//!
//! # Example
//!
//! ```rust
//! use tenant_scale_core::ErrorClass;
//! use tenant_scale_fanout::{FanOut, FanOutConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let fanout = FanOut::new(FanOutConfig::builder().name("create").build());
//!
//! let report = fanout
//!     .run(["user0", "user1", "user2"], |user| async move {
//!         Ok::<_, ErrorClass>(format!("vol-{user}"))
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(report.is_success());
//! assert_eq!(report.values().get(&"user1"), Some(&"vol-user1".to_string()));
//! # }
//! ```
//!
//! # Cross-check rounds
//!
//! [`FanOut::run_cross`] hands each worker a different key's value, which is
//! how negative authorization checks are run: every identity tries to touch
//! a resource owned by someone else, under [`OutcomePolicy::ExpectDenied`].
//!
//! ```rust
//! use tenant_scale_core::{ErrorClass, Snapshot};
//! use tenant_scale_fanout::{FanOut, FanOutConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let owned: Snapshot<&str, &str> = [("user0", "vol-a"), ("user1", "vol-b")].into_iter().collect();
//! let fanout = FanOut::new(FanOutConfig::builder().expect_denied().build());
//!
//! let report = fanout
//!     .run_cross(&owned, |_target| async move {
//!         Err::<(), _>(ErrorClass::PermissionDenied)
//!     })
//!     .await
//!     .unwrap();
//!
//! assert!(report.is_success());
//! assert_eq!(report.remapped().len(), 2);
//! # }
//! ```

mod config;
mod cross;
mod error;
mod events;
mod executor;
mod policy;
mod report;

pub use config::{FanOutConfig, FanOutConfigBuilder};
pub use cross::{cross_assign, CrossTarget};
pub use error::FanOutError;
pub use events::FanOutEvent;
pub use executor::{CurrentRuntime, Executor};
pub use policy::{OutcomePolicy, Verdict};
pub use report::RoundReport;

use futures::future::join_all;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tenant_scale_core::{Classify, ErrorCollector, Key, KeyedStore, Slot, Snapshot};
use tower::{Service, ServiceExt};

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
static METRICS_INIT: std::sync::Once = std::sync::Once::new();

/// Runs rounds of parallel workers, one per key.
///
/// `FanOut` is cheap to clone; clones share the configuration.
pub struct FanOut<X = CurrentRuntime> {
    config: Arc<FanOutConfig>,
    executor: X,
}

impl<X: Clone> Clone for FanOut<X> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            executor: self.executor.clone(),
        }
    }
}

impl FanOut<CurrentRuntime> {
    /// Creates a fan-out that spawns workers on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called from outside a tokio runtime.
    pub fn new(config: FanOutConfig) -> Self {
        Self::with_executor(config, CurrentRuntime::new())
    }
}

impl<X: Executor> FanOut<X> {
    /// Creates a fan-out that spawns workers through `executor`.
    pub fn with_executor(config: FanOutConfig, executor: X) -> Self {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "fanout_workers_total",
                    "Total number of fan-out workers by published outcome"
                );
                describe_histogram!(
                    "fanout_round_duration_seconds",
                    "Wall time of a fan-out round from first spawn to drained outcome"
                );
            });
        }

        Self {
            config: Arc::new(config),
            executor,
        }
    }

    /// The instance name used in events, logs and metric labels.
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// The outcome policy applied to every worker.
    pub fn policy(&self) -> OutcomePolicy {
        self.config.policy()
    }

    /// Runs `work` once per key in parallel and waits for all of them.
    ///
    /// Every key gets its outcome slot before the first task is spawned; a
    /// repeated key fails the round with [`FanOutError::DuplicateKey`] and
    /// nothing runs. An empty key set is an empty, successful round.
    ///
    /// Worker failures do not fail the call: they are reported through
    /// [`RoundReport::outcome`].
    pub async fn run<K, V, E, I, W, Fut>(
        &self,
        keys: I,
        work: W,
    ) -> Result<RoundReport<K, V, E>, FanOutError<K>>
    where
        K: Key,
        V: Clone + Send + Sync + 'static,
        E: Classify + fmt::Display + Send + 'static,
        I: IntoIterator<Item = K>,
        W: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let inputs = keys.into_iter().map(|key| (key.clone(), key)).collect();
        self.round(inputs, work).await
    }

    /// Runs `work` once per key of `snapshot`, each worker receiving a
    /// different key's value.
    ///
    /// All targets are computed before anything is spawned. A snapshot with
    /// a single key fails with [`FanOutError::NoOtherKey`].
    pub async fn run_cross<K, T, V, E, W, Fut>(
        &self,
        snapshot: &Snapshot<K, T>,
        work: W,
    ) -> Result<RoundReport<K, V, E>, FanOutError<K>>
    where
        K: Key,
        T: Clone,
        V: Clone + Send + Sync + 'static,
        E: Classify + fmt::Display + Send + 'static,
        W: FnMut(CrossTarget<K, T>) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let inputs = cross_assign(snapshot)?
            .into_iter()
            .map(|target| (target.key.clone(), target))
            .collect();
        self.round(inputs, work).await
    }

    /// Calls a clone of `service` once per key in parallel.
    pub async fn run_service<K, S, I>(
        &self,
        keys: I,
        service: S,
    ) -> Result<RoundReport<K, S::Response, S::Error>, FanOutError<K>>
    where
        K: Key,
        I: IntoIterator<Item = K>,
        S: Service<K> + Clone + Send + 'static,
        S::Response: Clone + Send + Sync + 'static,
        S::Error: Classify + fmt::Display + Send + 'static,
        S::Future: Send + 'static,
    {
        self.run(keys, move |key| service.clone().oneshot(key)).await
    }

    async fn round<K, T, V, E, W, Fut>(
        &self,
        inputs: Vec<(K, T)>,
        mut work: W,
    ) -> Result<RoundReport<K, V, E>, FanOutError<K>>
    where
        K: Key,
        V: Clone + Send + Sync + 'static,
        E: Classify + fmt::Display + Send + 'static,
        W: FnMut(T) -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let collector = ErrorCollector::new();
        let mut jobs = Vec::with_capacity(inputs.len());
        for (key, input) in inputs {
            jobs.push((collector.register(key)?, input));
        }

        let workers = jobs.len();
        let values = Arc::new(KeyedStore::new());
        let remapped = Arc::new(KeyedStore::new());
        let started = Instant::now();

        #[cfg(feature = "tracing")]
        debug!(fanout = %self.config.name, workers, "Starting round");

        let handles: Vec<_> = jobs
            .into_iter()
            .map(|(slot, input)| {
                let worker = Worker {
                    config: Arc::clone(&self.config),
                    values: Arc::clone(&values),
                    remapped: Arc::clone(&remapped),
                };
                self.executor.spawn(worker.drive(slot, work(input)))
            })
            .collect();

        for joined in join_all(handles).await {
            if let Err(err) = joined {
                #[cfg(feature = "tracing")]
                warn!(fanout = %self.config.name, error = %err, "Worker task ended without publishing");
                #[cfg(not(feature = "tracing"))]
                let _ = err;
            }
        }

        let outcome = collector.drain_all().await;
        let elapsed = started.elapsed();
        let failures = outcome.as_ref().err().map_or(0, |err| err.len());

        #[cfg(feature = "metrics")]
        histogram!("fanout_round_duration_seconds", "fanout" => self.config.name.clone())
            .record(elapsed.as_secs_f64());

        #[cfg(feature = "tracing")]
        info!(
            fanout = %self.config.name,
            workers,
            failures,
            elapsed_ms = elapsed.as_millis() as u64,
            "Round completed"
        );

        self.config
            .event_listeners
            .emit(&FanOutEvent::RoundCompleted {
                pattern_name: self.config.name.clone(),
                timestamp: Instant::now(),
                workers,
                failures,
                duration: elapsed,
            });

        Ok(RoundReport {
            values: values.snapshot(),
            remapped: remapped.snapshot(),
            outcome,
            workers,
            elapsed,
        })
    }
}

impl<X> fmt::Debug for FanOut<X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanOut")
            .field("name", &self.config.name)
            .field("policy", &self.config.policy)
            .finish()
    }
}

/// State shared between one round and its workers.
struct Worker<K, V> {
    config: Arc<FanOutConfig>,
    values: Arc<KeyedStore<K, V>>,
    remapped: Arc<KeyedStore<K, String>>,
}

impl<K: Key, V: Clone> Worker<K, V> {
    /// Runs one unit of work and publishes its outcome.
    ///
    /// The value is stored before the outcome is published, so anything that
    /// observes the drained outcome also observes the value.
    async fn drive<E, Fut>(self, slot: Slot<K, E>, work: Fut)
    where
        E: Classify + fmt::Display,
        Fut: Future<Output = Result<V, E>>,
    {
        let started = Instant::now();
        let result = work.await;
        let duration = started.elapsed();

        let key = slot.key().clone();
        let result = result.map(|value| self.values.put(key.clone(), value));
        let name = &self.config.name;

        match self.config.policy.judge(result) {
            Verdict::Success => {
                #[cfg(feature = "metrics")]
                counter!("fanout_workers_total", "fanout" => name.clone(), "outcome" => "success")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(fanout = %name, key = %key, "Worker succeeded");

                self.config
                    .event_listeners
                    .emit(&FanOutEvent::WorkerSucceeded {
                        pattern_name: name.clone(),
                        timestamp: Instant::now(),
                        key: key.to_string(),
                        duration,
                    });
                slot.publish(Ok(()));
            }
            Verdict::Remapped(err) => {
                self.remapped.put(key.clone(), err.to_string());

                #[cfg(feature = "metrics")]
                counter!("fanout_workers_total", "fanout" => name.clone(), "outcome" => "remapped")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(fanout = %name, key = %key, error = %err, "Permission denied as expected");

                self.config
                    .event_listeners
                    .emit(&FanOutEvent::DenialRemapped {
                        pattern_name: name.clone(),
                        timestamp: Instant::now(),
                        key: key.to_string(),
                    });
                slot.publish(Ok(()));
            }
            Verdict::Failure(cause) => {
                let class = cause.error().map(Classify::class);

                #[cfg(feature = "metrics")]
                counter!("fanout_workers_total", "fanout" => name.clone(), "outcome" => "failure")
                    .increment(1);

                #[cfg(feature = "tracing")]
                debug!(fanout = %name, key = %key, error = %cause, "Worker failed");

                self.config
                    .event_listeners
                    .emit(&FanOutEvent::WorkerFailed {
                        pattern_name: name.clone(),
                        timestamp: Instant::now(),
                        key: key.to_string(),
                        duration,
                        class,
                    });
                slot.fail(cause);
            }
        }
    }
}
