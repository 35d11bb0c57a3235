//! Bounded polling for tenant-scale rounds.
//!
//! A [`BoundedPoller`] runs a check every period until the check reports
//! [`Step::Done`], returns an error, or the timeout passes. It is used to wait
//! for an externally observed condition to clear, such as a volume still
//! being attached, before a destructive call is made.
//!
//! # States
//!
//! - **Continue**: the check wants to keep waiting; sleep one period and check again
//! - **Done**: the check is satisfied; the poll succeeds
//! - **Failed**: the check returned an error; it is propagated immediately
//! - **TimedOut**: the deadline passed before the next check
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use tenant_scale_poller::{BoundedPoller, PollerConfig, Step};
//!
//! # #[tokio::main(flavor = "current_thread", start_paused = true)]
//! # async fn main() {
//! let poller = BoundedPoller::new(
//!     PollerConfig::builder()
//!         .timeout(Duration::from_secs(5))
//!         .period(Duration::from_secs(1))
//!         .name("detach")
//!         .build(),
//! );
//!
//! let mut remaining = 2;
//! let summary = poller
//!     .wait(|| {
//!         remaining -= 1;
//!         let attached = remaining > 0;
//!         async move { Ok::<_, std::io::Error>(Step::continue_if(attached)) }
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(summary.attempts, 2);
//! # }
//! ```
//!
//! The poller is single-purpose: one logical caller per wait, no shared
//! state, and no cancellation other than the timeout.

mod config;
mod error;
mod events;

pub use config::{PollerConfig, PollerConfigBuilder};
pub use error::PollError;
pub use events::PollerEvent;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

#[cfg(feature = "metrics")]
static METRICS_INIT: std::sync::Once = std::sync::Once::new();

/// What a single check decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep waiting.
    Continue,
    /// Stop waiting; the poll succeeds.
    Done,
}

impl Step {
    /// `Continue` while `condition` holds, `Done` once it clears.
    pub fn continue_if(condition: bool) -> Self {
        if condition {
            Step::Continue
        } else {
            Step::Done
        }
    }
}

/// Result of a successful poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    /// Number of checks performed, including the one that reported done.
    pub attempts: usize,
    /// Time from the start of the wait to the check that reported done.
    pub elapsed: Duration,
}

/// Runs a check periodically until it completes, fails or times out.
#[derive(Clone, Debug)]
pub struct BoundedPoller {
    config: Arc<PollerConfig>,
}

impl BoundedPoller {
    /// Creates a poller from `config`.
    pub fn new(config: PollerConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            METRICS_INIT.call_once(|| {
                describe_counter!(
                    "poller_checks_total",
                    "Total number of checks run by bounded pollers"
                );
                describe_counter!(
                    "poller_results_total",
                    "Total number of bounded polls by terminal result (done, failed, timeout)"
                );
            });
        }

        Self {
            config: Arc::new(config),
        }
    }

    /// Returns the poller configuration.
    pub fn config(&self) -> &PollerConfig {
        &self.config
    }

    /// Runs `check` until it reports [`Step::Done`].
    ///
    /// The deadline is tested before every check, so a zero timeout times out
    /// without checking at all, and the check is never invoked again after it
    /// has returned `Done` or an error.
    pub async fn wait<F, Fut, E>(&self, mut check: F) -> Result<PollSummary, PollError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Step, E>>,
    {
        let config = &self.config;
        let start = Instant::now();
        // A timeout past the end of the clock never expires.
        let deadline = start.checked_add(config.timeout);
        let mut attempts = 0;

        loop {
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                let elapsed = start.elapsed();

                #[cfg(feature = "metrics")]
                counter!("poller_results_total", "poller" => config.name.clone(), "result" => "timeout")
                    .increment(1);

                #[cfg(feature = "tracing")]
                warn!(poller = %config.name, attempts, timeout_ms = config.timeout.as_millis() as u64, "Poll timed out");

                config.event_listeners.emit(&PollerEvent::TimedOut {
                    pattern_name: config.name.clone(),
                    timestamp: std::time::Instant::now(),
                    attempts,
                    elapsed,
                });
                return Err(PollError::TimedOut {
                    name: config.name.clone(),
                    timeout: config.timeout,
                    attempts,
                });
            }

            attempts += 1;

            #[cfg(feature = "metrics")]
            counter!("poller_checks_total", "poller" => config.name.clone()).increment(1);

            match check().await {
                Ok(Step::Done) => {
                    let elapsed = start.elapsed();

                    #[cfg(feature = "metrics")]
                    counter!("poller_results_total", "poller" => config.name.clone(), "result" => "done")
                        .increment(1);

                    #[cfg(feature = "tracing")]
                    debug!(poller = %config.name, attempts, elapsed_ms = elapsed.as_millis() as u64, "Poll done");

                    config.event_listeners.emit(&PollerEvent::Done {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        attempts,
                        elapsed,
                    });
                    return Ok(PollSummary { attempts, elapsed });
                }
                Ok(Step::Continue) => {
                    #[cfg(feature = "tracing")]
                    debug!(poller = %config.name, attempt = attempts, "Condition holds, waiting");

                    config.event_listeners.emit(&PollerEvent::Continued {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        attempt: attempts,
                    });
                    tokio::time::sleep(config.period).await;
                }
                Err(err) => {
                    #[cfg(feature = "metrics")]
                    counter!("poller_results_total", "poller" => config.name.clone(), "result" => "failed")
                        .increment(1);

                    #[cfg(feature = "tracing")]
                    debug!(poller = %config.name, attempts, "Check failed");

                    config.event_listeners.emit(&PollerEvent::Failed {
                        pattern_name: config.name.clone(),
                        timestamp: std::time::Instant::now(),
                        attempts,
                    });
                    return Err(PollError::Failed(err));
                }
            }
        }
    }
}

/// Polls `check` every `period` until it reports done, fails, or `timeout`
/// passes.
///
/// Shorthand for a [`BoundedPoller`] with an unnamed default configuration.
pub async fn poll_until<F, Fut, E>(
    timeout: Duration,
    period: Duration,
    check: F,
) -> Result<PollSummary, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Step, E>>,
{
    BoundedPoller::new(
        PollerConfig::builder()
            .timeout(timeout)
            .period(period)
            .build(),
    )
    .wait(check)
    .await
}
