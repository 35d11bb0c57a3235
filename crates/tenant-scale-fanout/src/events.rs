//! Event types for fan-out rounds.

use std::time::{Duration, Instant};
use tenant_scale_core::{ErrorClass, ScaleEvent};

/// Events emitted while a round runs.
#[derive(Debug, Clone)]
pub enum FanOutEvent {
    /// A worker's outcome was published as success.
    WorkerSucceeded {
        /// The name of the fan-out instance.
        pattern_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// The worker's key.
        key: String,
        /// How long the unit of work took.
        duration: Duration,
    },
    /// A worker's outcome was published as failure.
    WorkerFailed {
        /// The name of the fan-out instance.
        pattern_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// The worker's key.
        key: String,
        /// How long the unit of work took.
        duration: Duration,
        /// Class of the returned error; `None` when the policy failed a success.
        class: Option<ErrorClass>,
    },
    /// A permission denial was published as success under a denial policy.
    DenialRemapped {
        /// The name of the fan-out instance.
        pattern_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// The worker's key.
        key: String,
    },
    /// Every worker of a round has been joined and drained.
    RoundCompleted {
        /// The name of the fan-out instance.
        pattern_name: String,
        /// When the event occurred.
        timestamp: Instant,
        /// Number of workers spawned.
        workers: usize,
        /// Number of failed workers.
        failures: usize,
        /// Wall time of the whole round.
        duration: Duration,
    },
}

impl ScaleEvent for FanOutEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FanOutEvent::WorkerSucceeded { .. } => "worker_succeeded",
            FanOutEvent::WorkerFailed { .. } => "worker_failed",
            FanOutEvent::DenialRemapped { .. } => "denial_remapped",
            FanOutEvent::RoundCompleted { .. } => "round_completed",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            FanOutEvent::WorkerSucceeded { timestamp, .. }
            | FanOutEvent::WorkerFailed { timestamp, .. }
            | FanOutEvent::DenialRemapped { timestamp, .. }
            | FanOutEvent::RoundCompleted { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            FanOutEvent::WorkerSucceeded { pattern_name, .. }
            | FanOutEvent::WorkerFailed { pattern_name, .. }
            | FanOutEvent::DenialRemapped { pattern_name, .. }
            | FanOutEvent::RoundCompleted { pattern_name, .. } => pattern_name,
        }
    }
}
