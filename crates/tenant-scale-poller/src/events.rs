//! Event types for bounded polling.

use std::time::{Duration, Instant};
use tenant_scale_core::ScaleEvent;

/// Events emitted by a [`BoundedPoller`](crate::BoundedPoller).
#[derive(Debug, Clone)]
pub enum PollerEvent {
    /// A check asked to keep waiting.
    Continued {
        pattern_name: String,
        timestamp: Instant,
        /// 1-based number of the check.
        attempt: usize,
    },
    /// A check reported done.
    Done {
        pattern_name: String,
        timestamp: Instant,
        attempts: usize,
        elapsed: Duration,
    },
    /// A check returned an error.
    Failed {
        pattern_name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// The deadline passed.
    TimedOut {
        pattern_name: String,
        timestamp: Instant,
        attempts: usize,
        elapsed: Duration,
    },
}

impl ScaleEvent for PollerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PollerEvent::Continued { .. } => "continued",
            PollerEvent::Done { .. } => "done",
            PollerEvent::Failed { .. } => "failed",
            PollerEvent::TimedOut { .. } => "timed_out",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            PollerEvent::Continued { timestamp, .. }
            | PollerEvent::Done { timestamp, .. }
            | PollerEvent::Failed { timestamp, .. }
            | PollerEvent::TimedOut { timestamp, .. } => *timestamp,
        }
    }

    fn pattern_name(&self) -> &str {
        match self {
            PollerEvent::Continued { pattern_name, .. }
            | PollerEvent::Done { pattern_name, .. }
            | PollerEvent::Failed { pattern_name, .. }
            | PollerEvent::TimedOut { pattern_name, .. } => pattern_name,
        }
    }
}
