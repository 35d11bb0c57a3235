//! Error types for bounded polling.

use std::time::Duration;
use tenant_scale_core::{Classify, ErrorClass};

/// Why a poll ended without reaching [`Step::Done`](crate::Step::Done).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PollError<E> {
    /// The deadline passed before the check reported done.
    #[error("{name} timed out after {timeout:?} ({attempts} checks)")]
    TimedOut {
        /// The name of the poller.
        name: String,
        /// The configured timeout.
        timeout: Duration,
        /// Number of checks performed.
        attempts: usize,
    },
    /// The check itself returned an error.
    #[error("{0}")]
    Failed(E),
}

impl<E> PollError<E> {
    /// Returns true if the poll timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::TimedOut { .. })
    }

    /// Returns the check's error, if that is what ended the poll.
    pub fn into_inner(self) -> Option<E> {
        match self {
            PollError::Failed(e) => Some(e),
            PollError::TimedOut { .. } => None,
        }
    }
}

impl<E: Classify> Classify for PollError<E> {
    fn class(&self) -> ErrorClass {
        match self {
            PollError::TimedOut { .. } => ErrorClass::DeadlineExceeded,
            PollError::Failed(e) => e.class(),
        }
    }
}
