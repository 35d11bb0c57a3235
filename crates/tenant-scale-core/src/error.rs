//! Error taxonomy for fan-out rounds.
//!
//! Collaborator errors are never inspected by their rendered text. Instead a
//! collaborator implements [`Classify`] and reports an [`ErrorClass`], which is
//! what outcome policies (for example "a permission denial is the expected
//! result of this round") are evaluated against.
//!
//! A worker that fails becomes a [`WorkerError`], tagged with the key it ran
//! for. [`AggregateError`] is what a round surfaces to its caller: every failed
//! worker, in ascending key order, with nothing dropped.
//!
//! ```
//! use tenant_scale_core::{AggregateError, Cause, WorkerError};
//!
//! let err: AggregateError<String, String> = AggregateError::new(
//!     vec![WorkerError::new("user2".to_string(), Cause::Failed("volume not found".to_string()))],
//!     3,
//! );
//!
//! let message = err.to_string();
//! assert!(message.contains("1 of 3 workers failed"));
//! assert!(message.contains("error of user2: volume not found"));
//! ```

use std::fmt;

/// Coarse category of a collaborator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorClass {
    /// The caller is authenticated but not allowed to touch the resource.
    PermissionDenied,
    /// The credential was missing, malformed or expired.
    Unauthenticated,
    /// The resource does not exist.
    NotFound,
    /// The resource is in a state that forbids the operation (e.g. attached).
    FailedPrecondition,
    /// A deadline elapsed before the operation finished.
    DeadlineExceeded,
    /// The remote side could not be reached.
    Unavailable,
    /// Anything else.
    Other,
}

impl ErrorClass {
    /// Stable snake_case name, used for metric labels and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorClass::PermissionDenied => "permission_denied",
            ErrorClass::Unauthenticated => "unauthenticated",
            ErrorClass::NotFound => "not_found",
            ErrorClass::FailedPrecondition => "failed_precondition",
            ErrorClass::DeadlineExceeded => "deadline_exceeded",
            ErrorClass::Unavailable => "unavailable",
            ErrorClass::Other => "other",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can report their [`ErrorClass`].
pub trait Classify {
    /// The category of this error.
    fn class(&self) -> ErrorClass;

    /// Returns `true` if this error is a permission denial.
    fn is_permission_denied(&self) -> bool {
        self.class() == ErrorClass::PermissionDenied
    }
}

impl Classify for ErrorClass {
    fn class(&self) -> ErrorClass {
        *self
    }
}

/// Why a single worker is counted as failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cause<E> {
    /// The unit of work returned an error.
    Failed(E),
    /// The worker ended without publishing an outcome (it panicked or was aborted).
    Unpublished,
    /// The operation succeeded although the round required it to be denied.
    UnexpectedSuccess,
}

impl<E> Cause<E> {
    /// Returns the underlying error, if the work itself failed.
    pub fn error(&self) -> Option<&E> {
        match self {
            Cause::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl<E: fmt::Display> fmt::Display for Cause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cause::Failed(e) => write!(f, "{}", e),
            Cause::Unpublished => write!(f, "worker finished without publishing an outcome"),
            Cause::UnexpectedSuccess => {
                write!(f, "operation succeeded but a permission denial was expected")
            }
        }
    }
}

impl<E: Classify> Classify for Cause<E> {
    fn class(&self) -> ErrorClass {
        match self {
            Cause::Failed(e) => e.class(),
            Cause::Unpublished | Cause::UnexpectedSuccess => ErrorClass::Other,
        }
    }
}

/// Failure of one unit of work, tagged with the key it ran for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerError<K, E> {
    key: K,
    cause: Cause<E>,
}

impl<K, E> WorkerError<K, E> {
    /// Creates a worker error for `key`.
    pub fn new(key: K, cause: Cause<E>) -> Self {
        Self { key, cause }
    }

    /// The key the worker ran for.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Why the worker failed.
    pub fn cause(&self) -> &Cause<E> {
        &self.cause
    }

    /// Splits into key and cause.
    pub fn into_parts(self) -> (K, Cause<E>) {
        (self.key, self.cause)
    }
}

impl<K: fmt::Display, E: fmt::Display> fmt::Display for WorkerError<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error of {}: {}", self.key, self.cause)
    }
}

impl<K, E> std::error::Error for WorkerError<K, E>
where
    K: fmt::Display + fmt::Debug,
    E: fmt::Display + fmt::Debug,
{
}

/// Every failed worker of one round.
///
/// Never empty when returned by [`ErrorCollector::drain_all`]: a round with no
/// failures reports `Ok(())` instead.
///
/// [`ErrorCollector::drain_all`]: crate::ErrorCollector::drain_all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError<K, E> {
    failures: Vec<WorkerError<K, E>>,
    total: usize,
}

impl<K, E> AggregateError<K, E> {
    /// Creates an aggregate from `failures` out of `total` observed workers.
    pub fn new(failures: Vec<WorkerError<K, E>>, total: usize) -> Self {
        Self { failures, total }
    }

    /// Number of failed workers.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if there are no failures.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of workers whose outcome was observed, failed or not.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Failures in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &WorkerError<K, E>> {
        self.failures.iter()
    }

    /// Keys of the failed workers, in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.failures.iter().map(WorkerError::key)
    }

    /// Returns the failure recorded for `key`, if any.
    pub fn failure_for(&self, key: &K) -> Option<&WorkerError<K, E>>
    where
        K: PartialEq,
    {
        self.failures.iter().find(|f| f.key() == key)
    }

    /// Consumes the aggregate, returning the individual failures.
    pub fn into_failures(self) -> Vec<WorkerError<K, E>> {
        self.failures
    }
}

impl<K: fmt::Display, E: fmt::Display> fmt::Display for AggregateError<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} workers failed", self.failures.len(), self.total)?;
        for failure in &self.failures {
            write!(f, "\n{}", failure)?;
        }
        Ok(())
    }
}

impl<K, E> std::error::Error for AggregateError<K, E>
where
    K: fmt::Display + fmt::Debug,
    E: fmt::Display + fmt::Debug,
{
}
