//! How a worker's raw result becomes its published outcome.

use tenant_scale_core::{Cause, Classify};

/// Outcome policy for one round.
///
/// Negative authorization rounds issue calls that are supposed to be refused.
/// Under [`ExpectDenied`](Self::ExpectDenied) a permission denial is the
/// desired result and is published as success. The decision is made on the
/// error's [`ErrorClass`](tenant_scale_core::ErrorClass), never on its text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutcomePolicy {
    /// Every error is a failure.
    #[default]
    Strict,
    /// A permission denial counts as success; any other error is a failure.
    /// A call that succeeds is still a success.
    ExpectDenied,
    /// Like `ExpectDenied`, but a call that succeeds is a failure.
    RequireDenied,
}

/// What a policy decided for one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict<E> {
    /// Publish success.
    Success,
    /// Publish success; the denial is kept for the round's record.
    Remapped(E),
    /// Publish a failure.
    Failure(Cause<E>),
}

impl OutcomePolicy {
    /// Applies the policy to a worker's result.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenant_scale_core::ErrorClass;
    /// use tenant_scale_fanout::{OutcomePolicy, Verdict};
    ///
    /// let denied: Result<(), _> = Err(ErrorClass::PermissionDenied);
    /// assert_eq!(
    ///     OutcomePolicy::ExpectDenied.judge(denied),
    ///     Verdict::Remapped(ErrorClass::PermissionDenied)
    /// );
    /// ```
    pub fn judge<E: Classify>(&self, result: Result<(), E>) -> Verdict<E> {
        match (self, result) {
            (OutcomePolicy::RequireDenied, Ok(())) => Verdict::Failure(Cause::UnexpectedSuccess),
            (_, Ok(())) => Verdict::Success,
            (OutcomePolicy::Strict, Err(e)) => Verdict::Failure(Cause::Failed(e)),
            (_, Err(e)) if e.is_permission_denied() => Verdict::Remapped(e),
            (_, Err(e)) => Verdict::Failure(Cause::Failed(e)),
        }
    }
}
