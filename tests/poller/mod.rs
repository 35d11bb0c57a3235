//! Bounded poller tests:
//!
//! - **timing**: elapsed-time bounds under a paused clock
//! - **termination**: done, failed and timed-out terminal states

mod termination;
