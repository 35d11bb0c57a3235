//! Configuration for fan-out rounds.

use crate::events::FanOutEvent;
use crate::policy::OutcomePolicy;
use std::time::Duration;
use tenant_scale_core::{EventListeners, FnListener};

/// Configuration shared by every worker of a [`FanOut`](crate::FanOut).
#[derive(Clone, Debug)]
pub struct FanOutConfig {
    pub(crate) name: String,
    pub(crate) policy: OutcomePolicy,
    pub(crate) event_listeners: EventListeners<FanOutEvent>,
}

impl FanOutConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> FanOutConfigBuilder {
        FanOutConfigBuilder::new()
    }

    /// The instance name used in events, logs and metric labels.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The outcome policy applied to every worker.
    pub fn policy(&self) -> OutcomePolicy {
        self.policy
    }
}

/// Builder for [`FanOutConfig`].
pub struct FanOutConfigBuilder {
    name: String,
    policy: OutcomePolicy,
    event_listeners: EventListeners<FanOutEvent>,
}

impl FanOutConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            name: String::from("<unnamed>"),
            policy: OutcomePolicy::Strict,
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the name of this fan-out instance for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the outcome policy.
    ///
    /// Default: [`OutcomePolicy::Strict`]
    pub fn policy(mut self, policy: OutcomePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shorthand for `policy(OutcomePolicy::ExpectDenied)`.
    pub fn expect_denied(self) -> Self {
        self.policy(OutcomePolicy::ExpectDenied)
    }

    /// Registers a callback invoked with the key and duration of each
    /// successful worker.
    pub fn on_worker_success<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FanOutEvent::WorkerSucceeded { key, duration, .. } = event {
                f(key, *duration);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key and duration of each
    /// failed worker.
    pub fn on_worker_failure<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FanOutEvent::WorkerFailed { key, duration, .. } = event {
                f(key, *duration);
            }
        }));
        self
    }

    /// Registers a callback invoked with the key of each worker whose
    /// permission denial was published as success.
    pub fn on_denial_remapped<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FanOutEvent::DenialRemapped { key, .. } = event {
                f(key);
            }
        }));
        self
    }

    /// Registers a callback invoked once per round with the number of
    /// workers, the number of failures and the round duration.
    pub fn on_round_complete<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let FanOutEvent::RoundCompleted {
                workers,
                failures,
                duration,
                ..
            } = event
            {
                f(*workers, *failures, *duration);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> FanOutConfig {
        FanOutConfig {
            name: self.name,
            policy: self.policy,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for FanOutConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
