//! Configuration for bounded polling.

use crate::events::PollerEvent;
use std::time::Duration;
use tenant_scale_core::{EventListeners, FnListener};

/// Configuration for a [`BoundedPoller`](crate::BoundedPoller).
#[derive(Clone, Debug)]
pub struct PollerConfig {
    pub(crate) timeout: Duration,
    pub(crate) period: Duration,
    pub(crate) name: String,
    pub(crate) event_listeners: EventListeners<PollerEvent>,
}

impl PollerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> PollerConfigBuilder {
        PollerConfigBuilder::new()
    }

    /// Total time allowed before the poll times out.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sleep between two checks.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The instance name used in events, logs and metric labels.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Builder for [`PollerConfig`].
pub struct PollerConfigBuilder {
    timeout: Duration,
    period: Duration,
    name: String,
    event_listeners: EventListeners<PollerEvent>,
}

impl PollerConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(5 * 60),
            period: Duration::from_secs(1),
            name: String::from("<unnamed>"),
            event_listeners: EventListeners::new(),
        }
    }

    /// Sets the total time allowed before the poll times out.
    ///
    /// A zero timeout times out before the first check; a timeout too large
    /// to add to the current instant never expires.
    ///
    /// Default: 5 minutes
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the sleep between two checks.
    ///
    /// Default: 1 second
    pub fn period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Sets the name of this poller for observability.
    ///
    /// Default: `"<unnamed>"`
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked with the check number each time a
    /// check asks to keep waiting.
    pub fn on_continue<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let PollerEvent::Continued { attempt, .. } = event {
                f(*attempt);
            }
        }));
        self
    }

    /// Registers a callback invoked with the number of checks and the
    /// elapsed time when a check reports done.
    pub fn on_done<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let PollerEvent::Done {
                attempts, elapsed, ..
            } = event
            {
                f(*attempts, *elapsed);
            }
        }));
        self
    }

    /// Registers a callback invoked with the number of checks when a check
    /// returns an error.
    pub fn on_failed<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let PollerEvent::Failed { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked with the number of checks and the
    /// elapsed time when the poll times out.
    pub fn on_timeout<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let PollerEvent::TimedOut {
                attempts, elapsed, ..
            } = event
            {
                f(*attempts, *elapsed);
            }
        }));
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> PollerConfig {
        PollerConfig {
            timeout: self.timeout,
            period: self.period,
            name: self.name,
            event_listeners: self.event_listeners,
        }
    }
}

impl Default for PollerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
