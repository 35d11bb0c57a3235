//! Event system shared by fan-out rounds and pollers.
//!
//! A fan-out round emits one event per worker outcome (succeeded, failed,
//! denial remapped) and one when the round has been drained; a poller emits
//! one per check and one for its terminal state. Scale drivers hook these to
//! print progress, count denials per round, or time detach waits without
//! wrapping the units of work themselves.
//!
//! Listeners run on the worker task that produced the event, before the
//! worker publishes its outcome, so they must be quick and must not block.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// An event emitted by a round worker, a round driver or a poller.
pub trait ScaleEvent: Send + Sync + fmt::Debug {
    /// Short machine-readable kind, e.g. `"worker_failed"` or `"timeout"`.
    fn event_type(&self) -> &'static str;

    /// When the event occurred.
    fn timestamp(&self) -> Instant;

    /// Name of the emitting instance, typically the round name such as
    /// `"security-scale.inspect_others"` or a poller like `"security-scale.detach"`.
    fn pattern_name(&self) -> &str;
}

/// Receives the events of one round or poller configuration.
pub trait EventListener<E: ScaleEvent>: Send + Sync {
    /// Called once per emitted event.
    fn on_event(&self, event: &E);
}

/// Type alias for shared event listeners.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// The listeners registered through a config builder's `on_*` methods.
///
/// The collection lives in the config, which every spawned worker shares
/// through an `Arc`; cloning it only bumps reference counts.
#[derive(Clone)]
pub struct EventListeners<E: ScaleEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: ScaleEvent> EventListeners<E> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Delivers `event` to every listener in registration order.
    ///
    /// A panicking listener is isolated: the remaining listeners still run,
    /// and the worker goes on to publish its outcome, so a buggy progress
    /// callback can never turn into an unpublished slot.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));
        }
    }

    /// Returns true if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ScaleEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ScaleEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// A listener backed by a closure; what the `on_*` builder methods register.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Wraps `f` as a listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ScaleEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
