//! Where round workers are spawned.

use std::future::Future;
use tokio::task::JoinHandle;

/// Spawns the worker tasks of a round.
///
/// A round spawns exactly one task per key and joins every returned handle
/// before reporting. Implementations decide which runtime the tasks land on.
///
/// # Example
///
/// ```rust,no_run
/// use tenant_scale_fanout::{Executor, FanOut, FanOutConfig};
///
/// # fn example(runtime: &tokio::runtime::Runtime) {
/// // Run workers on a dedicated runtime while the driver lives elsewhere.
/// let fanout = FanOut::with_executor(FanOutConfig::builder().build(), runtime.handle().clone());
/// # }
/// ```
pub trait Executor: Clone + Send + Sync + 'static {
    /// Spawns one worker future.
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static;
}

impl Executor for tokio::runtime::Handle {
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        tokio::runtime::Handle::spawn(self, future)
    }
}

/// Spawns onto the runtime that was current when it was created.
#[derive(Clone, Debug)]
pub struct CurrentRuntime {
    handle: tokio::runtime::Handle,
}

impl CurrentRuntime {
    /// Captures the current runtime handle.
    ///
    /// # Panics
    ///
    /// Panics if called from outside a tokio runtime.
    pub fn new() -> Self {
        Self {
            handle: tokio::runtime::Handle::current(),
        }
    }
}

impl Default for CurrentRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for CurrentRuntime {
    fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.handle.spawn(future)
    }
}
