//! Single-use result cell.
//!
//! A cell is split into a [`Publisher`], owned by the worker, and a
//! [`Pending`], owned by whoever collects the outcome. Publishing consumes the
//! publisher, so an outcome is written at most once. The cell buffers the one
//! value it holds, so publishing never waits for the consumer.

use tokio::sync::oneshot;

/// Creates a connected publisher/pending pair.
pub fn result_cell<T>() -> (Publisher<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (Publisher { tx }, Pending { rx })
}

/// Write side of a result cell.
#[derive(Debug)]
pub struct Publisher<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Publisher<T> {
    /// Stores `outcome` in the cell.
    ///
    /// Never blocks. If the pending side is already gone the outcome is
    /// discarded.
    pub fn publish(self, outcome: T) {
        let _ = self.tx.send(outcome);
    }
}

/// Read side of a result cell.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Pending<T> {
    /// Waits for the outcome.
    ///
    /// Returns `None` if the publisher was dropped without publishing.
    pub async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }
}
