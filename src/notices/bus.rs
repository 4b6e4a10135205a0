//! # Notice bus for broadcasting scheduler lifecycle notices.
//!
//! [`NoticeBus`] is a thin wrapper around [`tokio::sync::broadcast`] that
//! provides non-blocking publishing from the scheduler loop to any number of
//! receivers: the external owners of jobs (watching for
//! [`NoticeKind::JobFinished`](crate::notices::NoticeKind::JobFinished)),
//! observer workers, dashboards, tests.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks or awaits; a slow
//!   receiver can never stall admission or dispatch.
//! - **Bounded capacity**: a single ring buffer stores recent notices for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip the
//!   `n` oldest items.
//! - **No persistence**: notices are lost if there are no active receivers at
//!   publish time.

use tokio::sync::broadcast;

use super::notice::Notice;

/// Broadcast channel for scheduler notices.
///
/// Thin wrapper over [`tokio::sync::broadcast`] providing a
/// `publish`/`subscribe` API. Cheap to clone (internally holds an
/// `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct NoticeBus {
    tx: broadcast::Sender<Notice>,
}

impl NoticeBus {
    /// Creates a new bus with the given ring-buffer capacity.
    ///
    /// The minimum capacity is 1 (clamped). Capacity is shared across all
    /// receivers, not per-receiver.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Notice>(capacity);
        Self { tx }
    }

    /// Publishes a notice to all active receivers.
    ///
    /// If there are no receivers, the notice is dropped; this function still
    /// returns immediately.
    pub fn publish(&self, notice: Notice) {
        let _ = self.tx.send(notice);
    }

    /// Creates a new receiver observing subsequent notices.
    ///
    /// A receiver only gets notices published **after** it subscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }
}
