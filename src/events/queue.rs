//! # Event queue: the sole synchronization surface into the scheduler.
//!
//! [`EventQueue`] is a thin wrapper around an unbounded
//! [`tokio::sync::mpsc`] channel: many producers, one consumer. Worker-pool
//! transports, jobs, and the scheduler itself post [`Event`]s from any task or
//! thread; the scheduler loop is the single receiver and the only place
//! registry state is mutated, so the lists behind it need no locks of their
//! own.
//!
//! ## Contract
//! - **Non-blocking post**: `post()` never waits; the channel is unbounded.
//! - **FIFO**: events are received in arrival order as merged by the channel;
//!   no ordering is guaranteed *between* producers beyond that merge.
//! - **No loss**: an accepted event is never dropped. Posting only fails once
//!   the consumer has been torn down ([`PostError::Closed`]).
//!
//! ## Example
//! ```
//! use workhub::events::EventQueue;
//!
//! let (queue, mut rx) = EventQueue::unbounded();
//! queue.worker_freed().unwrap();
//! assert!(rx.try_recv().is_ok());
//! ```

use thiserror::Error;
use tokio::sync::mpsc;

use crate::events::event::Event;
use crate::jobs::{JobId, UnitId};

/// Error returned when posting into a torn-down scheduler.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostError {
    /// The consumer task is gone; the event was not delivered.
    #[error("event queue closed")]
    Closed,
}

/// Multi-producer handle to the scheduler's event queue.
///
/// Cheap to clone (internally an `Arc`-backed sender). This is the narrow
/// "post an Event" capability collaborators depend on; none of them see the
/// scheduler's internals.
#[derive(Clone)]
pub struct EventQueue {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventQueue {
    /// Creates the queue, returning the shared sender and the single receiver.
    ///
    /// The receiver belongs to the scheduler loop; everything else holds
    /// clones of the sender.
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Posts an event. Non-blocking, safe from any task or thread.
    pub fn post(&self, event: Event) -> Result<(), PostError> {
        self.tx.send(event).map_err(|_| PostError::Closed)
    }

    /// Reports that a worker became available.
    pub fn worker_freed(&self) -> Result<(), PostError> {
        self.post(Event::WorkerFreed)
    }

    /// Reports that a unit completed with the given result payload.
    pub fn unit_completed(&self, unit: UnitId, payload: Vec<u8>) -> Result<(), PostError> {
        self.post(Event::UnitCompleted { unit, payload })
    }

    /// Reports that a job has finished producing.
    pub fn job_completed(&self, job: JobId) -> Result<(), PostError> {
        self.post(Event::JobCompleted { job })
    }
}

impl std::fmt::Debug for EventQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_across_posts() {
        let (queue, mut rx) = EventQueue::unbounded();
        queue.worker_freed().unwrap();
        queue.job_completed(JobId::next()).unwrap();
        queue.post(Event::SlotFreed).unwrap();

        assert!(matches!(rx.recv().await, Some(Event::WorkerFreed)));
        assert!(matches!(rx.recv().await, Some(Event::JobCompleted { .. })));
        assert!(matches!(rx.recv().await, Some(Event::SlotFreed)));
    }

    #[tokio::test]
    async fn test_post_after_consumer_drop_is_closed() {
        let (queue, rx) = EventQueue::unbounded();
        drop(rx);
        assert_eq!(queue.worker_freed(), Err(PostError::Closed));
    }

    #[tokio::test]
    async fn test_posts_merge_from_many_tasks() {
        let (queue, mut rx) = EventQueue::unbounded();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let q = queue.clone();
            handles.push(tokio::spawn(async move { q.worker_freed().unwrap() }));
        }
        for h in handles {
            h.await.unwrap();
        }
        for _ in 0..8 {
            assert!(matches!(rx.recv().await, Some(Event::WorkerFreed)));
        }
    }
}
