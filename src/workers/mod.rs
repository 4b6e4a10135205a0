//! # Worker pool boundary.
//!
//! The scheduling core does not manage connections, serialization, or any
//! physical dispatch; it consumes the pool as an opaque "assign this unit to
//! some available worker" capability and receives pool activity back as
//! events:
//!
//! ```text
//! pool transport ── events.worker_freed() ───────► EventQueue
//! pool transport ── events.unit_completed(id, r) ► EventQueue
//! scheduler loop ── pool.assign(unit) ───────────► WorkerPool
//! ```
//!
//! Which worker actually receives the unit is the pool's decision; the
//! scheduler only reacts to "a worker is free" and "a unit finished".

use async_trait::async_trait;

use crate::jobs::WorkUnit;

/// The consumed dispatch capability of the worker pool.
///
/// ## Contract
/// `assign` is fire-and-forget from the scheduler's perspective: it is called
/// from the single consumer task and **must not block** it. A pool that needs
/// to wait (socket back-pressure, handshakes) should buffer internally or
/// hand off to its own tasks, and report the outcome later via
/// [`EventQueue::unit_completed`](crate::events::EventQueue::unit_completed).
///
/// ## Example
/// ```
/// use async_trait::async_trait;
/// use workhub::{WorkUnit, WorkerPool};
///
/// struct NullPool;
///
/// #[async_trait]
/// impl WorkerPool for NullPool {
///     async fn assign(&self, unit: WorkUnit) {
///         // hand to transport; completion comes back as an event
///         let _ = unit;
///     }
/// }
/// ```
#[async_trait]
pub trait WorkerPool: Send + Sync + 'static {
    /// Hands a unit to some available worker.
    async fn assign(&self, unit: WorkUnit);
}
