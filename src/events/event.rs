//! # Scheduler events: everything that can happen, as one tagged union.
//!
//! Collaborators never call into the scheduler's handler methods; they post an
//! [`Event`] into the [`EventQueue`](crate::events::EventQueue) and the single
//! consumer dispatches on the variant. The variants fall into three groups:
//!
//! - **Collaborator events**: [`Event::WorkerFreed`], [`Event::UnitCompleted`],
//!   [`Event::JobCompleted`] - posted by the worker pool transport and by jobs.
//! - **Admission events**: [`Event::JobArrived`] (posted by
//!   [`Scheduler::enqueue`](crate::Scheduler::enqueue)) and [`Event::SlotFreed`]
//!   (self-posted when the dispatch queue transitions from full to having a
//!   free slot).
//! - **Control markers**: [`Event::Resumed`], posted by
//!   [`Scheduler::start_scheduler`](crate::Scheduler::start_scheduler) when
//!   leaving the paused state so deferred events replay promptly.
//!
//! Events are processed strictly in arrival order; pausing defers their side
//! effects but never reorders or drops them.

use crate::jobs::{JobId, JobRef, UnitId};

/// An immutable message describing something that happened.
///
/// Carries the data of exactly one occurrence; the scheduler consumes events
/// sequentially and mutates its registry only while handling one.
pub enum Event {
    /// A worker became available.
    ///
    /// Deliberately not bound to a specific worker: under concurrency, by the
    /// time the dispatch decision executes a different worker may be the one
    /// actually free. The pool assigns the popped unit to *some* free worker.
    WorkerFreed,

    /// A unit finished on a worker; `payload` is the opaque result.
    ///
    /// Ownership of the payload passes through the scheduler to the owning
    /// job's [`accept_unit_result`](crate::Job::accept_unit_result).
    UnitCompleted {
        /// Identity of the completed unit.
        unit: UnitId,
        /// Opaque result payload, transferred to the owning job.
        payload: Vec<u8>,
    },

    /// A job reports it has finished producing.
    ///
    /// At most one report per job is meaningful; a second one is discarded
    /// with a diagnostic.
    JobCompleted {
        /// Identity of the reporting job.
        job: JobId,
    },

    /// A new job was enqueued and should be admitted to the producing list.
    JobArrived {
        /// Handle to the admitted job; the scheduler keeps it non-owningly
        /// until the job completes.
        job: JobRef,
    },

    /// The dispatch queue went from full to having at least one free slot.
    ///
    /// Internal self-post driving the refill loop.
    SlotFreed,

    /// Scheduling resumed after a pause; deferred events replay now.
    Resumed,
}

impl Event {
    /// Short stable label (snake_case) for diagnostics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Event::WorkerFreed => "worker_freed",
            Event::UnitCompleted { .. } => "unit_completed",
            Event::JobCompleted { .. } => "job_completed",
            Event::JobArrived { .. } => "job_arrived",
            Event::SlotFreed => "slot_freed",
            Event::Resumed => "resumed",
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::UnitCompleted { unit, payload } => f
                .debug_struct("UnitCompleted")
                .field("unit", unit)
                .field("payload_len", &payload.len())
                .finish(),
            Event::JobCompleted { job } => {
                f.debug_struct("JobCompleted").field("job", job).finish()
            }
            Event::JobArrived { job } => f
                .debug_struct("JobArrived")
                .field("job", &job.id())
                .finish(),
            other => f.write_str(other.as_label()),
        }
    }
}
