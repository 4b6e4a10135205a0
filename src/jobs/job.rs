//! # Job abstraction: a distributable piece of work.
//!
//! A [`Job`] is submitted by a client of the framework and split into
//! [`WorkUnit`]s on demand. The scheduler holds a non-owning handle
//! ([`JobRef`]) from [`enqueue`](crate::Scheduler::enqueue) until the job
//! reports completion, at which point it is unlinked and ownership stays with
//! the caller.
//!
//! ## Contract
//! Both async methods are called from the scheduler's single consumer task and
//! **must return promptly**. A job that needs to do real work to produce a
//! unit or digest a result should hand that work to its own tasks and post
//! the outcome back as an event instead of blocking the scheduler.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;

use crate::jobs::unit::{UnitId, UnitSize, WorkUnit};

/// Global counter for job identities.
static JOB_SEQ: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a [`Job`].
///
/// Minted once per job (typically at construction) and carried by the
/// completion event the job posts when it finishes producing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(u64);

impl JobId {
    /// Mints the next process-unique job id.
    pub fn next() -> Self {
        Self(JOB_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// Outcome of asking a job for its next unit.
#[derive(Debug)]
pub enum Produce {
    /// A unit was produced and can be queued for dispatch.
    Unit(WorkUnit),

    /// Nothing to give right now, but the job is not finished.
    ///
    /// The scheduler parks the job on the waiting list; it is woken when one
    /// of its in-flight units completes.
    Starved,

    /// The job will never produce again; treated as a completion report.
    Exhausted,
}

/// A distributable job, polymorphic over the capability set
/// {produce_next_unit, accept_unit_result, is_exhausted}.
///
/// ## Example
/// ```
/// use async_trait::async_trait;
/// use workhub::{Job, JobId, Produce, UnitId, UnitSize, WorkUnit};
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// struct Counting {
///     id: JobId,
///     left: AtomicU32,
/// }
///
/// #[async_trait]
/// impl Job for Counting {
///     fn id(&self) -> JobId { self.id }
///     fn name(&self) -> &str { "counting" }
///
///     async fn produce_next_unit(&self, hint: UnitSize) -> Produce {
///         if self.left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
///             .is_ok()
///         {
///             Produce::Unit(WorkUnit::new(self.id, hint, vec![]))
///         } else {
///             Produce::Exhausted
///         }
///     }
///
///     async fn accept_unit_result(&self, _unit: UnitId, _payload: Vec<u8>) {}
///
///     fn is_exhausted(&self) -> bool {
///         self.left.load(Ordering::SeqCst) == 0
///     }
/// }
/// ```
#[async_trait]
pub trait Job: Send + Sync + 'static {
    /// Returns the job's stable identity.
    fn id(&self) -> JobId;

    /// Returns a stable, human-readable name for notices and logs.
    fn name(&self) -> &str;

    /// Produces the next unit, or reports why none is available.
    ///
    /// `hint` is the size/weight the scheduler would like the unit to have;
    /// jobs are free to produce smaller or larger units. Must return promptly.
    async fn produce_next_unit(&self, hint: UnitSize) -> Produce;

    /// Accepts the result payload of a completed unit.
    ///
    /// Ownership of the payload transfers to the job, which must consume or
    /// release it. Must return promptly.
    async fn accept_unit_result(&self, unit: UnitId, payload: Vec<u8>);

    /// Returns true once the job will never produce another unit.
    fn is_exhausted(&self) -> bool;
}

/// Shared handle to a job (`Arc<dyn Job>`).
pub type JobRef = Arc<dyn Job>;
