//! # Work units: the atomic dispatchable piece of a job.
//!
//! A [`WorkUnit`] is produced by a [`Job`](crate::Job) on demand and owned by
//! the scheduler's registry from the moment it enters the dispatch queue until
//! its completion has been delivered back to the job. It carries an opaque
//! `payload` (the serialized work the transport ships to a worker) and a
//! non-owning back-reference to its originating job.
//!
//! ## Identity
//! Unit ids are minted from a process-global counter, so they are unique
//! across all jobs for the lifetime of the process. The id is the key the
//! worker pool echoes back in its completion report.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use crate::jobs::job::JobId;

/// Global counter for unit identities.
static UNIT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Size/weight hint for produced units.
///
/// Interpreted by the job itself (rows, bytes, sub-problems, ...); the
/// scheduler only threads it through from
/// [`SchedulerConfig::unit_size`](crate::SchedulerConfig::unit_size).
pub type UnitSize = u32;

/// Unique identity of a [`WorkUnit`].
///
/// Completion reports from the worker pool carry only this id; the scheduler
/// correlates it back to the owning job through its registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(u64);

impl UnitId {
    /// Mints the next process-unique unit id.
    pub fn next() -> Self {
        Self(UNIT_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Returns the raw numeric id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// The smallest dispatchable piece of work, derived from a job.
///
/// Created by [`Job::produce_next_unit`](crate::Job::produce_next_unit),
/// queued under admission control, sent to exactly one worker at a time, and
/// dropped once its completion has been delivered to the owning job.
#[derive(Clone, Debug)]
pub struct WorkUnit {
    /// Process-unique identity, echoed back by completion reports.
    pub id: UnitId,
    /// Non-owning back-reference to the originating job.
    pub job: JobId,
    /// Size/weight the unit was produced with.
    pub size: UnitSize,
    /// Opaque serialized work for the transport to ship to a worker.
    pub payload: Vec<u8>,
}

impl WorkUnit {
    /// Creates a unit with a freshly minted id.
    pub fn new(job: JobId, size: UnitSize, payload: Vec<u8>) -> Self {
        Self {
            id: UnitId::next(),
            job,
            size,
            payload,
        }
    }
}
