//! # Lifecycle notices published by the scheduler.
//!
//! The [`NoticeKind`] enum classifies notices across three categories:
//! - **Scheduler state**: the state machine moved (started, paused)
//! - **Job lifecycle**: admission, parking/waking, and the one-shot
//!   finished notification to the job's external owner
//! - **Unit lifecycle**: queued under admission, dispatched to the pool,
//!   resolved back to the job, or discarded as stray
//!
//! The [`Notice`] struct carries the metadata: timestamps, job/unit
//! identities, names, and a human-readable reason for stray reports.
//!
//! ## Ordering guarantees
//! Each notice has a globally unique sequence number (`seq`) that increases
//! monotonically. Use `seq` to restore publish order when notices are
//! observed out of order across receivers.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::jobs::{JobId, UnitId, UnitSize};

/// Global sequence counter for notice ordering.
static NOTICE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of scheduler notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    // === Scheduler state ===
    /// Scheduling became active (initial start or resume from pause).
    ///
    /// Sets: `at`, `seq`
    SchedulerStarted,

    /// Scheduling paused; events are accepted but their effects deferred.
    ///
    /// Sets: `at`, `seq`
    SchedulerPaused,

    // === Job lifecycle ===
    /// A job was admitted to the producing list.
    ///
    /// Sets: `job`, `job_name`, `at`, `seq`
    JobAdmitted,

    /// A job had nothing to give right now and was parked on the waiting list.
    ///
    /// Sets: `job`, `job_name`, `at`, `seq`
    JobParked,

    /// A parked job was woken back to the producing list.
    ///
    /// Sets: `job`, `job_name`, `at`, `seq`
    JobWoken,

    /// A job finished producing and was unlinked; its external owner should
    /// reclaim it. Published at most once per job.
    ///
    /// Sets: `job`, `job_name` (when known), `at`, `seq`
    JobFinished,

    // === Unit lifecycle ===
    /// A freshly produced unit entered the dispatch queue.
    ///
    /// Sets: `job`, `unit`, `size`, `at`, `seq`
    UnitQueued,

    /// A unit was handed to the worker pool and is now pending.
    ///
    /// Sets: `job`, `unit`, `size`, `at`, `seq`
    UnitDispatched,

    /// A unit's result was delivered to its owning job.
    ///
    /// Sets: `job`, `unit`, `at`, `seq`
    UnitResolved,

    // === Discarded reports ===
    /// A completion arrived for a unit id the scheduler does not know.
    ///
    /// Duplicate completion, stale report after the owning job completed, or
    /// protocol desynchronization with the worker pool. Logged and discarded.
    ///
    /// Sets: `unit`, `reason`, `at`, `seq`
    StrayCompletion,

    /// A job reported completion a second time. Logged and discarded.
    ///
    /// Sets: `job`, `reason`, `at`, `seq`
    StrayJobCompletion,
}

/// A scheduler notice with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`NoticeKind`]
#[derive(Debug, Clone)]
pub struct Notice {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Notice classification.
    pub kind: NoticeKind,

    /// Job identity, if applicable.
    pub job: Option<JobId>,
    /// Job name, if applicable.
    pub job_name: Option<Arc<str>>,
    /// Unit identity, if applicable.
    pub unit: Option<UnitId>,
    /// Unit size, if applicable.
    pub size: Option<UnitSize>,
    /// Human-readable reason (stray reports).
    pub reason: Option<Arc<str>>,
}

impl Notice {
    /// Creates a new notice of the given kind with current timestamp and next
    /// sequence number.
    pub fn now(kind: NoticeKind) -> Self {
        Self {
            seq: NOTICE_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            job: None,
            job_name: None,
            unit: None,
            size: None,
            reason: None,
        }
    }

    /// Attaches a job identity.
    #[inline]
    pub fn with_job(mut self, job: JobId) -> Self {
        self.job = Some(job);
        self
    }

    /// Attaches a job name.
    #[inline]
    pub fn with_job_name(mut self, name: impl Into<Arc<str>>) -> Self {
        self.job_name = Some(name.into());
        self
    }

    /// Attaches a unit identity.
    #[inline]
    pub fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Attaches a unit size.
    #[inline]
    pub fn with_size(mut self, size: UnitSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
