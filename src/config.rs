//! # Scheduler configuration.
//!
//! Provides [`SchedulerConfig`], the centralized knobs of the scheduling core.
//!
//! ## Sentinel values
//! - `dispatch_capacity` is clamped to a minimum of 1 (a zero-capacity
//!   dispatch queue could never admit a unit).
//! - `notice_capacity` is clamped to a minimum of 1 by the bus.

use crate::jobs::UnitSize;

/// Configuration for a [`Scheduler`](crate::Scheduler).
///
/// Defines:
/// - **Admission control**: the dispatch-queue bound
/// - **Production**: the size hint passed to jobs producing units
/// - **Notices**: the broadcast ring capacity
///
/// ## Field semantics
/// - `dispatch_capacity`: at most this many produced-but-undispatched units
///   exist at any time; one prolific job can never starve others of slots nor
///   grow in-flight memory unboundedly.
/// - `unit_size`: threaded through to
///   [`Job::produce_next_unit`](crate::Job::produce_next_unit) as the hint;
///   jobs interpret it (rows, bytes, sub-problems, ...).
/// - `notice_capacity`: ring size of the notice broadcast; receivers lagging
///   behind more than this many notices observe `Lagged` and skip.
#[derive(Clone, Debug)]
pub struct SchedulerConfig {
    /// Maximum number of units in the dispatch queue.
    pub dispatch_capacity: usize,

    /// Size/weight hint passed to jobs when producing units.
    pub unit_size: UnitSize,

    /// Capacity of the notice broadcast ring buffer.
    pub notice_capacity: usize,
}

impl SchedulerConfig {
    /// Returns the dispatch capacity clamped to a minimum of 1.
    #[inline]
    pub fn dispatch_capacity_clamped(&self) -> usize {
        self.dispatch_capacity.max(1)
    }
}

impl Default for SchedulerConfig {
    /// Default configuration:
    ///
    /// - `dispatch_capacity = 10` (small in-flight buffer)
    /// - `unit_size = 16`
    /// - `notice_capacity = 1024`
    fn default() -> Self {
        Self {
            dispatch_capacity: 10,
            unit_size: 16,
            notice_capacity: 1024,
        }
    }
}
