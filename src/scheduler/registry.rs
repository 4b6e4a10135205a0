//! # Job & unit registry - the scheduler's bookkeeping.
//!
//! Owned exclusively by the consumer task and mutated only from there, so the
//! lists need no locks (all mutation is serialized through event processing
//! order).
//!
//! ## Lists
//! ```text
//! producing: [J3, J7, J1]        rotation order; front produces next
//! waiting:   [J5]                starved, not finished
//! dispatch:  [u9, u10]           produced, awaiting a free worker (bounded)
//! pending:   {u4, u6, u8}        handed to the pool, awaiting completion
//! unit_jobs: {u4→J3, ..., u10→J1}  completion correlation
//! ```
//!
//! ## Invariants
//! - A unit id is in at most one of {dispatch, pending}, and in `unit_jobs`
//!   exactly while it is in either.
//! - An active job is in exactly one of {producing, waiting}; a completed job
//!   is in neither.
//! - `dispatch.len() <= capacity` at all times. Exceeding it is an internal
//!   bug: [`Registry::queue_unit`] panics rather than recovers.

use std::collections::{HashMap, VecDeque};

use crate::jobs::{JobId, JobRef, UnitId, WorkUnit};

/// Bookkeeping for jobs and their in-flight units.
pub(crate) struct Registry {
    /// Jobs able to emit more units right now, in rotation order.
    producing: VecDeque<JobRef>,
    /// Jobs temporarily unable to produce, but not finished.
    waiting: Vec<JobRef>,
    /// Units produced but not yet handed to a worker. Bounded.
    dispatch: VecDeque<WorkUnit>,
    /// Units handed to a worker, awaiting a completion event.
    pending: HashMap<UnitId, WorkUnit>,
    /// Correlates a completion event (which only carries a unit id) back to
    /// the owning job. The `Arc` keeps the job reachable even after it has
    /// been unlinked, so in-flight units always drain.
    unit_jobs: HashMap<UnitId, JobRef>,
    /// Dispatch-queue bound (admission control).
    capacity: usize,
}

impl Registry {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            producing: VecDeque::new(),
            waiting: Vec::new(),
            dispatch: VecDeque::new(),
            pending: HashMap::new(),
            unit_jobs: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    // --- job lifecycle ---

    /// Admits a job to the back of the producing rotation.
    pub(crate) fn admit(&mut self, job: JobRef) {
        debug_assert!(
            !self.is_active(job.id()),
            "job admitted twice: {}",
            job.id()
        );
        self.producing.push_back(job);
    }

    /// Takes the next producer off the front of the rotation.
    ///
    /// The caller decides what happens next: requeue after a successful
    /// produce, park on starvation, or unlink on exhaustion.
    pub(crate) fn next_producer(&mut self) -> Option<JobRef> {
        self.producing.pop_front()
    }

    /// Returns a producer to the back of the rotation.
    pub(crate) fn requeue_producer(&mut self, job: JobRef) {
        self.producing.push_back(job);
    }

    /// Parks a job on the waiting list.
    pub(crate) fn park(&mut self, job: JobRef) {
        debug_assert!(
            !self.waiting.iter().any(|j| j.id() == job.id()),
            "job parked twice: {}",
            job.id()
        );
        self.waiting.push(job);
    }

    /// Moves a job from waiting back to producing. Returns false if the job
    /// was not parked.
    pub(crate) fn wake(&mut self, job: JobId) -> bool {
        match self.waiting.iter().position(|j| j.id() == job) {
            Some(idx) => {
                let job = self.waiting.swap_remove(idx);
                self.producing.push_back(job);
                true
            }
            None => false,
        }
    }

    /// Unlinks a job from whichever of {producing, waiting} it occupies.
    ///
    /// Returns the handle if the job was active, `None` if it was unknown or
    /// already unlinked (a duplicate completion report).
    pub(crate) fn unlink(&mut self, job: JobId) -> Option<JobRef> {
        if let Some(idx) = self.producing.iter().position(|j| j.id() == job) {
            return self.producing.remove(idx);
        }
        if let Some(idx) = self.waiting.iter().position(|j| j.id() == job) {
            return Some(self.waiting.swap_remove(idx));
        }
        None
    }

    /// True while the job is in exactly one of {producing, waiting}.
    pub(crate) fn is_active(&self, job: JobId) -> bool {
        self.producing.iter().any(|j| j.id() == job) || self.waiting.iter().any(|j| j.id() == job)
    }

    pub(crate) fn has_producers(&self) -> bool {
        !self.producing.is_empty()
    }

    // --- unit lifecycle ---

    /// Queues a freshly produced unit for dispatch, creating its correlation
    /// entry immediately.
    ///
    /// Panics if the dispatch queue is already at capacity: admission control
    /// only produces while a slot remains, so overflow is an internal
    /// invariant violation, not a runtime condition to recover from.
    pub(crate) fn queue_unit(&mut self, unit: WorkUnit, owner: JobRef) {
        if self.dispatch.len() >= self.capacity {
            panic!(
                "dispatch queue overflow: {} units, capacity {}",
                self.dispatch.len(),
                self.capacity
            );
        }
        let prior = self.unit_jobs.insert(unit.id, owner);
        debug_assert!(prior.is_none(), "unit id reused: {}", unit.id);
        self.dispatch.push_back(unit);
    }

    /// Pops the front unit for dispatch, moving it to the pending list.
    ///
    /// Returns a clone to hand to the worker pool; the registry keeps the
    /// original until the completion is processed.
    pub(crate) fn pop_unit_for_dispatch(&mut self) -> Option<WorkUnit> {
        let unit = self.dispatch.pop_front()?;
        let handed = unit.clone();
        self.pending.insert(unit.id, unit);
        Some(handed)
    }

    /// Resolves a completion: removes the unit from pending and drops its
    /// correlation entry, returning the unit and its owner.
    ///
    /// Returns `None` for an id that is not pending - unknown, duplicate, or
    /// (protocol desync) never dispatched.
    pub(crate) fn resolve_unit(&mut self, id: UnitId) -> Option<(WorkUnit, JobRef)> {
        let unit = self.pending.remove(&id)?;
        let owner = self
            .unit_jobs
            .remove(&id)
            .unwrap_or_else(|| panic!("pending unit without correlation entry: {id}"));
        Some((unit, owner))
    }

    pub(crate) fn dispatch_len(&self) -> usize {
        self.dispatch.len()
    }

    pub(crate) fn dispatch_is_full(&self) -> bool {
        self.dispatch.len() >= self.capacity
    }

    pub(crate) fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
