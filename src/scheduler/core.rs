//! # Scheduler: the single consumer driving admission and dispatch.
//!
//! The [`Scheduler`] owns the event queue's receiving end, the registry, the
//! notice bus, and handles to its collaborators (worker pool, observers). It
//! is constructed explicitly and passed by handle to everything that needs it
//! - there is deliberately no process-wide instance.
//!
//! ## High-level architecture
//! ```text
//! Inputs (any task/thread):
//!   enqueue(job) ──► Event::JobArrived ─┐
//!   pool transport ── worker_freed ─────┼──► EventQueue (MPSC, unbounded)
//!   pool transport ── unit_completed ───┤
//!   job ── job_completed ───────────────┘
//!
//! Consumer (one task, owns Registry):
//!   loop { recv ─► Paused? defer : handle }
//!     WorkerFreed   ─► dispatch front unit ─► pool.assign()   (fire-and-forget)
//!     UnitCompleted ─► resolve ─► job.accept_unit_result()
//!     JobCompleted  ─► unlink ─► Notice::JobFinished (one-shot)
//!     JobArrived    ─► admit  ─► refill
//!     SlotFreed     ─► refill (round-robin produce until full/exhausted)
//!     Resumed       ─► replay deferred events in original order
//!
//! Outputs:
//!   NoticeBus ──► owner receivers, ObserverSet workers
//! ```
//!
//! ## Rules
//! - All registry mutation happens on the consumer task; the only other
//!   shared state is the status flag behind a narrow mutex.
//! - Calls into collaborators ([`WorkerPool::assign`], [`Job`] methods) must
//!   return promptly; slow work belongs to the collaborator's own tasks, with
//!   outcomes posted back as events.
//! - A malformed event never aborts the loop: unknown unit ids and duplicate
//!   completion reports are logged and discarded.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::events::{Event, EventQueue, PostError};
use crate::jobs::{JobId, JobRef, Produce, UnitId};
use crate::notices::{Notice, NoticeBus, NoticeKind, Observe, ObserverSet};
use crate::scheduler::registry::Registry;
use crate::scheduler::status::Status;
use crate::workers::WorkerPool;

/// The scheduling core: event queue, registry, and state machine.
///
/// ## Example
/// ```no_run
/// use std::sync::Arc;
/// use workhub::{Scheduler, SchedulerConfig, WorkerPool, WorkUnit};
/// use async_trait::async_trait;
///
/// struct NullPool;
///
/// #[async_trait]
/// impl WorkerPool for NullPool {
///     async fn assign(&self, _unit: WorkUnit) {}
/// }
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let scheduler = Scheduler::new(SchedulerConfig::default(), Arc::new(NullPool));
///     let events = scheduler.events(); // hand to the pool transport
///     scheduler.start_scheduler();
///     // scheduler.enqueue(job)...
///     events.worker_freed().unwrap();
/// }
/// ```
pub struct Scheduler {
    cfg: SchedulerConfig,
    pool: Arc<dyn WorkerPool>,
    events: EventQueue,
    /// Receiver parked here until the first `start_scheduler` takes it.
    rx: Mutex<Option<mpsc::UnboundedReceiver<Event>>>,
    /// The one cross-thread flag. Never held across an await.
    status: Arc<Mutex<Status>>,
    bus: NoticeBus,
    observers: Arc<ObserverSet>,
    /// External teardown hook for the consumer task; not part of the
    /// Stopped/Paused/Running state machine.
    teardown: CancellationToken,
}

impl Scheduler {
    /// Creates a scheduler with no observers.
    pub fn new(cfg: SchedulerConfig, pool: Arc<dyn WorkerPool>) -> Self {
        Self::with_observers(cfg, pool, Vec::new())
    }

    /// Creates a scheduler with the given notice observers.
    ///
    /// Must be called from within a Tokio runtime when `observers` is
    /// non-empty (each observer gets a dedicated worker task).
    pub fn with_observers(
        cfg: SchedulerConfig,
        pool: Arc<dyn WorkerPool>,
        observers: Vec<Arc<dyn Observe>>,
    ) -> Self {
        let (events, rx) = EventQueue::unbounded();
        let bus = NoticeBus::new(cfg.notice_capacity);
        Self {
            pool,
            events,
            rx: Mutex::new(Some(rx)),
            status: Arc::new(Mutex::new(Status::Stopped)),
            bus,
            observers: Arc::new(ObserverSet::new(observers)),
            teardown: CancellationToken::new(),
            cfg,
        }
    }

    /// Admits a new job.
    ///
    /// Valid in any scheduler state; the job is registered on the producing
    /// list and unit production is attempted on the next loop iteration, so
    /// effects only become visible once `Running`.
    pub fn enqueue(&self, job: JobRef) -> Result<(), PostError> {
        self.events.post(Event::JobArrived { job })
    }

    /// Starts or resumes scheduling.
    ///
    /// - `Stopped → Running`: spawns the consumer task.
    /// - `Paused → Running`: posts a resume marker so deferred events replay
    ///   promptly, in their original order.
    /// - `Running`: no-op.
    pub fn start_scheduler(&self) {
        let mut status = self.status.lock().unwrap();
        match *status {
            Status::Running => {}
            Status::Paused => {
                *status = Status::Running;
                drop(status);
                tracing::debug!("scheduler resumed");
                // The consumer is alive, so the queue cannot be closed here.
                let _ = self.events.post(Event::Resumed);
                self.bus.publish(Notice::now(NoticeKind::SchedulerStarted));
            }
            Status::Stopped => {
                let Some(rx) = self.rx.lock().unwrap().take() else {
                    tracing::warn!("consumer already spawned; ignoring start");
                    return;
                };
                *status = Status::Running;
                drop(status);
                tracing::debug!("scheduler started");
                self.spawn_observer_listener();
                let consumer = Consumer {
                    cfg: self.cfg.clone(),
                    pool: Arc::clone(&self.pool),
                    events: self.events.clone(),
                    status: Arc::clone(&self.status),
                    bus: self.bus.clone(),
                    registry: Registry::new(self.cfg.dispatch_capacity_clamped()),
                    deferred: VecDeque::new(),
                };
                tokio::spawn(consumer.run(rx, self.teardown.clone()));
                self.bus.publish(Notice::now(NoticeKind::SchedulerStarted));
            }
        }
    }

    /// Pauses scheduling.
    ///
    /// The consumer keeps draining the event queue - events are still
    /// accepted and dequeued - but their admission/dispatch side effects are
    /// deferred (held, not discarded) until the next
    /// [`start_scheduler`](Scheduler::start_scheduler). No-op unless
    /// `Running`.
    pub fn stop_scheduler(&self) {
        let mut status = self.status.lock().unwrap();
        if *status != Status::Running {
            return;
        }
        *status = Status::Paused;
        drop(status);
        tracing::debug!("scheduler paused");
        self.bus.publish(Notice::now(NoticeKind::SchedulerPaused));
    }

    /// Current state of the scheduling state machine.
    pub fn status(&self) -> Status {
        *self.status.lock().unwrap()
    }

    /// The narrow "post an Event" handle for collaborators.
    pub fn events(&self) -> EventQueue {
        self.events.clone()
    }

    /// The worker pool handle, for collaborators that address it directly.
    pub fn worker_pool(&self) -> &Arc<dyn WorkerPool> {
        &self.pool
    }

    /// Subscribes to lifecycle notices.
    ///
    /// The external owner of a job watches for
    /// [`NoticeKind::JobFinished`] carrying its job id; that notice is
    /// published at most once per job.
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.bus.subscribe()
    }

    /// Tears down the consumer task.
    ///
    /// This is process-teardown plumbing, not a state-machine transition:
    /// a torn-down scheduler does not come back, and posting into it yields
    /// [`PostError::Closed`].
    pub fn shutdown(&self) {
        self.teardown.cancel();
        self.observers.abort();
    }

    /// Forwards bus notices to the observer set (fire-and-forget).
    fn spawn_observer_listener(&self) {
        if self.observers.is_empty() {
            return;
        }
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.observers);
        let teardown = self.teardown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = teardown.cancelled() => break,
                    notice = rx.recv() => match notice {
                        Ok(n) => set.emit(&n),
                        Err(broadcast::error::RecvError::Closed) => break,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "observer listener lagged");
                        }
                    },
                }
            }
        });
    }
}

/// State owned by the consumer task. Everything the event handlers mutate
/// lives here, unshared.
struct Consumer {
    cfg: SchedulerConfig,
    pool: Arc<dyn WorkerPool>,
    events: EventQueue,
    status: Arc<Mutex<Status>>,
    bus: NoticeBus,
    registry: Registry,
    /// Events drained while paused, replayed in order on resume.
    deferred: VecDeque<Event>,
}

impl Consumer {
    /// Drains the event queue until teardown or until every sender is gone.
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Event>, teardown: CancellationToken) {
        loop {
            tokio::select! {
                _ = teardown.cancelled() => break,
                event = rx.recv() => match event {
                    Some(event) => self.consume(event).await,
                    None => break,
                },
            }
        }
        tracing::debug!("consumer task exiting");
    }

    fn running(&self) -> bool {
        self.status.lock().unwrap().is_running()
    }

    /// Routes one event through the pause gate.
    async fn consume(&mut self, event: Event) {
        match event {
            Event::Resumed => {
                // A stale marker (paused again before it arrived) is ignored;
                // the next start posts a fresh one.
                if self.running() {
                    while let Some(deferred) = self.deferred.pop_front() {
                        self.handle(deferred).await;
                    }
                }
            }
            event if !self.running() => self.deferred.push_back(event),
            event => self.handle(event).await,
        }
    }

    async fn handle(&mut self, event: Event) {
        tracing::trace!(event = event.as_label(), "processing");
        match event {
            Event::WorkerFreed => self.handle_worker_freed().await,
            Event::UnitCompleted { unit, payload } => {
                self.handle_unit_completed(unit, payload).await
            }
            Event::JobCompleted { job } => self.handle_job_completed(job),
            Event::JobArrived { job } => self.handle_job_arrived(job).await,
            Event::SlotFreed => self.refill().await,
            // Filtered out by `consume`.
            Event::Resumed => {}
        }
    }

    /// A worker became available: hand it the front unit, if any.
    ///
    /// The free-worker capacity is implicitly dropped when the dispatch queue
    /// is empty - workers pull work; the scheduler does not track worker
    /// availability beyond what the pool itself does.
    async fn handle_worker_freed(&mut self) {
        let was_full = self.registry.dispatch_is_full();
        let Some(unit) = self.registry.pop_unit_for_dispatch() else {
            return;
        };
        self.bus.publish(
            Notice::now(NoticeKind::UnitDispatched)
                .with_job(unit.job)
                .with_unit(unit.id)
                .with_size(unit.size),
        );
        let assigned = unit.id;
        if AssertUnwindSafe(self.pool.assign(unit))
            .catch_unwind()
            .await
            .is_err()
        {
            tracing::warn!(unit = %assigned, "worker pool panicked during assignment");
        }
        if was_full {
            // Full → one free slot: give producers a chance to top up.
            let _ = self.events.post(Event::SlotFreed);
        }
    }

    /// A unit finished: deliver its result to the owning job.
    async fn handle_unit_completed(&mut self, unit: UnitId, payload: Vec<u8>) {
        let Some((resolved, owner)) = self.registry.resolve_unit(unit) else {
            // Duplicate completion, stale report after the job completed, or
            // protocol desync with the pool. One bad event must not halt
            // scheduling: log and discard.
            tracing::warn!(%unit, "completion for unknown unit id discarded");
            self.bus.publish(
                Notice::now(NoticeKind::StrayCompletion)
                    .with_unit(unit)
                    .with_reason("no owner for unit id"),
            );
            return;
        };

        if AssertUnwindSafe(owner.accept_unit_result(unit, payload))
            .catch_unwind()
            .await
            .is_err()
        {
            tracing::warn!(%unit, job = %resolved.job, "job panicked accepting a result");
        }
        self.bus.publish(
            Notice::now(NoticeKind::UnitResolved)
                .with_job(resolved.job)
                .with_unit(unit),
        );

        // The result may have unblocked a starved job.
        if self.registry.wake(resolved.job) {
            self.bus.publish(
                Notice::now(NoticeKind::JobWoken)
                    .with_job(resolved.job)
                    .with_job_name(owner.name().to_owned()),
            );
        }
        self.refill().await;
    }

    /// A job reports it has finished producing.
    fn handle_job_completed(&mut self, job: JobId) {
        match self.registry.unlink(job) {
            Some(handle) => self.publish_finished(&handle),
            None => {
                tracing::warn!(%job, "completion report for inactive job discarded");
                self.bus.publish(
                    Notice::now(NoticeKind::StrayJobCompletion)
                        .with_job(job)
                        .with_reason("job not active"),
                );
            }
        }
    }

    /// A new job arrived: admit it and try to produce from it right away.
    async fn handle_job_arrived(&mut self, job: JobRef) {
        self.bus.publish(
            Notice::now(NoticeKind::JobAdmitted)
                .with_job(job.id())
                .with_job_name(job.name().to_owned()),
        );
        self.registry.admit(job);
        self.refill().await;
    }

    /// Tops up the dispatch queue from the producing rotation.
    ///
    /// The front job produces one unit and rotates to the back, so slots are
    /// shared round-robin among all producing jobs; repeats until the queue
    /// is full or no producer remains.
    async fn refill(&mut self) {
        while !self.registry.dispatch_is_full() {
            let Some(job) = self.registry.next_producer() else {
                break;
            };
            let produced = AssertUnwindSafe(job.produce_next_unit(self.cfg.unit_size))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    // A job that faults while producing cannot stay in the
                    // rotation; unlink it and let the owner reclaim it.
                    tracing::warn!(job = %job.id(), "job panicked while producing");
                    Produce::Exhausted
                });
            match produced {
                Produce::Unit(unit) => {
                    debug_assert_eq!(unit.job, job.id(), "unit from foreign job");
                    self.bus.publish(
                        Notice::now(NoticeKind::UnitQueued)
                            .with_job(unit.job)
                            .with_unit(unit.id)
                            .with_size(unit.size),
                    );
                    self.registry.queue_unit(unit, Arc::clone(&job));
                    self.registry.requeue_producer(job);
                }
                Produce::Starved if job.is_exhausted() => {
                    // Starved but done: treat as an exhaustion report.
                    self.publish_finished(&job);
                }
                Produce::Starved => {
                    self.bus.publish(
                        Notice::now(NoticeKind::JobParked)
                            .with_job(job.id())
                            .with_job_name(job.name().to_owned()),
                    );
                    self.registry.park(job);
                }
                Produce::Exhausted => self.publish_finished(&job),
            }
        }
        tracing::trace!(
            queued = self.registry.dispatch_len(),
            pending = self.registry.pending_len(),
            producers = self.registry.has_producers(),
            "refill done"
        );
    }

    /// One-shot owner notification; the job is already unlinked.
    ///
    /// In-flight units keep draining: their correlation entries hold the job
    /// handle, so late completions still resolve.
    fn publish_finished(&self, job: &JobRef) {
        tracing::debug!(job = %job.id(), name = job.name(), "job finished");
        self.bus.publish(
            Notice::now(NoticeKind::JobFinished)
                .with_job(job.id())
                .with_job_name(job.name().to_owned()),
        );
    }
}
