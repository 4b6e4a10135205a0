//! # workhub
//!
//! **Workhub** is the scheduling core of a distributed work-distribution
//! framework: a central hub that admits jobs, splits them into dispatchable
//! units under admission control, hands units to a worker pool, and
//! reconciles completion results back to the originating job.
//!
//! ## Architecture
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │     Job      │   │     Job      │   │     Job      │
//!     │ (user job #1)│   │ (user job #2)│   │ (user job #3)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ enqueue / job_completed             │
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  EventQueue (MPSC, unbounded, FIFO)                               │
//! │    ◄── worker_freed / unit_completed (pool transport)             │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼  single consumer task
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                        │
//! │  - Registry (producing/waiting rotation, dispatch queue, pending) │
//! │  - Status state machine (Stopped/Paused/Running)                  │
//! │  - admission control: bounded dispatch queue, round-robin refill  │
//! └──────┬────────────────────────────────────────────────────┬───────┘
//!        │ assign(unit)  (fire-and-forget)                    │
//!        ▼                                                    ▼
//! ┌──────────────────┐                              ┌──────────────────┐
//! │   WorkerPool     │                              │    NoticeBus     │
//! │ (transport, I/O) │                              │ (broadcast)      │
//! └──────────────────┘                              └──┬──────────┬────┘
//!                                                      ▼          ▼
//!                                               job owners   ObserverSet
//!                                               (finished)   (LogWriter, …)
//! ```
//!
//! ## Lifecycle
//! ```text
//! enqueue(job) ─► JobArrived ─► producing rotation
//!
//! refill (on arrival / freed slot / resolved unit):
//!   ├─► front producer emits one unit ─► dispatch queue (+ id→job map)
//!   ├─► rotate producer to the back (round-robin fairness)
//!   ├─► Starved    ─► waiting list (woken when one of its units completes)
//!   └─► Exhausted  ─► unlink + Notice::JobFinished (one-shot)
//!
//! worker_freed ─► pop front unit ─► pending list ─► pool.assign(unit)
//! unit_completed(id, result) ─► id→job map ─► job.accept_unit_result(result)
//! ```
//!
//! ## Design rules
//! - **One consumer**: all bookkeeping is mutated by a single task draining
//!   the event queue, so the registry needs no locks; the only cross-thread
//!   state is the status flag.
//! - **Admission control**: the dispatch queue is bounded; production stops
//!   at capacity and resumes on the full→free-slot transition, so one
//!   prolific job cannot starve others or grow in-flight memory unboundedly.
//! - **Pause, don't drop**: while `Paused` the queue keeps accepting and
//!   draining, but effects are deferred and replayed in order on resume.
//! - **Log and discard**: stray completion reports never abort the loop.
//!
//! ## Features
//! | Area          | Description                                             | Key types / traits             |
//! |---------------|---------------------------------------------------------|--------------------------------|
//! | **Jobs**      | Define distributable jobs that produce units on demand. | [`Job`], [`Produce`]           |
//! | **Dispatch**  | Bounded admission and worker-pool hand-off.             | [`Scheduler`], [`WorkerPool`]  |
//! | **Events**    | Post occurrences into the single consumer.              | [`EventQueue`], [`Event`]      |
//! | **Notices**   | Observe lifecycle transitions; owner notification.      | [`NoticeBus`], [`Observe`]     |
//! | **Config**    | Centralize capacity and sizing knobs.                   | [`SchedulerConfig`]            |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] observer
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, OnceLock};
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use async_trait::async_trait;
//! use workhub::{
//!     EventQueue, Job, JobId, Produce, Scheduler, SchedulerConfig, UnitId, UnitSize, WorkUnit,
//!     WorkerPool,
//! };
//!
//! // A pool that "runs" units instantly and reports completions as events.
//! // It learns the scheduler's queue after construction.
//! #[derive(Default)]
//! struct EchoPool(OnceLock<EventQueue>);
//!
//! #[async_trait]
//! impl WorkerPool for EchoPool {
//!     async fn assign(&self, unit: WorkUnit) {
//!         if let Some(events) = self.0.get() {
//!             let _ = events.unit_completed(unit.id, unit.payload);
//!         }
//!     }
//! }
//!
//! struct Split {
//!     id: JobId,
//!     left: AtomicU32,
//! }
//!
//! #[async_trait]
//! impl Job for Split {
//!     fn id(&self) -> JobId { self.id }
//!     fn name(&self) -> &str { "split" }
//!     async fn produce_next_unit(&self, hint: UnitSize) -> Produce {
//!         match self.left.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1)) {
//!             Ok(_) => Produce::Unit(WorkUnit::new(self.id, hint, b"piece".to_vec())),
//!             Err(_) => Produce::Exhausted,
//!         }
//!     }
//!     async fn accept_unit_result(&self, _unit: UnitId, _payload: Vec<u8>) {}
//!     fn is_exhausted(&self) -> bool { self.left.load(Ordering::SeqCst) == 0 }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let pool = Arc::new(EchoPool::default());
//!     let cfg = SchedulerConfig { dispatch_capacity: 2, ..Default::default() };
//!     let scheduler = Scheduler::new(cfg, pool.clone());
//!     pool.0.set(scheduler.events()).ok().unwrap();
//!
//!     scheduler.start_scheduler();
//!     let job = Arc::new(Split { id: JobId::next(), left: AtomicU32::new(3) });
//!     scheduler.enqueue(job).unwrap();
//!     scheduler.events().worker_freed().unwrap();
//! }
//! ```

pub mod events;
pub mod notices;

mod config;
mod jobs;
mod scheduler;
mod workers;

// ---- Public re-exports ----

pub use config::SchedulerConfig;
pub use events::{Event, EventQueue, PostError};
pub use jobs::{Job, JobId, JobRef, Produce, UnitId, UnitSize, WorkUnit};
pub use notices::{Notice, NoticeBus, NoticeKind, Observe, ObserverSet};
pub use scheduler::{Scheduler, Status};
pub use workers::WorkerPool;

// Optional: expose a simple built-in logging observer (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use notices::LogWriter;
