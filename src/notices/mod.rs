//! # Outbound lifecycle notices.
//!
//! The scheduler's single consumer publishes a [`Notice`] for every meaningful
//! transition (job admitted/parked/woken/finished, unit queued/dispatched/
//! resolved, stray reports, state changes). Notices serve two purposes:
//!
//! - they are the **owner-notification channel**: the external owner of a job
//!   learns that its job finished by watching for
//!   [`NoticeKind::JobFinished`];
//! - they are the **observability surface**: loggers, metrics, and tests
//!   subscribe without ever being able to stall scheduling.
//!
//! ## Architecture
//! ```text
//! Scheduler loop ── publish(Notice) ──► NoticeBus ──► owner receivers
//!                                            │
//!                                            └─► ObserverSet ─► per-observer
//!                                                 queues and workers
//!                                                 (LogWriter, metrics, ...)
//! ```
//!
//! ## Contents
//! - [`Notice`], [`NoticeKind`] notice classification and payload metadata
//! - [`NoticeBus`] thin wrapper over `tokio::sync::broadcast`
//! - [`Observe`] observer trait, [`ObserverSet`] panic-isolated fan-out
//! - [`LogWriter`] stdout observer (feature `logging`)

mod bus;
mod notice;
mod observe;
mod set;

#[cfg(feature = "logging")]
mod log;

pub use bus::NoticeBus;
pub use notice::{Notice, NoticeKind};
pub use observe::Observe;
pub use set::ObserverSet;

#[cfg(feature = "logging")]
pub use log::LogWriter;
