//! # Simple logging observer for debugging and demos.
//!
//! [`LogWriter`] prints notices to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [started]
//! [admitted] job=job-1 name=crunch
//! [queued] job=job-1 unit=unit-1 size=8
//! [dispatched] job=job-1 unit=unit-1
//! [resolved] job=job-1 unit=unit-1
//! [parked] job=job-1 name=crunch
//! [finished] job=job-1 name=crunch
//! [stray-completion] unit=unit-9 reason="no owner for unit id"
//! ```

use async_trait::async_trait;

use super::notice::{Notice, NoticeKind};
use super::observe::Observe;

/// Simple stdout logging observer.
///
/// Enabled via the `logging` feature. Prints human-readable notice
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Observe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Observe for LogWriter {
    async fn on_notice(&self, n: &Notice) {
        match n.kind {
            NoticeKind::SchedulerStarted => println!("[started]"),
            NoticeKind::SchedulerPaused => println!("[paused]"),
            NoticeKind::JobAdmitted => {
                println!("[admitted] job={:?} name={:?}", n.job, n.job_name)
            }
            NoticeKind::JobParked => println!("[parked] job={:?} name={:?}", n.job, n.job_name),
            NoticeKind::JobWoken => println!("[woken] job={:?} name={:?}", n.job, n.job_name),
            NoticeKind::JobFinished => {
                println!("[finished] job={:?} name={:?}", n.job, n.job_name)
            }
            NoticeKind::UnitQueued => {
                println!("[queued] job={:?} unit={:?} size={:?}", n.job, n.unit, n.size)
            }
            NoticeKind::UnitDispatched => {
                println!("[dispatched] job={:?} unit={:?}", n.job, n.unit)
            }
            NoticeKind::UnitResolved => {
                println!("[resolved] job={:?} unit={:?}", n.job, n.unit)
            }
            NoticeKind::StrayCompletion => {
                println!("[stray-completion] unit={:?} reason={:?}", n.unit, n.reason)
            }
            NoticeKind::StrayJobCompletion => {
                println!("[stray-job-completion] job={:?} reason={:?}", n.job, n.reason)
            }
        }
    }

    fn name(&self) -> &'static str {
        "log_writer"
    }
}
