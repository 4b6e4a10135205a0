//! # Scheduler status: the only cross-thread flag.
//!
//! All registry state is confined to the consumer task; [`Status`] is the one
//! piece of state other threads read (and the start/stop API writes). It is
//! shared behind a plain [`std::sync::Mutex`] that is never held across an
//! await point.

use std::fmt;

/// State of the scheduling state machine.
///
/// Transitions:
/// ```text
/// Stopped ──start──► Running ◄──start── Paused
///                       └──────stop──────┘
/// ```
/// `Stopped` is only the pre-start condition; it is not reachable again once
/// scheduling has begun. Process teardown is external to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Initial state; the consumer task has not been spawned yet.
    Stopped,
    /// Events are accepted and drained, but their effects are deferred.
    Paused,
    /// Events are processed with full admission/dispatch side effects.
    Running,
}

impl Status {
    /// True when dispatch side effects may execute.
    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self, Status::Running)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Stopped => write!(f, "stopped"),
            Status::Paused => write!(f, "paused"),
            Status::Running => write!(f, "running"),
        }
    }
}
