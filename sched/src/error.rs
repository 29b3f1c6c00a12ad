//! Scheduler Error Handling
//!
//! Typed contract violations with recovery hints. Every variant here is a
//! programming defect in the embedding kernel, not a runtime condition, so
//! the only consumer is the fatal path: `sched_assert!` / `sched_fatal!`
//! panic with the error's display and hint.

use core::fmt;

use crate::level::Level;
use crate::thread::{ThreadId, ThreadState};

/// Contract violations detected by the scheduler core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Entered a scheduler operation with asynchronous preemption enabled
    PreemptionEnabled { op: &'static str },

    /// Operation requires a running thread but the running slot is vacant
    NoRunningThread { op: &'static str },

    /// Terminating dispatch found the destruction-pending slot occupied
    ReclaimSlotOccupied { pending: ThreadId, incoming: ThreadId },

    /// Stack probe failed for the outgoing thread
    StackOverflow { thread: ThreadId },

    /// Illegal thread state transition
    InvalidTransition { thread: ThreadId, from: ThreadState, to: ThreadState },

    /// Aging recorded a thread at a level that no longer holds it
    NotQueued { thread: ThreadId, level: Level },

    /// Bootstrap called while a thread already owns the CPU
    AlreadyBootstrapped { current: ThreadId, incoming: ThreadId },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreemptionEnabled { op } => {
                write!(f, "{} entered with preemption enabled", op)
            }
            Self::NoRunningThread { op } => {
                write!(f, "{} with no running thread", op)
            }
            Self::ReclaimSlotOccupied { pending, incoming } => {
                write!(
                    f,
                    "destruction slot still holds thread {} while thread {} terminates",
                    pending, incoming
                )
            }
            Self::StackOverflow { thread } => {
                write!(f, "stack overflow on thread {}", thread)
            }
            Self::InvalidTransition { thread, from, to } => {
                write!(f, "thread {}: illegal transition {} -> {}", thread, from, to)
            }
            Self::NotQueued { thread, level } => {
                write!(f, "thread {} missing from queue {}", thread, level)
            }
            Self::AlreadyBootstrapped { current, incoming } => {
                write!(
                    f,
                    "bootstrap of thread {} while thread {} is running",
                    incoming, current
                )
            }
        }
    }
}

impl SchedulerError {
    /// Get recovery hint for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::PreemptionEnabled { .. } => "Disable preemption around every scheduler call",
            Self::NoRunningThread { .. } => "Bootstrap the boot thread before scheduling",
            Self::ReclaimSlotOccupied { .. } => {
                "A switch away from a finished thread must complete before the next one finishes"
            }
            Self::StackOverflow { .. } => "Increase the thread's stack allocation",
            Self::InvalidTransition { .. } => "Check thread lifecycle management",
            Self::NotQueued { .. } => "Queue membership corrupted outside the scheduler",
            Self::AlreadyBootstrapped { .. } => "Bootstrap exactly once, at kernel start",
        }
    }
}

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Diverging fatal path for contract violations
#[macro_export]
macro_rules! sched_fatal {
    ($err:expr) => {{
        let err = $err;
        panic!("[SCHED] invariant violated: {} (hint: {})", err, err.recovery_hint());
    }};
}

/// Assert a scheduler invariant, panicking with the typed error on failure
#[macro_export]
macro_rules! sched_assert {
    ($cond:expr, $err:expr) => {
        if !$cond {
            $crate::sched_fatal!($err);
        }
    };
}
