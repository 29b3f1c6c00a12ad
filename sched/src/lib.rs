//! Three-Level Feedback Queue Scheduler Core
//!
//! CPU scheduling for a single-processor, cooperative-multitasking
//! kernel. The policy is a three-level feedback queue:
//!
//! - L1 `[100, 150)`: preemptive, shortest remaining burst first
//! - L2 `[50, 100)`: non-preemptive, lowest thread id first
//! - L3 `[0, 50)`: round-robin in admission order
//!
//! Selection is strict (L1 before L2 before L3); a periodic aging pass
//! boosts long-waiting threads upward so the low bands cannot starve; a
//! terminating thread's TCB is parked across the context swap and
//! reclaimed from a different stack.
//!
//! The core owns the TCBs but no machine state: the context swap, the
//! preemption flag, the tick counter, and user-state handling come in
//! through the [`KernelCtx`] trait, which is also what makes the whole
//! policy testable on a host.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod aging;
pub mod ctx;
pub mod error;
pub mod level;
pub mod logger;
pub mod queue;
pub mod scheduler;
pub mod stats;
pub mod thread;

pub use aging::{AGING_QUANTUM, AGING_THRESHOLD, PRIORITY_BOOST};
pub use ctx::{KernelCtx, LoopbackCtx};
pub use error::{SchedulerError, SchedulerResult};
pub use level::{Level, HIGH_BAND_MAX, LOW_BAND_MAX, MID_BAND_MAX};
pub use queue::{LevelQueue, ReadyQueues};
pub use scheduler::Scheduler;
pub use stats::{SchedulerStats, StatsSnapshot};
pub use thread::{alloc_thread_id, Thread, ThreadContext, ThreadId, ThreadState};
