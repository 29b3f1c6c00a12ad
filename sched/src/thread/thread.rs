//! Thread Structure and Management
//!
//! Represents a schedulable thread with minimal overhead. Stack allocation
//! and context preparation belong to the embedding kernel; the scheduler
//! only stores the register window and hands out pointers to it.

use alloc::boxed::Box;
use core::sync::atomic::{AtomicU64, Ordering};

use super::state::{validate_transition, ThreadState};
use crate::error::SchedulerError;

/// Thread ID type
pub type ThreadId = u64;

/// Saved thread context (windowed - callee-saved registers only)
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct ThreadContext {
    /// Stack pointer (RSP)
    pub rsp: u64,
    /// Instruction pointer (RIP)
    pub rip: u64,
    /// Flags register (RFLAGS)
    pub rflags: u64,
    /// Base register (RBX)
    pub rbx: u64,
    /// Base pointer (RBP)
    pub rbp: u64,
    pub r12: u64,
    pub r13: u64,
    pub r14: u64,
    pub r15: u64,
}

impl ThreadContext {
    pub const fn empty() -> Self {
        Self {
            rsp: 0,
            rip: 0,
            rflags: 0,
            rbx: 0,
            rbp: 0,
            r12: 0,
            r13: 0,
            r14: 0,
            r15: 0,
        }
    }
}

/// Thread Control Block (TCB)
pub struct Thread {
    /// Unique thread ID
    id: ThreadId,

    /// Thread name (for debugging)
    name: Box<str>,

    /// Current state
    state: ThreadState,

    /// Scheduling priority; the band containing it picks the level queue
    priority: u32,

    /// Approximated CPU time still needed, the L1 ordering key.
    /// Written by the embedder's CPU accounting, read by the scheduler.
    remaining_burst: u64,

    /// Time spent waiting in a level queue, accrued by the aging pass
    wait_time: u64,

    /// Whether the thread owns user-mode state to save/restore on a switch
    user_space: bool,

    /// Saved context (for windowed context switch)
    context: ThreadContext,

    /// Times this thread has been switched onto the CPU
    context_switches: AtomicU64,
}

impl Thread {
    /// Create a new kernel thread
    pub fn new_kernel(name: &str, priority: u32, remaining_burst: u64) -> Self {
        Self {
            id: alloc_thread_id(),
            name: name.into(),
            state: ThreadState::Creating,
            priority,
            remaining_burst,
            wait_time: 0,
            user_space: false,
            context: ThreadContext::empty(),
            context_switches: AtomicU64::new(0),
        }
    }

    /// Create a new user-space thread
    ///
    /// User threads additionally get their user-mode register and
    /// address-space state saved and restored across dispatches.
    pub fn new_user(name: &str, priority: u32, remaining_burst: u64) -> Self {
        let mut thread = Self::new_kernel(name, priority, remaining_burst);
        thread.user_space = true;
        thread
    }

    /// Check if this is a user-space thread
    pub fn is_user_thread(&self) -> bool {
        self.user_space
    }

    /// Get thread ID
    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Get thread name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get thread state
    pub fn state(&self) -> ThreadState {
        self.state
    }

    /// Set thread state
    ///
    /// # Panics
    /// An illegal lifecycle transition is a fatal contract violation.
    pub fn set_state(&mut self, state: ThreadState) {
        crate::sched_assert!(
            validate_transition(self.state, state),
            SchedulerError::InvalidTransition { thread: self.id, from: self.state, to: state }
        );
        self.state = state;
    }

    /// Get priority
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Set priority
    pub fn set_priority(&mut self, priority: u32) {
        self.priority = priority;
    }

    /// Get remaining burst time
    pub fn remaining_burst(&self) -> u64 {
        self.remaining_burst
    }

    /// Set remaining burst time
    pub fn set_remaining_burst(&mut self, burst: u64) {
        self.remaining_burst = burst;
    }

    /// Get accrued queue wait time
    pub fn wait_time(&self) -> u64 {
        self.wait_time
    }

    /// Set accrued queue wait time
    pub fn set_wait_time(&mut self, wait: u64) {
        self.wait_time = wait;
    }

    /// Shared access to the saved context
    pub fn context(&self) -> &ThreadContext {
        &self.context
    }

    /// Mutable access to the saved context (for the embedder's trampoline setup)
    pub fn context_mut(&mut self) -> &mut ThreadContext {
        &mut self.context
    }

    /// Get context pointer (for context switch)
    pub fn context_ptr(&mut self) -> *mut ThreadContext {
        &mut self.context as *mut ThreadContext
    }

    /// Times this thread was switched onto the CPU
    pub fn context_switches(&self) -> u64 {
        self.context_switches.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_context_switches(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }
}

/// Next thread ID to allocate
static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a unique thread ID
pub fn alloc_thread_id() -> ThreadId {
    NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed)
}
