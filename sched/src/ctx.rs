//! Kernel Context Seam
//!
//! The scheduler core never reaches into kernel globals. The preemption
//! state, the tick counter, the machine-level context swap, user-state
//! handling, and the stack probe all come in through `KernelCtx`, passed
//! to every operation. This keeps the policy testable on a host without a
//! machine layer behind it.

use alloc::vec::Vec;

use crate::thread::{Thread, ThreadContext, ThreadId};

/// Capabilities the scheduler borrows from the embedding kernel
pub trait KernelCtx {
    /// Whether asynchronous preemption is currently disabled.
    /// Every scheduler operation asserts this on entry.
    fn preemption_disabled(&self) -> bool;

    /// Current tick count. Stamps diagnostic messages only; scheduling
    /// decisions never read the clock.
    fn now_ticks(&self) -> u64;

    /// Save the outgoing thread's user-mode register and address-space
    /// state. Called only for user-space threads, before the swap.
    fn save_user_state(&mut self, thread: &mut Thread);

    /// Restore the resumed thread's user-mode state, after the swap.
    fn restore_user_state(&mut self, thread: &mut Thread);

    /// Probe the thread's stack for overflow. A `false` return is fatal.
    fn stack_intact(&self, thread: &Thread) -> bool;

    /// Swap execution contexts. Saves the current context into `old_ctx`
    /// and resumes from `new_ctx`; returns only when `old_ctx` is later
    /// switched back into.
    ///
    /// # Safety
    /// Both pointers must stay valid until the swap completes, and the
    /// caller's stack must remain intact for the eventual resume.
    unsafe fn swap_context(&mut self, old_ctx: *mut ThreadContext, new_ctx: *const ThreadContext);
}

/// In-process context for host tests
///
/// The swap records the pointer pair and returns immediately, modeling a
/// resume that happens right away; the dispatcher's post-swap phase then
/// runs on the calling stack. User-state traffic and the tick counter are
/// plain fields the test drives by hand.
pub struct LoopbackCtx {
    preemption_disabled: bool,
    ticks: u64,
    swaps: Vec<(usize, usize)>,
    user_saves: Vec<ThreadId>,
    user_restores: Vec<ThreadId>,
    broken_stacks: Vec<ThreadId>,
}

impl LoopbackCtx {
    pub fn new() -> Self {
        Self {
            preemption_disabled: true,
            ticks: 0,
            swaps: Vec::new(),
            user_saves: Vec::new(),
            user_restores: Vec::new(),
            broken_stacks: Vec::new(),
        }
    }

    /// Flip the preemption flag the scheduler asserts on
    pub fn set_preemption_disabled(&mut self, disabled: bool) {
        self.preemption_disabled = disabled;
    }

    /// Advance the diagnostic tick counter
    pub fn advance_ticks(&mut self, delta: u64) {
        self.ticks += delta;
    }

    /// Make the stack probe fail for one thread
    pub fn break_stack_of(&mut self, id: ThreadId) {
        self.broken_stacks.push(id);
    }

    /// Recorded (old, new) context addresses, in swap order
    pub fn swaps(&self) -> &[(usize, usize)] {
        &self.swaps
    }

    pub fn swap_count(&self) -> usize {
        self.swaps.len()
    }

    /// Threads whose user state was saved, in order
    pub fn user_saves(&self) -> &[ThreadId] {
        &self.user_saves
    }

    /// Threads whose user state was restored, in order
    pub fn user_restores(&self) -> &[ThreadId] {
        &self.user_restores
    }
}

impl Default for LoopbackCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelCtx for LoopbackCtx {
    fn preemption_disabled(&self) -> bool {
        self.preemption_disabled
    }

    fn now_ticks(&self) -> u64 {
        self.ticks
    }

    fn save_user_state(&mut self, thread: &mut Thread) {
        self.user_saves.push(thread.id());
    }

    fn restore_user_state(&mut self, thread: &mut Thread) {
        self.user_restores.push(thread.id());
    }

    fn stack_intact(&self, thread: &Thread) -> bool {
        !self.broken_stacks.contains(&thread.id())
    }

    unsafe fn swap_context(&mut self, old_ctx: *mut ThreadContext, new_ctx: *const ThreadContext) {
        self.swaps.push((old_ctx as usize, new_ctx as usize));
    }
}
