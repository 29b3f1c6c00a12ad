//! Scheduler Core
//!
//! The three-level feedback queue scheduler. L1 runs shortest remaining
//! burst first and preempts on admission; L2 runs lowest thread id first
//! without preemption; L3 is round-robin in admission order.
//!
//! Selection drains L1 before L2 before L3; the aging pass migrates
//! starved threads upward (see `aging`). Mutual exclusion is structural:
//! every operation runs inside the caller's preemption-disabled section
//! and the core takes no locks of its own, because lock acquisition could
//! re-enter the scheduler.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;

use crate::ctx::KernelCtx;
use crate::error::SchedulerError;
use crate::level::Level;
use crate::logger;
use crate::queue::ReadyQueues;
use crate::stats::SchedulerStats;
use crate::thread::{Thread, ThreadId, ThreadState};

/// Three-level feedback queue scheduler
///
/// Owns every TCB it schedules: ready threads live in the level queues,
/// the running thread in `current`, blocked threads in the registry, and
/// a terminating thread in the destruction-pending slot until a foreign
/// stack reclaims it.
pub struct Scheduler {
    /// The three ready queues
    pub(crate) queues: ReadyQueues,
    /// Thread currently owning the CPU
    current: Option<Box<Thread>>,
    /// Finished thread whose stack may still be in use; reclaimed in the
    /// next post-swap phase
    to_reclaim: Option<Box<Thread>>,
    /// Threads parked while blocked on a primitive
    blocked: BTreeMap<ThreadId, Box<Thread>>,
    /// Activity counters
    pub(crate) stats: SchedulerStats,
}

impl Scheduler {
    pub const fn new() -> Self {
        Self {
            queues: ReadyQueues::new(),
            current: None,
            to_reclaim: None,
            blocked: BTreeMap::new(),
            stats: SchedulerStats::new(),
        }
    }

    /// Adopt the boot thread as the running thread
    ///
    /// The kernel's startup context must own the CPU before the first
    /// dispatch; this records it without a context swap.
    pub fn bootstrap(&mut self, mut thread: Box<Thread>, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "bootstrap" }
        );
        if let Some(current) = self.current.as_deref() {
            crate::sched_fatal!(SchedulerError::AlreadyBootstrapped {
                current: current.id(),
                incoming: thread.id(),
            });
        }
        thread.set_state(ThreadState::Running);
        logger::debug(&format!(
            "[Bootstrap] Tick [{}]: Thread [{}] adopts the CPU",
            ctx.now_ticks(),
            thread.id()
        ));
        self.current = Some(thread);
    }

    /// Admit a thread into the queue matching its priority band
    ///
    /// High-band admission preempts: if the newcomer's remaining burst is
    /// strictly shorter than the burst of the thread that was at the L1
    /// front before this insertion, and a thread is running, the running
    /// thread yields immediately. Admission into an empty L1 never
    /// preempts, and neither does mid- or low-band admission.
    pub fn mark_ready(&mut self, thread: Box<Thread>, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "mark_ready" }
        );
        let burst = thread.remaining_burst();
        let displaced = self
            .queues
            .queue(Level::L1)
            .front()
            .map(|front| front.remaining_burst());
        let level = self.admit(thread, ctx);

        if level == Level::L1 && self.current.is_some() {
            if let Some(front_burst) = displaced {
                if burst < front_burst {
                    self.stats.record_preemption();
                    logger::debug(&format!(
                        "[Preempt] Tick [{}]: burst [{}] admitted over L1 front [{}]",
                        ctx.now_ticks(),
                        burst,
                        front_burst
                    ));
                    self.yield_now(ctx);
                }
            }
        }
    }

    /// Classify and insert; shared by external admission and the yield path
    fn admit(&mut self, mut thread: Box<Thread>, ctx: &mut dyn KernelCtx) -> Level {
        let level = Level::for_priority(thread.priority());
        thread.set_state(ThreadState::Ready);
        logger::debug(&format!(
            "[InsertToQueue] Tick [{}]: Thread [{}] is inserted into queue L[{}]",
            ctx.now_ticks(),
            thread.id(),
            level.number()
        ));
        self.queues.insert(level, thread);
        level
    }

    /// Remove and return the next thread to run
    ///
    /// Strict level priority: L1 drains before L2 before L3. `None` means
    /// every queue is empty and the caller runs its idle path; the core
    /// has no idle thread of its own.
    pub fn select_next(&mut self, ctx: &mut dyn KernelCtx) -> Option<Box<Thread>> {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "select_next" }
        );
        let (level, thread) = match self.queues.pop_first_nonempty() {
            Some(found) => found,
            None => return None,
        };
        self.stats.record_pick();
        logger::debug(&format!(
            "[RemoveFromQueue] Tick [{}]: Thread [{}] is removed from queue L[{}]",
            ctx.now_ticks(),
            thread.id(),
            level.number()
        ));
        Some(thread)
    }

    /// Hand the CPU to `next`
    ///
    /// The operation is split around the context swap. Pre-swap, still on
    /// the outgoing thread's stack: mark and park the outgoing thread
    /// (destruction-pending slot when `finishing`, blocked registry when
    /// it blocked, otherwise back through admission), save its user state,
    /// probe its stack. Then the swap abandons this stack; the call
    /// returns only when a later dispatch switches the saved context back
    /// in, and the tail runs [`Self::finish_switch`] on the resumed stack.
    ///
    /// # Panics
    /// No running thread; destruction slot occupied while `finishing`;
    /// stack probe failure; preemption enabled at entry or at resume.
    pub fn dispatch(&mut self, mut next: Box<Thread>, finishing: bool, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "dispatch" }
        );
        let mut old = match self.current.take() {
            Some(thread) => thread,
            None => crate::sched_fatal!(SchedulerError::NoRunningThread { op: "dispatch" }),
        };
        let old_id = old.id();

        if finishing {
            if let Some(pending) = self.to_reclaim.as_deref() {
                crate::sched_fatal!(SchedulerError::ReclaimSlotOccupied {
                    pending: pending.id(),
                    incoming: old_id,
                });
            }
            old.set_state(ThreadState::Finished);
        }

        if old.is_user_thread() {
            ctx.save_user_state(&mut old);
        }

        crate::sched_assert!(
            ctx.stack_intact(&old),
            SchedulerError::StackOverflow { thread: old_id }
        );

        // The context lives on the heap: the pointer stays valid while the
        // box below moves between owners.
        let old_ctx = old.context_ptr();

        if finishing {
            self.to_reclaim = Some(old);
        } else if old.state() == ThreadState::Blocked {
            self.blocked.insert(old_id, old);
        } else {
            // Yield path: back into the queues. Cannot re-preempt, the
            // running slot is vacant until the switch below.
            self.admit(old, ctx);
        }

        logger::debug(&format!(
            "[Dispatch] Tick [{}]: switching from Thread [{}] to Thread [{}]",
            ctx.now_ticks(),
            old_id,
            next.id()
        ));
        next.set_state(ThreadState::Running);
        next.inc_context_switches();
        let new_ctx = next.context_ptr();
        self.current = Some(next);
        self.stats.record_switch();

        // The outgoing stack is abandoned here.
        unsafe { ctx.swap_context(old_ctx, new_ctx) };

        // Running again, on the resumed thread's stack.
        self.finish_switch(ctx);
    }

    /// Post-swap phase: reclaim and restore, on the resumed stack
    ///
    /// Runs automatically at the tail of every dispatch that resumes. A
    /// brand-new thread never returns through a dispatch frame, so the
    /// embedder's thread trampoline must call this once on first entry,
    /// before the thread body.
    pub fn finish_switch(&mut self, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "finish_switch" }
        );
        self.reclaim_finished(ctx);
        if let Some(current) = self.current.as_deref_mut() {
            if current.is_user_thread() {
                ctx.restore_user_state(current);
            }
        }
    }

    /// Drop the thread parked in the destruction-pending slot, if any
    ///
    /// Only reached from the post-swap phase: the slot's occupant owns a
    /// stack some earlier dispatch abandoned, never the one executing
    /// here, so freeing the TCB cannot pull the stack out from under us.
    fn reclaim_finished(&mut self, ctx: &mut dyn KernelCtx) {
        if let Some(finished) = self.to_reclaim.take() {
            logger::debug(&format!(
                "[Reclaim] Tick [{}]: Thread [{}] destroyed",
                ctx.now_ticks(),
                finished.id()
            ));
            self.stats.record_reclaim();
            // TCB freed here.
        }
    }

    /// Voluntarily hand the CPU to the next ready thread, if any
    pub fn yield_now(&mut self, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "yield_now" }
        );
        crate::sched_assert!(
            self.current.is_some(),
            SchedulerError::NoRunningThread { op: "yield_now" }
        );
        let next = match self.select_next(ctx) {
            Some(thread) => thread,
            None => return, // alone; keep running
        };
        self.stats.record_yield();
        self.dispatch(next, false, ctx);
    }

    /// Block the running thread and hand the CPU over
    ///
    /// Returns `false` without side effects when no other thread is
    /// ready; the caller idles and retries. On success the outgoing TCB
    /// parks in the blocked registry until [`Self::unblock`].
    pub fn block_current(&mut self, ctx: &mut dyn KernelCtx) -> bool {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "block_current" }
        );
        crate::sched_assert!(
            self.current.is_some(),
            SchedulerError::NoRunningThread { op: "block_current" }
        );
        let next = match self.select_next(ctx) {
            Some(thread) => thread,
            None => return false,
        };
        if let Some(current) = self.current.as_deref_mut() {
            current.set_state(ThreadState::Blocked);
            logger::debug(&format!(
                "[Block] Tick [{}]: Thread [{}] blocks",
                ctx.now_ticks(),
                current.id()
            ));
        }
        self.dispatch(next, false, ctx);
        true
    }

    /// Wake a blocked thread and re-admit it
    ///
    /// The full admission path runs, preemption check included. Returns
    /// `false` for an id the registry does not hold.
    pub fn unblock(&mut self, id: ThreadId, ctx: &mut dyn KernelCtx) -> bool {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "unblock" }
        );
        match self.blocked.remove(&id) {
            Some(thread) => {
                logger::debug(&format!(
                    "[Unblock] Tick [{}]: Thread [{}] wakes",
                    ctx.now_ticks(),
                    id
                ));
                self.mark_ready(thread, ctx);
                true
            }
            None => {
                logger::warn(&format!(
                    "[Unblock] Tick [{}]: Thread [{}] is not blocked",
                    ctx.now_ticks(),
                    id
                ));
                false
            }
        }
    }

    /// Terminate the running thread and hand the CPU over
    ///
    /// Returns `false` when no successor exists; the kernel then halts or
    /// idles and retries. Otherwise dispatches with the terminating flag.
    /// On hardware the successful path never returns (the calling context
    /// is dead); the `true` return is observable only under an in-process
    /// context such as [`crate::ctx::LoopbackCtx`].
    pub fn finish_current(&mut self, ctx: &mut dyn KernelCtx) -> bool {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "finish_current" }
        );
        crate::sched_assert!(
            self.current.is_some(),
            SchedulerError::NoRunningThread { op: "finish_current" }
        );
        let next = match self.select_next(ctx) {
            Some(thread) => thread,
            None => return false,
        };
        self.dispatch(next, true, ctx);
        true
    }

    /// Visit every queued thread, L1 first, each queue in its own order
    pub fn describe<F>(&self, ctx: &dyn KernelCtx, mut visit: F)
    where
        F: FnMut(&Thread, Level),
    {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "describe" }
        );
        for level in [Level::L1, Level::L2, Level::L3] {
            for thread in self.queues.queue(level).iter() {
                visit(thread, level);
            }
        }
    }

    /// Id of the running thread
    pub fn current_id(&self) -> Option<ThreadId> {
        self.current.as_deref().map(|t| t.id())
    }

    /// Run a closure over the running thread's TCB
    ///
    /// This is how the embedder's CPU accounting updates the remaining
    /// burst of the thread it just ran.
    pub fn with_current<F, R>(&mut self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Thread) -> R,
    {
        self.current.as_deref_mut().map(f)
    }

    /// Where a thread currently is, if the scheduler owns it
    pub fn thread_state(&self, id: ThreadId) -> Option<ThreadState> {
        if let Some(current) = self.current.as_deref() {
            if current.id() == id {
                return Some(current.state());
            }
        }
        if self.queues.find_level(id).is_some() {
            return Some(ThreadState::Ready);
        }
        if let Some(pending) = self.to_reclaim.as_deref() {
            if pending.id() == id {
                return Some(ThreadState::Finished);
            }
        }
        self.blocked.get(&id).map(|t| t.state())
    }

    /// Id of the thread awaiting reclamation, if any
    pub fn pending_reclaim(&self) -> Option<ThreadId> {
        self.to_reclaim.as_deref().map(|t| t.id())
    }

    /// Queue lengths as (L1, L2, L3)
    pub fn queue_lengths(&self) -> (usize, usize, usize) {
        self.queues.lengths()
    }

    /// Whether any thread waits in the level queues
    pub fn has_ready(&self) -> bool {
        !self.queues.is_empty()
    }

    /// Activity counters
    pub fn stats(&self) -> &SchedulerStats {
        &self.stats
    }

    /// Log the counters at info level
    pub fn log_stats(&self) {
        logger::info(&format!("[Stats] {}", self.stats.snapshot()));
    }

    #[cfg(test)]
    pub(crate) fn force_pending(&mut self, thread: Box<Thread>) {
        self.to_reclaim = Some(thread);
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
