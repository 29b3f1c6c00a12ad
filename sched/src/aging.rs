//! Aging
//!
//! Starvation avoidance. A periodic pass accrues wait time for every
//! queued thread, boosts priority once the wait reaches a threshold, and
//! migrates threads whose boosted priority crossed into a higher band.
//! Only queued threads age: the running thread, the blocked registry, and
//! the destruction-pending slot are untouched.

use alloc::format;
use alloc::vec::Vec;

use crate::ctx::KernelCtx;
use crate::error::SchedulerError;
use crate::level::Level;
use crate::logger;
use crate::scheduler::Scheduler;
use crate::thread::ThreadId;

/// Wait time accrued per aging pass
pub const AGING_QUANTUM: u64 = 100;

/// Accrued wait that triggers a boost and resets to zero
pub const AGING_THRESHOLD: u64 = 400;

/// Priority added per boost
pub const PRIORITY_BOOST: u32 = 10;

impl Scheduler {
    /// One aging pass over every queued thread
    ///
    /// Driven by the embedder's timer at a fixed interval. Levels age in
    /// L3, L2, L1 order, so a thread promoted out of L3 is also aged by
    /// the L2 leg of the same invocation.
    pub fn age_all(&mut self, ctx: &mut dyn KernelCtx) {
        crate::sched_assert!(
            ctx.preemption_disabled(),
            SchedulerError::PreemptionEnabled { op: "age_all" }
        );
        self.age_level(Level::L3, ctx);
        self.age_level(Level::L2, ctx);
        self.age_level(Level::L1, ctx);
    }

    fn age_level(&mut self, level: Level, ctx: &mut dyn KernelCtx) {
        // Boost in place first; queue order keys (id, burst) are unchanged
        // by aging, so membership only needs fixing afterwards.
        let mut crossed: Vec<ThreadId> = Vec::new();

        for thread in self.queues.queue_mut(level).iter_mut() {
            thread.set_wait_time(thread.wait_time() + AGING_QUANTUM);
            if thread.wait_time() >= AGING_THRESHOLD {
                let from = thread.priority();
                let to = from + PRIORITY_BOOST;
                thread.set_priority(to);
                thread.set_wait_time(0);
                self.stats.record_boost();
                logger::debug(&format!(
                    "[UpdatePriority] Tick [{}]: Thread [{}] changes its priority from [{}] to [{}]",
                    ctx.now_ticks(),
                    thread.id(),
                    from,
                    to
                ));
                if Level::for_priority(to) != level {
                    crossed.push(thread.id());
                }
            }
        }

        for id in crossed {
            let thread = match self.queues.queue_mut(level).remove(id) {
                Some(thread) => thread,
                None => crate::sched_fatal!(SchedulerError::NotQueued { thread: id, level }),
            };
            logger::debug(&format!(
                "[RemoveFromQueue] Tick [{}]: Thread [{}] is removed from queue L[{}]",
                ctx.now_ticks(),
                id,
                level.number()
            ));
            let dest = Level::for_priority(thread.priority());
            logger::debug(&format!(
                "[InsertToQueue] Tick [{}]: Thread [{}] is inserted into queue L[{}]",
                ctx.now_ticks(),
                id,
                dest.number()
            ));
            self.queues.insert(dest, thread);
            self.stats.record_promotion();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ctx::LoopbackCtx;
    use crate::thread::{Thread, ThreadState};
    use alloc::boxed::Box;

    fn booted() -> (Scheduler, LoopbackCtx) {
        let mut sched = Scheduler::new();
        let mut ctx = LoopbackCtx::new();
        sched.bootstrap(Box::new(Thread::new_kernel("boot", 0, 0)), &mut ctx);
        (sched, ctx)
    }

    fn queued_priority_and_wait(sched: &Scheduler, ctx: &LoopbackCtx, id: u64) -> (u32, u64) {
        let mut found = None;
        sched.describe(ctx, |thread, _level| {
            if thread.id() == id {
                found = Some((thread.priority(), thread.wait_time()));
            }
        });
        found.unwrap()
    }

    #[test]
    fn test_five_passes_boost_once_and_keep_accruing() {
        let (mut sched, mut ctx) = booted();
        let t = Box::new(Thread::new_kernel("starved", 10, 5));
        let id = t.id();
        sched.mark_ready(t, &mut ctx);

        let mut waits = Vec::new();
        for _ in 0..5 {
            ctx.advance_ticks(100);
            sched.age_all(&mut ctx);
            waits.push(queued_priority_and_wait(&sched, &ctx, id).1);
        }

        assert_eq!(waits, [100, 200, 300, 0, 100]);
        let (priority, wait) = queued_priority_and_wait(&sched, &ctx, id);
        assert_eq!(priority, 20);
        assert_eq!(wait, 100);
        assert_eq!(sched.queue_lengths(), (0, 0, 1)); // still in L3
        assert_eq!(sched.stats().snapshot().priority_boosts, 1);
        assert_eq!(sched.stats().snapshot().level_promotions, 0);
    }

    #[test]
    fn test_boost_across_low_band_boundary_promotes_to_l2() {
        let (mut sched, mut ctx) = booted();
        let t = Box::new(Thread::new_kernel("climber", 45, 5));
        let id = t.id();
        sched.mark_ready(t, &mut ctx);

        for _ in 0..4 {
            sched.age_all(&mut ctx);
        }

        assert_eq!(sched.queue_lengths(), (0, 1, 0));
        let (priority, wait) = queued_priority_and_wait(&sched, &ctx, id);
        assert_eq!(priority, 55);
        // Promoted during the L3 leg, then aged again by the L2 leg of the
        // same pass.
        assert_eq!(wait, 100);
        assert_eq!(sched.stats().snapshot().level_promotions, 1);
    }

    #[test]
    fn test_boost_across_mid_band_boundary_promotes_to_l1() {
        let (mut sched, mut ctx) = booted();
        let t = Box::new(Thread::new_kernel("climber", 95, 5));
        let id = t.id();
        sched.mark_ready(t, &mut ctx);

        for _ in 0..4 {
            sched.age_all(&mut ctx);
        }

        assert_eq!(sched.queue_lengths(), (1, 0, 0));
        let (priority, wait) = queued_priority_and_wait(&sched, &ctx, id);
        assert_eq!(priority, 105);
        assert_eq!(wait, 100);
    }

    #[test]
    fn test_l1_boost_resets_wait_without_promotion() {
        let (mut sched, mut ctx) = booted();
        let t = Box::new(Thread::new_kernel("patient", 120, 5));
        let id = t.id();
        sched.mark_ready(t, &mut ctx);

        for _ in 0..4 {
            sched.age_all(&mut ctx);
        }

        let (priority, wait) = queued_priority_and_wait(&sched, &ctx, id);
        assert_eq!(priority, 130);
        assert_eq!(wait, 0); // L1 ages last; nothing re-ages it
        assert_eq!(sched.queue_lengths(), (1, 0, 0));
        assert_eq!(sched.stats().snapshot().level_promotions, 0);
    }

    #[test]
    fn test_boost_past_nominal_band_top_stays_in_l1() {
        let (mut sched, mut ctx) = booted();
        let t = Box::new(Thread::new_kernel("veteran", 145, 5));
        let id = t.id();
        sched.mark_ready(t, &mut ctx);

        for _ in 0..8 {
            sched.age_all(&mut ctx);
        }

        let (priority, _) = queued_priority_and_wait(&sched, &ctx, id);
        assert_eq!(priority, 165);
        assert_eq!(sched.queue_lengths(), (1, 0, 0));
    }

    #[test]
    fn test_running_and_blocked_threads_do_not_age() {
        let mut sched = Scheduler::new();
        let mut ctx = LoopbackCtx::new();
        let boot = Box::new(Thread::new_kernel("boot", 0, 0));
        let boot_id = boot.id();
        sched.bootstrap(boot, &mut ctx);

        let sleeper = Box::new(Thread::new_kernel("sleeper", 60, 5));
        let sleeper_id = sleeper.id();
        sched.mark_ready(sleeper, &mut ctx);

        // Boot blocks; the sleeper takes the CPU.
        assert!(sched.block_current(&mut ctx));
        assert_eq!(sched.current_id(), Some(sleeper_id));
        assert_eq!(sched.thread_state(boot_id), Some(ThreadState::Blocked));

        for _ in 0..5 {
            sched.age_all(&mut ctx);
        }

        // Neither the running thread nor the blocked one accrued wait.
        assert_eq!(sched.with_current(|t| t.wait_time()), Some(0));
        assert_eq!(sched.stats().snapshot().priority_boosts, 0);

        // The blocked thread re-admits with zero wait.
        assert!(sched.unblock(boot_id, &mut ctx));
        sched.describe(&ctx, |t, _| {
            if t.id() == boot_id {
                assert_eq!(t.wait_time(), 0);
            }
        });
    }
}
