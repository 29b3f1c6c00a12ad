//! Scheduler Statistics
//!
//! Relaxed atomic counters bumped on the scheduling paths. Diagnostic
//! only: nothing here feeds back into scheduling decisions.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Counters for scheduler activity
pub struct SchedulerStats {
    /// Completed context switches
    pub context_switches: AtomicU64,
    /// Threads removed from a level queue by selection
    pub picks: AtomicU64,
    /// Yields forced by shortest-burst admission into L1
    pub preemptions: AtomicU64,
    /// Voluntary yields
    pub yields: AtomicU64,
    /// Aging boosts applied (+10 priority)
    pub priority_boosts: AtomicU64,
    /// Threads migrated to a higher level by aging
    pub level_promotions: AtomicU64,
    /// Finished threads reclaimed from the destruction-pending slot
    pub reclaims: AtomicU64,
}

impl SchedulerStats {
    pub const fn new() -> Self {
        Self {
            context_switches: AtomicU64::new(0),
            picks: AtomicU64::new(0),
            preemptions: AtomicU64::new(0),
            yields: AtomicU64::new(0),
            priority_boosts: AtomicU64::new(0),
            level_promotions: AtomicU64::new(0),
            reclaims: AtomicU64::new(0),
        }
    }

    pub fn record_switch(&self) {
        self.context_switches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pick(&self) {
        self.picks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_preemption(&self) {
        self.preemptions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_yield(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_boost(&self) {
        self.priority_boosts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_promotion(&self) {
        self.level_promotions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reclaim(&self) {
        self.reclaims.fetch_add(1, Ordering::Relaxed);
    }

    /// Consistent point-in-time copy
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            context_switches: self.context_switches.load(Ordering::Relaxed),
            picks: self.picks.load(Ordering::Relaxed),
            preemptions: self.preemptions.load(Ordering::Relaxed),
            yields: self.yields.load(Ordering::Relaxed),
            priority_boosts: self.priority_boosts.load(Ordering::Relaxed),
            level_promotions: self.level_promotions.load(Ordering::Relaxed),
            reclaims: self.reclaims.load(Ordering::Relaxed),
        }
    }
}

impl Default for SchedulerStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Plain copy of the counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub context_switches: u64,
    pub picks: u64,
    pub preemptions: u64,
    pub yields: u64,
    pub priority_boosts: u64,
    pub level_promotions: u64,
    pub reclaims: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "switches={} picks={} preemptions={} yields={} boosts={} promotions={} reclaims={}",
            self.context_switches,
            self.picks,
            self.preemptions,
            self.yields,
            self.priority_boosts,
            self.level_promotions,
            self.reclaims
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = SchedulerStats::new();
        stats.record_switch();
        stats.record_switch();
        stats.record_preemption();
        let snap = stats.snapshot();
        assert_eq!(snap.context_switches, 2);
        assert_eq!(snap.preemptions, 1);
        assert_eq!(snap.yields, 0);
    }

    #[test]
    fn test_snapshot_display_lists_all_counters() {
        let stats = SchedulerStats::new();
        stats.record_boost();
        let text = alloc::format!("{}", stats.snapshot());
        assert!(text.contains("boosts=1"));
        assert!(text.contains("switches=0"));
    }
}
