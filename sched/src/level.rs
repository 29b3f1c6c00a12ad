//! Priority Bands
//!
//! Maps a thread's numeric priority onto one of the three scheduling
//! levels. The low band `[0, 50)` is L3, the mid band `[50, 100)` is L2,
//! and everything from 100 up is L1: the high band has a nominal top of
//! 150 but no hard ceiling, since aging keeps boosting threads that wait.

use core::fmt;

/// Upper bound (exclusive) of the low band
pub const LOW_BAND_MAX: u32 = 50;

/// Upper bound (exclusive) of the mid band
pub const MID_BAND_MAX: u32 = 100;

/// Nominal upper bound of the high band. Admission above it still lands in
/// L1; aging can push a long-waiting L1 thread past it.
pub const HIGH_BAND_MAX: u32 = 150;

/// Scheduling level, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Preemptive shortest-remaining-burst queue
    L1,
    /// Non-preemptive queue ordered by thread id
    L2,
    /// Round-robin queue in admission order
    L3,
}

impl Level {
    /// Band classification for a priority value
    pub fn for_priority(priority: u32) -> Level {
        match priority {
            p if p < LOW_BAND_MAX => Level::L3,
            p if p < MID_BAND_MAX => Level::L2,
            _ => Level::L1,
        }
    }

    /// Queue number as printed in diagnostics (L1 = 1)
    pub fn number(self) -> u8 {
        match self {
            Level::L1 => 1,
            Level::L2 => 2,
            Level::L3 => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::const_assert;

    const_assert!(LOW_BAND_MAX < MID_BAND_MAX);
    const_assert!(MID_BAND_MAX < HIGH_BAND_MAX);

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Level::for_priority(0), Level::L3);
        assert_eq!(Level::for_priority(49), Level::L3);
        assert_eq!(Level::for_priority(50), Level::L2);
        assert_eq!(Level::for_priority(99), Level::L2);
        assert_eq!(Level::for_priority(100), Level::L1);
        assert_eq!(Level::for_priority(149), Level::L1);
    }

    #[test]
    fn test_high_band_open_ended() {
        assert_eq!(Level::for_priority(150), Level::L1);
        assert_eq!(Level::for_priority(u32::MAX), Level::L1);
    }

    #[test]
    fn test_display_number() {
        assert_eq!(alloc::format!("{}", Level::L1), "L1");
        assert_eq!(Level::L3.number(), 3);
    }

    proptest! {
        #[test]
        fn classification_matches_band(priority in 0u32..HIGH_BAND_MAX) {
            let level = Level::for_priority(priority);
            match level {
                Level::L3 => prop_assert!(priority < LOW_BAND_MAX),
                Level::L2 => prop_assert!((LOW_BAND_MAX..MID_BAND_MAX).contains(&priority)),
                Level::L1 => prop_assert!(priority >= MID_BAND_MAX),
            }
        }
    }
}
