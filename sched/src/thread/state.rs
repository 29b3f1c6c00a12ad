//! Thread Lifecycle States

use core::fmt;

/// Thread execution state
///
/// `Creating` is the state of a freshly built TCB that has never been
/// admitted; `Finished` marks a thread parked in the destruction-pending
/// slot until its stack is no longer in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadState {
    /// Built but never admitted
    Creating,
    /// Waiting in one of the level queues
    Ready,
    /// Owns the CPU
    Running,
    /// Parked in the blocked registry
    Blocked,
    /// Terminated, awaiting reclamation
    Finished,
}

impl ThreadState {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadState::Creating => "CREATING",
            ThreadState::Ready => "READY",
            ThreadState::Running => "RUNNING",
            ThreadState::Blocked => "BLOCKED",
            ThreadState::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for ThreadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validate a state transition
pub fn validate_transition(from: ThreadState, to: ThreadState) -> bool {
    use ThreadState::*;
    matches!(
        (from, to),
        (Creating, Ready)       // first admission
            | (Creating, Running)   // bootstrap adoption
            | (Ready, Running)      // dispatched
            | (Running, Ready)      // yielded or preempted
            | (Running, Blocked)    // blocked on a primitive
            | (Running, Finished)   // terminating dispatch
            | (Blocked, Ready)      // woken
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(validate_transition(ThreadState::Creating, ThreadState::Ready));
        assert!(validate_transition(ThreadState::Creating, ThreadState::Running));
        assert!(validate_transition(ThreadState::Ready, ThreadState::Running));
        assert!(validate_transition(ThreadState::Running, ThreadState::Ready));
        assert!(validate_transition(ThreadState::Running, ThreadState::Blocked));
        assert!(validate_transition(ThreadState::Running, ThreadState::Finished));
        assert!(validate_transition(ThreadState::Blocked, ThreadState::Ready));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!validate_transition(ThreadState::Ready, ThreadState::Blocked));
        assert!(!validate_transition(ThreadState::Blocked, ThreadState::Running));
        assert!(!validate_transition(ThreadState::Finished, ThreadState::Ready));
        assert!(!validate_transition(ThreadState::Finished, ThreadState::Running));
        assert!(!validate_transition(ThreadState::Creating, ThreadState::Blocked));
        assert!(!validate_transition(ThreadState::Ready, ThreadState::Ready));
    }

    #[test]
    fn test_display_names() {
        assert_eq!(ThreadState::Running.as_str(), "RUNNING");
        assert_eq!(alloc::format!("{}", ThreadState::Finished), "FINISHED");
    }
}
