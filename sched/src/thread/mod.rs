//! Thread Control Blocks and Lifecycle

pub mod state;
pub mod thread;

pub use state::{validate_transition, ThreadState};
pub use thread::{alloc_thread_id, Thread, ThreadContext, ThreadId};
