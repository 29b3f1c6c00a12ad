//! Level Queues
//!
//! The three ready queues. Each queue owns its TCBs and enforces one
//! ordering discipline at insertion:
//! - L1 ascending remaining burst, equal bursts in admission order
//! - L2 ascending thread id
//! - L3 admission order
//!
//! The queues are plain containers; state changes, logging, and preemption
//! decisions happen in the scheduler on top of them.

use alloc::boxed::Box;
use alloc::collections::VecDeque;

use crate::level::Level;
use crate::thread::{Thread, ThreadId};

/// A single level queue
pub struct LevelQueue {
    level: Level,
    threads: VecDeque<Box<Thread>>,
}

impl LevelQueue {
    pub const fn new(level: Level) -> Self {
        Self { level, threads: VecDeque::new() }
    }

    /// Insert preserving the level's ordering discipline
    pub fn insert(&mut self, thread: Box<Thread>) {
        let pos = match self.level {
            // First strictly greater key; ties stay behind earlier arrivals.
            Level::L1 => {
                let burst = thread.remaining_burst();
                self.threads.iter().position(|t| t.remaining_burst() > burst)
            }
            Level::L2 => {
                let id = thread.id();
                self.threads.iter().position(|t| t.id() > id)
            }
            Level::L3 => None,
        };
        match pos {
            Some(idx) => self.threads.insert(idx, thread),
            None => self.threads.push_back(thread),
        }
    }

    /// Remove and return the front thread
    pub fn pop_front(&mut self) -> Option<Box<Thread>> {
        self.threads.pop_front()
    }

    /// Peek the front thread
    pub fn front(&self) -> Option<&Thread> {
        self.threads.front().map(|t| t.as_ref())
    }

    /// Remove an arbitrary member by id
    pub fn remove(&mut self, id: ThreadId) -> Option<Box<Thread>> {
        let idx = self.threads.iter().position(|t| t.id() == id)?;
        self.threads.remove(idx)
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Thread> {
        self.threads.iter().map(|t| t.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Thread> {
        self.threads.iter_mut().map(|t| t.as_mut())
    }
}

/// The three level queues as one unit
pub struct ReadyQueues {
    l1: LevelQueue,
    l2: LevelQueue,
    l3: LevelQueue,
}

impl ReadyQueues {
    pub const fn new() -> Self {
        Self {
            l1: LevelQueue::new(Level::L1),
            l2: LevelQueue::new(Level::L2),
            l3: LevelQueue::new(Level::L3),
        }
    }

    pub fn queue(&self, level: Level) -> &LevelQueue {
        match level {
            Level::L1 => &self.l1,
            Level::L2 => &self.l2,
            Level::L3 => &self.l3,
        }
    }

    pub fn queue_mut(&mut self, level: Level) -> &mut LevelQueue {
        match level {
            Level::L1 => &mut self.l1,
            Level::L2 => &mut self.l2,
            Level::L3 => &mut self.l3,
        }
    }

    /// Insert into the queue for `level`
    pub fn insert(&mut self, level: Level, thread: Box<Thread>) {
        self.queue_mut(level).insert(thread);
    }

    /// Remove the front of the first non-empty queue, L1 before L2 before L3
    pub fn pop_first_nonempty(&mut self) -> Option<(Level, Box<Thread>)> {
        if let Some(thread) = self.l1.pop_front() {
            return Some((Level::L1, thread));
        }
        if let Some(thread) = self.l2.pop_front() {
            return Some((Level::L2, thread));
        }
        if let Some(thread) = self.l3.pop_front() {
            return Some((Level::L3, thread));
        }
        None
    }

    /// Which level currently queues the thread, if any
    pub fn find_level(&self, id: ThreadId) -> Option<Level> {
        for level in [Level::L1, Level::L2, Level::L3] {
            if self.queue(level).iter().any(|t| t.id() == id) {
                return Some(level);
            }
        }
        None
    }

    /// Queue lengths as (L1, L2, L3)
    pub fn lengths(&self) -> (usize, usize, usize) {
        (self.l1.len(), self.l2.len(), self.l3.len())
    }

    pub fn is_empty(&self) -> bool {
        self.l1.is_empty() && self.l2.is_empty() && self.l3.is_empty()
    }
}
