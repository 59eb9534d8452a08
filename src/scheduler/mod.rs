//! Timer services the decorators schedule deferred work on.
//!
//! [`delay`](crate::delay) and [`throttle`](crate::throttle) never sleep on the caller's
//! thread. They hand a [`Task`] to a [`Scheduler`] and return immediately.
//!
//! # Implementations
//!
//! - [`ThreadScheduler`]: one background timer thread, tasks run one at a time in deadline order
//! - [`ManualScheduler`]: deterministic fake clock, time only moves when told to
//! - `AsyncScheduler`: spawns sleeping tasks on tokio or smol (`runtime-tokio` / `runtime-smol`)

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

mod manual_scheduler;
pub use manual_scheduler::*;

mod thread_scheduler;
pub use thread_scheduler::*;

#[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
mod async_scheduler;
#[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
pub use async_scheduler::*;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A timer service.
///
/// Implementations must run `task` exactly once, no earlier than `delay` after the call,
/// and must not run it synchronously inside `schedule`. Registrations cannot be cancelled.
pub trait Scheduler: Send + Sync {
    /// Register `task` to run after `delay`.
    fn schedule(&self, task: Task, delay: Duration);
}

struct TimerEntry<D> {
    deadline: D,
    seq: u64,
    task: Task,
}

impl<D: Ord> PartialEq for TimerEntry<D> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<D: Ord> Eq for TimerEntry<D> {}

impl<D: Ord> PartialOrd for TimerEntry<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Ord> Ord for TimerEntry<D> {
    // Reversed so the max-heap pops the earliest deadline, ties in registration order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .deadline
            .cmp(&self.deadline)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Deadline-ordered queue of pending tasks, shared by the thread and manual schedulers.
pub(crate) struct TimerQueue<D> {
    heap: BinaryHeap<TimerEntry<D>>,
    next_seq: u64,
}

impl<D: Ord + Copy> TimerQueue<D> {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    pub fn push(&mut self, deadline: D, task: Task) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(TimerEntry {
            deadline,
            seq,
            task,
        });
    }

    pub fn next_deadline(&self) -> Option<D> {
        self.heap.peek().map(|entry| entry.deadline)
    }

    /// Pops the earliest task if its deadline is at or before `now`.
    pub fn pop_due(&mut self, now: D) -> Option<(D, Task)> {
        match self.heap.peek() {
            Some(entry) if entry.deadline <= now => {}
            _ => return None,
        }

        self.heap.pop().map(|entry| (entry.deadline, entry.task))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.heap.len();
        self.heap.clear();
        dropped
    }
}
