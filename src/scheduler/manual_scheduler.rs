use std::{fmt, sync::Mutex, time::Duration};

use crate::{
    common::lock,
    scheduler::{Scheduler, Task, TimerQueue},
};

/// Deterministic scheduler driven by an explicit fake clock.
///
/// Time starts at zero and only moves through [`advance`](Self::advance) or
/// [`run_until_idle`](Self::run_until_idle). Due tasks run on the calling thread, one at a
/// time, in deadline order (ties in registration order). Tasks scheduled by a running task
/// are picked up within the same `advance` if they fall due before the target time.
///
/// A task that panics propagates out of `advance`; the clock stays at that task's deadline.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
/// use std::time::Duration;
/// use decorum::{ManualScheduler, Scheduler};
///
/// let scheduler = ManualScheduler::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = Arc::clone(&hits);
/// scheduler.schedule(
///     Box::new(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     }),
///     Duration::from_millis(100),
/// );
///
/// scheduler.advance(Duration::from_millis(99));
/// assert_eq!(hits.load(Ordering::SeqCst), 0);
///
/// scheduler.advance(Duration::from_millis(1));
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
pub struct ManualScheduler {
    clock: Mutex<ManualClock>,
}

struct ManualClock {
    now: Duration,
    timers: TimerQueue<Duration>,
}

impl ManualScheduler {
    /// Create a scheduler whose clock reads zero.
    pub fn new() -> Self {
        Self {
            clock: Mutex::new(ManualClock {
                now: Duration::ZERO,
                timers: TimerQueue::new(),
            }),
        }
    }

    /// Current fake time, measured from construction.
    pub fn now(&self) -> Duration {
        lock(&self.clock).now
    }

    /// Number of registered tasks that have not run yet.
    pub fn pending_tasks(&self) -> usize {
        lock(&self.clock).timers.len()
    }

    /// Move the clock forward by `by`, running every task that falls due on the way.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        let mut fired = 0;

        loop {
            let due = {
                let mut clock = lock(&self.clock);
                match clock.timers.pop_due(target) {
                    Some((deadline, task)) => {
                        if deadline > clock.now {
                            clock.now = deadline;
                        }
                        Some(task)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };

            let Some(task) = due else {
                break;
            };

            task();
            fired += 1;
        }

        fired
    } // end method advance

    /// Keep advancing to the next deadline until no task is pending.
    ///
    /// Does not return if tasks keep rescheduling themselves forever.
    pub fn run_until_idle(&self) -> usize {
        let mut fired = 0;

        loop {
            let next = {
                let clock = lock(&self.clock);
                clock
                    .timers
                    .next_deadline()
                    .map(|deadline| deadline.saturating_sub(clock.now))
            };

            let Some(step) = next else {
                return fired;
            };

            fired += self.advance(step);
        }
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let clock = lock(&self.clock);
        f.debug_struct("ManualScheduler")
            .field("now", &clock.now)
            .field("pending_tasks", &clock.timers.len())
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: Task, delay: Duration) {
        let mut clock = lock(&self.clock);
        let deadline = clock.now.saturating_add(delay);
        clock.timers.push(deadline, task);
    }
}
