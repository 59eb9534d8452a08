use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Condvar, Mutex},
    thread,
    time::{Duration, Instant},
};

use crate::{
    DecorumError,
    common::lock,
    scheduler::{Scheduler, Task, TimerQueue},
};

/// Deadline used when `now + delay` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(60 * 60 * 24 * 365 * 30);

/// Scheduler backed by a single background timer thread.
///
/// All tasks run on that one thread, one at a time, in deadline order (ties in registration
/// order). This gives the decorators a single cooperative execution context: a retest from
/// one throttle never runs concurrently with a deferred call on the same scheduler.
///
/// # Failure handling
///
/// A task that panics is caught and reported through `tracing::error!`; the thread keeps
/// serving the remaining timers.
///
/// # Shutdown
///
/// Dropping the scheduler stops the thread. Timers that have not fired yet are discarded.
/// Tasks scheduled by a throttle hold the throttle (and through it the scheduler) alive, so
/// a scheduler shared with active throttles only drops once their backlogs drain.
pub struct ThreadScheduler {
    shared: Arc<TimerShared>,
}

struct TimerShared {
    state: Mutex<TimerState>,
    wake: Condvar,
}

struct TimerState {
    timers: TimerQueue<Instant>,
    shutdown: bool,
}

impl ThreadScheduler {
    /// Start the timer thread.
    pub fn new() -> Result<Self, DecorumError> {
        let shared = Arc::new(TimerShared {
            state: Mutex::new(TimerState {
                timers: TimerQueue::new(),
                shutdown: false,
            }),
            wake: Condvar::new(),
        });

        let worker = Arc::clone(&shared);
        thread::Builder::new()
            .name("decorum-timer".to_string())
            .spawn(move || worker.run())?;

        Ok(Self { shared })
    }

    /// Number of registered tasks that have not run yet.
    pub fn pending_tasks(&self) -> usize {
        lock(&self.shared.state).timers.len()
    }
}

impl TimerShared {
    fn run(&self) {
        loop {
            let task = {
                let mut state = lock(&self.state);

                loop {
                    if state.shutdown {
                        let dropped = state.timers.clear();
                        if dropped > 0 {
                            tracing::debug!(dropped, "scheduler shut down with pending timers");
                        }
                        return;
                    }

                    let now = Instant::now();
                    if let Some((_, task)) = state.timers.pop_due(now) {
                        break task;
                    }

                    state = match state.timers.next_deadline() {
                        None => self
                            .wake
                            .wait(state)
                            .unwrap_or_else(|err| err.into_inner()),
                        Some(deadline) => {
                            self.wake
                                .wait_timeout(state, deadline.saturating_duration_since(now))
                                .unwrap_or_else(|err| err.into_inner())
                                .0
                        }
                    };
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                tracing::error!(panic = %message, "scheduled task panicked");
            }
        }
    } // end method run
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, task: Task, delay: Duration) {
        let now = Instant::now();
        let deadline = now
            .checked_add(delay)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        lock(&self.shared.state).timers.push(deadline, task);
        self.shared.wake.notify_one();
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        lock(&self.shared.state).shutdown = true;
        self.shared.wake.notify_one();
    }
}

impl fmt::Debug for ThreadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadScheduler")
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}
