use std::{
    fmt,
    sync::{Arc, Mutex},
};

use crate::{
    WaitMs,
    common::lock,
    scheduler::{Scheduler, Task},
};

/// Rate-limited wrapper: the wrapped function runs at most once per window.
///
/// Created by [`throttle`].
///
/// # Algorithm
///
/// The throttle is either idle (the leader slot is free) or inside a window.
///
/// 1. **Every call:** `pending += 1` and the call's arguments become the latest arguments
/// 2. **Idle:** the call takes the leader slot and runs the *leader action* right away
/// 3. **Inside a window:** the call joins the backlog and returns the previous result
///
/// The **leader action** decrements `pending`, schedules a *retest* after `wait`, then runs
/// the wrapped function with the latest arguments and stores the result.
///
/// The **retest** reads `pending` at firing time:
/// - `pending > 0`: the whole backlog is coalesced into one trailing run (excess calls are
///   dropped) and the leader action runs again
/// - `pending == 0`: the leader slot is freed and the throttle is idle again
///
/// Net effect: calls arriving during a window never run the function synchronously but
/// guarantee exactly one extra run shortly after the window closes; calls arriving once the
/// window has drained run immediately.
///
/// # Semantics & Limitations
///
/// **Latest arguments win:** the trailing run receives the arguments of the most recent
/// call. Wrap a no-argument function as `|()| ...` to ignore arguments entirely.
///
/// **Panics:** a panic in the wrapped function propagates to whichever call triggered the
/// leader action, or to the scheduler for a trailing run. Counters are updated and the
/// retest is scheduled before the function runs, so the throttle keeps draining afterwards.
///
/// # Thread Safety
///
/// Counters live behind one mutex per instance; the wrapped function sits behind a second
/// mutex so concurrent callers absorbed into the backlog never wait on a slow run.
pub struct Throttle<F, A, R> {
    inner: Arc<ThrottleInner<F, A, R>>,
}

struct ThrottleInner<F, A, R> {
    func: Mutex<F>,
    state: Mutex<ThrottleState<A, R>>,
    wait: WaitMs,
    scheduler: Arc<dyn Scheduler>,
}

struct ThrottleState<A, R> {
    pending: u64,
    leader_free: bool,
    last_result: Option<R>,
    latest_args: Option<A>,
}

/// Wrap `f` so it runs at most once per `wait`, with at most one queued trailing run.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
/// use std::time::Duration;
/// use decorum::{ManualScheduler, WaitMs};
///
/// let scheduler = Arc::new(ManualScheduler::new());
/// let runs = Arc::new(AtomicU32::new(0));
///
/// let counter = Arc::clone(&runs);
/// let tick = decorum::throttle(
///     scheduler.clone(),
///     move |()| counter.fetch_add(1, Ordering::SeqCst) + 1,
///     WaitMs::try_from(100).unwrap(),
/// );
///
/// assert_eq!(tick.call(()), Some(1));
/// scheduler.advance(Duration::from_millis(10));
/// assert_eq!(tick.call(()), Some(1)); // absorbed, stale result
/// scheduler.advance(Duration::from_millis(10));
/// assert_eq!(tick.call(()), Some(1));
///
/// scheduler.run_until_idle();
/// assert_eq!(runs.load(Ordering::SeqCst), 2);
/// ```
pub fn throttle<A, R, F>(scheduler: Arc<dyn Scheduler>, f: F, wait: WaitMs) -> Throttle<F, A, R>
where
    F: FnMut(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    Throttle {
        inner: Arc::new(ThrottleInner {
            func: Mutex::new(f),
            state: Mutex::new(ThrottleState {
                pending: 0,
                leader_free: true,
                last_result: None,
                latest_args: None,
            }),
            wait,
            scheduler,
        }),
    }
}

impl<F, A, R> Throttle<F, A, R>
where
    F: FnMut(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    /// Invoke the throttle.
    ///
    /// Returns the result of the run this call triggered, or the most recent result if the
    /// call joined the backlog. `None` only if no run has completed yet.
    pub fn call(&self, args: A) -> Option<R> {
        {
            let mut state = lock(&self.inner.state);
            state.pending += 1;
            state.latest_args = Some(args);

            if !state.leader_free {
                tracing::trace!(pending = state.pending, "throttle.backlog");
                return state.last_result.clone();
            }

            state.leader_free = false;
        }

        Some(ThrottleInner::lead(&self.inner))
    } // end method call

    /// Result of the most recent completed run.
    pub fn last_result(&self) -> Option<R> {
        lock(&self.inner.state).last_result.clone()
    }

    /// Window length.
    pub fn wait(&self) -> WaitMs {
        self.inner.wait
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> u64 {
        lock(&self.inner.state).pending
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        lock(&self.inner.state).leader_free
    }
}

impl<F, A, R> ThrottleInner<F, A, R>
where
    F: FnMut(A) -> R + Send + 'static,
    A: Send + 'static,
    R: Clone + Send + 'static,
{
    fn lead(inner: &Arc<Self>) -> R {
        let args = {
            let mut state = lock(&inner.state);
            state.pending = state.pending.saturating_sub(1);
            state.latest_args.take()
        };

        let Some(args) = args else {
            unreachable!("Throttle::lead: a pending call always leaves its arguments");
        };

        let retest = Arc::clone(inner);
        let task: Task = Box::new(move || Self::retest(&retest));
        inner.scheduler.schedule(task, inner.wait.as_duration());

        // Stored under the func guard so a later run cannot be overwritten by an older one.
        let mut func = lock(&inner.func);
        let result = (*func)(args);
        lock(&inner.state).last_result = Some(result.clone());
        drop(func);

        result
    } // end method lead

    fn retest(inner: &Arc<Self>) {
        {
            let mut state = lock(&inner.state);

            if state.pending == 0 {
                state.leader_free = true;
                return;
            }

            let dropped = state.pending - 1;
            if dropped > 0 {
                tracing::debug!(dropped, "throttle.coalesce, backlog merged into one run");
            }
            state.pending = 1;
        }

        Self::lead(inner);
    } // end method retest
}

impl<F, A, R> fmt::Debug for Throttle<F, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner.state);
        f.debug_struct("Throttle")
            .field("wait", &self.inner.wait)
            .field("pending", &state.pending)
            .field("leader_free", &state.leader_free)
            .finish()
    }
}
