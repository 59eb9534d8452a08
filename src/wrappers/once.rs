use std::{fmt, sync::Mutex};

use crate::common::lock;

enum GateState<F, R> {
    Armed(F),
    Firing,
    Fired(Option<R>),
}

/// Invocation gate: the wrapped function runs at most once.
///
/// Created by [`once`]. The first [`call`](Self::call) runs the function with its
/// arguments and stores the result; every later call ignores its arguments and returns a
/// clone of that stored result.
///
/// # Panics in the wrapped function
///
/// A panic propagates to the first caller untouched. The gate still counts as fired and
/// every later call returns `None`.
///
/// # Concurrency
///
/// The gate's lock is held while the function runs, so concurrent first callers wait and
/// then observe the same result. The wrapped function must not call its own gate.
pub struct Once<F, R> {
    state: Mutex<GateState<F, R>>,
}

/// Wrap `f` so its body executes at most one time.
///
/// Arguments are passed as a single value, usually a tuple (`()` for none).
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let count = AtomicU32::new(0);
/// let init = decorum::once(|()| count.fetch_add(1, Ordering::SeqCst) + 1);
///
/// for _ in 0..5 {
///     assert_eq!(init.call(()), Some(1));
/// }
/// assert_eq!(count.load(Ordering::SeqCst), 1);
/// ```
pub fn once<A, R, F>(f: F) -> Once<F, R>
where
    F: FnOnce(A) -> R,
{
    Once {
        state: Mutex::new(GateState::Armed(f)),
    }
}

impl<F, R> Once<F, R> {
    /// Invoke the gate.
    ///
    /// Returns `None` only when the first invocation panicked.
    pub fn call<A>(&self, args: A) -> Option<R>
    where
        F: FnOnce(A) -> R,
        R: Clone,
    {
        let mut state = lock(&self.state);

        match std::mem::replace(&mut *state, GateState::Firing) {
            GateState::Armed(f) => {
                let result = f(args);
                *state = GateState::Fired(Some(result.clone()));
                Some(result)
            }
            // The lock was poisoned by a first call that unwound mid-flight.
            GateState::Firing => {
                *state = GateState::Fired(None);
                None
            }
            GateState::Fired(result) => {
                let out = result.clone();
                *state = GateState::Fired(result);
                out
            }
        }
    } // end method call

    /// Whether the wrapped function has been invoked.
    pub fn has_run(&self) -> bool {
        !matches!(*lock(&self.state), GateState::Armed(_))
    }
}

impl<F, R> fmt::Debug for Once<F, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Once")
            .field("has_run", &self.has_run())
            .finish()
    }
}
