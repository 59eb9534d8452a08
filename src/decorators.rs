//! Top-level entrypoint that wires a scheduler into the decorators.
//!
//! The free functions ([`once`](crate::once), [`memoize`](crate::memoize),
//! [`delay`](crate::delay), [`throttle`](crate::throttle)) work on their own; [`Decorators`]
//! just carries one shared [`Scheduler`] so call sites do not have to thread it through.

use std::{fmt, hash::Hash, sync::Arc};

use crate::{
    DecorumError, Memoize, Once, ThreadScheduler, Throttle, WaitMs, memoize, once,
    scheduler::Scheduler, throttle,
};

/// Top-level configuration for [`Decorators`].
#[derive(Clone)]
pub struct DecoratorsOptions {
    /// Timer service used by `delay` and `throttle`.
    pub scheduler: Arc<dyn Scheduler>,
}

/// Decorator entrypoint.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use decorum::{Decorators, DecoratorsOptions, ManualScheduler, WaitMs};
///
/// let scheduler = Arc::new(ManualScheduler::new());
/// let decorators = Decorators::new(DecoratorsOptions {
///     scheduler: scheduler.clone(),
/// });
///
/// let square = decorators.memoize(|n: u64| n * n);
/// assert_eq!(square.call(12), 144);
///
/// let save = decorators.throttle(|()| "saved", WaitMs::try_from(1_000).unwrap());
/// assert_eq!(save.call(()), Some("saved"));
///
/// scheduler.advance(Duration::from_secs(1));
/// ```
#[derive(Clone)]
pub struct Decorators {
    scheduler: Arc<dyn Scheduler>,
}

impl Decorators {
    /// Create a new [`Decorators`].
    pub fn new(options: DecoratorsOptions) -> Self {
        Self {
            scheduler: options.scheduler,
        }
    }

    /// Create a new [`Decorators`] backed by a fresh [`ThreadScheduler`].
    pub fn with_thread_scheduler() -> Result<Self, DecorumError> {
        Ok(Self::new(DecoratorsOptions {
            scheduler: Arc::new(ThreadScheduler::new()?),
        }))
    }

    /// Access the shared scheduler.
    pub fn scheduler(&self) -> &Arc<dyn Scheduler> {
        &self.scheduler
    }

    /// See [`once`](crate::once).
    pub fn once<A, R, F>(&self, f: F) -> Once<F, R>
    where
        F: FnOnce(A) -> R,
    {
        once(f)
    }

    /// See [`memoize`](crate::memoize).
    pub fn memoize<A, R, F>(&self, f: F) -> Memoize<F, A, R>
    where
        F: Fn(A) -> R,
        A: Eq + Hash + Clone,
        R: Clone,
    {
        memoize(f)
    }

    /// Run `f(args)` on the shared scheduler after `wait`. See [`delay`](crate::delay).
    pub fn delay<A, R, F>(&self, f: F, wait: WaitMs, args: A)
    where
        F: FnOnce(A) -> R + Send + 'static,
        A: Send + 'static,
    {
        crate::delay(self.scheduler.as_ref(), f, wait, args);
    }

    /// Throttle `f` on the shared scheduler. See [`throttle`](crate::throttle).
    pub fn throttle<A, R, F>(&self, f: F, wait: WaitMs) -> Throttle<F, A, R>
    where
        F: FnMut(A) -> R + Send + 'static,
        A: Send + 'static,
        R: Clone + Send + 'static,
    {
        throttle(Arc::clone(&self.scheduler), f, wait)
    }
}

impl fmt::Debug for Decorators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Decorators").finish_non_exhaustive()
    }
}
