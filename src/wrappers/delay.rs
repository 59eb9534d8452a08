use crate::{WaitMs, scheduler::Scheduler};

/// Schedule one call of `f(args)` at least `wait` from now.
///
/// Returns immediately; `f` never runs on the caller's stack, even with [`WaitMs::ZERO`].
/// The registration cannot be cancelled. The return value of `f` is discarded, and a panic
/// in `f` surfaces wherever `scheduler` reports task failures.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
/// use decorum::{ManualScheduler, WaitMs};
///
/// let scheduler = ManualScheduler::new();
/// let seen = Arc::new(Mutex::new(Vec::new()));
///
/// let sink = Arc::clone(&seen);
/// decorum::delay(
///     &scheduler,
///     move |(a, b): (&str, &str)| sink.lock().unwrap().push(format!("{a}{b}")),
///     WaitMs::try_from(500).unwrap(),
///     ("a", "b"),
/// );
///
/// assert!(seen.lock().unwrap().is_empty());
/// scheduler.advance(Duration::from_millis(500));
/// assert_eq!(*seen.lock().unwrap(), vec!["ab".to_string()]);
/// ```
pub fn delay<A, R, F>(scheduler: &dyn Scheduler, f: F, wait: WaitMs, args: A)
where
    F: FnOnce(A) -> R + Send + 'static,
    A: Send + 'static,
{
    scheduler.schedule(
        Box::new(move || {
            let _ = f(args);
        }),
        wait.as_duration(),
    );
}
