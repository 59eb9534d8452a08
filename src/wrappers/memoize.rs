use std::{fmt, hash::Hash};

use dashmap::DashMap;

/// Result cache keyed by the call's arguments.
///
/// Created by [`memoize`]. The argument value itself is the cache key, so identical
/// arguments always hit the same slot and distinct values never collide. For functions over
/// mixed primitive inputs use [`Primitive`](crate::Primitive) as the argument type.
///
/// # Semantics & Limitations
///
/// **Purity is assumed:**
/// - The wrapped function must return the same output for the same input
/// - This is not checked
///
/// **Write-once entries:**
/// - A key is inserted at most once and its value is never replaced
/// - Two threads missing on the same key may both compute; the first insert wins and both
///   return the stored value
///
/// **Unbounded growth:**
/// - There is no eviction; every distinct argument stays cached for the lifetime of the handle
///
/// **Panics:**
/// - A panic in the wrapped function inserts nothing and propagates to the caller
///
/// # Thread Safety
///
/// Entries live in a [`DashMap`](dashmap::DashMap). The wrapped function runs outside any
/// shard lock, so it may call other memoized functions freely.
pub struct Memoize<F, A, R> {
    func: F,
    entries: DashMap<A, R>,
}

/// Cache the results of the pure function `f`, keyed by argument.
///
/// Arguments are passed as a single value, usually a tuple.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicU32, Ordering};
///
/// let runs = AtomicU32::new(0);
/// let double = decorum::memoize(|n: i64| {
///     runs.fetch_add(1, Ordering::SeqCst);
///     n * 2
/// });
///
/// assert_eq!(double.call(3), 6);
/// assert_eq!(double.call(3), 6);
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// ```
pub fn memoize<A, R, F>(f: F) -> Memoize<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    Memoize {
        func: f,
        entries: DashMap::new(),
    }
}

impl<F, A, R> Memoize<F, A, R>
where
    F: Fn(A) -> R,
    A: Eq + Hash + Clone,
    R: Clone,
{
    /// Return the cached result for `args`, computing and storing it on a miss.
    pub fn call(&self, args: A) -> R {
        if let Some(hit) = self.entries.get(&args) {
            tracing::trace!("memoize.hit");
            return hit.value().clone();
        }

        tracing::trace!("memoize.miss");
        let value = (self.func)(args.clone());

        self.entries.entry(args).or_insert(value).value().clone()
    } // end method call

    /// Whether a result for `args` is cached.
    pub fn contains(&self, args: &A) -> bool {
        self.entries.contains_key(args)
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F, A, R> fmt::Debug for Memoize<F, A, R>
where
    A: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoize")
            .field("entries", &self.entries.len())
            .finish()
    }
}
