use std::{
    hash::{Hash, Hasher},
    ops::Deref,
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use crate::DecorumError;

/// A validated wait duration in milliseconds.
///
/// Used by [`delay`](crate::delay) and [`throttle`](crate::throttle) to express how long the
/// scheduler should hold a task before running it.
///
/// # Validation
///
/// - Zero is allowed: the task still runs later, never synchronously
/// - Must not exceed [`WaitMs::MAX`]
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use decorum::WaitMs;
///
/// let wait = WaitMs::try_from(250).unwrap();
/// assert_eq!(*wait, 250);
/// assert_eq!(wait.as_duration(), Duration::from_millis(250));
///
/// assert!(WaitMs::try_from(Duration::from_secs(1)).is_ok());
/// assert!(WaitMs::try_from(u64::MAX).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitMs(u64);

impl WaitMs {
    /// Largest accepted wait (2_147_483_647 ms, roughly 24.8 days).
    pub const MAX: Self = Self(2_147_483_647);

    /// No wait; the task runs on the scheduler's next turn.
    pub const ZERO: Self = Self(0);

    /// Wait as a [`Duration`].
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Deref for WaitMs {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<u64> for WaitMs {
    type Error = DecorumError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > Self::MAX.0 {
            Err(DecorumError::InvalidWaitMs(format!(
                "Wait must not exceed {} ms",
                Self::MAX.0
            )))
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<Duration> for WaitMs {
    type Error = DecorumError;

    fn try_from(value: Duration) -> Result<Self, Self::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        Self::try_from(millis)
    }
}

impl From<WaitMs> for Duration {
    fn from(value: WaitMs) -> Self {
        value.as_duration()
    }
}

/// A dynamically typed primitive argument.
///
/// Lets a single memoized function accept a mix of booleans, integers, floats and
/// strings while keeping cache keys exact. Keys are type-tagged, so `Int(1)` and
/// `Str("1")` never share a cache slot.
///
/// Floats compare and hash by bit pattern: `NaN` equals itself, while `0.0` and
/// `-0.0` are distinct keys.
#[derive(Debug, Clone)]
pub enum Primitive {
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A float, keyed by its bits.
    Float(f64),
    /// A string.
    Str(String),
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Primitive {}

impl Hash for Primitive {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Str(v) => v.hash(state),
        }
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Primitive {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Locks `mutex`, recovering the guard if a wrapped function panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
