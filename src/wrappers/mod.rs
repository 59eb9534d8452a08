//! The four decorators.
//!
//! Each is a factory taking a function and returning a handle that owns the decorator's
//! private state. None of them depends on another; compose them in your own code.
//!
//! Rust has no variadic calls, so a wrapped function always takes its arguments as one
//! value: a tuple for several arguments, `()` for none.
//!
//! - [`once`]: the body runs at most once, every call sees the first result
//! - [`memoize`]: results cached by argument, no eviction
//! - [`delay`]: one deferred call with bound arguments
//! - [`throttle`]: at most one run per window plus one trailing run for the backlog

mod delay;
pub use delay::*;

mod memoize;
pub use memoize::*;

mod once;
pub use once::*;

mod throttle;
pub use throttle::*;
