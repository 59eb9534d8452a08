#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod decorators;
pub use decorators::*;

mod wrappers;
pub use wrappers::*;

pub mod scheduler;
pub use scheduler::{ManualScheduler, Scheduler, Task, ThreadScheduler};

#[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
pub use scheduler::AsyncScheduler;

#[cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))]
mod runtime;

mod error;
pub use error::*;

mod common;
pub use common::{Primitive, WaitMs};

#[cfg(test)]
mod tests;
