use std::{fmt, time::Duration};

use crate::{
    DecorumError,
    runtime::{self, Spawner},
    scheduler::{Scheduler, Task},
};

/// Scheduler that spawns one sleeping task per registration on the async runtime.
///
/// With `runtime-tokio` the scheduler captures the runtime it was created in, so it can be
/// used from threads outside that runtime. With `runtime-smol` tasks go to smol's global
/// executor. If both features are enabled, tokio is used.
///
/// Ordering is best-effort: on a multi-threaded runtime two tasks with close deadlines may
/// run concurrently or out of order.
#[cfg_attr(docsrs, doc(cfg(any(feature = "runtime-tokio", feature = "runtime-smol"))))]
pub struct AsyncScheduler {
    spawner: Spawner,
}

impl AsyncScheduler {
    /// Attach to the current runtime.
    ///
    /// Fails with [`DecorumError::RuntimeUnavailable`] when called outside a tokio runtime.
    pub fn new() -> Result<Self, DecorumError> {
        Ok(Self {
            spawner: runtime::current_spawner()?,
        })
    }
}

impl Scheduler for AsyncScheduler {
    fn schedule(&self, task: Task, delay: Duration) {
        runtime::spawn_task(&self.spawner, async move {
            runtime::sleep(delay).await;
            task();
        });
    }
}

impl fmt::Debug for AsyncScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncScheduler").finish_non_exhaustive()
    }
}
