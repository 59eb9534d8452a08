use std::{future::Future, time::Duration};

use crate::DecorumError;

#[cfg(feature = "runtime-tokio")]
pub(crate) type Spawner = tokio::runtime::Handle;

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
#[derive(Clone, Copy, Debug)]
pub(crate) struct Spawner;

#[cfg(feature = "runtime-tokio")]
pub(crate) fn current_spawner() -> Result<Spawner, DecorumError> {
    tokio::runtime::Handle::try_current()
        .map_err(|err| DecorumError::RuntimeUnavailable(err.to_string()))
}

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub(crate) fn current_spawner() -> Result<Spawner, DecorumError> {
    Ok(Spawner)
}

#[cfg(feature = "runtime-tokio")]
pub(crate) fn spawn_task<F>(spawner: &Spawner, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn(fut);
}

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub(crate) fn spawn_task<F>(_spawner: &Spawner, fut: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    smol::spawn(fut).detach();
}

#[cfg(feature = "runtime-tokio")]
pub(crate) async fn sleep(d: Duration) {
    tokio::time::sleep(d).await;
}

#[cfg(all(feature = "runtime-smol", not(feature = "runtime-tokio")))]
pub(crate) async fn sleep(d: Duration) {
    smol::Timer::after(d).await;
}
