/// Error type for this crate.
#[derive(Debug, thiserror::Error)]
pub enum DecorumError {
    /// A wait duration was outside the range the schedulers accept.
    #[error("invalid wait: {0}")]
    InvalidWaitMs(String),

    /// The background timer thread could not be started.
    #[error("failed to spawn scheduler thread: {0}")]
    SchedulerSpawn(#[from] std::io::Error),

    /// No async runtime was available to attach a scheduler to.
    #[error("async runtime unavailable: {0}")]
    RuntimeUnavailable(String),
}
