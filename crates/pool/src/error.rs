use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("worker pool needs at least one worker")]
    EmptyPool,
    #[error("no worker with index {0}")]
    UnknownWorker(usize),
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("task panicked before completing")]
    TaskPanicked,
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

pub type Result<T> = std::result::Result<T, PoolError>;
