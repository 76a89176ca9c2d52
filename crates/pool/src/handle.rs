use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::error::{PoolError, Result};

/// Completion handle returned by [`crate::WorkerPool::submit`].
///
/// Resolves to `Ok(())` once the task has run to completion and to
/// [`PoolError::TaskPanicked`] if the task unwound instead. The handle can be
/// awaited or waited on synchronously; dropping it does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle {
    rx: oneshot::Receiver<()>,
}

impl TaskHandle {
    pub(crate) fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx }
    }

    /// Blocks the calling thread until the task finishes.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait(self) -> Result<()> {
        self.rx.blocking_recv().map_err(|_| PoolError::TaskPanicked)
    }

    /// Non-blocking check; `None` while the task is still queued or running.
    pub fn try_wait(&mut self) -> Option<Result<()>> {
        match self.rx.try_recv() {
            Ok(()) => Some(Ok(())),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PoolError::TaskPanicked)),
        }
    }
}

impl Future for TaskHandle {
    type Output = Result<()>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|res| res.map_err(|_| PoolError::TaskPanicked))
    }
}
