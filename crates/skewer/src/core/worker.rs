//! Module for handling the background batch formation task.

use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A handle for managing the background task that forms and dispatches batches.
///
/// The task is spawned on construction and cancelled at its current
/// suspension point by [`shutdown`](Self::shutdown), [`abort`](Self::abort) or
/// drop. Work the task has already handed off (dispatched batches) is not
/// affected by cancelling it.
///
/// # Example
///
/// ```ignore
/// let worker = BatchWorkerHandle::spawn(&Handle::current(), async move {
///     loop {
///         // wait for work, then hand it off
///     }
/// });
///
/// // stop the loop and wait until it is gone
/// worker.shutdown().await;
/// ```
pub(crate) struct BatchWorkerHandle {
    /// Handle to the spawned background task, becomes `None` once cancellation is initiated
    handle: Option<JoinHandle<()>>,
}

impl BatchWorkerHandle {
    /// Spawns `task` on `runtime` and returns a handle owning it.
    pub fn spawn<F>(runtime: &Handle, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = runtime.spawn(task);
        debug!("batch worker started");
        Self {
            handle: Some(handle),
        }
    }

    /// `true` while the task has been neither cancelled nor finished.
    ///
    /// A loop that ended by panicking reports `false`, so it can be replaced.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Requests cancellation without waiting for the task to observe it.
    ///
    /// Returns the task's join handle the first time it is called.
    pub fn abort(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.handle.take()?;
        handle.abort();
        debug!("batch worker cancelled");
        Some(handle)
    }

    /// Cancels the task and waits until it has stopped.
    pub async fn shutdown(mut self) {
        let Some(handle) = self.abort() else {
            return;
        };
        match handle.await {
            Err(err) if err.is_panic() => warn!("batch worker panicked before shutdown"),
            _ => debug!("batch worker stopped"),
        }
    }
}

impl Drop for BatchWorkerHandle {
    /// Ensures the background task is cancelled when the handle is dropped.
    fn drop(&mut self) {
        self.abort();
    }
}
