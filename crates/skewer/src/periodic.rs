//! # Periodic Task Runner
//!
//! [`PeriodicTask`] repeatedly invokes a zero-argument task in the background
//! for as long as it is entered, optionally running it one final time on exit.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info_span, warn, Instrument};
use crate::callable::{immediate, AsyncCallable, Immediate};
use crate::config::PeriodicConfig;
use crate::error::{panic_message, PeriodicError};

/// The running loop of an entered [`PeriodicTask`].
struct TaskLoop<R> {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<R>,
}

/// # PeriodicTask
///
/// Runs a task over and over while entered.
///
/// [`enter`](Self::enter) spawns a loop that invokes the task, then waits for
/// [`PeriodicConfig::delay`] before invoking it again. [`exit`](Self::exit)
/// ends the loop and, when [`PeriodicConfig::run_on_exit`] is set, the task
/// runs once more before `exit` returns. A task that fails ends the loop early;
/// its error is returned by the next `exit`.
///
/// The task can be entered again after every exit. Dropping a task that is
/// still entered aborts its loop without the final run.
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
/// use skewer::{PeriodicConfig, PeriodicTask};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let ticks = Arc::new(AtomicUsize::new(0));
/// let counter = ticks.clone();
///
/// let mut task = PeriodicTask::from_fn(
///     move |()| {
///         counter.fetch_add(1, Ordering::SeqCst);
///         Ok::<_, std::io::Error>(())
///     },
///     PeriodicConfig::default().with_delay(Duration::from_millis(5)),
/// );
///
/// task.scoped(|| tokio::time::sleep(Duration::from_millis(20))).await.unwrap();
///
/// // one run on entry, a few while sleeping, one on exit
/// assert!(ticks.load(Ordering::SeqCst) >= 2);
/// # }
/// ```
pub struct PeriodicTask<T>
where
    T: AsyncCallable<()>,
{
    task: Arc<T>,
    config: PeriodicConfig,
    running: Option<TaskLoop<T::Output>>,
    runtime: Option<Handle>,
}

impl<T, E> PeriodicTask<T>
where
    T: AsyncCallable<(), Output = Result<(), E>> + 'static,
    E: Send + 'static,
{
    pub fn new(task: T, config: PeriodicConfig) -> Self {
        Self {
            task: Arc::new(task),
            config,
            running: None,
            runtime: None,
        }
    }

    /// Runs the loop on `runtime` instead of the runtime current at [`enter`](Self::enter).
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Spawns the loop and yields once so its first run can start.
    ///
    /// # Errors
    ///
    /// * [`PeriodicError::AlreadyRunning`] if the task was entered and not exited
    /// * [`PeriodicError::NoRuntime`] if no runtime was configured and none is current
    pub async fn enter(&mut self) -> Result<(), PeriodicError<E>> {
        if self.running.is_some() {
            return Err(PeriodicError::AlreadyRunning);
        }
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|_| PeriodicError::NoRuntime)?,
        };

        let (stop, stopped) = oneshot::channel();
        let task_loop = run_periodically(Arc::clone(&self.task), self.config.clone(), stopped);
        let handle = runtime.spawn(task_loop.instrument(info_span!("periodic_task")));
        self.running = Some(TaskLoop { stop, handle });
        debug!(delay = ?self.config.delay, "periodic task entered");

        tokio::task::yield_now().await;
        Ok(())
    }

    /// Stops the loop and waits for it, including the final run if configured.
    ///
    /// Exiting a task that is not entered does nothing.
    ///
    /// # Errors
    ///
    /// * [`PeriodicError::Task`] with the error that ended the loop
    /// * [`PeriodicError::Panicked`] if the task panicked
    pub async fn exit(&mut self) -> Result<(), PeriodicError<E>> {
        let Some(TaskLoop { stop, handle }) = self.running.take() else {
            return Ok(());
        };
        // the loop may already have ended on an error
        let _ = stop.send(());

        let outcome = match handle.await {
            Ok(result) => result.map_err(PeriodicError::Task),
            Err(err) if err.is_panic() => Err(PeriodicError::Panicked(panic_message(err.into_panic()))),
            Err(_) => Ok(()),
        };
        debug!(ok = outcome.is_ok(), "periodic task exited");
        outcome
    }

    /// Runs `body` with the task entered and exits afterwards.
    ///
    /// A failure of the task is returned even though `body` completed.
    pub async fn scoped<F, Fut, R>(&mut self, body: F) -> Result<R, PeriodicError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = R>,
    {
        self.enter().await?;
        let output = body().await;
        self.exit().await?;
        Ok(output)
    }
}

impl<F, E> PeriodicTask<Immediate<F>>
where
    F: Fn(()) -> Result<(), E> + Send + Sync + 'static,
    E: Send + 'static,
{
    /// Creates a periodic task from a function that runs without suspending.
    pub fn from_fn(func: F, config: PeriodicConfig) -> Self {
        Self::new(immediate(func), config)
    }
}

impl<T> PeriodicTask<T>
where
    T: AsyncCallable<()>,
{
    /// `true` between a successful [`enter`](Self::enter) and the matching `exit`.
    pub fn is_entered(&self) -> bool {
        self.running.is_some()
    }

    pub fn config(&self) -> &PeriodicConfig {
        &self.config
    }
}

impl<T> Drop for PeriodicTask<T>
where
    T: AsyncCallable<()>,
{
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.handle.abort();
            debug!("periodic task dropped while entered, loop aborted");
        }
    }
}

impl<T> fmt::Debug for PeriodicTask<T>
where
    T: AsyncCallable<()>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PeriodicTask")
            .field("config", &self.config)
            .field("entered", &self.is_entered())
            .finish_non_exhaustive()
    }
}

async fn run_periodically<T, E>(
    task: Arc<T>,
    config: PeriodicConfig,
    mut stopped: oneshot::Receiver<()>,
) -> Result<(), E>
where
    T: AsyncCallable<(), Output = Result<(), E>>,
{
    loop {
        if let Err(error) = task.call(()).await {
            warn!("periodic task failed, loop ended");
            return Err(error);
        }

        tokio::select! {
            biased;
            _ = &mut stopped => break,
            _ = pause(&config) => {}
        }
    }

    if config.run_on_exit {
        task.call(()).await?;
    }
    Ok(())
}

async fn pause(config: &PeriodicConfig) {
    if config.delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        time::sleep(config.delay).await;
    }
}
