use std::fmt;
use std::future::Future;
use std::sync::Arc;
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::debug;
use crate::callable::{immediate, suspending, AsyncCallable};
use crate::communication::{PendingCall, Submission};
use crate::config::SubmitterConfig;
use crate::core::batch::{Backend, Shared};
use crate::core::worker::BatchWorkerHandle;
use crate::error::{BatchError, BoxError, ConfigError, SubmitterError};
use super::session::Session;

/// Lifecycle state of a [`BatchSubmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitterState {
    /// No formation loop; submitted inputs wait in the queue
    Stopped,
    /// The formation loop is turning queued inputs into batches
    Running,
}

/// # BatchSubmitter
///
/// Coalesces independent single-input calls into batched calls of a listable backend.
///
/// Every [`submit`](Self::submit) queues one input and returns a
/// [`Submission`] resolving to that input's output. A background formation
/// loop groups queued inputs into batches according to the
/// [`SubmitterConfig`] and hands each batch to the backend as its own task, so
/// several batches can be in flight at once. When a batch completes, each
/// caller receives the output at its input's position, or the batch's failure.
///
/// ## Lifecycle
///
/// A submitter is constructed stopped. [`start`](Self::start) spawns the
/// formation loop and [`stop`](Self::stop) cancels it. Inputs that were never
/// drained stay queued across a stop and are picked up after the next start;
/// batches already in flight keep running and resolve their callers
/// regardless. Submitting to a stopped submitter starts it lazily when a
/// runtime is reachable. [`enter`](Self::enter) and [`scoped`](Self::scoped)
/// tie a running period to a scope. Dropping the submitter cancels its loop.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use skewer::{BatchSubmitter, SubmitterConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let config = SubmitterConfig::default()
///     .with_min_batch_size(4)
///     .with_timeout(Duration::from_millis(10));
///
/// let submitter = BatchSubmitter::from_fn(
///     |inputs: Vec<u64>| Ok::<_, std::io::Error>(inputs.into_iter().map(|x| x * 3).collect()),
///     config,
/// )
/// .unwrap();
///
/// let results = futures::future::join_all((0..10).map(|x| submitter.submit(x))).await;
/// let results: Vec<u64> = results.into_iter().map(Result::unwrap).collect();
/// assert_eq!(results, (0..10).map(|x| x * 3).collect::<Vec<_>>());
/// # }
/// ```
///
/// ## Type Parameters
///
/// * `I` - The type of a single input
/// * `O` - The type of a single output
pub struct BatchSubmitter<I, O> {
    /// Queue, in-flight set, backend and configuration
    shared: Arc<Shared<I, O>>,

    /// The running formation loop, if any
    worker: Mutex<Option<BatchWorkerHandle>>,

    /// Runtime for background work; the ambient runtime when `None`
    runtime: Option<Handle>,
}

impl<I, O> BatchSubmitter<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Creates a stopped submitter around a normalized listable backend.
    ///
    /// The backend's error type only needs to convert into a boxed error;
    /// whatever it reports reaches every caller of the failing batch as
    /// [`BatchError::Backend`].
    pub fn new<C, E>(backend: C, config: SubmitterConfig) -> Result<Self, ConfigError>
    where
        C: AsyncCallable<Vec<I>, Output = Result<Vec<O>, E>> + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        config.validate()?;
        let backend: Backend<I, O> = Arc::new(ErasedBackend { inner: backend });
        Ok(Self {
            shared: Arc::new(Shared::new(backend, config)),
            worker: Mutex::new(None),
            runtime: None,
        })
    }

    /// Creates a submitter around a backend that answers without suspending.
    pub fn from_fn<F, E>(func: F, config: SubmitterConfig) -> Result<Self, ConfigError>
    where
        F: Fn(Vec<I>) -> Result<Vec<O>, E> + Send + Sync + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::new(immediate(func), config)
    }

    /// Creates a submitter around a backend that returns a future.
    pub fn from_async_fn<F, Fut, E>(func: F, config: SubmitterConfig) -> Result<Self, ConfigError>
    where
        F: Fn(Vec<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<O>, E>> + Send + 'static,
        E: Into<BoxError> + Send + 'static,
    {
        Self::new(suspending(func), config)
    }

    /// Runs the formation loop and all batches on `runtime` instead of the
    /// runtime that happens to be current when the submitter starts.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Queues `input` and returns the handle its result will arrive on.
    ///
    /// The input is queued before this returns, whether or not the handle is
    /// ever awaited. A stopped submitter is started on the way if a runtime is
    /// reachable; otherwise the input waits for an explicit [`start`](Self::start).
    pub fn submit(&self, input: I) -> Submission<O> {
        let (tx, rx) = oneshot::channel();
        self.shared.enqueue(PendingCall::new(input, tx));
        self.ensure_running();
        Submission::new(rx)
    }

    /// Spawns the formation loop.
    ///
    /// # Errors
    ///
    /// * [`SubmitterError::AlreadyRunning`] if the loop is already running
    /// * [`SubmitterError::NoRuntime`] if no runtime was configured and none is current
    pub fn start(&self) -> Result<(), SubmitterError> {
        let mut worker = self.worker.lock();
        if worker.as_ref().is_some_and(BatchWorkerHandle::is_running) {
            return Err(SubmitterError::AlreadyRunning);
        }

        let runtime = self.runtime()?;
        let formation = Arc::clone(&self.shared).formation_loop(runtime.clone());
        *worker = Some(BatchWorkerHandle::spawn(&runtime, formation));
        Ok(())
    }

    /// Starts the submitter for the lifetime of the returned [`Session`].
    ///
    /// Call [`Session::exit`] to stop gracefully; a session dropped on any
    /// other path, including an early return or a panic, cancels the loop.
    pub fn enter(&self) -> Result<Session<'_, I, O>, SubmitterError> {
        self.start()?;
        Ok(Session::new(self))
    }

    /// Runs `body` with the submitter started and stops it afterwards.
    ///
    /// ```rust
    /// use skewer::BatchSubmitter;
    /// use skewer::SubmitterConfig;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let submitter = BatchSubmitter::from_fn(
    ///     |xs: Vec<i32>| Ok::<_, std::io::Error>(xs),
    ///     SubmitterConfig::default(),
    /// )
    /// .unwrap();
    ///
    /// let submitter = &submitter;
    /// let echoed = submitter
    ///     .scoped(move || async move { submitter.submit(7).await })
    ///     .await
    ///     .unwrap();
    ///
    /// assert_eq!(echoed.unwrap(), 7);
    /// # }
    /// ```
    pub async fn scoped<F, Fut, T>(&self, body: F) -> Result<T, SubmitterError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let session = self.enter()?;
        let output = body().await;
        session.exit().await;
        Ok(output)
    }

    fn ensure_running(&self) {
        match self.start() {
            Ok(()) => debug!("batch submitter started on submit"),
            Err(SubmitterError::AlreadyRunning) => {}
            Err(SubmitterError::NoRuntime) => {
                debug!("no runtime to start the batch submitter; input stays queued")
            }
        }
    }

    fn runtime(&self) -> Result<Handle, SubmitterError> {
        match &self.runtime {
            Some(runtime) => Ok(runtime.clone()),
            None => Handle::try_current().map_err(|_| SubmitterError::NoRuntime),
        }
    }
}

impl<I, O> BatchSubmitter<I, O> {
    /// Cancels the formation loop and waits until it has stopped.
    ///
    /// The loop is interrupted while it waits for a batch to qualify, so no
    /// drained input is ever left behind: inputs still queued remain queued,
    /// and batches already handed to the backend keep running and resolve
    /// their callers. Completed batches are distributed the moment they
    /// complete, so nothing already available is lost here. Stopping a
    /// stopped submitter does nothing.
    pub async fn stop(&self) {
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.shutdown().await;
            debug!(queued = self.queued(), in_flight = self.in_flight(), "batch submitter stopped");
        }
    }

    /// Cancels the formation loop without waiting for it.
    pub(crate) fn abort(&self) {
        if let Some(mut worker) = self.worker.lock().take() {
            worker.abort();
        }
    }

    pub fn state(&self) -> SubmitterState {
        if self.worker.lock().as_ref().is_some_and(BatchWorkerHandle::is_running) {
            SubmitterState::Running
        } else {
            SubmitterState::Stopped
        }
    }

    /// Number of inputs waiting to be drained into a batch.
    pub fn queued(&self) -> usize {
        self.shared.queued()
    }

    /// Number of batches handed to the backend whose results are not distributed yet.
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight()
    }

    pub fn config(&self) -> &SubmitterConfig {
        self.shared.config()
    }
}

impl<I, O> fmt::Debug for BatchSubmitter<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSubmitter")
            .field("config", self.shared.config())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Maps a backend's own error type onto [`BatchError`].
struct ErasedBackend<C> {
    inner: C,
}

#[async_trait]
impl<I, O, E, C> AsyncCallable<Vec<I>> for ErasedBackend<C>
where
    I: Send + 'static,
    O: Send + 'static,
    E: Into<BoxError> + Send + 'static,
    C: AsyncCallable<Vec<I>, Output = Result<Vec<O>, E>> + 'static,
{
    type Output = Result<Vec<O>, BatchError>;

    async fn call(&self, inputs: Vec<I>) -> Self::Output {
        self.inner.call(inputs).await.map_err(BatchError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use futures::future::join_all;
    use tokio::time;

    fn identity(config: SubmitterConfig) -> BatchSubmitter<u64, u64> {
        BatchSubmitter::from_fn(|xs: Vec<u64>| Ok::<_, io::Error>(xs), config).unwrap()
    }

    /// Identity backend that records the inputs of every batch it sees.
    fn recording(config: SubmitterConfig) -> (BatchSubmitter<u64, u64>, Arc<Mutex<Vec<Vec<u64>>>>) {
        let batches = Arc::new(Mutex::new(vec![]));
        let recorded = batches.clone();
        let submitter = BatchSubmitter::from_fn(
            move |xs: Vec<u64>| {
                recorded.lock().push(xs.clone());
                Ok::<_, io::Error>(xs)
            },
            config,
        )
        .unwrap();
        (submitter, batches)
    }

    fn slow_identity(delay: Duration, config: SubmitterConfig) -> BatchSubmitter<u64, u64> {
        BatchSubmitter::from_async_fn(
            move |xs: Vec<u64>| async move {
                time::sleep(delay).await;
                Ok::<_, io::Error>(xs)
            },
            config,
        )
        .unwrap()
    }

    async fn collect(submissions: Vec<Submission<u64>>) -> Vec<u64> {
        join_all(submissions)
            .await
            .into_iter()
            .map(Result::unwrap)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_identity_backend_returns_each_callers_input() {
        for timeout in [Duration::ZERO, Duration::from_secs(1)] {
            for count in [10_u64, 150, 300, 600] {
                let submitter = identity(SubmitterConfig::default().with_timeout(timeout));

                let submissions = (0..count).map(|x| submitter.submit(x)).collect();
                let results = collect(submissions).await;

                assert_eq!(results, (0..count).collect::<Vec<_>>(), "count={count} timeout={timeout:?}");
                assert_eq!(submitter.queued(), 0);
            }
        }
    }

    #[tokio::test]
    async fn test_backend_error_reaches_caller() {
        let submitter = BatchSubmitter::from_fn(
            |_: Vec<u64>| Err::<Vec<u64>, _>(io::Error::new(io::ErrorKind::InvalidInput, "bad value")),
            SubmitterConfig::default(),
        )
        .unwrap();

        let error = submitter.submit(1).await.unwrap_err();

        let source = error.downcast_ref::<io::Error>().expect("backend error is preserved");
        assert_eq!(source.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(source.to_string(), "bad value");
    }

    #[tokio::test]
    async fn test_failing_batch_does_not_affect_other_batches() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(2)
            .with_max_batch_size(2)
            .with_timeout(Duration::from_secs(60));
        let submitter = BatchSubmitter::from_fn(
            |xs: Vec<u64>| {
                if xs.contains(&3) {
                    Err("three is not allowed".to_string())
                } else {
                    Ok(xs)
                }
            },
            config,
        )
        .unwrap();

        let results = join_all((0..6).map(|x| submitter.submit(x))).await;

        for (input, result) in results.iter().enumerate() {
            match input {
                2 | 3 => assert!(matches!(result, Err(BatchError::Backend(_)))),
                _ => assert_eq!(*result.as_ref().unwrap(), input as u64),
            }
        }
        let (two, three) = (results[2].as_ref().unwrap_err(), results[3].as_ref().unwrap_err());
        assert!(two.same_failure(three));
        assert_eq!(two.to_string(), "batch function failed: three is not allowed");
    }

    #[tokio::test]
    async fn test_length_mismatch_fails_the_whole_batch() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(3)
            .with_max_batch_size(3);
        let submitter = BatchSubmitter::from_fn(
            |mut xs: Vec<u64>| {
                xs.pop();
                Ok::<_, io::Error>(xs)
            },
            config,
        )
        .unwrap();

        let results = join_all((0..3).map(|x| submitter.submit(x))).await;

        for result in results {
            assert!(matches!(
                result,
                Err(BatchError::LengthMismatch { expected: 3, actual: 2 })
            ));
        }
    }

    #[tokio::test]
    async fn test_backend_panic_is_reported() {
        let submitter = BatchSubmitter::from_fn(
            |_: Vec<u64>| -> Result<Vec<u64>, io::Error> { panic!("backend exploded") },
            SubmitterConfig::default(),
        )
        .unwrap();

        match submitter.submit(1).await {
            Err(BatchError::Panicked(message)) => assert_eq!(message, "backend exploded"),
            other => panic!("unexpected result {other:?}"),
        }
        // the formation loop survives a panicking batch
        assert_eq!(submitter.state(), SubmitterState::Running);
    }

    #[tokio::test]
    async fn test_factorial_with_single_item_batches() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(1)
            .with_max_batch_size(1);
        let sizes = Arc::new(Mutex::new(vec![]));
        let recorded = sizes.clone();
        let submitter = BatchSubmitter::from_fn(
            move |xs: Vec<u64>| {
                recorded.lock().push(xs.len());
                Ok::<_, io::Error>(xs.into_iter().map(|n| (1..=n).product::<u64>()).collect())
            },
            config,
        )
        .unwrap();

        let (four, three) = futures::join!(submitter.submit(4), submitter.submit(3));

        assert_eq!(four.unwrap(), 24);
        assert_eq!(three.unwrap(), 6);
        assert_eq!(*sizes.lock(), vec![1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queue_never_exceeds_unresolved_submissions() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(4)
            .with_max_batch_size(4)
            .with_timeout(Duration::from_millis(50))
            .with_sleep_time(Duration::from_millis(5));
        let submitter = identity(config);
        let mut pending = vec![];

        for x in 0..30_u64 {
            pending.push((x, submitter.submit(x)));
            time::sleep(Duration::from_millis(7)).await;

            pending.retain_mut(|(input, submission)| match submission.try_result() {
                Some(result) => {
                    assert_eq!(result.unwrap(), *input);
                    false
                }
                None => true,
            });
            assert!(submitter.queued() <= pending.len());
        }

        for (input, submission) in pending {
            assert_eq!(submission.await.unwrap(), input);
        }
        assert_eq!(submitter.queued(), 0);
        assert_eq!(submitter.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_manual_start_and_stop() {
        let submitter = identity(SubmitterConfig::default());
        assert_eq!(submitter.state(), SubmitterState::Stopped);

        submitter.start().unwrap();
        assert_eq!(submitter.state(), SubmitterState::Running);
        let first = collect((0..10).map(|x| submitter.submit(x)).collect()).await;
        assert_eq!(first, (0..10).collect::<Vec<_>>());

        let second: Vec<_> = (0..10).map(|x| submitter.submit(x)).collect();
        submitter.stop().await;
        assert_eq!(submitter.state(), SubmitterState::Stopped);

        submitter.start().unwrap();
        assert_eq!(collect(second).await, (0..10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let submitter = identity(SubmitterConfig::default());

        submitter.start().unwrap();

        assert_eq!(submitter.start(), Err(SubmitterError::AlreadyRunning));
        assert!(matches!(submitter.enter(), Err(SubmitterError::AlreadyRunning)));
    }

    #[tokio::test]
    async fn test_stop_is_a_no_op_when_stopped() {
        let submitter = identity(SubmitterConfig::default());

        submitter.stop().await;
        submitter.stop().await;

        assert_eq!(submitter.state(), SubmitterState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_items_wait_while_stopped() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(5)
            .with_timeout(Duration::from_secs(60));
        let submitter = identity(config);

        let mut submissions: Vec<_> = (0..3).map(|x| submitter.submit(x)).collect();
        submitter.stop().await;
        time::sleep(Duration::from_secs(120)).await;

        // below the minimum and stopped: nothing was drained
        assert_eq!(submitter.queued(), 3);
        assert!(submissions.iter_mut().all(|s| s.try_result().is_none()));

        submissions.extend((3..5).map(|x| submitter.submit(x)));
        assert_eq!(collect(submissions).await, (0..5).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_batch_resolves_after_stop() {
        let submitter = slow_identity(Duration::from_millis(100), SubmitterConfig::default());

        let submission = submitter.submit(9);
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(submitter.in_flight(), 1);

        submitter.stop().await;
        assert_eq!(submitter.state(), SubmitterState::Stopped);

        assert_eq!(submission.await.unwrap(), 9);
        assert_eq!(submitter.in_flight(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_several_batches_in_flight_at_once() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(2)
            .with_max_batch_size(2);
        let submitter = slow_identity(Duration::from_millis(100), config);

        let submissions: Vec<_> = (0..6).map(|x| submitter.submit(x)).collect();
        time::sleep(Duration::from_millis(10)).await;
        assert_eq!(submitter.in_flight(), 3);

        assert_eq!(collect(submissions).await, (0..6).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_items_survive_repeated_stop_and_start() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(3)
            .with_max_batch_size(5)
            .with_timeout(Duration::from_millis(200));
        let submitter = Arc::new(identity(config));
        let cycles = Arc::new(AtomicUsize::new(0));
        let done = Arc::new(AtomicBool::new(false));

        let toggler = tokio::spawn({
            let submitter = submitter.clone();
            let cycles = cycles.clone();
            let done = done.clone();
            async move {
                while !done.load(Ordering::SeqCst) {
                    time::sleep(Duration::from_millis(100)).await;
                    submitter.stop().await;
                    // a submit may have restarted the loop lazily in between
                    match submitter.start() {
                        Ok(()) | Err(SubmitterError::AlreadyRunning) => {}
                        Err(error) => panic!("restart failed: {error}"),
                    }
                    cycles.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        let mut submissions = vec![];
        for x in 0..50 {
            submissions.push(submitter.submit(x));
            time::sleep(Duration::from_millis(10)).await;
        }

        // the toggler keeps cycling until the last result is in
        let results = collect(submissions).await;
        done.store(true, Ordering::SeqCst);
        toggler.await.unwrap();

        assert_eq!(results, (0..50).collect::<Vec<_>>());
        assert!(cycles.load(Ordering::SeqCst) > 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lone_items_time_out_despite_frequent_restarts() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(3)
            .with_max_batch_size(5)
            .with_timeout(Duration::from_millis(200));
        let submitter = identity(config);

        let mut first = submitter.submit(48);
        let mut second = submitter.submit(49);

        // restarting more often than the timeout must not hold the pair back
        for _ in 0..10 {
            time::sleep(Duration::from_millis(100)).await;
            submitter.stop().await;
            submitter.start().unwrap();
        }

        assert_eq!(first.try_result().map(Result::unwrap), Some(48));
        assert_eq!(second.try_result().map(Result::unwrap), Some(49));
        assert_eq!(submitter.queued(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_submissions_are_not_dispatched() {
        let config = SubmitterConfig::default().with_min_batch_size(3);
        let (submitter, batches) = recording(config);

        let first = submitter.submit(0);
        drop(submitter.submit(1));
        let last = submitter.submit(2);

        assert_eq!(first.await.unwrap(), 0);
        assert_eq!(last.await.unwrap(), 2);
        assert_eq!(*batches.lock(), vec![vec![0, 2]]);
    }

    #[tokio::test]
    async fn test_session_exit_stops_submitter() {
        let submitter = identity(SubmitterConfig::default());

        let session = submitter.enter().unwrap();
        assert_eq!(session.submit(5).await.unwrap(), 5);
        assert_eq!(submitter.state(), SubmitterState::Running);

        session.exit().await;
        assert_eq!(submitter.state(), SubmitterState::Stopped);
    }

    #[tokio::test]
    async fn test_dropped_session_cancels_loop() {
        let submitter = identity(SubmitterConfig::default());

        {
            let _session = submitter.enter().unwrap();
            assert_eq!(submitter.state(), SubmitterState::Running);
        }

        assert_eq!(submitter.state(), SubmitterState::Stopped);
        // the submitter is still usable after an aborted session
        assert_eq!(submitter.submit(3).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_scoped_runs_body_and_stops() {
        let submitter = identity(SubmitterConfig::default());
        let handle = &submitter;

        let results = submitter
            .scoped(|| async move { collect((0..4).map(|x| handle.submit(x)).collect()).await })
            .await
            .unwrap();

        assert_eq!(results, vec![0, 1, 2, 3]);
        assert_eq!(submitter.state(), SubmitterState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_submitter_keeps_in_flight_results() {
        let submitter = slow_identity(Duration::from_millis(50), SubmitterConfig::default());

        let submission = submitter.submit(11);
        time::sleep(Duration::from_millis(10)).await;
        drop(submitter);

        assert_eq!(submission.await.unwrap(), 11);
    }

    #[test]
    fn test_no_runtime_leaves_input_queued() {
        let submitter = identity(SubmitterConfig::default());

        assert_eq!(submitter.start(), Err(SubmitterError::NoRuntime));

        let mut submission = submitter.submit(1);
        assert_eq!(submitter.queued(), 1);
        assert_eq!(submitter.state(), SubmitterState::Stopped);
        assert!(submission.try_result().is_none());

        drop(submitter);
        assert!(matches!(submission.try_result(), Some(Err(BatchError::Abandoned))));
    }

    #[test]
    fn test_explicit_runtime_drives_batches() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let submitter = identity(SubmitterConfig::default()).with_runtime(runtime.handle().clone());

        // submitted from outside any runtime, processed on the configured one
        let submissions: Vec<_> = (0..20).map(|x| submitter.submit(x)).collect();
        let results = futures::executor::block_on(collect(submissions));

        assert_eq!(results, (0..20).collect::<Vec<_>>());
        assert_eq!(submitter.state(), SubmitterState::Running);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SubmitterConfig::default()
            .with_min_batch_size(10)
            .with_max_batch_size(5);

        let result = BatchSubmitter::from_fn(|xs: Vec<u64>| Ok::<_, io::Error>(xs), config);

        assert!(matches!(result, Err(ConfigError::MaxBelowMin { min: 10, max: 5 })));
    }
}
