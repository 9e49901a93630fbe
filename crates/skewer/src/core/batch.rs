use std::collections::{HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info_span, trace, warn, Instrument};
use crate::callable::AsyncCallable;
use crate::communication::{BatchId, BatchRecord, PendingCall};
use crate::config::SubmitterConfig;
use crate::error::BatchError;
use super::policy::{drain_batch, wait_for_batch, DrainReason};

/// A listable backend with its error type already erased to [`BatchError`].
pub(crate) type Backend<I, O> = Arc<dyn AsyncCallable<Vec<I>, Output = Result<Vec<O>, BatchError>>>;

/// Batches that were handed to the backend and are not distributed yet.
pub(crate) struct InFlight<O> {
    records: Mutex<HashMap<BatchId, BatchRecord<O>>>,
}

impl<O> InFlight<O> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    fn insert(&self, record: BatchRecord<O>) {
        let previous = self.records.lock().insert(record.id(), record);
        debug_assert!(previous.is_none(), "batch id reused while in flight");
    }

    /// Removes the batch and resolves all of its slots as one step.
    ///
    /// The record leaves the in-flight set only together with the full
    /// distribution of its results, and at most once per id.
    pub fn collect(&self, id: BatchId, result: Result<Vec<O>, BatchError>) {
        let mut records = self.records.lock();
        let Some(record) = records.remove(&id) else {
            drop(records);
            warn!(batch_id = %id, "completed batch was not in flight");
            return;
        };

        let size = record.len();
        let elapsed = record.dispatched_at().elapsed();
        match &result {
            Err(error) => warn!(batch_id = %id, size, %error, "batch failed"),
            Ok(outputs) if outputs.len() != size => warn!(
                batch_id = %id,
                expected = size,
                actual = outputs.len(),
                "batch function returned the wrong number of results"
            ),
            Ok(_) => {}
        }

        let delivery = record.distribute(result);
        drop(records);

        if delivery.dropped > 0 {
            debug!(batch_id = %id, dropped = delivery.dropped, "some callers left before their batch completed");
        }
        debug!(batch_id = %id, delivered = delivery.delivered, ?elapsed, "batch collected");
    }
}

/// # Shared
///
/// State shared between a [`BatchSubmitter`](crate::BatchSubmitter), its
/// formation loop and its in-flight batches.
///
/// The queue and the in-flight set are only touched by `submit`'s enqueue
/// step, the formation loop and the batches' completion handlers. No lock is
/// held across a suspension point.
pub(crate) struct Shared<I, O> {
    /// Calls waiting to be drained into a batch, oldest first
    queue: Mutex<VecDeque<PendingCall<I, O>>>,

    /// Wakes the formation loop when work is enqueued
    notifier: Notify,

    /// Dispatched batches awaiting their results
    in_flight: Arc<InFlight<O>>,

    backend: Backend<I, O>,

    config: SubmitterConfig,
}

impl<I, O> Shared<I, O> {
    pub fn new(backend: Backend<I, O>, config: SubmitterConfig) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            notifier: Notify::new(),
            in_flight: Arc::new(InFlight::new()),
            backend,
            config,
        }
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    pub fn queued(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Appends a call to the back of the queue and wakes the formation loop.
    pub fn enqueue(&self, call: PendingCall<I, O>) {
        let queued = {
            let mut queue = self.queue.lock();
            queue.push_back(call);
            queue.len()
        };
        trace!(queued, "call enqueued");
        self.notifier.notify_one();
    }
}

impl<I, O> Shared<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Forms and dispatches batches until cancelled.
    ///
    /// Each cycle waits for the queue to qualify, drains it and dispatches the
    /// batch without suspending in between, so cancelling the loop can never
    /// strand drained calls. Backend invocations run as their own tasks on
    /// `runtime`; the loop does not wait for them before forming the next batch.
    pub async fn formation_loop(self: Arc<Self>, runtime: Handle) {
        debug!(
            min_batch_size = self.config.min_batch_size,
            max_batch_size = self.config.max_batch_size,
            timeout = ?self.config.timeout,
            "batch formation loop running"
        );

        loop {
            let reason = wait_for_batch(&self.queue, &self.notifier, &self.config).await;
            let calls = drain_batch(&self.queue, self.config.max_batch_size);
            if calls.is_empty() {
                continue;
            }
            self.dispatch(calls, reason, &runtime);
        }
    }

    /// Hands one batch to the backend and records it as in flight.
    ///
    /// The completion handler attached here distributes the batch's outcome,
    /// including a panic of the backend, which is reported as
    /// [`BatchError::Panicked`].
    pub(crate) fn dispatch(&self, calls: Vec<PendingCall<I, O>>, reason: DrainReason, runtime: &Handle) -> BatchId {
        let id = BatchId::new();
        let (inputs, slots): (Vec<I>, Vec<_>) = calls
            .into_iter()
            .map(PendingCall::into_parts)
            .unzip();
        let size = inputs.len();

        self.in_flight.insert(BatchRecord::new(id, slots));
        debug!(batch_id = %id, size, reason = reason.as_str(), "dispatching batch");

        let backend = Arc::clone(&self.backend);
        let in_flight = Arc::clone(&self.in_flight);
        let span = info_span!("batch", batch_id = %id, size);

        runtime.spawn(
            async move {
                let result = match AssertUnwindSafe(backend.call(inputs)).catch_unwind().await {
                    Ok(result) => result,
                    Err(panic) => Err(BatchError::from_panic(panic)),
                };
                in_flight.collect(id, result);
            }
            .instrument(span),
        );

        id
    }
}
