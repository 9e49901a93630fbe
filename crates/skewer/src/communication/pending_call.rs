use tokio::sync::oneshot::Sender;
use tokio::time::Instant;
use crate::error::BatchError;

/// Write half of a caller's result slot.
pub(crate) type ResultSender<O> = Sender<Result<O, BatchError>>;

/// # PendingCall
///
/// A queued input paired with the slot its result must be written to.
///
/// `PendingCall` is created by `submit` and owned by the submitter's queue
/// until the formation loop drains it into a batch. At that point the pair is
/// split: the input goes to the backend, the slot goes to the in-flight
/// [`BatchRecord`](super::BatchRecord).
///
/// ## Type Parameters
///
/// * `I` - The input value submitted by the caller
/// * `O` - The output value the caller is waiting for
pub(crate) struct PendingCall<I, O> {
    /// The input value to be processed
    input: I,

    /// Channel for sending the result back to the caller
    slot: ResultSender<O>,

    /// When the call entered the queue
    enqueued_at: Instant,
}

impl<I, O> PendingCall<I, O> {
    pub fn new(input: I, slot: ResultSender<O>) -> Self {
        Self {
            input,
            slot,
            enqueued_at: Instant::now(),
        }
    }

    /// Returns a reference to the input value.
    #[allow(dead_code)]
    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn enqueued_at(&self) -> Instant {
        self.enqueued_at
    }

    /// `true` once the caller has dropped its [`Submission`](super::Submission).
    pub fn is_abandoned(&self) -> bool {
        self.slot.is_closed()
    }

    /// Splits the call into its input and its result slot.
    pub fn into_parts(self) -> (I, ResultSender<O>) {
        (self.input, self.slot)
    }
}
