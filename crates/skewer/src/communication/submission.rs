use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use crate::error::BatchError;

/// # Submission
///
/// The caller's handle on one submitted input.
///
/// A `Submission` is returned by
/// [`BatchSubmitter::submit`](crate::BatchSubmitter::submit) after the input
/// has already been queued. Awaiting it yields the output the backend produced
/// for that input, or the failure of the batch it was drawn into.
///
/// Dropping a `Submission` does not remove the input from its batch; the
/// result is simply discarded when the batch completes.
#[must_use = "a submission does nothing useful unless awaited"]
pub struct Submission<O> {
    /// The read half of the result slot
    receiver: oneshot::Receiver<Result<O, BatchError>>,
}

impl<O> Submission<O> {
    pub(crate) fn new(receiver: oneshot::Receiver<Result<O, BatchError>>) -> Self {
        Self {
            receiver,
        }
    }

    /// Returns the result if the batch has already resolved this submission.
    ///
    /// Returns `None` while the input is still queued or in flight.
    pub fn try_result(&mut self) -> Option<Result<O, BatchError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(BatchError::Abandoned)),
        }
    }
}

impl<O> Future for Submission<O> {
    type Output = Result<O, BatchError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.get_mut().receiver)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(BatchError::Abandoned)))
    }
}
