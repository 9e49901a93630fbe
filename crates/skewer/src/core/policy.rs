use std::cmp;
use std::collections::VecDeque;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::trace;
use crate::communication::PendingCall;
use crate::config::SubmitterConfig;

/// Why the formation policy decided a batch was ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DrainReason {
    /// The queue reached the minimum batch size
    Size,
    /// A non-empty queue waited out the timeout
    Timeout,
}

impl DrainReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Timeout => "timeout",
        }
    }
}

/// Waits until the queue qualifies for a drain.
///
/// The queue qualifies once it holds `min_batch_size` entries, or once it is
/// non-empty and its oldest entry has been queued for `timeout`. The age is
/// taken from the entry itself, so a wait that is cancelled and begun again
/// (a stop followed by a start) does not reset it. With an empty queue the
/// wait parks on `notifier` and no clock runs; with a non-empty queue it wakes
/// at least every `sleep_time` (or when the oldest entry times out, whichever
/// comes first) and on every notification.
///
/// Cancelling the returned future at any of its suspension points is safe:
/// nothing is removed from the queue here.
pub(crate) async fn wait_for_batch<I, O>(
    queue: &Mutex<VecDeque<PendingCall<I, O>>>,
    notifier: &Notify,
    config: &SubmitterConfig,
) -> DrainReason {
    loop {
        let (queued, oldest) = {
            let queue = queue.lock();
            (queue.len(), queue.front().map(PendingCall::enqueued_at))
        };
        if queued >= config.min_batch_size {
            return DrainReason::Size;
        }

        let Some(oldest) = oldest else {
            notifier.notified().await;
            continue;
        };

        let waited = oldest.elapsed();
        if waited >= config.timeout {
            return DrainReason::Timeout;
        }

        let pause = cmp::min(config.sleep_time, config.timeout - waited);
        trace!(queued, ?waited, ?pause, "waiting for batch to fill");
        // either outcome just means "look at the queue again"
        let _ = tokio::time::timeout(pause, notifier.notified()).await;
    }
}

/// Takes up to `max_batch_size` live calls off the front of the queue.
///
/// Calls whose caller has already dropped its submission are discarded
/// instead of being sent to the backend. The returned batch may therefore be
/// empty even when the queue was not.
pub(crate) fn drain_batch<I, O>(
    queue: &Mutex<VecDeque<PendingCall<I, O>>>,
    max_batch_size: usize,
) -> Vec<PendingCall<I, O>> {
    let mut queue = queue.lock();
    let mut batch = Vec::with_capacity(cmp::min(max_batch_size, queue.len()));
    let mut discarded = 0_usize;

    while batch.len() < max_batch_size {
        match queue.pop_front() {
            Some(call) if call.is_abandoned() => discarded += 1,
            Some(call) => batch.push(call),
            None => break,
        }
    }

    if discarded > 0 {
        trace!(discarded, "dropped abandoned submissions from the queue");
    }
    batch
}
