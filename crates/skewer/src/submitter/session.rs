use std::ops::Deref;
use super::batcher::BatchSubmitter;

/// A running period of a [`BatchSubmitter`], opened by
/// [`BatchSubmitter::enter`].
///
/// The session dereferences to its submitter, so inputs are submitted through
/// it directly. [`exit`](Self::exit) stops the formation loop and waits for it;
/// dropping the session without exiting cancels the loop immediately.
#[must_use = "dropping a session stops its submitter"]
pub struct Session<'a, I, O> {
    submitter: &'a BatchSubmitter<I, O>,
    active: bool,
}

impl<'a, I, O> Session<'a, I, O> {
    pub(crate) fn new(submitter: &'a BatchSubmitter<I, O>) -> Self {
        Self {
            submitter,
            active: true,
        }
    }

    /// Stops the submitter and waits until its formation loop is gone.
    pub async fn exit(mut self) {
        self.submitter.stop().await;
        self.active = false;
    }
}

impl<I, O> Deref for Session<'_, I, O> {
    type Target = BatchSubmitter<I, O>;

    fn deref(&self) -> &Self::Target {
        self.submitter
    }
}

impl<I, O> Drop for Session<'_, I, O> {
    fn drop(&mut self) {
        if self.active {
            self.submitter.abort();
        }
    }
}
