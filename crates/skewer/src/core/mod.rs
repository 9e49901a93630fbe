//! # Batching Core
//!
//! The machinery behind [`BatchSubmitter`](crate::BatchSubmitter).
//!
//! * [`policy`] - decides when the pending queue is ready to become a batch
//!   and drains it in submission order.
//!
//! * [`batch`] - the state shared by the submitter and its background work:
//!   the queue, the in-flight set, the formation loop and batch dispatch with
//!   completion-driven collection.
//!
//! * [`worker`] - owns the task running the formation loop and cancels it on
//!   shutdown or drop.
//!
pub(crate) mod batch;
pub(crate) mod policy;
pub(crate) mod worker;
