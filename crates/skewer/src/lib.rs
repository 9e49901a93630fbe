//! # Skewer
//!
//! Asynchronous micro-batching: many independent callers each submit one input
//! and await one output, while behind the scenes the inputs are grouped into
//! batches and handed to a **listable** backend, a function that takes a list
//! of inputs and returns the list of their results in the same order.
//!
//! ## Overview
//!
//! Batching amortizes per-call overhead (a remote request, a GPU kernel, a
//! locked resource) across many logical callers. Callers keep a simple
//! one-in, one-out interface and never see the batches their inputs were
//! drawn into.
//!
//! Key components include:
//!
//! - [`BatchSubmitter`], the batching engine
//! - [`AsyncCallable`] with the [`immediate`] and [`suspending`] adapters, which
//!   let plain functions and functions returning futures be used alike
//! - [`ParallelLimit`], a cap on concurrent invocations of any callable
//! - [`PeriodicTask`], a background task repeated while a scope is entered
//!
//! ## Architecture
//!
//! ### Batch formation
//!
//! Each `submit` pushes the input onto a FIFO queue and returns a
//! [`Submission`]. A background formation loop waits until the queue holds
//! [`SubmitterConfig::min_batch_size`] inputs, or until the oldest queued input
//! has waited [`SubmitterConfig::timeout`], then drains up to
//! [`SubmitterConfig::max_batch_size`] of them into one batch.
//!
//! ### Dispatch and collection
//!
//! Every batch runs as its own task, so several batches can be in flight at
//! once. When the backend returns, the results are matched to the callers by
//! position. A backend error, a panic or a result of the wrong length fails
//! every caller of that batch with the same [`BatchError`]; other batches are
//! unaffected.
//!
//! ### Lifecycle
//!
//! A submitter starts lazily on the first submit, or explicitly through
//! [`BatchSubmitter::start`], [`BatchSubmitter::enter`] or
//! [`BatchSubmitter::scoped`]. Stopping it never loses work: queued inputs wait
//! for the next start and batches in flight still resolve their callers.
//!
//! ## Runtime
//!
//! Everything runs on tokio. By default the runtime current at start-up is
//! used; [`BatchSubmitter::with_runtime`] and [`PeriodicTask::with_runtime`]
//! select another one.
//!
//! ## Features
//!
//! - **serde** - `Serialize`/`Deserialize` for [`SubmitterConfig`] and [`PeriodicConfig`]
//!

mod callable;
mod communication;
mod config;
mod core;
mod error;
mod limit;
mod periodic;
mod submitter;

pub use callable::{
    immediate,
    suspending,
    AsyncCallable,
    Immediate,
    Suspending
};

pub use communication::Submission;

pub use config::{
    PeriodicConfig,
    SubmitterConfig,
    DEFAULT_MAX_BATCH_SIZE,
    DEFAULT_MIN_BATCH_SIZE,
    DEFAULT_SLEEP_TIME
};

pub use error::{
    BatchError,
    BoxError,
    ConfigError,
    PeriodicError,
    SubmitterError
};

pub use limit::{LimitPermit, ParallelLimit};
pub use periodic::PeriodicTask;
pub use submitter::{BatchSubmitter, Session, SubmitterState};
