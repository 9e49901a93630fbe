//! Error types shared by the submitter, the limiter and the periodic runner.

use std::error::Error as StdError;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error accepted from backend functions.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The outcome a single caller observes when its batch could not produce a value.
///
/// Failures are batch-wide: every caller whose input was drawn into a failing
/// batch receives a clone of the same `BatchError`. For [`BatchError::Backend`]
/// the clones share one allocation, so the original error can be recovered with
/// [`BatchError::downcast_ref`].
#[derive(Debug, Clone, Error)]
pub enum BatchError {
    /// The backend function reported an error for the whole batch.
    #[error("batch function failed: {0}")]
    Backend(Arc<dyn StdError + Send + Sync + 'static>),

    /// The backend returned a result sequence whose length differs from the input.
    #[error("batch function returned {actual} results for {expected} inputs")]
    LengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// The backend panicked while processing the batch.
    #[error("batch function panicked: {0}")]
    Panicked(String),

    /// The result slot was dropped before anyone resolved it.
    #[error("submission was abandoned before its batch produced a result")]
    Abandoned,
}

impl BatchError {
    /// Wraps a backend error so it can be shared by every caller in the batch.
    pub fn backend<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Backend(Arc::from(error.into()))
    }

    /// Returns the backend's own error, if this failure came from the backend.
    pub fn backend_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Self::Backend(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// Attempts to view the backend's error as a concrete type.
    pub fn downcast_ref<T>(&self) -> Option<&T>
    where
        T: StdError + 'static,
    {
        self.backend_error()?.downcast_ref::<T>()
    }

    /// `true` when both errors are the very same backend failure.
    pub fn same_failure(&self, other: &BatchError) -> bool {
        match (self, other) {
            (Self::Backend(a), Self::Backend(b)) => Arc::ptr_eq(a, b),
            (
                Self::LengthMismatch { expected, actual },
                Self::LengthMismatch { expected: e, actual: a },
            ) => expected == e && actual == a,
            (Self::Panicked(a), Self::Panicked(b)) => a == b,
            (Self::Abandoned, Self::Abandoned) => true,
            _ => false,
        }
    }

    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        Self::Panicked(panic_message(payload))
    }
}

/// Lifecycle misuse of a [`BatchSubmitter`](crate::BatchSubmitter).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitterError {
    #[error("batch submitter is already running")]
    AlreadyRunning,

    #[error("no tokio runtime available to run the batch submitter")]
    NoRuntime,
}

/// Rejected configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("sleep time must be greater than zero")]
    ZeroSleepTime,

    #[error("minimum batch size must be at least 1")]
    ZeroMinBatchSize,

    #[error("maximum batch size {max} is below the minimum batch size {min}")]
    MaxBelowMin {
        min: usize,
        max: usize,
    },

    #[error("parallelism limit must be at least 1")]
    ZeroParallelism,
}

/// Failure surfaced when a [`PeriodicTask`](crate::PeriodicTask) exits.
#[derive(Debug, Error)]
pub enum PeriodicError<E> {
    #[error("periodic task failed: {0}")]
    Task(E),

    #[error("periodic task panicked: {0}")]
    Panicked(String),

    #[error("periodic task is already running")]
    AlreadyRunning,

    #[error("no tokio runtime available to run the periodic task")]
    NoRuntime,
}

pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
