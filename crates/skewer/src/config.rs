use std::time::Duration;
use crate::error::ConfigError;

/// Default pause between checks of the pending queue.
pub const DEFAULT_SLEEP_TIME: Duration = Duration::from_millis(100);

/// Default minimum batch size that triggers a dispatch before the timeout.
pub const DEFAULT_MIN_BATCH_SIZE: usize = 100;

/// Default upper bound on the number of inputs in one batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 1000;

/// # SubmitterConfig
///
/// Batch-formation policy of a [`BatchSubmitter`](crate::BatchSubmitter).
///
/// A batch is dispatched as soon as `min_batch_size` inputs are queued, or
/// once `timeout` has passed with at least one input waiting. A `timeout` of
/// zero dispatches whatever is queued immediately. No batch ever holds more
/// than `max_batch_size` inputs.
///
/// ```rust
/// use std::time::Duration;
/// use skewer::SubmitterConfig;
///
/// let config = SubmitterConfig::default()
///     .with_timeout(Duration::from_millis(200))
///     .with_min_batch_size(3)
///     .with_max_batch_size(5);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SubmitterConfig {
    /// Maximum age of a waiting batch before it is dispatched below `min_batch_size`
    pub timeout: Duration,

    /// Interval at which the formation loop re-checks a non-empty queue
    pub sleep_time: Duration,

    /// Queue length at which a batch is dispatched without waiting for the timeout
    pub min_batch_size: usize,

    /// Largest number of inputs handed to the backend in one call
    pub max_batch_size: usize,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::ZERO,
            sleep_time: DEFAULT_SLEEP_TIME,
            min_batch_size: DEFAULT_MIN_BATCH_SIZE,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl SubmitterConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_sleep_time(mut self, sleep_time: Duration) -> Self {
        self.sleep_time = sleep_time;
        self
    }

    pub fn with_min_batch_size(mut self, min_batch_size: usize) -> Self {
        self.min_batch_size = min_batch_size;
        self
    }

    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Checks the invariants `sleep_time > 0`, `min_batch_size >= 1` and
    /// `max_batch_size >= min_batch_size`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sleep_time.is_zero() {
            return Err(ConfigError::ZeroSleepTime);
        }
        if self.min_batch_size == 0 {
            return Err(ConfigError::ZeroMinBatchSize);
        }
        if self.max_batch_size < self.min_batch_size {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_batch_size,
                max: self.max_batch_size,
            });
        }
        Ok(())
    }
}

/// Timing of a [`PeriodicTask`](crate::PeriodicTask).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeriodicConfig {
    /// Minimum time between the end of one invocation and the start of the next
    pub delay: Duration,

    /// Invoke the task once more when the scope is exited
    pub run_on_exit: bool,
}

impl Default for PeriodicConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(1),
            run_on_exit: true,
        }
    }
}

impl PeriodicConfig {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_run_on_exit(mut self, run_on_exit: bool) -> Self {
        self.run_on_exit = run_on_exit;
        self
    }
}
