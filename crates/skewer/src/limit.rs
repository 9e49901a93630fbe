//! # Parallelism Limiter
//!
//! [`ParallelLimit`] caps how many invocations of a callable may be in
//! progress at the same time. It is independent of the batch submitter and
//! can guard a backend, a whole submitter or any other [`AsyncCallable`].

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use async_trait::async_trait;
use tokio::sync::Notify;
use tracing::trace;
use crate::callable::AsyncCallable;
use crate::error::ConfigError;

/// # ParallelLimit
///
/// Wraps a callable so that at most `max_parallel` invocations run concurrently.
///
/// The limiter owns a live counter of running invocations. A caller that finds
/// every slot taken suspends until a slot is released and then checks again;
/// waiting callers are not served in arrival order. Slots are held by a
/// [`LimitPermit`] and released when it drops, so an invocation that fails,
/// panics or is cancelled gives its slot back like one that succeeds.
///
/// ```rust
/// use skewer::{immediate, AsyncCallable, ParallelLimit};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let limited = ParallelLimit::new(immediate(|x: u32| x + 1), 2).unwrap();
///
/// assert_eq!(limited.call(1).await, 2);
/// assert_eq!(limited.active(), 0);
/// # }
/// ```
pub struct ParallelLimit<C> {
    inner: C,
    gate: Gate,
}

/// The live counter and its release signal.
struct Gate {
    /// Number of permits currently held
    active: AtomicUsize,

    max_parallel: usize,

    /// Signalled whenever a permit is released
    released: Notify,
}

impl Gate {
    fn try_claim(&self) -> bool {
        self.active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < self.max_parallel).then_some(active + 1)
            })
            .is_ok()
    }

    fn release(&self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
        self.released.notify_waiters();
    }
}

impl<C> ParallelLimit<C> {
    /// Wraps `inner`, allowing `max_parallel` concurrent invocations.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ZeroParallelism`] if `max_parallel` is zero.
    pub fn new(inner: C, max_parallel: usize) -> Result<Self, ConfigError> {
        if max_parallel == 0 {
            return Err(ConfigError::ZeroParallelism);
        }
        Ok(Self {
            inner,
            gate: Gate {
                active: AtomicUsize::new(0),
                max_parallel,
                released: Notify::new(),
            },
        })
    }

    /// Waits for a free slot and claims it until the permit drops.
    pub async fn acquire(&self) -> LimitPermit<'_> {
        loop {
            let released = self.gate.released.notified();
            tokio::pin!(released);
            // register for the next release before looking at the counter
            released.as_mut().enable();

            if let Some(permit) = self.try_acquire() {
                return permit;
            }
            trace!(max_parallel = self.gate.max_parallel, "parallel limit reached, waiting");
            released.await;
        }
    }

    /// Claims a slot if one is free right now.
    pub fn try_acquire(&self) -> Option<LimitPermit<'_>> {
        self.gate
            .try_claim()
            .then(|| LimitPermit { gate: &self.gate })
    }

    /// Number of invocations currently holding a slot.
    pub fn active(&self) -> usize {
        self.gate.active.load(Ordering::Acquire)
    }

    pub fn max_parallel(&self) -> usize {
        self.gate.max_parallel
    }

    pub fn get_ref(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }
}

#[async_trait]
impl<A, C> AsyncCallable<A> for ParallelLimit<C>
where
    A: Send + 'static,
    C: AsyncCallable<A>,
{
    type Output = C::Output;

    async fn call(&self, args: A) -> Self::Output {
        let _permit = self.acquire().await;
        self.inner.call(args).await
    }
}

impl<C> fmt::Debug for ParallelLimit<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParallelLimit")
            .field("active", &self.active())
            .field("max_parallel", &self.max_parallel())
            .finish_non_exhaustive()
    }
}

/// One claimed slot of a [`ParallelLimit`], released on drop.
#[must_use = "the slot is released as soon as the permit is dropped"]
pub struct LimitPermit<'a> {
    gate: &'a Gate,
}

impl Drop for LimitPermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

impl fmt::Debug for LimitPermit<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LimitPermit").finish_non_exhaustive()
    }
}
