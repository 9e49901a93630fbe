use std::fmt;
use std::future::Future;
use async_trait::async_trait;
use super::core_trait::AsyncCallable;

/// Adapter for functions that return their value without suspending.
///
/// The function runs inside the returned future, on its first poll.
#[derive(Clone)]
pub struct Immediate<F> {
    func: F,
}

impl<F> Immediate<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }

    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F> fmt::Debug for Immediate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Immediate").finish_non_exhaustive()
    }
}

#[async_trait]
impl<A, R, F> AsyncCallable<A> for Immediate<F>
where
    A: Send + 'static,
    R: Send + 'static,
    F: Fn(A) -> R + Send + Sync + 'static,
{
    type Output = R;

    async fn call(&self, args: A) -> R {
        (self.func)(args)
    }
}

/// Adapter for functions that hand back a future to be awaited.
#[derive(Clone)]
pub struct Suspending<F> {
    func: F,
}

impl<F> Suspending<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }

    pub fn into_inner(self) -> F {
        self.func
    }
}

impl<F> fmt::Debug for Suspending<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspending").finish_non_exhaustive()
    }
}

#[async_trait]
impl<A, Fut, F> AsyncCallable<A> for Suspending<F>
where
    A: Send + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
{
    type Output = Fut::Output;

    async fn call(&self, args: A) -> Fut::Output {
        (self.func)(args).await
    }
}

/// Normalizes a plain function into an [`AsyncCallable`].
///
/// ```rust
/// use skewer::{immediate, AsyncCallable};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let double = immediate(|x: u32| x * 2);
/// assert_eq!(double.call(21).await, 42);
/// # }
/// ```
pub fn immediate<F>(func: F) -> Immediate<F> {
    Immediate::new(func)
}

/// Normalizes a function returning a future into an [`AsyncCallable`].
///
/// ```rust
/// use skewer::{suspending, AsyncCallable};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let double = suspending(|x: u32| async move {
///     tokio::task::yield_now().await;
///     x * 2
/// });
/// assert_eq!(double.call(21).await, 42);
/// # }
/// ```
pub fn suspending<F>(func: F) -> Suspending<F> {
    Suspending::new(func)
}
