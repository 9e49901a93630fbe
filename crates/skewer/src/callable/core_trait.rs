use std::sync::Arc;
use async_trait::async_trait;

/// # AsyncCallable
///
/// The single calling contract every function handed to this crate is normalized to.
///
/// Invoking [`call`](AsyncCallable::call) always yields a future; awaiting it
/// completes with whatever the underlying function produced. Failures are part
/// of `Output` (typically a `Result`) and pass through untouched, so the
/// submitter, the limiter and the periodic runner never need to know whether
/// the function they wrap answers immediately or only after suspending.
///
/// Plain closures are adapted with [`immediate`](crate::immediate) and
/// closures returning futures with [`suspending`](crate::suspending). Types
/// with their own state can implement the trait directly:
///
/// ```rust
/// use skewer::AsyncCallable;
/// use async_trait::async_trait;
///
/// struct Tripler;
///
/// #[async_trait]
/// impl AsyncCallable<Vec<u64>> for Tripler {
///     type Output = Result<Vec<u64>, std::io::Error>;
///
///     async fn call(&self, inputs: Vec<u64>) -> Self::Output {
///         Ok(inputs.into_iter().map(|x| x * 3).collect())
///     }
/// }
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// assert_eq!(Tripler.call(vec![1, 2]).await.unwrap(), vec![3, 6]);
/// # }
/// ```
///
/// ## Type Parameters
///
/// * `A` - The argument passed on each invocation. Zero-argument callables use `()`.
#[async_trait]
pub trait AsyncCallable<A>: Send + Sync {
    /// What an invocation completes with
    type Output: Send;

    /// Invokes the underlying function with `args`.
    async fn call(&self, args: A) -> Self::Output;
}

#[async_trait]
impl<A, C> AsyncCallable<A> for Arc<C>
where A: Send + 'static, C: AsyncCallable<A> + ?Sized
{
    type Output = C::Output;

    async fn call(&self, args: A) -> Self::Output {
        self.as_ref().call(args).await
    }
}

#[async_trait]
impl<A, C> AsyncCallable<A> for Box<C>
where A: Send + 'static, C: AsyncCallable<A> + ?Sized
{
    type Output = C::Output;

    async fn call(&self, args: A) -> Self::Output {
        self.as_ref().call(args).await
    }
}
