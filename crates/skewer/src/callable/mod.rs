//! # Callable Normalization
//!
//! Functions handed to this crate come in two calling conventions: ones that
//! return their value right away and ones that return a future. Both are
//! normalized to [`AsyncCallable`] so the batching engine and the utilities
//! built on it treat them identically.
//!
//! * [`Immediate`] / [`immediate`] - wraps `Fn(A) -> R`
//! * [`Suspending`] / [`suspending`] - wraps `Fn(A) -> impl Future<Output = R>`

mod adapters;
mod core_trait;

pub use adapters::{immediate, suspending, Immediate, Suspending};
pub use core_trait::AsyncCallable;
