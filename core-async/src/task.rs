//! Task spawning.
//!
//! Retry timers and event pumps are spawned here and kept alive through the
//! returned handles. [`AbortHandle`] is what the retry scheduler stores to
//! cancel a superseded timer.

pub use tokio::task::{yield_now, AbortHandle, JoinError, JoinHandle, JoinSet};

/// Spawns a new asynchronous task on the current runtime.
///
/// # Panics
///
/// Panics when called outside of a runtime context, like `tokio::spawn`.
/// Callers on synchronous paths should check [`crate::runtime::has_current`]
/// first.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}
