//! Per-provider failure boundary used by every fan-out.

use crate::registry::ProviderHandle;
use bridge_traits::BridgeError;
use core_async::time::{timeout, Duration};
use futures::future::{join_all, FutureExt};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::warn;

/// Why a guarded provider call produced no value.
#[derive(Debug)]
pub enum CallFailure {
    Failed(BridgeError),
    Panicked(String),
    TimedOut(Duration),
}

impl fmt::Display for CallFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallFailure::Failed(err) => write!(f, "{err}"),
            CallFailure::Panicked(message) => write!(f, "panicked: {message}"),
            CallFailure::TimedOut(limit) => write!(f, "timed out after {limit:?}"),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs one provider call, converting errors, panics and timeouts into a
/// logged [`CallFailure`].
pub async fn guarded<P, T, Fut>(
    handle: &ProviderHandle<P>,
    operation: &'static str,
    limit: Duration,
    call: Fut,
) -> Result<T, CallFailure>
where
    P: ?Sized,
    Fut: Future<Output = bridge_traits::error::Result<T>>,
{
    let outcome = match timeout(limit, AssertUnwindSafe(call).catch_unwind()).await {
        Ok(Ok(Ok(value))) => return Ok(value),
        Ok(Ok(Err(err))) => CallFailure::Failed(err),
        Ok(Err(payload)) => CallFailure::Panicked(panic_message(payload.as_ref())),
        Err(_) => CallFailure::TimedOut(limit),
    };

    warn!(
        provider = handle.name(),
        kind = %handle.kind(),
        operation,
        error = %outcome,
        "Provider call failed"
    );
    Err(outcome)
}

/// Invokes `call` on every provider, concurrently, started in registration
/// order. Failed calls yield `None` in the provider's slot.
pub async fn fan_out<P, T, F, Fut>(
    handles: &[ProviderHandle<P>],
    operation: &'static str,
    limit: Duration,
    call: F,
) -> Vec<Option<T>>
where
    P: ?Sized,
    F: Fn(Arc<P>) -> Fut,
    Fut: Future<Output = bridge_traits::error::Result<T>>,
{
    let calls = handles.iter().map(|handle| {
        let fut = call(Arc::clone(handle.provider()));
        async move { guarded(handle, operation, limit, fut).await.ok() }
    });
    join_all(calls).await
}
