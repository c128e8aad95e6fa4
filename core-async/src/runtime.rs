//! Runtime utilities that abstract over the underlying async executor.

pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a lightweight current-thread
/// runtime.
///
/// Intended for synchronous host entry points (FFI shims, tests). Must not be
/// called from inside another runtime.
pub fn block_on<F>(future: F) -> std::io::Result<F::Output>
where
    F: std::future::Future,
{
    let runtime = Builder::new_current_thread().enable_all().build()?;
    Ok(runtime.block_on(future))
}

/// Returns `true` when the caller is running inside a runtime context and can
/// therefore spawn tasks.
pub fn has_current() -> bool {
    Handle::try_current().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_outside_runtime() {
        let value = block_on(async { 7 }).unwrap();
        assert_eq!(value, 7);
        assert!(!has_current());
    }
}
