//! Lifecycle Observer

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState},
};

/// Desktop lifecycle observer.
///
/// Desktop applications have no background state the bridge cares about,
/// so this reports `Foreground` and never emits a change.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopLifecycleObserver;

impl DesktopLifecycleObserver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LifecycleObserver for DesktopLifecycleObserver {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(LifecycleState::Foreground)
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        Ok(Box::new(DesktopLifecycleChangeStream))
    }
}

/// Desktop lifecycle change stream (never emits).
struct DesktopLifecycleChangeStream;

#[async_trait]
impl LifecycleChangeStream for DesktopLifecycleChangeStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        std::future::pending::<()>().await;
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_async::time::{timeout, Duration};

    #[tokio::test(start_paused = true)]
    async fn test_always_foreground() {
        let observer = DesktopLifecycleObserver::new();
        assert_eq!(
            observer.get_state().await.unwrap(),
            LifecycleState::Foreground
        );

        let mut changes = observer.subscribe_changes().await.unwrap();
        assert!(timeout(Duration::from_secs(3600), changes.next())
            .await
            .is_err());
    }
}
