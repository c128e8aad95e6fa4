//! Initialization readiness gate.
//!
//! The bridge is ready once every expected provider reported in, or once the
//! grace period elapsed, whichever comes first. Readiness is sticky.

use bridge_traits::ProviderKind;
use core_async::sync::{lock_unpoisoned, oneshot, watch};
use core_async::task;
use core_async::time::{sleep, Duration, Instant};
use core_runtime::events::{BridgeEvent, EventBus, LifecycleEvent, ReadinessReason};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Snapshot of initialization progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializationStatus {
    pub expected: usize,
    pub completed: usize,
    pub ready: bool,
    /// When the grace period ends; `None` until it has started.
    pub deadline: Option<Instant>,
}

#[derive(Debug, Default)]
struct GateState {
    expected: usize,
    completed: usize,
    ready: bool,
    armed: bool,
    deadline: Option<Instant>,
}

struct GateInner {
    state: Mutex<GateState>,
    ready_tx: watch::Sender<bool>,
    bus: EventBus,
    grace_period: Duration,
}

/// Tracks provider initialization and publishes readiness.
#[derive(Clone)]
pub struct InitializationGate {
    inner: Arc<GateInner>,
}

impl InitializationGate {
    pub fn new(grace_period: Duration, bus: EventBus) -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(GateInner {
                state: Mutex::new(GateState::default()),
                ready_tx,
                bus,
                grace_period,
            }),
        }
    }

    /// Adds `count` providers to the number expected to report in.
    pub fn expect_providers(&self, count: usize) {
        let mut state = lock_unpoisoned(&self.inner.state);
        state.expected += count;
    }

    /// Records that a provider finished initialization.
    pub fn mark_completed(&self, provider: &str, kind: ProviderKind) {
        let reached = {
            let mut state = lock_unpoisoned(&self.inner.state);
            state.completed += 1;
            debug!(
                provider,
                completed = state.completed,
                expected = state.expected,
                "Provider reported initialized"
            );
            state.armed && !state.ready && state.completed >= state.expected
        };

        self.inner
            .bus
            .emit(BridgeEvent::Lifecycle(LifecycleEvent::ProviderInitialized {
                provider: provider.to_string(),
                kind,
            }))
            .ok();

        if reached {
            self.set_ready(ReadinessReason::AllProvidersReported);
        }
    }

    /// Waits for a provider's [`InitializationSignal`](bridge_traits::InitializationSignal)
    /// on a background task.
    ///
    /// A dropped signal counts as "never reported".
    pub fn attach_signal(&self, provider: String, kind: ProviderKind, rx: oneshot::Receiver<()>) {
        let gate = self.clone();
        task::spawn(async move {
            match rx.await {
                Ok(()) => gate.mark_completed(&provider, kind),
                Err(_) => debug!(provider = %provider, "Initialization signal dropped"),
            }
        });
    }

    /// Starts the grace period.
    ///
    /// Becomes ready immediately when every expected provider already
    /// reported (including when none are expected). Calling it again has no
    /// effect.
    pub fn start_grace_period(&self) {
        let all_reported = {
            let mut state = lock_unpoisoned(&self.inner.state);
            if state.armed {
                return;
            }
            state.armed = true;
            state.deadline = Some(Instant::now() + self.inner.grace_period);
            state.completed >= state.expected
        };

        if all_reported {
            self.set_ready(ReadinessReason::AllProvidersReported);
            return;
        }

        let gate = self.clone();
        let grace_period = self.inner.grace_period;
        task::spawn(async move {
            sleep(grace_period).await;
            gate.set_ready(ReadinessReason::GracePeriodElapsed);
        });
    }

    pub fn is_ready(&self) -> bool {
        *self.inner.ready_tx.borrow()
    }

    /// Resolves once the bridge is ready. Returns immediately if it already is.
    pub async fn wait_until_ready(&self) {
        let mut rx = self.inner.ready_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    pub fn status(&self) -> InitializationStatus {
        let state = lock_unpoisoned(&self.inner.state);
        InitializationStatus {
            expected: state.expected,
            completed: state.completed,
            ready: state.ready,
            deadline: state.deadline,
        }
    }

    fn set_ready(&self, reason: ReadinessReason) {
        let (completed, expected) = {
            let mut state = lock_unpoisoned(&self.inner.state);
            if state.ready {
                return;
            }
            state.ready = true;
            (state.completed, state.expected)
        };

        self.inner.ready_tx.send_replace(true);
        info!(?reason, completed, expected, "Bridge initialized");
        self.inner
            .bus
            .emit(BridgeEvent::Lifecycle(LifecycleEvent::BridgeReady {
                reason,
                completed,
                expected,
            }))
            .ok();
    }
}

impl std::fmt::Debug for InitializationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationGate")
            .field("status", &self.status())
            .field("grace_period", &self.inner.grace_period)
            .finish()
    }
}
