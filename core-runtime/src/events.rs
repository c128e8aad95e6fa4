//! # Event Bus System
//!
//! Canonical event distribution for the ad bridge.
//!
//! ## Overview
//!
//! Mediators translate SDK-native callbacks into [`BridgeEvent`]s and publish
//! them on the [`EventBus`]. The orchestrator subscribes and forwards ad
//! events to analytics providers and revenue records to attribution
//! providers. Host applications may subscribe as well, e.g. to react to a
//! granted reward or to the bridge becoming ready.
//!
//! The bus is a `broadcast` channel:
//! - Multiple producers (clone the `EventBus`)
//! - Multiple consumers (each `subscribe()` creates a new receiver)
//! - Lagging detection: slow subscribers get `RecvError::Lagged` and continue
//!
//! ## Usage
//!
//! ```rust
//! use bridge_traits::{AdAction, AdEvent, AdType};
//! use core_runtime::events::{BridgeEvent, EventBus, EventStream};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(100);
//! let mut rewards = EventStream::new(bus.subscribe()).filter(|event| {
//!     matches!(event, BridgeEvent::Ad(ad) if ad.action == AdAction::Reward)
//! });
//!
//! bus.emit(BridgeEvent::Ad(
//!     AdEvent::new(AdAction::Reward, AdType::RewardedVideo, "AppLovin").with_reward("coins", 10.0),
//! ))
//! .ok();
//!
//! let event = rewards.recv().await.unwrap();
//! assert_eq!(event.description(), "Ad event");
//! # }
//! ```

use bridge_traits::logging::LogLevel;
use bridge_traits::{AdAction, AdEvent, AdRevenueData, ProviderKind};
use core_async::sync::broadcast;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use core_async::sync::broadcast::error::{RecvError, SendError, TryRecvError};
pub use core_async::sync::broadcast::Receiver;

/// Default bus capacity. A subscriber more than this many events behind
/// receives `RecvError::Lagged` and resumes from the oldest retained event.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Bridge Event Types
// ============================================================================

/// Everything published on the bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload")]
pub enum BridgeEvent {
    Ad(AdEvent),
    Revenue(AdRevenueData),
    Lifecycle(LifecycleEvent),
}

impl BridgeEvent {
    pub fn description(&self) -> &str {
        match self {
            BridgeEvent::Ad(_) => "Ad event",
            BridgeEvent::Revenue(_) => "Ad revenue paid",
            BridgeEvent::Lifecycle(e) => e.description(),
        }
    }

    /// Level at which a host would log this event.
    pub fn log_level(&self) -> LogLevel {
        match self {
            BridgeEvent::Lifecycle(LifecycleEvent::ProviderFailed { .. }) => LogLevel::Warn,
            BridgeEvent::Lifecycle(LifecycleEvent::BridgeReady { .. }) => LogLevel::Info,
            BridgeEvent::Ad(ad) if ad.action == AdAction::Fail => LogLevel::Warn,
            BridgeEvent::Revenue(_) => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    pub fn is_ad(&self) -> bool {
        matches!(self, BridgeEvent::Ad(_))
    }
}

/// How the bridge became ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadinessReason {
    /// Every expected provider reported in.
    AllProvidersReported,
    /// The grace period elapsed first.
    GracePeriodElapsed,
}

/// Bridge and provider lifecycle events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LifecycleEvent {
    ProviderInitialized { provider: String, kind: ProviderKind },
    ProviderFailed {
        provider: String,
        kind: ProviderKind,
        message: String,
    },
    BridgeReady {
        reason: ReadinessReason,
        completed: usize,
        expected: usize,
    },
    /// The remote configuration was fetched and handed to every provider.
    RemoteConfigurationApplied,
}

impl LifecycleEvent {
    fn description(&self) -> &str {
        match self {
            LifecycleEvent::ProviderInitialized { .. } => "Provider initialized",
            LifecycleEvent::ProviderFailed { .. } => "Provider failed to initialize",
            LifecycleEvent::BridgeReady { .. } => "Bridge ready",
            LifecycleEvent::RemoteConfigurationApplied => "Remote configuration applied",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Broadcast bus shared by the orchestrator, the mediators and the host.
///
/// Clones publish into the same channel. Events emitted while nobody is
/// subscribed are dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BridgeEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity).0,
        }
    }

    /// Returns how many subscribers received the event; errors when there
    /// are none.
    pub fn emit(&self, event: BridgeEvent) -> Result<usize, SendError<BridgeEvent>> {
        self.sender.send(event)
    }

    /// New receiver starting at the next emitted event.
    pub fn subscribe(&self) -> Receiver<BridgeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type Predicate = Box<dyn Fn(&BridgeEvent) -> bool + Send + Sync>;

/// Receiver that skips events rejected by an optional predicate.
pub struct EventStream {
    receiver: Receiver<BridgeEvent>,
    predicate: Option<Predicate>,
}

impl EventStream {
    pub fn new(receiver: Receiver<BridgeEvent>) -> Self {
        Self {
            receiver,
            predicate: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&BridgeEvent) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Box::new(predicate));
        self
    }

    /// Only canonical ad events.
    pub fn ads(self) -> Self {
        self.filter(BridgeEvent::is_ad)
    }

    fn wanted(&self, event: &BridgeEvent) -> bool {
        self.predicate.as_ref().map_or(true, |keep| keep(event))
    }

    /// Next accepted event. Lag and closure are reported as the underlying
    /// receiver reports them.
    pub async fn recv(&mut self) -> Result<BridgeEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.wanted(&event) {
                return Ok(event);
            }
        }
    }

    /// Next accepted event already buffered, without waiting.
    pub fn try_recv(&mut self) -> Result<BridgeEvent, TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if self.wanted(&event) {
                return Ok(event);
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("filtered", &self.predicate.is_some())
            .finish()
    }
}
