//! # Ad Bridge Traits
//!
//! Contracts between the bridge core and everything it talks to.
//!
//! ## Overview
//!
//! The bridge aggregates three kinds of third-party integrations behind one
//! facade. Each integration is wrapped in an adapter implementing one of the
//! provider traits; everything the core needs from the host application is
//! expressed as a collaborator trait.
//!
//! ## Traits
//!
//! ### Providers
//! - [`Mediator`](provider::Mediator) - Ad-serving network (banner, interstitial, rewarded video)
//! - [`Attribution`](provider::Attribution) - Install/event attribution and ad revenue
//! - [`Analytics`](provider::Analytics) - Gameplay, design, error and ad telemetry
//! - [`CustomDimensions`](provider::CustomDimensions) - Optional analytics capability
//!
//! ### Collaborators
//! - [`ConfigurationSource`](config::ConfigurationSource) - Bundled adapter settings
//! - [`RemoteConfigSource`](config::RemoteConfigSource) - Runtime configuration fetch
//! - [`ExperimentContext`](config::ExperimentContext) - A/B test assignment
//! - [`NetworkMonitor`](network::NetworkMonitor) - Reachability changes
//! - [`LifecycleObserver`](lifecycle::LifecycleObserver) - Foreground/background transitions
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All traits return [`BridgeError`](error::BridgeError). Provider failures
//! are isolated and logged by the orchestrator; they never reach callers of
//! the bridge facade.
//!
//! ## Thread Safety
//!
//! All traits require `Send + Sync` so implementations can be shared across
//! async tasks behind `Arc`.

pub mod ads;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod network;
pub mod platform;
pub mod provider;
pub mod tracking;

pub use error::BridgeError;

pub use ads::{
    AdAction, AdEvent, AdEventPayload, AdRevenueData, AdType, BannerPosition, BannerRequest,
    BannerSize, Color, PlacementId, VideoAdReward, DEFAULT_AD_NETWORK,
};
pub use config::{
    ConfigurationSource, ExperimentContext, InMemoryConfigSource, NoExperiment,
    RemoteConfigSource, RemoteConfiguration, Settings, StaticRemoteConfig,
};
pub use lifecycle::{LifecycleChangeStream, LifecycleObserver, LifecycleState};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType};
pub use platform::Platform;
pub use provider::{
    Analytics, Attribution, Capabilities, CustomDimensions, InitContext, InitializationSignal,
    Mediator, ProviderKind, ProviderLifecycle,
};
pub use tracking::{
    CustomDimensionSlot, DesignEvent, ErrorSeverity, EventArguments, InAppPurchase,
    ProgressionEvent, ProgressionStatus, ResourceEvent, ResourceFlowType,
};
