//! Provider Capability Contracts
//!
//! Every third-party SDK integration is wrapped in an adapter implementing
//! [`ProviderLifecycle`] plus exactly one of [`Mediator`], [`Attribution`] or
//! [`Analytics`]. The orchestrator only ever talks to providers through these
//! traits.
//!
//! # Initialization protocol
//!
//! Providers receive an [`InitContext`] in [`ProviderLifecycle::initialize`].
//! A provider whose SDK finishes asynchronously declares
//! [`Capabilities::initialization_callback`] and calls
//! [`InitializationSignal::notify`] once ready. Providers without the
//! capability are considered ready as soon as `initialize` returns `Ok`.
//!
//! ```ignore
//! use bridge_traits::provider::{InitContext, ProviderLifecycle};
//!
//! #[async_trait::async_trait]
//! impl ProviderLifecycle for MyAnalytics {
//!     fn name(&self) -> &str {
//!         "my-analytics"
//!     }
//!
//!     async fn initialize(&self, ctx: InitContext) -> Result<()> {
//!         self.sdk.start();
//!         Ok(())
//!     }
//!     // consent setters ...
//! }
//! ```

use async_trait::async_trait;
use core_async::sync::oneshot;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    ads::{AdEvent, AdRevenueData, BannerRequest, PlacementId},
    config::RemoteConfiguration,
    error::Result,
    tracking::{
        CustomDimensionSlot, DesignEvent, ErrorSeverity, EventArguments, InAppPurchase,
        ProgressionEvent, ResourceEvent,
    },
};

/// Provider kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Mediator,
    Attribution,
    Analytics,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Mediator => write!(f, "mediator"),
            ProviderKind::Attribution => write!(f, "attribution"),
            ProviderKind::Analytics => write!(f, "analytics"),
        }
    }
}

/// Optional behaviours a provider opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Reports readiness through [`InitializationSignal`].
    pub initialization_callback: bool,
    /// Accepts analytics custom dimensions.
    pub custom_dimensions: bool,
}

impl Capabilities {
    pub const fn none() -> Self {
        Self {
            initialization_callback: false,
            custom_dimensions: false,
        }
    }

    pub const fn with_initialization_callback(mut self) -> Self {
        self.initialization_callback = true;
        self
    }

    pub const fn with_custom_dimensions(mut self) -> Self {
        self.custom_dimensions = true;
        self
    }
}

/// One-shot readiness report handed to a provider during initialization.
///
/// Dropping the signal without calling [`notify`](Self::notify) means the
/// provider never reports in; readiness then waits for the grace period.
pub struct InitializationSignal {
    provider: String,
    sender: Option<oneshot::Sender<()>>,
}

impl InitializationSignal {
    pub fn new(provider: impl Into<String>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                provider: provider.into(),
                sender: Some(tx),
            },
            rx,
        )
    }

    /// A signal nobody listens to.
    pub fn detached(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            sender: None,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn notify(mut self) {
        if let Some(sender) = self.sender.take() {
            let _ = sender.send(());
        }
    }
}

impl fmt::Debug for InitializationSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitializationSignal")
            .field("provider", &self.provider)
            .field("attached", &self.sender.is_some())
            .finish()
    }
}

/// Arguments passed to [`ProviderLifecycle::initialize`].
#[derive(Debug)]
pub struct InitContext {
    pub signal: InitializationSignal,
    /// Experiment scope and variant, set for attribution providers.
    pub experiment_id: Option<String>,
}

impl InitContext {
    pub fn new(signal: InitializationSignal) -> Self {
        Self {
            signal,
            experiment_id: None,
        }
    }

    pub fn with_experiment_id(mut self, experiment_id: Option<String>) -> Self {
        self.experiment_id = experiment_id;
        self
    }
}

/// Operations shared by every provider kind.
#[async_trait]
pub trait ProviderLifecycle: Send + Sync {
    /// Stable provider name used in logs and events.
    fn name(&self) -> &str;

    fn capabilities(&self) -> Capabilities {
        Capabilities::none()
    }

    /// Config-independent initialization.
    async fn initialize(&self, ctx: InitContext) -> Result<()>;

    /// Subscribe to SDK callbacks. Called after `initialize` for mediators.
    async fn register_events(&self) -> Result<()> {
        Ok(())
    }

    /// Config-dependent initialization, called once the remote configuration
    /// has been fetched.
    async fn on_remote_configuration(&self, _config: &RemoteConfiguration) -> Result<()> {
        Ok(())
    }

    async fn on_application_pause(&self, _paused: bool) -> Result<()> {
        Ok(())
    }

    async fn validate_integration(&self) -> Result<()> {
        Ok(())
    }

    async fn set_user_is_above_required_age(&self, consent: bool) -> Result<()>;

    async fn set_terms_and_conditions_acceptance(&self, consent: bool) -> Result<()>;

    async fn set_analytics_tracking_consent_granted(&self, consent: bool) -> Result<()>;

    async fn set_tailored_ads_consent_granted(&self, consent: bool) -> Result<()>;
}

/// Ad-serving network adapter.
#[async_trait]
pub trait Mediator: ProviderLifecycle {
    async fn load_banner(&self, request: BannerRequest) -> Result<()>;

    async fn show_banner(&self, placement: Option<PlacementId>) -> Result<()>;

    async fn hide_banner(&self, placement: Option<PlacementId>) -> Result<()>;

    async fn destroy_banner(&self, placement: Option<PlacementId>) -> Result<()>;

    async fn show_interstitial(&self, placement: Option<PlacementId>) -> Result<()>;

    async fn is_interstitial_available(&self, placement: Option<PlacementId>) -> Result<bool>;

    async fn show_rewarded_video_ad(&self, placement: Option<PlacementId>) -> Result<()>;

    async fn is_rewarded_video_ad_available(&self, placement: Option<PlacementId>)
        -> Result<bool>;
}

/// Install and event attribution service.
#[async_trait]
pub trait Attribution: ProviderLifecycle {
    async fn track_in_app_purchase(&self, purchase: &InAppPurchase) -> Result<()>;

    async fn track_ad_revenue(&self, revenue: &AdRevenueData) -> Result<()>;

    async fn track_event(&self, name: &str, arguments: &EventArguments) -> Result<()>;
}

/// Gameplay and ad telemetry backend.
#[async_trait]
pub trait Analytics: ProviderLifecycle {
    async fn track_in_app_purchase(&self, purchase: &InAppPurchase) -> Result<()>;

    async fn track_resource_event(&self, event: &ResourceEvent) -> Result<()>;

    async fn track_progression_event(&self, event: &ProgressionEvent) -> Result<()>;

    async fn track_error_event(&self, severity: ErrorSeverity, message: &str) -> Result<()>;

    async fn track_design_event(&self, event: &DesignEvent) -> Result<()>;

    async fn track_ad_event(&self, event: &AdEvent) -> Result<()>;

    /// Custom dimension support, if any. Resolved once at registration.
    fn as_custom_dimensions(&self) -> Option<&dyn CustomDimensions> {
        None
    }
}

/// Analytics providers that accept custom dimensions.
#[async_trait]
pub trait CustomDimensions: Send + Sync {
    async fn set_custom_dimension(&self, slot: CustomDimensionSlot, value: &str) -> Result<()>;
}
