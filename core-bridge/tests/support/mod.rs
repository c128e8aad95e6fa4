#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{
    AdEvent, AdRevenueData, Analytics, Attribution, BannerRequest, BridgeError, Capabilities,
    CustomDimensionSlot, CustomDimensions, DesignEvent, ErrorSeverity, EventArguments,
    InAppPurchase, InitContext, InitializationSignal, LifecycleChangeStream, LifecycleObserver,
    LifecycleState, Mediator, PlacementId, ProgressionEvent, ProviderLifecycle,
    RemoteConfiguration, ResourceEvent, StaticRemoteConfig,
};
use core_async::sync::mpsc;
use core_runtime::config::BridgeConfig;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Behavior {
    #[default]
    Succeed,
    Fail,
    Panic,
    Hang,
}

/// Provider double implementing every provider trait. The const parameter
/// gives each instance its own concrete type, which is the registry's
/// identity.
#[derive(Default)]
pub struct FakeProvider<const ID: u8> {
    pub behavior: Behavior,
    pub callback: bool,
    pub hold_signal: bool,
    pub custom_dimensions: bool,
    pub interstitial_ready: bool,
    pub rewarded_ready: bool,
    calls: Mutex<Vec<String>>,
    signal: Mutex<Option<InitializationSignal>>,
    experiment_id: Mutex<Option<String>>,
}

impl<const ID: u8> FakeProvider<ID> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Reports readiness through the signal and keeps it until released.
    pub fn holding_signal(mut self) -> Self {
        self.callback = true;
        self.hold_signal = true;
        self
    }

    pub fn with_callback(mut self) -> Self {
        self.callback = true;
        self
    }

    pub fn with_custom_dimensions(mut self) -> Self {
        self.custom_dimensions = true;
        self
    }

    pub fn with_availability(mut self, interstitial: bool, rewarded: bool) -> Self {
        self.interstitial_ready = interstitial;
        self.rewarded_ready = rewarded;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    pub fn experiment_id(&self) -> Option<String> {
        self.experiment_id.lock().unwrap().clone()
    }

    pub fn release_signal(&self) {
        if let Some(signal) = self.signal.lock().unwrap().take() {
            signal.notify();
        }
    }

    async fn act(&self, call: impl Into<String>) -> Result<()> {
        self.calls.lock().unwrap().push(call.into());
        match self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail => Err(BridgeError::OperationFailed(format!("provider {ID} failed"))),
            Behavior::Panic => panic!("provider {ID} panicked"),
            Behavior::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl<const ID: u8> ProviderLifecycle for FakeProvider<ID> {
    fn name(&self) -> &str {
        "fake"
    }

    fn capabilities(&self) -> Capabilities {
        let caps = Capabilities::none();
        if self.callback {
            caps.with_initialization_callback()
        } else {
            caps
        }
    }

    async fn initialize(&self, ctx: InitContext) -> Result<()> {
        *self.experiment_id.lock().unwrap() = ctx.experiment_id.clone();
        if self.hold_signal {
            *self.signal.lock().unwrap() = Some(ctx.signal);
        } else {
            ctx.signal.notify();
        }
        self.act("initialize").await
    }

    async fn register_events(&self) -> Result<()> {
        self.act("register_events").await
    }

    async fn on_remote_configuration(&self, config: &RemoteConfiguration) -> Result<()> {
        self.act(format!("on_remote_configuration:{}", config.values.len()))
            .await
    }

    async fn on_application_pause(&self, paused: bool) -> Result<()> {
        self.act(format!("pause:{paused}")).await
    }

    async fn validate_integration(&self) -> Result<()> {
        self.act("validate_integration").await
    }

    async fn set_user_is_above_required_age(&self, consent: bool) -> Result<()> {
        self.act(format!("consent_age:{consent}")).await
    }

    async fn set_terms_and_conditions_acceptance(&self, consent: bool) -> Result<()> {
        self.act(format!("consent_terms:{consent}")).await
    }

    async fn set_analytics_tracking_consent_granted(&self, consent: bool) -> Result<()> {
        self.act(format!("consent_analytics:{consent}")).await
    }

    async fn set_tailored_ads_consent_granted(&self, consent: bool) -> Result<()> {
        self.act(format!("consent_tailored:{consent}")).await
    }
}

#[async_trait]
impl<const ID: u8> Mediator for FakeProvider<ID> {
    async fn load_banner(&self, request: BannerRequest) -> Result<()> {
        self.act(format!("load_banner:{:?}", request.position)).await
    }

    async fn show_banner(&self, _placement: Option<PlacementId>) -> Result<()> {
        self.act("show_banner").await
    }

    async fn hide_banner(&self, _placement: Option<PlacementId>) -> Result<()> {
        self.act("hide_banner").await
    }

    async fn destroy_banner(&self, _placement: Option<PlacementId>) -> Result<()> {
        self.act("destroy_banner").await
    }

    async fn show_interstitial(&self, _placement: Option<PlacementId>) -> Result<()> {
        self.act("show_interstitial").await
    }

    async fn is_interstitial_available(&self, _placement: Option<PlacementId>) -> Result<bool> {
        self.act("is_interstitial_available").await?;
        Ok(self.interstitial_ready)
    }

    async fn show_rewarded_video_ad(&self, _placement: Option<PlacementId>) -> Result<()> {
        self.act("show_rewarded_video_ad").await
    }

    async fn is_rewarded_video_ad_available(
        &self,
        _placement: Option<PlacementId>,
    ) -> Result<bool> {
        self.act("is_rewarded_video_ad_available").await?;
        Ok(self.rewarded_ready)
    }
}

#[async_trait]
impl<const ID: u8> Attribution for FakeProvider<ID> {
    async fn track_in_app_purchase(&self, purchase: &InAppPurchase) -> Result<()> {
        self.act(format!("iap:{}", purchase.product_id)).await
    }

    async fn track_ad_revenue(&self, revenue: &AdRevenueData) -> Result<()> {
        self.act(format!("ad_revenue:{}", revenue.ad_unit_id)).await
    }

    async fn track_event(&self, name: &str, arguments: &EventArguments) -> Result<()> {
        self.act(format!("event:{name}:{}", arguments.len())).await
    }
}

#[async_trait]
impl<const ID: u8> Analytics for FakeProvider<ID> {
    async fn track_in_app_purchase(&self, purchase: &InAppPurchase) -> Result<()> {
        self.act(format!("iap:{}", purchase.product_id)).await
    }

    async fn track_resource_event(&self, event: &ResourceEvent) -> Result<()> {
        self.act(format!("resource:{}", event.item_id)).await
    }

    async fn track_progression_event(&self, event: &ProgressionEvent) -> Result<()> {
        self.act(format!("progression:{}", event.levels.join("/")))
            .await
    }

    async fn track_error_event(&self, severity: ErrorSeverity, message: &str) -> Result<()> {
        self.act(format!("error:{severity:?}:{message}")).await
    }

    async fn track_design_event(&self, event: &DesignEvent) -> Result<()> {
        self.act(format!("design:{}", event.name)).await
    }

    async fn track_ad_event(&self, event: &AdEvent) -> Result<()> {
        self.act(format!(
            "ad_event:{:?}:{}:{}",
            event.action, event.ad_type, event.network
        ))
        .await
    }

    fn as_custom_dimensions(&self) -> Option<&dyn CustomDimensions> {
        if self.custom_dimensions {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait]
impl<const ID: u8> CustomDimensions for FakeProvider<ID> {
    async fn set_custom_dimension(&self, slot: CustomDimensionSlot, value: &str) -> Result<()> {
        self.act(format!("custom_dimension:{}:{value}", slot.index()))
            .await
    }
}

/// Lifecycle observer fed from a channel.
pub struct ChannelLifecycle {
    rx: Mutex<Option<mpsc::UnboundedReceiver<LifecycleState>>>,
}

impl ChannelLifecycle {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedSender<LifecycleState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                rx: Mutex::new(Some(rx)),
            }),
            tx,
        )
    }
}

struct ChannelLifecycleStream(mpsc::UnboundedReceiver<LifecycleState>);

#[async_trait]
impl LifecycleChangeStream for ChannelLifecycleStream {
    async fn next(&mut self) -> Option<LifecycleState> {
        self.0.recv().await
    }
}

#[async_trait]
impl LifecycleObserver for ChannelLifecycle {
    async fn get_state(&self) -> Result<LifecycleState> {
        Ok(LifecycleState::Foreground)
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn LifecycleChangeStream>> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BridgeError::NotAvailable("already subscribed".to_string()))?;
        Ok(Box::new(ChannelLifecycleStream(rx)))
    }
}

pub fn remote_config(json: &str) -> Arc<StaticRemoteConfig> {
    Arc::new(StaticRemoteConfig(
        RemoteConfiguration::from_json(json).unwrap(),
    ))
}

pub fn config() -> BridgeConfig {
    BridgeConfig::builder()
        .remote_config(remote_config("{}"))
        .grace_period(Duration::from_secs(10))
        .dispatch_timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

/// Lets spawned tasks run. Under paused time this also advances the clock
/// by a negligible amount.
pub async fn settle() {
    core_async::time::sleep(Duration::from_millis(1)).await;
}
