//! AppLovin MAX mediator implementation
//!
//! Implements the `Mediator` trait on top of the native SDK contract in
//! [`crate::sdk`].
//!
//! SDK callbacks are consumed by a background task and translated into
//! canonical [`AdEvent`]s and [`AdRevenueData`] published on the bridge
//! [`EventBus`]. Each format keeps its own [`AdFormatState`]; failed loads are
//! retried with exponential backoff and reachability recovery reloads every
//! format at once.

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{
    AdAction, AdEvent, AdRevenueData, AdType, BannerPosition, BannerRequest, Capabilities, Color,
    ConfigurationSource, InitContext, InitializationSignal, Mediator, NetworkMonitor, PlacementId,
    Platform, ProviderLifecycle,
};
use core_async::sync::lock_unpoisoned;
use core_async::task::{self, AbortHandle};
use core_async::time::{sleep, Instant};
use core_runtime::config::BridgeConfig;
use core_runtime::events::{BridgeEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, instrument, warn};

use crate::error::{self, MaxMediatorError};
use crate::placement::{AdUnitDefaults, SDK_KEY};
use crate::retry::{ReachabilityTracker, RetryAction, RetryPolicy};
use crate::sdk::{MaxBannerPosition, MaxErrorInfo, MaxSdk, MaxSdkEvent, MaxSdkEventStream};
use crate::state::{FormatStates, LoadPhase, PendingRetry};

/// Provider name reported to the bridge.
pub const PROVIDER_NAME: &str = "AppLovinMax";

/// Network name on canonical ad events and revenue records.
pub const AD_PLATFORM: &str = "AppLovin";

/// MAX reports revenue in USD.
pub const REVENUE_CURRENCY: &str = "USD";

/// Error code of synthesized show failures.
pub const UNAVAILABLE_ERROR_CODE: &str = "999";

const ADAPTIVE_BANNER_KEY: &str = "adaptive_banner";

/// Builder for [`AppLovinMaxMediator`].
pub struct MaxMediatorBuilder {
    sdk: Arc<dyn MaxSdk>,
    configuration: Arc<dyn ConfigurationSource>,
    bus: EventBus,
    network: Option<Arc<dyn NetworkMonitor>>,
    platform: Platform,
    retry_policy: RetryPolicy,
}

impl MaxMediatorBuilder {
    /// Takes platform and backoff settings from the bridge configuration.
    pub fn bridge_config(mut self, config: &BridgeConfig) -> Self {
        self.platform = config.platform;
        self.retry_policy = RetryPolicy::from_config(config);
        self
    }

    /// Enables reloading every format when connectivity comes back.
    pub fn network_monitor(mut self, monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network = Some(monitor);
        self
    }

    /// Overrides the platform used to pick per-platform ad units.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Replaces the reload backoff taken from the bridge configuration.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn build(self) -> AppLovinMaxMediator {
        AppLovinMaxMediator {
            inner: Arc::new(Inner {
                sdk: self.sdk,
                configuration: self.configuration,
                bus: self.bus,
                network: self.network,
                platform: self.platform,
                policy: self.retry_policy,
                state: Mutex::new(MediatorState::default()),
                tasks: Mutex::new(Vec::new()),
            }),
        }
    }
}

/// AppLovin MAX mediator
///
/// # Example
///
/// ```ignore
/// use mediator_applovin_max::AppLovinMaxMediator;
///
/// let mediator = AppLovinMaxMediator::builder(sdk, configuration, orchestrator.event_bus().clone())
///     .bridge_config(&config)
///     .network_monitor(network)
///     .build();
/// orchestrator.register_mediator(Arc::new(mediator));
/// ```
pub struct AppLovinMaxMediator {
    inner: Arc<Inner>,
}

struct Inner {
    sdk: Arc<dyn MaxSdk>,
    configuration: Arc<dyn ConfigurationSource>,
    bus: EventBus,
    network: Option<Arc<dyn NetworkMonitor>>,
    platform: Platform,
    policy: RetryPolicy,
    state: Mutex<MediatorState>,
    tasks: Mutex<Vec<AbortHandle>>,
}

#[derive(Default)]
struct MediatorState {
    defaults: AdUnitDefaults,
    formats: FormatStates,
    signal: Option<InitializationSignal>,
    sdk_ready: bool,
}

impl AppLovinMaxMediator {
    pub fn builder(
        sdk: Arc<dyn MaxSdk>,
        configuration: Arc<dyn ConfigurationSource>,
        bus: EventBus,
    ) -> MaxMediatorBuilder {
        MaxMediatorBuilder {
            sdk,
            configuration,
            bus,
            network: None,
            platform: Platform::current(),
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Where `format` currently is in its load cycle.
    pub fn load_phase(&self, format: AdType) -> LoadPhase {
        lock_unpoisoned(&self.inner.state).formats.get(format).phase
    }

    /// Consecutive failed loads since the last success.
    pub fn retry_attempt(&self, format: AdType) -> u32 {
        lock_unpoisoned(&self.inner.state)
            .formats
            .get(format)
            .retry_attempt
    }

    /// When the pending reload of `format` fires, if one is scheduled.
    pub fn pending_retry_due(&self, format: AdType) -> Option<Instant> {
        lock_unpoisoned(&self.inner.state)
            .formats
            .get(format)
            .pending_retry()
            .map(|pending| pending.due)
    }

    /// Ad unit used for `format` when a call passes no placement.
    pub fn default_ad_unit(&self, format: AdType) -> Option<PlacementId> {
        lock_unpoisoned(&self.inner.state)
            .defaults
            .get(format)
            .cloned()
    }

    async fn show_full_screen(&self, format: AdType, placement: Option<PlacementId>) -> Result<()> {
        let inner = &self.inner;
        if !inner.sdk_initialized(format.as_str()) {
            inner.on_load_failed(
                format,
                None,
                MaxErrorInfo::new(UNAVAILABLE_ERROR_CODE, "Not initialized"),
            );
            return Ok(());
        }

        let unit = inner.ad_unit(format, placement.as_ref())?;
        if !inner.is_loaded(format) || !inner.sdk_ready(format, &unit) {
            debug!(%format, ad_unit = %unit, "Ad not available");
            let message = match format {
                AdType::RewardedVideo => "Rewarded video not available",
                _ => "Interstitial not available",
            };
            inner.on_load_failed(
                format,
                Some(unit),
                MaxErrorInfo::new(UNAVAILABLE_ERROR_CODE, message),
            );
            return Ok(());
        }

        debug!(%format, ad_unit = %unit, "Showing ad");
        match format {
            AdType::RewardedVideo => inner.sdk.show_rewarded_ad(unit.as_str()),
            _ => inner.sdk.show_interstitial(unit.as_str()),
        }
        Ok(())
    }

    fn is_available(&self, format: AdType, placement: Option<PlacementId>) -> bool {
        let inner = &self.inner;
        if !inner.sdk_initialized(format.as_str()) {
            return false;
        }
        match inner.ad_unit(format, placement.as_ref()) {
            Ok(unit) => inner.is_loaded(format) && inner.sdk_ready(format, &unit),
            Err(err) => {
                debug!(%format, error = %err, "Availability unknown");
                false
            }
        }
    }
}

impl Inner {
    async fn load_configuration(&self) -> error::Result<(String, AdUnitDefaults)> {
        let settings = self
            .configuration
            .load()
            .await?
            .ok_or(MaxMediatorError::ConfigurationMissing)?;

        let sdk_key = settings
            .get(SDK_KEY)
            .filter(|key| !key.trim().is_empty())
            .cloned()
            .ok_or(MaxMediatorError::SdkKeyMissing)?;

        let defaults = AdUnitDefaults::from_settings(&settings, self.platform);
        if defaults.is_empty() {
            warn!(platform = %self.platform, "No default ad units configured");
        }

        Ok((sdk_key, defaults))
    }

    fn keep(&self, handle: AbortHandle) {
        lock_unpoisoned(&self.tasks).push(handle);
    }

    /// Warns and returns `false` while the SDK is still starting.
    fn sdk_initialized(&self, operation: &str) -> bool {
        let initialized = self.sdk.is_initialized();
        if !initialized {
            warn!(operation, "AppLovin MAX SDK not initialized");
        }
        initialized
    }

    fn ad_unit(&self, format: AdType, placement: Option<&PlacementId>) -> error::Result<PlacementId> {
        lock_unpoisoned(&self.state)
            .defaults
            .resolve(format, placement)
            .ok_or(MaxMediatorError::AdUnitMissing(format))
    }

    /// A full-screen format is shown only after its last load succeeded.
    fn is_loaded(&self, format: AdType) -> bool {
        lock_unpoisoned(&self.state).formats.get(format).phase == LoadPhase::Loaded
    }

    fn sdk_ready(&self, format: AdType, unit: &PlacementId) -> bool {
        match format {
            AdType::Interstitial => self.sdk.is_interstitial_ready(unit.as_str()),
            AdType::RewardedVideo => self.sdk.is_rewarded_ad_ready(unit.as_str()),
            AdType::Banner => false,
        }
    }

    fn emit_ad(&self, event: AdEvent) {
        self.bus.emit(BridgeEvent::Ad(event)).ok();
    }

    fn ad_event(action: AdAction, format: AdType, unit: Option<PlacementId>) -> AdEvent {
        AdEvent::new(action, format, AD_PLATFORM).with_placement(unit)
    }

    /// Single entry for every load: explicit, preload, auto-recache and
    /// reachability. Full-screen formats already loading or loaded are
    /// skipped.
    fn request_load(&self, format: AdType, placement: Option<&PlacementId>) {
        let unit = match self.ad_unit(format, placement) {
            Ok(unit) => unit,
            Err(err) => {
                warn!(%format, error = %err, "Cannot load ad");
                return;
            }
        };

        {
            let mut state = lock_unpoisoned(&self.state);
            let format_state = state.formats.get_mut(format);
            if format != AdType::Banner && format_state.is_busy() {
                debug!(%format, phase = ?format_state.phase, "Load skipped");
                return;
            }
            format_state.mark_loading();
        }

        self.issue_load(format, &unit);
    }

    fn issue_load(&self, format: AdType, unit: &PlacementId) {
        debug!(%format, ad_unit = %unit, "Loading ad");
        match format {
            AdType::Banner => {
                self.sdk
                    .create_banner(unit.as_str(), MaxBannerPosition::BottomCenter);
                self.sdk
                    .set_banner_extra_parameter(unit.as_str(), ADAPTIVE_BANNER_KEY, "true");
            }
            AdType::Interstitial => self.sdk.load_interstitial(unit.as_str()),
            AdType::RewardedVideo => self.sdk.load_rewarded_ad(unit.as_str()),
        }
    }

    fn on_loaded(&self, format: AdType, unit: Option<PlacementId>) {
        lock_unpoisoned(&self.state).formats.get_mut(format).mark_loaded();
        debug!(%format, "Ad loaded");
        self.emit_ad(Self::ad_event(AdAction::Loaded, format, unit));
    }

    fn on_load_failed(self: &Arc<Self>, format: AdType, unit: Option<PlacementId>, error: MaxErrorInfo) {
        lock_unpoisoned(&self.state).formats.get_mut(format).mark_unloaded();
        debug!(%format, code = %error.code, message = %error.message, "Ad load failed");
        self.emit_ad(
            Self::ad_event(AdAction::Fail, format, unit.clone()).with_error(error.code, error.message),
        );
        self.schedule_retry(format, unit);
    }

    fn schedule_retry(self: &Arc<Self>, format: AdType, unit: Option<PlacementId>) {
        let mut state = lock_unpoisoned(&self.state);
        let format_state = state.formats.get_mut(format);
        let Some((generation, attempt)) = format_state.reserve_retry() else {
            debug!(%format, "Reload already scheduled");
            return;
        };

        let delay = self.policy.delay_for(attempt);
        let weak = Arc::downgrade(self);
        let timer = task::spawn(async move {
            sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.fire_retry(format, generation, unit);
            }
        });
        format_state.arm_retry(PendingRetry::new(
            generation,
            Instant::now() + delay,
            timer.abort_handle(),
        ));

        debug!(%format, attempt, delay_ms = delay.as_millis() as u64, "Scheduled reload");
    }

    fn fire_retry(&self, format: AdType, generation: u64, unit: Option<PlacementId>) {
        if !lock_unpoisoned(&self.state)
            .formats
            .get_mut(format)
            .take_fired_retry(generation)
        {
            debug!(%format, generation, "Stale reload ignored");
            return;
        }

        if !self.sdk.is_initialized() {
            debug!(%format, "Reload skipped until the SDK is initialized");
            return;
        }

        let unit = match self.ad_unit(format, unit.as_ref()) {
            Ok(unit) => unit,
            Err(err) => {
                warn!(%format, error = %err, "Cannot reload ad");
                return;
            }
        };
        let ready = self.sdk_ready(format, &unit);

        let action = {
            let mut state = lock_unpoisoned(&self.state);
            let format_state = state.formats.get_mut(format);
            let action = RetryAction::decide(format, format_state, ready);
            if action != RetryAction::Skip {
                format_state.mark_loading();
            }
            action
        };

        match action {
            RetryAction::Skip => debug!(%format, "Reload not needed"),
            RetryAction::RecreateBanner | RetryAction::Load => self.issue_load(format, &unit),
        }
    }

    fn on_sdk_initialized(self: &Arc<Self>) {
        let signal = {
            let mut state = lock_unpoisoned(&self.state);
            if state.sdk_ready {
                return;
            }
            state.sdk_ready = true;
            state.signal.take()
        };
        info!("AppLovin MAX SDK initialized");

        self.request_load(AdType::Interstitial, None);
        self.request_load(AdType::RewardedVideo, None);
        self.request_load(AdType::Banner, None);

        if let Some(network) = self.network.clone() {
            let watcher = task::spawn(watch_reachability(Arc::downgrade(self), network));
            self.keep(watcher.abort_handle());
        }

        if let Some(signal) = signal {
            signal.notify();
        }
    }

    /// Pending timers are superseded; retry counters are kept.
    fn on_reachability_restored(&self) {
        debug!("Network reachable again, reloading ads");
        lock_unpoisoned(&self.state).formats.cancel_all();

        self.request_load(AdType::Banner, None);
        self.request_load(AdType::RewardedVideo, None);
        self.request_load(AdType::Interstitial, None);
    }

    fn handle_sdk_event(self: &Arc<Self>, event: MaxSdkEvent) {
        match event {
            MaxSdkEvent::SdkInitialized => self.on_sdk_initialized(),
            MaxSdkEvent::AdLoaded { format, ad_unit_id } => {
                self.on_loaded(format, PlacementId::non_empty(ad_unit_id))
            }
            MaxSdkEvent::AdLoadFailed {
                format,
                ad_unit_id,
                error,
            } => self.on_load_failed(format, PlacementId::non_empty(ad_unit_id), error),
            MaxSdkEvent::AdDisplayed { format, ad_unit_id } => {
                lock_unpoisoned(&self.state).formats.get_mut(format).mark_showing();
                self.emit_ad(Self::ad_event(
                    AdAction::Show,
                    format,
                    PlacementId::non_empty(ad_unit_id),
                ));
            }
            MaxSdkEvent::AdDisplayFailed {
                format,
                ad_unit_id,
                error,
            } => {
                let unit = PlacementId::non_empty(ad_unit_id);
                debug!(%format, code = %error.code, message = %error.message, "Ad display failed");
                self.emit_ad(
                    Self::ad_event(AdAction::Fail, format, unit.clone())
                        .with_error(error.code, error.message),
                );
                self.recache(format, unit);
            }
            MaxSdkEvent::AdHidden { format, ad_unit_id } => {
                let unit = PlacementId::non_empty(ad_unit_id);
                self.emit_ad(Self::ad_event(AdAction::Close, format, unit.clone()));
                self.recache(format, unit);
            }
            MaxSdkEvent::AdClicked { format, ad_unit_id } => {
                self.emit_ad(Self::ad_event(
                    AdAction::Click,
                    format,
                    PlacementId::non_empty(ad_unit_id),
                ));
            }
            MaxSdkEvent::RewardReceived { ad_unit_id, reward } => {
                self.emit_ad(
                    Self::ad_event(
                        AdAction::Reward,
                        AdType::RewardedVideo,
                        PlacementId::non_empty(ad_unit_id),
                    )
                    .with_reward(reward.label, reward.amount),
                );
            }
            MaxSdkEvent::AdRevenuePaid { format, info } => {
                debug!(%format, network = %info.network_name, "Ad revenue paid");
                self.bus
                    .emit(BridgeEvent::Revenue(AdRevenueData {
                        ad_platform: AD_PLATFORM.to_string(),
                        currency: REVENUE_CURRENCY.to_string(),
                        revenue: info.revenue,
                        ad_unit_id: info.ad_unit_id,
                        network_name: info.network_name,
                        placement: info.placement,
                    }))
                    .ok();
            }
        }
    }

    /// A shown or failed-to-show ad is consumed; fetch the next one.
    fn recache(&self, format: AdType, unit: Option<PlacementId>) {
        lock_unpoisoned(&self.state).formats.get_mut(format).mark_unloaded();
        if format != AdType::Banner {
            self.request_load(format, unit.as_ref());
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for handle in lock_unpoisoned(&self.tasks).drain(..) {
            handle.abort();
        }
        lock_unpoisoned(&self.state).formats.cancel_all();
    }
}

async fn pump_events(inner: Weak<Inner>, mut events: Box<dyn MaxSdkEventStream>) {
    while let Some(event) = events.next().await {
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.handle_sdk_event(event);
    }
    debug!("AppLovin MAX event stream closed");
}

async fn watch_reachability(inner: Weak<Inner>, network: Arc<dyn NetworkMonitor>) {
    let initial = network.get_network_info().await.ok().map(|info| info.status);
    let mut changes = match network.subscribe_changes().await {
        Ok(changes) => changes,
        Err(err) => {
            warn!(error = %err, "Reachability subscription failed");
            return;
        }
    };

    let mut tracker = ReachabilityTracker::new(initial);
    while let Some(info) = changes.next().await {
        if !tracker.observe(info.status) {
            continue;
        }
        let Some(inner) = inner.upgrade() else {
            break;
        };
        inner.on_reachability_restored();
    }
}

#[async_trait]
impl ProviderLifecycle for AppLovinMaxMediator {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::none().with_initialization_callback()
    }

    /// Starts the SDK. Readiness is signalled once the SDK reports itself
    /// initialized; missing configuration leaves the adapter silent.
    #[instrument(skip_all, name = "applovin_max.initialize")]
    async fn initialize(&self, ctx: InitContext) -> Result<()> {
        let (sdk_key, defaults) = match self.inner.load_configuration().await {
            Ok(loaded) => loaded,
            Err(err) if err.is_configuration_gap() => {
                warn!(error = %err, "AppLovin MAX mediator left uninitialized");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        {
            let mut state = lock_unpoisoned(&self.inner.state);
            state.defaults = defaults;
            state.signal = Some(ctx.signal);
        }

        let events = self.inner.sdk.subscribe_events();
        let pump = task::spawn(pump_events(Arc::downgrade(&self.inner), events));
        self.inner.keep(pump.abort_handle());

        debug!(
            sdk_key = %redact_if_sensitive("sdk_key", &sdk_key),
            "Starting AppLovin MAX SDK"
        );
        self.inner.sdk.set_sdk_key(&sdk_key);
        self.inner.sdk.initialize_sdk();
        self.inner.sdk.set_verbose_logging(false);
        Ok(())
    }

    async fn validate_integration(&self) -> Result<()> {
        self.inner.sdk.show_mediation_debugger();
        Ok(())
    }

    async fn set_user_is_above_required_age(&self, consent: bool) -> Result<()> {
        self.inner.sdk.set_is_age_restricted_user(!consent);
        Ok(())
    }

    async fn set_terms_and_conditions_acceptance(&self, _consent: bool) -> Result<()> {
        Ok(())
    }

    async fn set_analytics_tracking_consent_granted(&self, _consent: bool) -> Result<()> {
        Ok(())
    }

    async fn set_tailored_ads_consent_granted(&self, consent: bool) -> Result<()> {
        self.inner.sdk.set_has_user_consent(consent);
        Ok(())
    }
}

#[async_trait]
impl Mediator for AppLovinMaxMediator {
    async fn load_banner(&self, request: BannerRequest) -> Result<()> {
        let inner = &self.inner;
        if !inner.sdk_initialized("load_banner") {
            return Ok(());
        }

        let unit = inner.ad_unit(AdType::Banner, request.placement.as_ref())?;
        let position = match request.position {
            BannerPosition::Top => MaxBannerPosition::TopCenter,
            BannerPosition::Bottom => MaxBannerPosition::BottomCenter,
        };

        inner.sdk.create_banner(unit.as_str(), position);
        inner
            .sdk
            .set_banner_extra_parameter(unit.as_str(), ADAPTIVE_BANNER_KEY, "true");
        match request.background {
            Some(color) if color == Color::CLEAR => {}
            Some(color) => inner.sdk.set_banner_background_color(unit.as_str(), color),
            None => inner
                .sdk
                .set_banner_background_color(unit.as_str(), Color::WHITE),
        }

        // The SDK does not report banner creation.
        inner.on_loaded(AdType::Banner, Some(unit));
        Ok(())
    }

    async fn show_banner(&self, placement: Option<PlacementId>) -> Result<()> {
        if self.inner.sdk_initialized("show_banner") {
            let unit = self.inner.ad_unit(AdType::Banner, placement.as_ref())?;
            self.inner.sdk.show_banner(unit.as_str());
        }
        Ok(())
    }

    async fn hide_banner(&self, placement: Option<PlacementId>) -> Result<()> {
        if self.inner.sdk_initialized("hide_banner") {
            let unit = self.inner.ad_unit(AdType::Banner, placement.as_ref())?;
            self.inner.sdk.hide_banner(unit.as_str());
        }
        Ok(())
    }

    async fn destroy_banner(&self, placement: Option<PlacementId>) -> Result<()> {
        if self.inner.sdk_initialized("destroy_banner") {
            let unit = self.inner.ad_unit(AdType::Banner, placement.as_ref())?;
            self.inner.sdk.destroy_banner(unit.as_str());
            lock_unpoisoned(&self.inner.state)
                .formats
                .get_mut(AdType::Banner)
                .reset();
        }
        Ok(())
    }

    async fn show_interstitial(&self, placement: Option<PlacementId>) -> Result<()> {
        self.show_full_screen(AdType::Interstitial, placement).await
    }

    async fn is_interstitial_available(&self, placement: Option<PlacementId>) -> Result<bool> {
        Ok(self.is_available(AdType::Interstitial, placement))
    }

    async fn show_rewarded_video_ad(&self, placement: Option<PlacementId>) -> Result<()> {
        self.show_full_screen(AdType::RewardedVideo, placement).await
    }

    async fn is_rewarded_video_ad_available(&self, placement: Option<PlacementId>) -> Result<bool> {
        Ok(self.is_available(AdType::RewardedVideo, placement))
    }
}
