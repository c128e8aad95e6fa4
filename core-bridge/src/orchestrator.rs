//! # Provider Orchestrator
//!
//! Owns the provider registry and the initialization gate, runs the
//! two-phase startup and fans every bridge call out to the providers of the
//! relevant kind.
//!
//! ## Startup
//!
//! [`Orchestrator::initialize`] returns immediately and spawns two phases:
//!
//! 1. **Phase A** (config-independent): starts the grace period, then
//!    initializes the three provider groups concurrently. Mediators start at
//!    once and register their SDK events after `initialize`; attributions
//!    wait for the experiment id and analytics for the experiment custom
//!    dimensions, each lookup bounded by `dispatch_timeout`.
//! 2. **Phase B** (config-dependent): waits for the remote configuration
//!    fetch, stores the result and hands it to every provider.
//!
//! Ad events published by mediators on the [`EventBus`] are forwarded to
//! every analytics provider; revenue events to every attribution provider.
//!
//! ## Failure isolation
//!
//! Every provider call runs inside its own boundary: an `Err`, a panic or a
//! call exceeding `dispatch_timeout` is logged with the provider identity and
//! never reaches the caller or the other providers.
//!
//! ## Usage
//!
//! ```ignore
//! use core_bridge::Orchestrator;
//!
//! let bridge = Orchestrator::builder(config)
//!     .event_bus(bus.clone())
//!     .mediator(max_mediator)
//!     .analytics(analytics)
//!     .build()?;
//!
//! bridge.initialize();
//! bridge.wait_until_initialized().await;
//!
//! if bridge.is_rewarded_video_ad_available(None).await {
//!     bridge.show_rewarded_video_ad(None).await;
//! }
//! ```

use crate::dispatch::{fan_out, guarded};
use crate::error::Result;
use crate::gate::{InitializationGate, InitializationStatus};
use crate::registry::{ProviderHandle, ProviderRegistry, RegistrationOutcome};
use bridge_traits::{
    AdAction, AdEvent, AdRevenueData, AdType, Analytics, Attribution, BannerRequest, BridgeError,
    CustomDimensionSlot, DesignEvent, ErrorSeverity, EventArguments, InAppPurchase, InitContext,
    InitializationSignal, LifecycleObserver, Mediator, PlacementId, ProgressionEvent,
    ProviderKind, ProviderLifecycle, RemoteConfiguration, ResourceEvent, DEFAULT_AD_NETWORK,
};
use core_async::sync::lock_unpoisoned;
use core_async::task::{self, AbortHandle};
use core_async::time::timeout;
use core_runtime::config::BridgeConfig;
use core_runtime::events::{
    BridgeEvent, EventBus, EventStream, LifecycleEvent, Receiver, RecvError,
};
use futures::future::join_all;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, instrument, warn};

/// External tokens applied as analytics custom dimensions before startup.
const EXPERIMENT_DIMENSIONS: [(u8, CustomDimensionSlot); 2] = [
    (0, CustomDimensionSlot::One),
    (1, CustomDimensionSlot::Two),
];

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: BridgeConfig,
    bus: Option<EventBus>,
    registry: ProviderRegistry,
}

impl OrchestratorBuilder {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            bus: None,
            registry: ProviderRegistry::new(),
        }
    }

    /// Shares an existing bus, typically the one mediators publish to.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    pub fn mediator<M: Mediator + 'static>(mut self, mediator: Arc<M>) -> Self {
        self.registry.register_mediator(mediator);
        self
    }

    pub fn attribution<A: Attribution + 'static>(mut self, attribution: Arc<A>) -> Self {
        self.registry.register_attribution(attribution);
        self
    }

    pub fn analytics<A: Analytics + 'static>(mut self, analytics: Arc<A>) -> Self {
        self.registry.register_analytics(analytics);
        self
    }

    pub fn build(self) -> Result<Orchestrator> {
        self.config.validate()?;

        let bus = self
            .bus
            .unwrap_or_else(|| EventBus::new(self.config.event_buffer_size));
        let gate = InitializationGate::new(self.config.grace_period, bus.clone());

        Ok(Orchestrator {
            inner: Arc::new(Inner {
                config: self.config,
                registry: Mutex::new(self.registry),
                gate,
                bus,
                started: AtomicBool::new(false),
                remote_configuration: Mutex::new(None),
                background: Mutex::new(Vec::new()),
            }),
        })
    }
}

struct Inner {
    config: BridgeConfig,
    registry: Mutex<ProviderRegistry>,
    gate: InitializationGate,
    bus: EventBus,
    started: AtomicBool,
    remote_configuration: Mutex<Option<RemoteConfiguration>>,
    /// Long-lived tasks stopped when the orchestrator goes away.
    background: Mutex<Vec<AbortHandle>>,
}

impl Inner {
    fn mediators(&self) -> Vec<ProviderHandle<dyn Mediator>> {
        lock_unpoisoned(&self.registry).mediators().to_vec()
    }

    fn attributions(&self) -> Vec<ProviderHandle<dyn Attribution>> {
        lock_unpoisoned(&self.registry).attributions().to_vec()
    }

    fn analytics(&self) -> Vec<ProviderHandle<dyn Analytics>> {
        lock_unpoisoned(&self.registry).analytics().to_vec()
    }

    fn all(&self) -> Vec<ProviderHandle<dyn ProviderLifecycle>> {
        lock_unpoisoned(&self.registry).all()
    }

    fn keep(&self, handle: AbortHandle) {
        lock_unpoisoned(&self.background).push(handle);
    }

    async fn track_ad_event(&self, event: &AdEvent) {
        let handles = self.analytics();
        fan_out(
            &handles,
            "track_ad_event",
            self.config.dispatch_timeout,
            |analytics| async move { analytics.track_ad_event(event).await },
        )
        .await;
    }

    async fn track_ad_revenue(&self, revenue: &AdRevenueData) {
        let handles = self.attributions();
        fan_out(
            &handles,
            "track_ad_revenue",
            self.config.dispatch_timeout,
            |attribution| async move { attribution.track_ad_revenue(revenue).await },
        )
        .await;
    }

    async fn set_custom_dimension(&self, slot: CustomDimensionSlot, value: &str) {
        let handles: Vec<_> = self
            .analytics()
            .into_iter()
            .filter(|handle| handle.capabilities().custom_dimensions)
            .collect();

        fan_out(
            &handles,
            "set_custom_dimension",
            self.config.dispatch_timeout,
            |analytics| async move {
                match analytics.as_custom_dimensions() {
                    Some(dimensions) => dimensions.set_custom_dimension(slot, value).await,
                    None => Err(BridgeError::NotAvailable("custom dimensions".to_string())),
                }
            },
        )
        .await;
    }

    async fn on_application_pause(&self, paused: bool) {
        let mediators = self.mediators();
        let attributions = self.attributions();
        let limit = self.config.dispatch_timeout;

        futures::join!(
            fan_out(&mediators, "on_application_pause", limit, |m| async move {
                m.on_application_pause(paused).await
            }),
            fan_out(&attributions, "on_application_pause", limit, |a| async move {
                a.on_application_pause(paused).await
            }),
        );
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for handle in lock_unpoisoned(&self.background).drain(..) {
            handle.abort();
        }
    }
}

/// The bridge facade.
///
/// Cheap to clone; clones share the same registry, gate and bus.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("registry", &*lock_unpoisoned(&self.inner.registry))
            .field("gate", &self.inner.gate)
            .field("started", &self.inner.started.load(Ordering::SeqCst))
            .finish()
    }
}

impl Orchestrator {
    pub fn builder(config: BridgeConfig) -> OrchestratorBuilder {
        OrchestratorBuilder::new(config)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    pub fn register_mediator<M: Mediator + 'static>(&self, mediator: Arc<M>) -> RegistrationOutcome {
        self.note_late_registration(mediator.name());
        lock_unpoisoned(&self.inner.registry).register_mediator(mediator)
    }

    pub fn register_attribution<A: Attribution + 'static>(
        &self,
        attribution: Arc<A>,
    ) -> RegistrationOutcome {
        self.note_late_registration(attribution.name());
        lock_unpoisoned(&self.inner.registry).register_attribution(attribution)
    }

    pub fn register_analytics<A: Analytics + 'static>(&self, analytics: Arc<A>) -> RegistrationOutcome {
        self.note_late_registration(analytics.name());
        lock_unpoisoned(&self.inner.registry).register_analytics(analytics)
    }

    fn note_late_registration(&self, provider: &str) {
        if self.inner.started.load(Ordering::SeqCst) {
            info!(
                provider,
                "Provider registered after initialization; it receives calls but is not initialized"
            );
        }
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Starts both initialization phases and returns immediately.
    ///
    /// Only the first call has an effect. Providers registered afterwards are
    /// not initialized.
    pub fn initialize(&self) {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            warn!("Bridge initialize called more than once, ignoring");
            return;
        }

        let (mediators, attributions, analytics) = {
            let registry = lock_unpoisoned(&self.inner.registry);
            (
                registry.mediators().to_vec(),
                registry.attributions().to_vec(),
                registry.analytics().to_vec(),
            )
        };
        self.inner
            .gate
            .expect_providers(mediators.len() + attributions.len() + analytics.len());

        // Subscribe before anything is initialized so no mediator event is missed.
        let events = self.inner.bus.subscribe();
        let forwarder = task::spawn(forward_events(Arc::downgrade(&self.inner), events));
        self.inner.keep(forwarder.abort_handle());

        if let Some(observer) = self.inner.config.lifecycle_observer.clone() {
            self.attach_lifecycle_observer(observer);
        }

        task::spawn(run_phase_a(
            Arc::clone(&self.inner),
            mediators,
            attributions,
            analytics,
        ));
        task::spawn(run_phase_b(Arc::clone(&self.inner)));
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.gate.is_ready()
    }

    /// Resolves once every provider reported in or the grace period elapsed.
    pub async fn wait_until_initialized(&self) {
        self.inner.gate.wait_until_ready().await
    }

    pub fn initialization_status(&self) -> InitializationStatus {
        self.inner.gate.status()
    }

    /// The remote configuration, once phase B fetched it.
    pub fn remote_configuration(&self) -> Option<RemoteConfiguration> {
        lock_unpoisoned(&self.inner.remote_configuration).clone()
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn subscribe(&self) -> EventStream {
        EventStream::new(self.inner.bus.subscribe())
    }

    /// Translates lifecycle changes into `on_application_pause` calls.
    pub fn attach_lifecycle_observer(&self, observer: Arc<dyn LifecycleObserver>) {
        let handle = task::spawn(observe_lifecycle(Arc::downgrade(&self.inner), observer));
        self.inner.keep(handle.abort_handle());
    }

    pub fn set_debug(&self, enabled: bool) {
        debug!(enabled, "Debug mode requested; providers manage their own verbosity");
    }

    // ------------------------------------------------------------------
    // Lifecycle & consent
    // ------------------------------------------------------------------

    /// Forwarded to mediators and attributions.
    pub async fn on_application_pause(&self, paused: bool) {
        self.inner.on_application_pause(paused).await
    }

    pub async fn validate_integration(&self) {
        let handles = self.inner.all();
        fan_out(
            &handles,
            "validate_integration",
            self.inner.config.dispatch_timeout,
            |p| async move { p.validate_integration().await },
        )
        .await;
    }

    pub async fn set_user_is_above_required_age(&self, consent: bool) {
        let handles = self.inner.all();
        fan_out(
            &handles,
            "set_user_is_above_required_age",
            self.inner.config.dispatch_timeout,
            |p| async move { p.set_user_is_above_required_age(consent).await },
        )
        .await;
    }

    pub async fn set_terms_and_conditions_acceptance(&self, consent: bool) {
        let handles = self.inner.all();
        fan_out(
            &handles,
            "set_terms_and_conditions_acceptance",
            self.inner.config.dispatch_timeout,
            |p| async move { p.set_terms_and_conditions_acceptance(consent).await },
        )
        .await;
    }

    pub async fn set_analytics_tracking_consent_granted(&self, consent: bool) {
        let handles = self.inner.all();
        fan_out(
            &handles,
            "set_analytics_tracking_consent_granted",
            self.inner.config.dispatch_timeout,
            |p| async move { p.set_analytics_tracking_consent_granted(consent).await },
        )
        .await;
    }

    pub async fn set_tailored_ads_consent_granted(&self, consent: bool) {
        let handles = self.inner.all();
        fan_out(
            &handles,
            "set_tailored_ads_consent_granted",
            self.inner.config.dispatch_timeout,
            |p| async move { p.set_tailored_ads_consent_granted(consent).await },
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Ads
    // ------------------------------------------------------------------

    pub async fn load_banner(&self, request: BannerRequest) {
        self.track_request(AdType::Banner, request.placement.clone())
            .await;

        let handles = self.inner.mediators();
        let request = &request;
        fan_out(
            &handles,
            "load_banner",
            self.inner.config.dispatch_timeout,
            |m| async move { m.load_banner(request.clone()).await },
        )
        .await;
    }

    pub async fn show_banner(&self, placement: Option<PlacementId>) {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "show_banner",
            self.inner.config.dispatch_timeout,
            |m| async move { m.show_banner(placement.clone()).await },
        )
        .await;
    }

    pub async fn hide_banner(&self, placement: Option<PlacementId>) {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "hide_banner",
            self.inner.config.dispatch_timeout,
            |m| async move { m.hide_banner(placement.clone()).await },
        )
        .await;
    }

    pub async fn destroy_banner(&self, placement: Option<PlacementId>) {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "destroy_banner",
            self.inner.config.dispatch_timeout,
            |m| async move { m.destroy_banner(placement.clone()).await },
        )
        .await;
    }

    pub async fn show_interstitial(&self, placement: Option<PlacementId>) {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "show_interstitial",
            self.inner.config.dispatch_timeout,
            |m| async move { m.show_interstitial(placement.clone()).await },
        )
        .await;
    }

    /// `true` if any mediator has an interstitial ready.
    pub async fn is_interstitial_available(&self, placement: Option<PlacementId>) -> bool {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "is_interstitial_available",
            self.inner.config.dispatch_timeout,
            |m| async move { m.is_interstitial_available(placement.clone()).await },
        )
        .await
        .into_iter()
        .any(|available| available == Some(true))
    }

    pub async fn show_rewarded_video_ad(&self, placement: Option<PlacementId>) {
        self.track_request(AdType::RewardedVideo, placement.clone())
            .await;

        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "show_rewarded_video_ad",
            self.inner.config.dispatch_timeout,
            |m| async move { m.show_rewarded_video_ad(placement.clone()).await },
        )
        .await;
    }

    /// `true` if any mediator has a rewarded video ready.
    pub async fn is_rewarded_video_ad_available(&self, placement: Option<PlacementId>) -> bool {
        let handles = self.inner.mediators();
        let placement = &placement;
        fan_out(
            &handles,
            "is_rewarded_video_ad_available",
            self.inner.config.dispatch_timeout,
            |m| async move { m.is_rewarded_video_ad_available(placement.clone()).await },
        )
        .await
        .into_iter()
        .any(|available| available == Some(true))
    }

    async fn track_request(&self, ad_type: AdType, placement: Option<PlacementId>) {
        let event =
            AdEvent::new(AdAction::Request, ad_type, DEFAULT_AD_NETWORK).with_placement(placement);
        self.inner.track_ad_event(&event).await;
    }

    // ------------------------------------------------------------------
    // Tracking
    // ------------------------------------------------------------------

    /// Forwarded to attributions and analytics.
    pub async fn track_in_app_purchase(&self, purchase: &InAppPurchase) {
        let attributions = self.inner.attributions();
        let analytics = self.inner.analytics();
        let limit = self.inner.config.dispatch_timeout;

        futures::join!(
            fan_out(&attributions, "track_in_app_purchase", limit, |a| async move {
                a.track_in_app_purchase(purchase).await
            }),
            fan_out(&analytics, "track_in_app_purchase", limit, |a| async move {
                a.track_in_app_purchase(purchase).await
            }),
        );
    }

    pub async fn track_resource_event(&self, event: &ResourceEvent) {
        let handles = self.inner.analytics();
        fan_out(
            &handles,
            "track_resource_event",
            self.inner.config.dispatch_timeout,
            |a| async move { a.track_resource_event(event).await },
        )
        .await;
    }

    pub async fn track_progression_event(&self, event: &ProgressionEvent) {
        let handles = self.inner.analytics();
        fan_out(
            &handles,
            "track_progression_event",
            self.inner.config.dispatch_timeout,
            |a| async move { a.track_progression_event(event).await },
        )
        .await;
    }

    pub async fn track_error_event(&self, severity: ErrorSeverity, message: &str) {
        let handles = self.inner.analytics();
        fan_out(
            &handles,
            "track_error_event",
            self.inner.config.dispatch_timeout,
            |a| async move { a.track_error_event(severity, message).await },
        )
        .await;
    }

    pub async fn track_design_event(&self, event: &DesignEvent) {
        let handles = self.inner.analytics();
        fan_out(
            &handles,
            "track_design_event",
            self.inner.config.dispatch_timeout,
            |a| async move { a.track_design_event(event).await },
        )
        .await;
    }

    pub async fn track_ad_event(&self, event: &AdEvent) {
        self.inner.track_ad_event(event).await
    }

    pub async fn track_ad_revenue(&self, revenue: &AdRevenueData) {
        self.inner.track_ad_revenue(revenue).await
    }

    /// Forwarded to attributions.
    pub async fn track_attribution_event(&self, name: &str, arguments: &EventArguments) {
        let handles = self.inner.attributions();
        fan_out(
            &handles,
            "track_event",
            self.inner.config.dispatch_timeout,
            |a| async move { a.track_event(name, arguments).await },
        )
        .await;
    }

    /// Forwarded to analytics providers supporting custom dimensions.
    pub async fn set_custom_dimension(&self, slot: CustomDimensionSlot, value: &str) {
        self.inner.set_custom_dimension(slot, value).await
    }
}

// ----------------------------------------------------------------------
// Background phases
// ----------------------------------------------------------------------

#[instrument(skip_all, name = "bridge.phase_a")]
async fn run_phase_a(
    inner: Arc<Inner>,
    mediators: Vec<ProviderHandle<dyn Mediator>>,
    attributions: Vec<ProviderHandle<dyn Attribution>>,
    analytics: Vec<ProviderHandle<dyn Analytics>>,
) {
    // Armed before any provider call; readiness never waits past the grace period.
    inner.gate.start_grace_period();
    let limit = inner.config.dispatch_timeout;

    let mediator_init = join_all(
        mediators
            .iter()
            .map(|handle| initialize_provider(&inner, handle.as_lifecycle(), None)),
    );

    let attribution_init = async {
        let experiment_id = timeout(limit, experiment_id(&inner))
            .await
            .unwrap_or_else(|_| {
                warn!("Experiment identifier lookup timed out");
                None
            });
        join_all(attributions.iter().map(|handle| {
            initialize_provider(&inner, handle.as_lifecycle(), experiment_id.clone())
        }))
        .await
    };

    let analytics_init = async {
        if timeout(limit, apply_experiment_dimensions(&inner))
            .await
            .is_err()
        {
            warn!("Experiment dimension lookup timed out");
        }
        join_all(
            analytics
                .iter()
                .map(|handle| initialize_provider(&inner, handle.as_lifecycle(), None)),
        )
        .await
    };

    futures::join!(mediator_init, attribution_init, analytics_init);
}

async fn initialize_provider(
    inner: &Inner,
    handle: ProviderHandle<dyn ProviderLifecycle>,
    experiment_id: Option<String>,
) {
    let reports_via_signal = handle.capabilities().initialization_callback;
    let signal = if reports_via_signal {
        let (signal, rx) = InitializationSignal::new(handle.name());
        inner
            .gate
            .attach_signal(handle.name().to_string(), handle.kind(), rx);
        signal
    } else {
        InitializationSignal::detached(handle.name())
    };

    let ctx = InitContext::new(signal).with_experiment_id(experiment_id);
    let provider = Arc::clone(handle.provider());
    let limit = inner.config.dispatch_timeout;

    match guarded(&handle, "initialize", limit, provider.initialize(ctx)).await {
        Ok(()) => {
            if !reports_via_signal {
                inner.gate.mark_completed(handle.name(), handle.kind());
            }
            if handle.kind() == ProviderKind::Mediator {
                guarded(&handle, "register_events", limit, provider.register_events())
                    .await
                    .ok();
            }
        }
        Err(failure) => {
            inner
                .bus
                .emit(BridgeEvent::Lifecycle(LifecycleEvent::ProviderFailed {
                    provider: handle.name().to_string(),
                    kind: handle.kind(),
                    message: failure.to_string(),
                }))
                .ok();
        }
    }
}

async fn experiment_id(inner: &Inner) -> Option<String> {
    let experiment = &inner.config.experiment;
    let scope = experiment.scope_id().await.unwrap_or_default();
    let variant = experiment.variant_id().await.unwrap_or_default();
    let id = format!("{scope}{variant}");
    (!id.is_empty()).then_some(id)
}

async fn apply_experiment_dimensions(inner: &Inner) {
    for (token, slot) in EXPERIMENT_DIMENSIONS {
        let Some(value) = inner.config.experiment.external_token(token).await else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        debug!(slot = slot.index(), "Applying experiment token as custom dimension");
        inner.set_custom_dimension(slot, &value).await;
    }
}

#[instrument(skip_all, name = "bridge.phase_b")]
async fn run_phase_b(inner: Arc<Inner>) {
    let config = match inner.config.remote_config.fetch().await {
        Ok(config) => config,
        Err(err) => {
            warn!(error = %err, "Remote configuration fetch failed; config-dependent initialization skipped");
            return;
        }
    };

    *lock_unpoisoned(&inner.remote_configuration) = Some(config.clone());

    let handles = inner.all();
    let config = &config;
    fan_out(
        &handles,
        "on_remote_configuration",
        inner.config.dispatch_timeout,
        |p| async move { p.on_remote_configuration(config).await },
    )
    .await;

    info!(providers = handles.len(), "Remote configuration applied");
    inner
        .bus
        .emit(BridgeEvent::Lifecycle(LifecycleEvent::RemoteConfigurationApplied))
        .ok();
}

async fn forward_events(inner: Weak<Inner>, mut events: Receiver<BridgeEvent>) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Event forwarding fell behind; events dropped");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        let Some(inner) = inner.upgrade() else {
            break;
        };

        match &event {
            BridgeEvent::Ad(ad) => inner.track_ad_event(ad).await,
            BridgeEvent::Revenue(revenue) => inner.track_ad_revenue(revenue).await,
            BridgeEvent::Lifecycle(_) => {}
        }
    }
}

async fn observe_lifecycle(inner: Weak<Inner>, observer: Arc<dyn LifecycleObserver>) {
    let mut changes = match observer.subscribe_changes().await {
        Ok(changes) => changes,
        Err(err) => {
            warn!(error = %err, "Lifecycle observer subscription failed");
            return;
        }
    };

    let mut paused = None;
    while let Some(state) = changes.next().await {
        let now_paused = state.is_paused();
        if paused == Some(now_paused) {
            continue;
        }
        paused = Some(now_paused);

        let Some(inner) = inner.upgrade() else {
            break;
        };
        debug!(?state, "Application lifecycle changed");
        inner.on_application_pause(now_paused).await;
    }
}
