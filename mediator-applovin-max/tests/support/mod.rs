#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::{
    AdType, BridgeError, Color, InMemoryConfigSource, NetworkChangeStream, NetworkInfo,
    NetworkMonitor, NetworkStatus,
};
use core_async::sync::mpsc;
use mediator_applovin_max::{MaxBannerPosition, MaxSdk, MaxSdkEvent, MaxSdkEventStream};
use std::collections::HashSet;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::fmt::MakeWriter;

pub const INTERSTITIAL_UNIT: &str = "inter-default";
pub const REWARDED_UNIT: &str = "rv-default";
pub const BANNER_UNIT: &str = "banner-default";

/// Adapter configuration with an SDK key and Android defaults.
pub fn configuration() -> InMemoryConfigSource {
    InMemoryConfigSource::from_pairs([
        ("s_sdk_key", "test-sdk-key"),
        ("s_android_default_interstitial_ad_unit_id", INTERSTITIAL_UNIT),
        ("s_android_default_rewarded_video_ad_unit_id", REWARDED_UNIT),
        ("s_android_default_banner_ad_unit_id", BANNER_UNIT),
    ])
}

/// Records every SDK command; callbacks are pushed by the test.
#[derive(Default)]
pub struct FakeSdk {
    calls: Mutex<Vec<String>>,
    initialized: AtomicBool,
    ready: Mutex<HashSet<String>>,
    events: Mutex<Option<mpsc::UnboundedSender<MaxSdkEvent>>>,
}

impl FakeSdk {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_ready(&self, ad_unit_id: &str, ready: bool) {
        let mut units = self.ready.lock().unwrap();
        if ready {
            units.insert(ad_unit_id.to_string());
        } else {
            units.remove(ad_unit_id);
        }
    }

    /// Delivers a callback to the subscribed mediator.
    pub fn emit(&self, event: MaxSdkEvent) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            tx.send(event).unwrap();
        }
    }

    /// Marks the SDK initialized and reports it.
    pub fn finish_initialization(&self) {
        self.initialized.store(true, Ordering::SeqCst);
        self.emit(MaxSdkEvent::SdkInitialized);
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

struct ChannelEvents(mpsc::UnboundedReceiver<MaxSdkEvent>);

#[async_trait]
impl MaxSdkEventStream for ChannelEvents {
    async fn next(&mut self) -> Option<MaxSdkEvent> {
        self.0.recv().await
    }
}

impl MaxSdk for FakeSdk {
    fn set_sdk_key(&self, sdk_key: &str) {
        self.record(format!("set_sdk_key:{sdk_key}"));
    }

    fn initialize_sdk(&self) {
        self.record("initialize_sdk".to_string());
    }

    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    fn set_verbose_logging(&self, enabled: bool) {
        self.record(format!("set_verbose_logging:{enabled}"));
    }

    fn load_interstitial(&self, ad_unit_id: &str) {
        self.record(format!("load_interstitial:{ad_unit_id}"));
    }

    fn is_interstitial_ready(&self, ad_unit_id: &str) -> bool {
        self.ready.lock().unwrap().contains(ad_unit_id)
    }

    fn show_interstitial(&self, ad_unit_id: &str) {
        self.record(format!("show_interstitial:{ad_unit_id}"));
    }

    fn load_rewarded_ad(&self, ad_unit_id: &str) {
        self.record(format!("load_rewarded_ad:{ad_unit_id}"));
    }

    fn is_rewarded_ad_ready(&self, ad_unit_id: &str) -> bool {
        self.ready.lock().unwrap().contains(ad_unit_id)
    }

    fn show_rewarded_ad(&self, ad_unit_id: &str) {
        self.record(format!("show_rewarded_ad:{ad_unit_id}"));
    }

    fn create_banner(&self, ad_unit_id: &str, position: MaxBannerPosition) {
        self.record(format!("create_banner:{ad_unit_id}:{position:?}"));
    }

    fn set_banner_extra_parameter(&self, ad_unit_id: &str, key: &str, value: &str) {
        self.record(format!("banner_extra:{ad_unit_id}:{key}={value}"));
    }

    fn set_banner_background_color(&self, ad_unit_id: &str, color: Color) {
        self.record(format!("banner_background:{ad_unit_id}:{}", color.to_hex()));
    }

    fn show_banner(&self, ad_unit_id: &str) {
        self.record(format!("show_banner:{ad_unit_id}"));
    }

    fn hide_banner(&self, ad_unit_id: &str) {
        self.record(format!("hide_banner:{ad_unit_id}"));
    }

    fn destroy_banner(&self, ad_unit_id: &str) {
        self.record(format!("destroy_banner:{ad_unit_id}"));
    }

    fn set_is_age_restricted_user(&self, restricted: bool) {
        self.record(format!("age_restricted:{restricted}"));
    }

    fn set_has_user_consent(&self, consent: bool) {
        self.record(format!("user_consent:{consent}"));
    }

    fn show_mediation_debugger(&self) {
        self.record("mediation_debugger".to_string());
    }

    fn subscribe_events(&self) -> Box<dyn MaxSdkEventStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap() = Some(tx);
        Box::new(ChannelEvents(rx))
    }
}

/// Reachability monitor driven by the test.
pub struct FakeNetwork {
    initial: NetworkStatus,
    rx: Mutex<Option<mpsc::UnboundedReceiver<NetworkInfo>>>,
}

impl FakeNetwork {
    pub fn new(initial: NetworkStatus) -> (Self, mpsc::UnboundedSender<NetworkInfo>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                initial,
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

struct ChannelNetwork(mpsc::UnboundedReceiver<NetworkInfo>);

#[async_trait]
impl NetworkChangeStream for ChannelNetwork {
    async fn next(&mut self) -> Option<NetworkInfo> {
        self.0.recv().await
    }
}

#[async_trait]
impl NetworkMonitor for FakeNetwork {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        Ok(NetworkInfo::new(self.initial))
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| BridgeError::NotAvailable("already subscribed".to_string()))?;
        Ok(Box::new(ChannelNetwork(rx)))
    }
}

pub fn load_call(format: AdType) -> String {
    match format {
        AdType::Interstitial => format!("load_interstitial:{INTERSTITIAL_UNIT}"),
        AdType::RewardedVideo => format!("load_rewarded_ad:{REWARDED_UNIT}"),
        AdType::Banner => format!("create_banner:{BANNER_UNIT}:BottomCenter"),
    }
}

pub async fn settle() {
    core_async::time::sleep(Duration::from_millis(1)).await;
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
