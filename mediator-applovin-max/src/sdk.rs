//! AppLovin MAX SDK Contract
//!
//! The native SDK is reached through [`MaxSdk`]. Commands are synchronous
//! fire-and-forget calls; everything the SDK reports back arrives as a
//! [`MaxSdkEvent`] on the stream returned by [`MaxSdk::subscribe_events`].

use async_trait::async_trait;
use bridge_traits::{AdType, Color};

/// Native banner anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxBannerPosition {
    TopCenter,
    BottomCenter,
}

/// Impression details attached to revenue callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct MaxAdInfo {
    pub ad_unit_id: String,
    pub network_name: String,
    pub placement: Option<String>,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxErrorInfo {
    pub code: String,
    pub message: String,
}

impl MaxErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaxReward {
    pub label: String,
    pub amount: f64,
}

/// Callbacks delivered by the SDK.
#[derive(Debug, Clone, PartialEq)]
pub enum MaxSdkEvent {
    SdkInitialized,
    AdLoaded {
        format: AdType,
        ad_unit_id: String,
    },
    AdLoadFailed {
        format: AdType,
        ad_unit_id: String,
        error: MaxErrorInfo,
    },
    AdDisplayed {
        format: AdType,
        ad_unit_id: String,
    },
    AdDisplayFailed {
        format: AdType,
        ad_unit_id: String,
        error: MaxErrorInfo,
    },
    AdClicked {
        format: AdType,
        ad_unit_id: String,
    },
    AdHidden {
        format: AdType,
        ad_unit_id: String,
    },
    RewardReceived {
        ad_unit_id: String,
        reward: MaxReward,
    },
    AdRevenuePaid {
        format: AdType,
        info: MaxAdInfo,
    },
}

/// Stream of SDK callbacks.
#[async_trait]
pub trait MaxSdkEventStream: Send {
    /// Returns `None` once the SDK stops reporting.
    async fn next(&mut self) -> Option<MaxSdkEvent>;
}

/// Native AppLovin MAX SDK surface used by the mediator.
pub trait MaxSdk: Send + Sync {
    fn set_sdk_key(&self, sdk_key: &str);
    fn initialize_sdk(&self);
    fn is_initialized(&self) -> bool;
    fn set_verbose_logging(&self, enabled: bool);

    fn load_interstitial(&self, ad_unit_id: &str);
    fn is_interstitial_ready(&self, ad_unit_id: &str) -> bool;
    fn show_interstitial(&self, ad_unit_id: &str);

    fn load_rewarded_ad(&self, ad_unit_id: &str);
    fn is_rewarded_ad_ready(&self, ad_unit_id: &str) -> bool;
    fn show_rewarded_ad(&self, ad_unit_id: &str);

    fn create_banner(&self, ad_unit_id: &str, position: MaxBannerPosition);
    fn set_banner_extra_parameter(&self, ad_unit_id: &str, key: &str, value: &str);
    fn set_banner_background_color(&self, ad_unit_id: &str, color: Color);
    fn show_banner(&self, ad_unit_id: &str);
    fn hide_banner(&self, ad_unit_id: &str);
    fn destroy_banner(&self, ad_unit_id: &str);

    fn set_is_age_restricted_user(&self, restricted: bool);
    fn set_has_user_consent(&self, consent: bool);
    fn show_mediation_debugger(&self);

    /// Subscribes to SDK callbacks. Called once per mediator initialization.
    fn subscribe_events(&self) -> Box<dyn MaxSdkEventStream>;
}
