//! Canonical Ad Vocabulary
//!
//! Normalized ad formats, events and revenue records shared by every
//! mediator and tracking provider.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Network name used for events emitted by the bridge itself rather than by
/// a concrete mediation network.
pub const DEFAULT_AD_NETWORK: &str = "adbridge.default";

/// Ad format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    Banner,
    Interstitial,
    RewardedVideo,
}

impl AdType {
    pub const ALL: [AdType; 3] = [AdType::Banner, AdType::Interstitial, AdType::RewardedVideo];

    /// Key fragment used in configuration keys.
    pub const fn as_str(self) -> &'static str {
        match self {
            AdType::Banner => "banner",
            AdType::Interstitial => "interstitial",
            AdType::RewardedVideo => "rewarded_video",
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to an ad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdAction {
    Request,
    Loaded,
    Show,
    Click,
    Close,
    Reward,
    Fail,
}

/// Opaque ad-unit / placement identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(String);

impl PlacementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns `None` for empty or whitespace-only ids.
    pub fn non_empty(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PlacementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Reward granted after a rewarded video completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoAdReward {
    pub label: String,
    pub amount: f64,
}

/// Optional detail attached to an [`AdEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdEventPayload {
    Reward(VideoAdReward),
    Error { code: String, message: String },
}

/// Canonical ad event consumed by analytics providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdEvent {
    pub action: AdAction,
    pub ad_type: AdType,
    pub network: String,
    pub placement_id: Option<PlacementId>,
    pub payload: Option<AdEventPayload>,
}

impl AdEvent {
    pub fn new(action: AdAction, ad_type: AdType, network: impl Into<String>) -> Self {
        Self {
            action,
            ad_type,
            network: network.into(),
            placement_id: None,
            payload: None,
        }
    }

    pub fn with_placement(mut self, placement_id: Option<PlacementId>) -> Self {
        self.placement_id = placement_id;
        self
    }

    pub fn with_reward(mut self, label: impl Into<String>, amount: f64) -> Self {
        self.payload = Some(AdEventPayload::Reward(VideoAdReward {
            label: label.into(),
            amount,
        }));
        self
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.payload = Some(AdEventPayload::Error {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    /// Error code carried by a `Fail` event, if any.
    pub fn error_code(&self) -> Option<&str> {
        match &self.payload {
            Some(AdEventPayload::Error { code, .. }) => Some(code),
            _ => None,
        }
    }
}

/// Impression-level revenue reported by a mediation network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRevenueData {
    pub ad_platform: String,
    pub currency: String,
    pub revenue: f64,
    pub ad_unit_id: String,
    pub network_name: String,
    pub placement: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BannerSize {
    #[default]
    Standard,
    Large,
    MediumRectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BannerPosition {
    Top,
    #[default]
    Bottom,
}

/// RGBA colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    /// Sentinel meaning "no banner background".
    pub const CLEAR: Color = Color::rgba(1.0, 1.0, 1.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// `#RRGGBBAA` representation.
    pub fn to_hex(self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            channel(self.r),
            channel(self.g),
            channel(self.b),
            channel(self.a)
        )
    }
}

/// Parameters for [`Mediator::load_banner`](crate::provider::Mediator::load_banner).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BannerRequest {
    pub size: BannerSize,
    pub position: BannerPosition,
    pub placement: Option<PlacementId>,
    pub background: Option<Color>,
}

impl BannerRequest {
    pub fn new(size: BannerSize, position: BannerPosition) -> Self {
        Self {
            size,
            position,
            ..Default::default()
        }
    }

    pub fn with_placement(mut self, placement: Option<PlacementId>) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }
}
