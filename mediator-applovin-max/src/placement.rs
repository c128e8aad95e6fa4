//! Default ad unit resolution.
//!
//! The adapter configuration carries one default ad unit per format and
//! platform under `s_{platform}_default_{format}_ad_unit_id`. The running
//! platform's value wins; the other platform's value is the per-format
//! fallback.

use bridge_traits::{AdType, PlacementId, Platform, Settings};
use std::collections::HashMap;

/// Configuration key holding the SDK key.
pub const SDK_KEY: &str = "s_sdk_key";

/// Configuration key of a format's default ad unit on `platform`.
pub fn default_ad_unit_key(platform: Platform, format: AdType) -> String {
    format!(
        "s_{}_default_{}_ad_unit_id",
        platform.config_key(),
        format.as_str()
    )
}

/// Per-format default ad units for the running platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdUnitDefaults {
    units: HashMap<AdType, PlacementId>,
}

impl AdUnitDefaults {
    pub fn from_settings(settings: &Settings, platform: Platform) -> Self {
        let lookup = |platform: Platform, format: AdType| {
            settings
                .get(&default_ad_unit_key(platform, format))
                .and_then(|value| PlacementId::non_empty(value.as_str()))
        };

        let units = AdType::ALL
            .into_iter()
            .filter_map(|format| {
                lookup(platform, format)
                    .or_else(|| lookup(platform.counterpart(), format))
                    .map(|unit| (format, unit))
            })
            .collect();

        Self { units }
    }

    pub fn get(&self, format: AdType) -> Option<&PlacementId> {
        self.units.get(&format)
    }

    /// An explicit non-empty placement wins over the default.
    pub fn resolve(&self, format: AdType, explicit: Option<&PlacementId>) -> Option<PlacementId> {
        explicit
            .filter(|placement| !placement.is_empty())
            .or_else(|| self.get(format))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_key_format() {
        assert_eq!(
            default_ad_unit_key(Platform::Android, AdType::RewardedVideo),
            "s_android_default_rewarded_video_ad_unit_id"
        );
        assert_eq!(
            default_ad_unit_key(Platform::Ios, AdType::Banner),
            "s_ios_default_banner_ad_unit_id"
        );
    }

    #[test]
    fn test_same_platform_preferred() {
        let defaults = AdUnitDefaults::from_settings(
            &settings(&[
                ("s_android_default_interstitial_ad_unit_id", "and-inter"),
                ("s_ios_default_interstitial_ad_unit_id", "ios-inter"),
            ]),
            Platform::Ios,
        );

        assert_eq!(
            defaults.get(AdType::Interstitial).map(PlacementId::as_str),
            Some("ios-inter")
        );
        assert_eq!(defaults.len(), 1);
    }

    #[test]
    fn test_cross_platform_fallback_per_format() {
        let defaults = AdUnitDefaults::from_settings(
            &settings(&[
                ("s_android_default_banner_ad_unit_id", "and-banner"),
                ("s_ios_default_banner_ad_unit_id", ""),
                ("s_ios_default_rewarded_video_ad_unit_id", "ios-rv"),
            ]),
            Platform::Ios,
        );

        assert_eq!(
            defaults.get(AdType::Banner).map(PlacementId::as_str),
            Some("and-banner")
        );
        assert_eq!(
            defaults.get(AdType::RewardedVideo).map(PlacementId::as_str),
            Some("ios-rv")
        );
        assert!(defaults.get(AdType::Interstitial).is_none());
    }

    #[test]
    fn test_resolve() {
        let defaults = AdUnitDefaults::from_settings(
            &settings(&[("s_android_default_banner_ad_unit_id", "banner-default")]),
            Platform::Android,
        );

        let explicit = PlacementId::new("custom");
        assert_eq!(
            defaults.resolve(AdType::Banner, Some(&explicit)),
            Some(explicit.clone())
        );
        assert_eq!(
            defaults.resolve(AdType::Banner, Some(&PlacementId::new(""))),
            Some(PlacementId::new("banner-default"))
        );
        assert_eq!(
            defaults.resolve(AdType::Banner, None),
            Some(PlacementId::new("banner-default"))
        );
        assert_eq!(defaults.resolve(AdType::Interstitial, None), None);
        assert_eq!(
            defaults.resolve(AdType::Interstitial, Some(&explicit)),
            Some(explicit)
        );
    }
}
