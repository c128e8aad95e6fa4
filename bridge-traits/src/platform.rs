//! Target platform identification.
//!
//! Mediation networks issue separate ad units per mobile platform, so
//! configuration keys and default placements are looked up per platform.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Platform the bridge is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    /// Desktop and test hosts.
    Other,
}

impl Platform {
    /// Platform of the current compilation target.
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Other
        }
    }

    /// Key fragment used in configuration keys (`s_android_...`, `s_ios_...`).
    ///
    /// `Other` reads the Android keys.
    pub const fn config_key(self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android | Platform::Other => "android",
        }
    }

    /// The other mobile platform, used as a fallback source of defaults.
    pub const fn counterpart(self) -> Self {
        match self {
            Platform::Ios => Platform::Android,
            Platform::Android | Platform::Other => Platform::Ios,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "android"),
            Platform::Ios => write!(f, "ios"),
            Platform::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_key_and_counterpart() {
        assert_eq!(Platform::Ios.config_key(), "ios");
        assert_eq!(Platform::Android.config_key(), "android");
        assert_eq!(Platform::Other.config_key(), "android");
        assert_eq!(Platform::Ios.counterpart(), Platform::Android);
        assert_eq!(Platform::Other.counterpart(), Platform::Ios);
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&Platform::Ios).unwrap();
        assert_eq!(json, "\"ios\"");
    }
}
