//! Configuration Collaborators
//!
//! The bridge consumes three kinds of externally supplied configuration:
//!
//! - [`ConfigurationSource`]: flat string settings bundled with the app
//!   (SDK keys, default ad-unit ids). Read by adapters during initialization.
//! - [`RemoteConfigSource`]: configuration fetched at runtime. Its arrival
//!   triggers the config-dependent initialization phase.
//! - [`ExperimentContext`]: A/B-testing scope, variant and external tokens.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Flat key/value adapter settings.
pub type Settings = HashMap<String, String>;

#[async_trait]
pub trait ConfigurationSource: Send + Sync {
    /// Load settings. `Ok(None)` means no configuration was bundled.
    async fn load(&self) -> Result<Option<Settings>>;
}

/// Settings held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConfigSource {
    settings: Option<Settings>,
}

impl InMemoryConfigSource {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Some(settings),
        }
    }

    /// A source with no bundled configuration.
    pub fn missing() -> Self {
        Self { settings: None }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[async_trait]
impl ConfigurationSource for InMemoryConfigSource {
    async fn load(&self) -> Result<Option<Settings>> {
        Ok(self.settings.clone())
    }
}

/// Remotely fetched configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteConfiguration {
    pub values: serde_json::Map<String, serde_json::Value>,
}

impl RemoteConfiguration {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[async_trait]
pub trait RemoteConfigSource: Send + Sync {
    async fn fetch(&self) -> Result<RemoteConfiguration>;
}

/// Remote configuration known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticRemoteConfig(pub RemoteConfiguration);

#[async_trait]
impl RemoteConfigSource for StaticRemoteConfig {
    async fn fetch(&self) -> Result<RemoteConfiguration> {
        Ok(self.0.clone())
    }
}

/// Experiment assignment of the current user.
#[async_trait]
pub trait ExperimentContext: Send + Sync {
    async fn scope_id(&self) -> Option<String>;

    async fn variant_id(&self) -> Option<String>;

    /// External token by index (`ExternalToken0`, `ExternalToken1`, ...).
    async fn external_token(&self, index: u8) -> Option<String>;
}

/// No experiment running.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExperiment;

#[async_trait]
impl ExperimentContext for NoExperiment {
    async fn scope_id(&self) -> Option<String> {
        None
    }

    async fn variant_id(&self) -> Option<String> {
        None
    }

    async fn external_token(&self, _index: u8) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BridgeError;
    use mockall::mock;

    mock! {
        Remote {}

        #[async_trait]
        impl RemoteConfigSource for Remote {
            async fn fetch(&self) -> Result<RemoteConfiguration>;
        }
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let source = InMemoryConfigSource::from_pairs([("s_sdk_key", "abc")]);
        let settings = source.load().await.unwrap().unwrap();
        assert_eq!(settings.get("s_sdk_key").map(String::as_str), Some("abc"));

        assert!(InMemoryConfigSource::missing().load().await.unwrap().is_none());
    }

    #[test]
    fn test_remote_configuration_accessors() {
        let config =
            RemoteConfiguration::from_json(r#"{"ads_enabled": true, "segment": "whales"}"#)
                .unwrap();

        assert_eq!(config.get_bool("ads_enabled"), Some(true));
        assert_eq!(config.get_str("segment"), Some("whales"));
        assert_eq!(config.get_str("ads_enabled"), None);
        assert!(RemoteConfiguration::default().is_empty());
    }

    #[tokio::test]
    async fn test_remote_source_through_trait_object() {
        let mut remote = MockRemote::new();
        remote
            .expect_fetch()
            .times(1)
            .returning(|| Err(BridgeError::OperationFailed("offline".to_string())));

        let source: Box<dyn RemoteConfigSource> = Box::new(remote);
        assert!(source.fetch().await.is_err());
    }

    #[tokio::test]
    async fn test_no_experiment() {
        assert!(NoExperiment.scope_id().await.is_none());
        assert!(NoExperiment.external_token(0).await.is_none());
    }
}
