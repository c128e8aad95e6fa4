//! # Bridge Configuration Module
//!
//! Provides configuration management for the ad bridge.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `BridgeConfig` holding the collaborators and timing settings the
//! orchestrator and mediators need. Validation is fail-fast: a missing
//! required collaborator or an out-of-range setting is reported when the
//! configuration is built, not when the bridge first uses it.
//!
//! ## Required Dependencies
//!
//! - `RemoteConfigSource` - Fetch that gates the config-dependent phase
//!
//! ## Optional Dependencies
//!
//! - `ExperimentContext` - A/B test assignment (defaults to no experiment)
//! - `LifecycleObserver` - Drives provider pause/resume
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_traits::{RemoteConfiguration, StaticRemoteConfig};
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let config = BridgeConfig::builder()
//!     .remote_config(Arc::new(StaticRemoteConfig(RemoteConfiguration::default())))
//!     .grace_period(Duration::from_secs(5))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    ExperimentContext, LifecycleObserver, NoExperiment, Platform, RemoteConfigSource,
};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_MAX_EXPONENT: u32 = 6;

/// Exponents above this would overflow any sane delay.
const MAX_RETRY_EXPONENT: u32 = 16;

/// Runtime configuration for the bridge.
///
/// Use [`BridgeConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct BridgeConfig {
    /// Time after which the bridge reports ready even if some providers never
    /// signalled.
    pub grace_period: Duration,

    /// Upper bound for a single provider call during fan-out.
    pub dispatch_timeout: Duration,

    /// Platform used to pick ad-unit defaults.
    pub platform: Platform,

    /// Capacity of the canonical event bus.
    pub event_buffer_size: usize,

    /// Delay unit of the load retry backoff.
    pub retry_base_delay: Duration,

    /// Cap on the backoff exponent.
    pub retry_max_exponent: u32,

    pub remote_config: Arc<dyn RemoteConfigSource>,

    pub experiment: Arc<dyn ExperimentContext>,

    pub lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
}

impl std::fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("grace_period", &self.grace_period)
            .field("dispatch_timeout", &self.dispatch_timeout)
            .field("platform", &self.platform)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("retry_base_delay", &self.retry_base_delay)
            .field("retry_max_exponent", &self.retry_max_exponent)
            .field("remote_config", &"RemoteConfigSource { ... }")
            .field("experiment", &"ExperimentContext { ... }")
            .field(
                "lifecycle_observer",
                &self
                    .lifecycle_observer
                    .as_ref()
                    .map(|_| "LifecycleObserver { ... }"),
            )
            .finish()
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Grace period and dispatch timeout are non-zero
    /// - Event buffer can hold at least one event
    /// - Retry base delay is non-zero and the exponent is bounded
    pub fn validate(&self) -> Result<()> {
        if self.grace_period.is_zero() {
            return Err(Error::Config(
                "Grace period must be greater than zero".to_string(),
            ));
        }

        if self.dispatch_timeout.is_zero() {
            return Err(Error::Config(
                "Dispatch timeout must be greater than zero".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than zero".to_string(),
            ));
        }

        if self.retry_base_delay.is_zero() {
            return Err(Error::Config(
                "Retry base delay must be greater than zero".to_string(),
            ));
        }

        if self.retry_max_exponent > MAX_RETRY_EXPONENT {
            return Err(Error::Config(format!(
                "Retry max exponent {} exceeds maximum of {}",
                self.retry_max_exponent, MAX_RETRY_EXPONENT
            )));
        }

        Ok(())
    }
}

fn remote_config_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "RemoteConfigSource".to_string(),
        message: "A RemoteConfigSource is required to run the config-dependent \
                  initialization phase. Inject StaticRemoteConfig when the host \
                  has no remote configuration."
            .to_string(),
    }
}

/// Builder for [`BridgeConfig`].
#[derive(Default)]
pub struct BridgeConfigBuilder {
    grace_period: Option<Duration>,
    dispatch_timeout: Option<Duration>,
    platform: Option<Platform>,
    event_buffer_size: Option<usize>,
    retry_base_delay: Option<Duration>,
    retry_max_exponent: Option<u32>,
    remote_config: Option<Arc<dyn RemoteConfigSource>>,
    experiment: Option<Arc<dyn ExperimentContext>>,
    lifecycle_observer: Option<Arc<dyn LifecycleObserver>>,
}

impl BridgeConfigBuilder {
    /// Sets the readiness grace period (default 10s).
    pub fn grace_period(mut self, period: Duration) -> Self {
        self.grace_period = Some(period);
        self
    }

    /// Sets the per-provider dispatch timeout (default 5s).
    pub fn dispatch_timeout(mut self, timeout: Duration) -> Self {
        self.dispatch_timeout = Some(timeout);
        self
    }

    /// Overrides the detected platform.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = Some(delay);
        self
    }

    pub fn retry_max_exponent(mut self, exponent: u32) -> Self {
        self.retry_max_exponent = Some(exponent);
        self
    }

    /// Sets the remote configuration source (required).
    pub fn remote_config(mut self, source: Arc<dyn RemoteConfigSource>) -> Self {
        self.remote_config = Some(source);
        self
    }

    pub fn experiment(mut self, experiment: Arc<dyn ExperimentContext>) -> Self {
        self.experiment = Some(experiment);
        self
    }

    pub fn lifecycle_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle_observer = Some(observer);
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<BridgeConfig> {
        let remote_config = self.remote_config.ok_or_else(remote_config_missing_error)?;

        let config = BridgeConfig {
            grace_period: self.grace_period.unwrap_or(DEFAULT_GRACE_PERIOD),
            dispatch_timeout: self.dispatch_timeout.unwrap_or(DEFAULT_DISPATCH_TIMEOUT),
            platform: self.platform.unwrap_or_else(Platform::current),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            retry_base_delay: self.retry_base_delay.unwrap_or(DEFAULT_RETRY_BASE_DELAY),
            retry_max_exponent: self
                .retry_max_exponent
                .unwrap_or(DEFAULT_RETRY_MAX_EXPONENT),
            remote_config,
            experiment: self
                .experiment
                .unwrap_or_else(|| Arc::new(NoExperiment)),
            lifecycle_observer: self.lifecycle_observer,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{RemoteConfiguration, StaticRemoteConfig};

    fn remote() -> Arc<dyn RemoteConfigSource> {
        Arc::new(StaticRemoteConfig(RemoteConfiguration::default()))
    }

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::builder().remote_config(remote()).build().unwrap();

        assert_eq!(config.grace_period, Duration::from_secs(10));
        assert_eq!(config.dispatch_timeout, Duration::from_secs(5));
        assert_eq!(config.event_buffer_size, 100);
        assert_eq!(config.retry_base_delay, Duration::from_secs(1));
        assert_eq!(config.retry_max_exponent, 6);
        assert_eq!(config.platform, Platform::current());
        assert!(config.lifecycle_observer.is_none());
    }

    #[test]
    fn test_missing_remote_config() {
        let result = BridgeConfig::builder().build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "RemoteConfigSource");
            }
            other => panic!("expected CapabilityMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides() {
        let config = BridgeConfig::builder()
            .remote_config(remote())
            .grace_period(Duration::from_secs(3))
            .dispatch_timeout(Duration::from_millis(250))
            .platform(Platform::Ios)
            .event_buffer_size(16)
            .retry_base_delay(Duration::from_millis(500))
            .retry_max_exponent(4)
            .build()
            .unwrap();

        assert_eq!(config.grace_period, Duration::from_secs(3));
        assert_eq!(config.platform, Platform::Ios);
        assert_eq!(config.event_buffer_size, 16);
        assert_eq!(config.retry_max_exponent, 4);
        assert!(format!("{config:?}").contains("RemoteConfigSource { ... }"));
    }

    #[test]
    fn test_validation_errors() {
        let zero_grace = BridgeConfig::builder()
            .remote_config(remote())
            .grace_period(Duration::ZERO)
            .build();
        assert!(matches!(zero_grace, Err(Error::Config(_))));

        let zero_buffer = BridgeConfig::builder()
            .remote_config(remote())
            .event_buffer_size(0)
            .build();
        assert!(matches!(zero_buffer, Err(Error::Config(_))));

        let huge_exponent = BridgeConfig::builder()
            .remote_config(remote())
            .retry_max_exponent(40)
            .build();
        assert!(matches!(huge_exponent, Err(Error::Config(msg)) if msg.contains("exponent")));

        let zero_delay = BridgeConfig::builder()
            .remote_config(remote())
            .retry_base_delay(Duration::ZERO)
            .build();
        assert!(matches!(zero_delay, Err(Error::Config(_))));
    }
}
