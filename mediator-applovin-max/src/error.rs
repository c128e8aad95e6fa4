//! Error types for the AppLovin MAX mediator

use bridge_traits::error::BridgeError;
use bridge_traits::AdType;
use thiserror::Error;

/// AppLovin MAX mediator errors
#[derive(Error, Debug)]
pub enum MaxMediatorError {
    /// The adapter configuration could not be found
    #[error("Could not find configuration data for AppLovin MAX")]
    ConfigurationMissing,

    /// The configuration has no SDK key
    #[error("Could not find sdk_key for AppLovin MAX")]
    SdkKeyMissing,

    /// The SDK has not finished initializing
    #[error("AppLovin MAX SDK not initialized")]
    NotInitialized,

    /// No explicit placement and no default ad unit for the format
    #[error("No ad unit id configured for {0}")]
    AdUnitMissing(AdType),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for mediator operations
pub type Result<T> = std::result::Result<T, MaxMediatorError>;

impl MaxMediatorError {
    /// Whether the adapter should stay silently uninitialized instead of
    /// reporting a provider failure.
    pub fn is_configuration_gap(&self) -> bool {
        matches!(
            self,
            MaxMediatorError::ConfigurationMissing | MaxMediatorError::SdkKeyMissing
        )
    }
}

impl From<MaxMediatorError> for BridgeError {
    fn from(error: MaxMediatorError) -> Self {
        match error {
            MaxMediatorError::ConfigurationMissing | MaxMediatorError::SdkKeyMissing => {
                BridgeError::ConfigurationMissing(error.to_string())
            }
            MaxMediatorError::NotInitialized => BridgeError::NotInitialized(error.to_string()),
            MaxMediatorError::AdUnitMissing(_) => BridgeError::NotAvailable(error.to_string()),
            MaxMediatorError::BridgeError(inner) => inner,
        }
    }
}
