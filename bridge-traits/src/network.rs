//! Network Reachability Abstraction
//!
//! Mediators reload their ad formats when connectivity comes back, so they
//! subscribe to reachability changes through [`NetworkMonitor`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Network connection type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkType {
    Cellular,
    WiFi,
    Ethernet,
    Other,
}

/// Network connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkStatus {
    Connected,
    Disconnected,
    /// Connection status unknown or indeterminate
    Indeterminate,
}

impl NetworkStatus {
    pub fn is_reachable(self) -> bool {
        matches!(self, NetworkStatus::Connected)
    }
}

/// Network information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
    pub network_type: Option<NetworkType>,
}

impl NetworkInfo {
    pub fn new(status: NetworkStatus) -> Self {
        Self {
            status,
            network_type: None,
        }
    }
}

/// Network monitor trait
///
/// # Platform Support
///
/// - **iOS**: Network framework, Reachability
/// - **Android**: ConnectivityManager
/// - **Desktop**: periodic TCP probe (see `bridge-desktop`)
#[async_trait]
pub trait NetworkMonitor: Send + Sync {
    /// Get current network information
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        matches!(
            self.get_network_info().await,
            Ok(NetworkInfo {
                status: NetworkStatus::Connected,
                ..
            })
        )
    }

    /// Subscribe to network status changes
    ///
    /// Implementations should emit an event whenever the status changes.
    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>>;
}

/// Stream of network status changes
#[async_trait]
pub trait NetworkChangeStream: Send {
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<NetworkInfo>;
}
