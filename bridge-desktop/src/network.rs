//! Network Monitoring Implementation

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus, NetworkType},
};
use core_async::time::{sleep, timeout, Duration};
use std::sync::Arc;
use tracing::debug;

/// Default endpoint probed for connectivity.
pub const DEFAULT_PROBE_ADDRESS: &str = "8.8.8.8:53";

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// One connectivity check.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    async fn probe(&self) -> NetworkStatus;
}

/// Opens a TCP connection to a well-known endpoint.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    address: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(address: impl Into<String>, timeout: Duration) -> Self {
        Self {
            address: address.into(),
            timeout,
        }
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDRESS, DEFAULT_PROBE_TIMEOUT)
    }
}

#[async_trait]
impl ConnectivityProbe for TcpProbe {
    async fn probe(&self) -> NetworkStatus {
        match timeout(self.timeout, tokio::net::TcpStream::connect(self.address.as_str())).await {
            Ok(Ok(_)) => NetworkStatus::Connected,
            Ok(Err(_)) | Err(_) => NetworkStatus::Disconnected,
        }
    }
}

/// Desktop network monitor implementation
///
/// Desktop platforms have no portable reachability callback, so the monitor
/// polls a [`ConnectivityProbe`] and reports status changes.
pub struct DesktopNetworkMonitor {
    probe: Arc<dyn ConnectivityProbe>,
    poll_interval: Duration,
}

impl DesktopNetworkMonitor {
    pub fn new() -> Self {
        Self::with_probe(Arc::new(TcpProbe::default()))
    }

    pub fn with_probe(probe: Arc<dyn ConnectivityProbe>) -> Self {
        Self {
            probe,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for DesktopNetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

fn network_info(status: NetworkStatus) -> NetworkInfo {
    NetworkInfo {
        status,
        // Desktop cannot tell Ethernet from WiFi without platform APIs
        network_type: (status == NetworkStatus::Connected).then_some(NetworkType::Other),
    }
}

#[async_trait]
impl NetworkMonitor for DesktopNetworkMonitor {
    async fn get_network_info(&self) -> Result<NetworkInfo> {
        let status = self.probe.probe().await;
        debug!(status = ?status, "Network info updated");
        Ok(network_info(status))
    }

    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>> {
        Ok(Box::new(DesktopNetworkChangeStream {
            probe: Arc::clone(&self.probe),
            poll_interval: self.poll_interval,
            last_status: None,
        }))
    }
}

/// Network change stream that polls for changes
struct DesktopNetworkChangeStream {
    probe: Arc<dyn ConnectivityProbe>,
    poll_interval: Duration,
    last_status: Option<NetworkStatus>,
}

#[async_trait]
impl NetworkChangeStream for DesktopNetworkChangeStream {
    async fn next(&mut self) -> Option<NetworkInfo> {
        loop {
            sleep(self.poll_interval).await;

            let status = self.probe.probe().await;
            if self.last_status != Some(status) {
                self.last_status = Some(status);
                return Some(network_info(status));
            }
        }
    }
}
