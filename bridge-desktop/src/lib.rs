//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge collaborator traits for desktop
//! platforms (macOS, Windows, Linux), used for development builds and tools
//! that run the bridge outside a mobile host.
//!
//! ## Overview
//!
//! - `ConfigurationSource` and `RemoteConfigSource` reading JSON files
//! - `NetworkMonitor` polling a TCP endpoint
//! - `LifecycleObserver` that always reports foreground
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopNetworkMonitor, JsonFileConfigSource, JsonFileRemoteConfig};
//! use core_runtime::config::BridgeConfig;
//! use std::sync::Arc;
//!
//! let config = BridgeConfig::builder()
//!     .remote_config(Arc::new(JsonFileRemoteConfig::new("remote.json")))
//!     .build()?;
//! let adapter_settings = Arc::new(JsonFileConfigSource::new("applovin_max.json"));
//! let network = Arc::new(DesktopNetworkMonitor::new());
//! ```

mod lifecycle;
mod network;
mod settings;

pub use lifecycle::DesktopLifecycleObserver;
pub use network::{ConnectivityProbe, DesktopNetworkMonitor, TcpProbe};
pub use settings::{JsonFileConfigSource, JsonFileRemoteConfig};
