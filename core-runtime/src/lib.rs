//! # Core Runtime Module
//!
//! Foundational runtime infrastructure shared by the bridge crates:
//! - Logging and tracing setup
//! - Bridge configuration
//! - Canonical event bus
//!
//! ## Overview
//!
//! The orchestrator and every mediator depend on this crate for their
//! logging conventions, their timing settings and the bus over which ad
//! events travel from mediators to tracking providers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{BridgeConfig, BridgeConfigBuilder};
pub use error::{Error, Result};
pub use events::{BridgeEvent, EventBus, EventStream, LifecycleEvent, ReadinessReason};
