//! # AppLovin MAX Mediator
//!
//! Implements the bridge `Mediator` trait for AppLovin MAX mediation.
//!
//! ## Overview
//!
//! This crate provides:
//! - The native SDK contract ([`MaxSdk`]) the host binds to the platform SDK
//! - Default ad unit resolution from the adapter configuration
//! - Per-format load state with deduplicated exponential backoff
//! - Reloads on reachability recovery
//! - Translation of SDK callbacks into canonical bridge events

pub mod error;
pub mod mediator;
pub mod placement;
pub mod retry;
pub mod sdk;
pub mod state;

pub use error::{MaxMediatorError, Result};
pub use mediator::{AppLovinMaxMediator, MaxMediatorBuilder, AD_PLATFORM, PROVIDER_NAME};
pub use placement::AdUnitDefaults;
pub use retry::RetryPolicy;
pub use sdk::{
    MaxAdInfo, MaxBannerPosition, MaxErrorInfo, MaxReward, MaxSdk, MaxSdkEvent,
    MaxSdkEventStream,
};
pub use state::LoadPhase;
