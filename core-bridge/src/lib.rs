//! # Core Bridge
//!
//! The provider orchestration layer of the ad bridge.
//!
//! ## Components
//!
//! - [`ProviderRegistry`]: mediators, attributions and analytics providers,
//!   one instance per concrete type
//! - [`InitializationGate`]: readiness once every provider reported in or the
//!   grace period elapsed
//! - [`Orchestrator`]: two-phase startup and fan-out dispatch with
//!   per-provider failure isolation
//!
//! Provider errors never propagate to callers: every bridge operation
//! returns after all providers were called, logging individual failures.

pub mod dispatch;
pub mod error;
pub mod gate;
pub mod orchestrator;
pub mod registry;

pub use error::{BridgeCoreError, Result};
pub use gate::{InitializationGate, InitializationStatus};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use registry::{ProviderHandle, ProviderRegistry, RegistrationOutcome};
