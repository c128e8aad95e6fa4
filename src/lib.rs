//! Workspace placeholder crate.
//!
//! Exposes feature flags that map to the individual workspace crates so a host
//! application can depend on `adbridge-workspace` and pick the bridge, the
//! AppLovin MAX mediator and the desktop collaborators without wiring each
//! crate by hand.

#[cfg(feature = "bridge")]
pub use core_bridge;

#[cfg(feature = "applovin-max")]
pub use mediator_applovin_max;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;
