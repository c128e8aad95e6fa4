//! Time-related abstractions.
//!
//! Re-exports `tokio::time` so that tests can pause and advance the clock
//! (`tokio::time::pause`) and exercise grace periods and backoff delays
//! deterministically.

pub use tokio::time::{error::Elapsed, interval, sleep, sleep_until, timeout, Interval, Sleep};

pub use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub use tokio::time::Instant;

/// Returns `2^exponent` times `base`, saturating instead of overflowing.
pub fn exponential_delay(base: Duration, exponent: u32) -> Duration {
    let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
    base.saturating_mul(factor)
}
