//! Load retry scheduling.
//!
//! A failed load schedules exactly one reload per format after an
//! exponential backoff. Reachability coming back reloads every format
//! immediately and supersedes pending timers.

use bridge_traits::{AdType, NetworkStatus};
use core_async::time::{exponential_delay, Duration};
use core_runtime::config::{BridgeConfig, DEFAULT_RETRY_BASE_DELAY, DEFAULT_RETRY_MAX_EXPONENT};

use crate::state::AdFormatState;

/// Backoff parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub base_delay: Duration,
    pub max_exponent: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_delay: DEFAULT_RETRY_BASE_DELAY,
            max_exponent: DEFAULT_RETRY_MAX_EXPONENT,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            base_delay: config.retry_base_delay,
            max_exponent: config.retry_max_exponent,
        }
    }

    /// `base * 2^min(attempt, max_exponent)`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        exponential_delay(self.base_delay, attempt.min(self.max_exponent))
    }
}

/// What a fired retry timer should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    RecreateBanner,
    Load,
    Skip,
}

impl RetryAction {
    /// Banners are always recreated. Full-screen formats reload only when
    /// neither ready in the SDK nor already loading.
    pub fn decide(format: AdType, state: &AdFormatState, sdk_ready: bool) -> Self {
        match format {
            AdType::Banner => RetryAction::RecreateBanner,
            _ if sdk_ready || state.is_busy() => RetryAction::Skip,
            _ => RetryAction::Load,
        }
    }
}

/// Detects reachability recovery from successive status reports.
#[derive(Debug, Default)]
pub struct ReachabilityTracker {
    last: Option<NetworkStatus>,
}

impl ReachabilityTracker {
    pub fn new(initial: Option<NetworkStatus>) -> Self {
        Self { last: initial }
    }

    /// Records `status` and returns `true` on a `Disconnected → Connected`
    /// transition.
    pub fn observe(&mut self, status: NetworkStatus) -> bool {
        let restored = matches!(self.last, Some(NetworkStatus::Disconnected))
            && status == NetworkStatus::Connected;
        self.last = Some(status);
        restored
    }
}
