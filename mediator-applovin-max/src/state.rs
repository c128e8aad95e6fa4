//! Per-format load state.

use bridge_traits::AdType;
use core_async::task::AbortHandle;
use core_async::time::Instant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadPhase {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Showing,
}

/// A scheduled reload. The generation lets a timer that fires after being
/// superseded recognise that it is stale.
#[derive(Debug)]
pub struct PendingRetry {
    pub generation: u64,
    pub due: Instant,
    abort: AbortHandle,
}

impl PendingRetry {
    pub fn new(generation: u64, due: Instant, abort: AbortHandle) -> Self {
        Self {
            generation,
            due,
            abort,
        }
    }

    fn cancel(self) {
        self.abort.abort();
    }
}

/// Load state of one ad format.
#[derive(Debug, Default)]
pub struct AdFormatState {
    pub phase: LoadPhase,
    pub retry_attempt: u32,
    pending_retry: Option<PendingRetry>,
    generation: u64,
}

impl AdFormatState {
    pub fn mark_loading(&mut self) {
        self.phase = LoadPhase::Loading;
    }

    /// Successful load: counter back to zero, pending retry dropped.
    pub fn mark_loaded(&mut self) {
        self.phase = LoadPhase::Loaded;
        self.retry_attempt = 0;
        self.cancel_retry();
    }

    pub fn mark_unloaded(&mut self) {
        self.phase = LoadPhase::Unloaded;
    }

    pub fn mark_showing(&mut self) {
        self.phase = LoadPhase::Showing;
    }

    /// Back to `Unloaded` with no retry pending. The counter is kept.
    pub fn reset(&mut self) {
        self.phase = LoadPhase::Unloaded;
        self.cancel_retry();
    }

    /// Already loading or holding a loaded ad.
    pub fn is_busy(&self) -> bool {
        matches!(self.phase, LoadPhase::Loading | LoadPhase::Loaded)
    }

    pub fn pending_retry(&self) -> Option<&PendingRetry> {
        self.pending_retry.as_ref()
    }

    /// Claims the retry slot. Returns the generation and the attempt number
    /// to compute the delay from, or `None` if a retry is already pending.
    pub fn reserve_retry(&mut self) -> Option<(u64, u32)> {
        if self.pending_retry.is_some() {
            return None;
        }
        self.retry_attempt = self.retry_attempt.saturating_add(1);
        self.generation = self.generation.wrapping_add(1);
        Some((self.generation, self.retry_attempt))
    }

    pub fn arm_retry(&mut self, retry: PendingRetry) {
        if let Some(previous) = self.pending_retry.replace(retry) {
            previous.cancel();
        }
    }

    /// Clears the pending retry if `generation` is still the current one.
    pub fn take_fired_retry(&mut self, generation: u64) -> bool {
        match &self.pending_retry {
            Some(pending) if pending.generation == generation => {
                self.pending_retry = None;
                true
            }
            _ => false,
        }
    }

    /// Aborts the pending retry, if any.
    pub fn cancel_retry(&mut self) -> bool {
        match self.pending_retry.take() {
            Some(pending) => {
                pending.cancel();
                true
            }
            None => false,
        }
    }
}

/// State of all three formats.
#[derive(Debug, Default)]
pub struct FormatStates {
    banner: AdFormatState,
    interstitial: AdFormatState,
    rewarded_video: AdFormatState,
}

impl FormatStates {
    pub fn get(&self, format: AdType) -> &AdFormatState {
        match format {
            AdType::Banner => &self.banner,
            AdType::Interstitial => &self.interstitial,
            AdType::RewardedVideo => &self.rewarded_video,
        }
    }

    pub fn get_mut(&mut self, format: AdType) -> &mut AdFormatState {
        match format {
            AdType::Banner => &mut self.banner,
            AdType::Interstitial => &mut self.interstitial,
            AdType::RewardedVideo => &mut self.rewarded_video,
        }
    }

    pub fn cancel_all(&mut self) {
        for format in AdType::ALL {
            self.get_mut(format).cancel_retry();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_abort_handle() -> AbortHandle {
        core_async::task::spawn(std::future::pending::<()>()).abort_handle()
    }

    #[tokio::test]
    async fn test_reserve_dedups_while_pending() {
        let mut state = AdFormatState::default();

        let (generation, attempt) = state.reserve_retry().unwrap();
        assert_eq!(attempt, 1);
        state.arm_retry(PendingRetry::new(generation, Instant::now(), idle_abort_handle()));

        assert!(state.reserve_retry().is_none());
        assert_eq!(state.retry_attempt, 1);
    }

    #[tokio::test]
    async fn test_stale_generation_is_ignored() {
        let mut state = AdFormatState::default();
        let (first, _) = state.reserve_retry().unwrap();
        state.arm_retry(PendingRetry::new(first, Instant::now(), idle_abort_handle()));
        state.cancel_retry();

        let (second, attempt) = state.reserve_retry().unwrap();
        assert_eq!(attempt, 2);
        state.arm_retry(PendingRetry::new(second, Instant::now(), idle_abort_handle()));

        assert!(!state.take_fired_retry(first));
        assert!(state.pending_retry().is_some());
        assert!(state.take_fired_retry(second));
        assert!(state.pending_retry().is_none());
    }

    #[tokio::test]
    async fn test_loaded_resets_counter_and_cancels() {
        let mut state = AdFormatState::default();
        let (generation, _) = state.reserve_retry().unwrap();
        state.arm_retry(PendingRetry::new(generation, Instant::now(), idle_abort_handle()));
        state.mark_loading();

        state.mark_loaded();

        assert_eq!(state.phase, LoadPhase::Loaded);
        assert_eq!(state.retry_attempt, 0);
        assert!(state.pending_retry().is_none());
        assert!(state.is_busy());
    }

    #[test]
    fn test_counter_saturates() {
        let mut state = AdFormatState {
            retry_attempt: u32::MAX,
            ..Default::default()
        };
        let (_, attempt) = state.reserve_retry().unwrap();
        assert_eq!(attempt, u32::MAX);
    }

    #[test]
    fn test_format_lookup() {
        let mut states = FormatStates::default();
        states.get_mut(AdType::Interstitial).mark_loading();

        assert_eq!(states.get(AdType::Interstitial).phase, LoadPhase::Loading);
        assert_eq!(states.get(AdType::Banner).phase, LoadPhase::Unloaded);
    }
}
