//! Blink-rate estimation from an eye-aspect-ratio stream.
//!
//! For callers whose perception layer reports EAR but not blink rate.
//! A blink is counted when the eyes re-open after closing; the rate is
//! reported in blinks per minute over a rolling window.

use std::collections::VecDeque;

use attentrack_signal_model::sample::TimestampMs;

/// Eyes count as closed below this EAR.
pub const BLINK_CLOSE_EAR: f64 = 0.20;
/// Eyes count as open again at or above this EAR.
pub const BLINK_OPEN_EAR: f64 = 0.25;
/// Rolling window length.
pub const BLINK_WINDOW_MS: u64 = 60_000;

/// Rolling blink counter.
#[derive(Debug, Clone, Default)]
pub struct BlinkRateTracker {
    closed: bool,
    blinks: VecDeque<TimestampMs>,
}

impl BlinkRateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one EAR sample and return the current blink rate.
    ///
    /// Returns `true` in the second slot when this sample completed a blink.
    pub fn observe(&mut self, ear: f64, timestamp_ms: TimestampMs) -> (f64, bool) {
        let mut blinked = false;
        if ear.is_finite() {
            if !self.closed && ear < BLINK_CLOSE_EAR {
                self.closed = true;
            } else if self.closed && ear >= BLINK_OPEN_EAR {
                self.closed = false;
                self.blinks.push_back(timestamp_ms);
                blinked = true;
            }
        }
        self.evict(timestamp_ms);
        (self.rate(), blinked)
    }

    /// Blinks per minute over the rolling window.
    pub fn rate(&self) -> f64 {
        self.blinks.len() as f64 * 60_000.0 / BLINK_WINDOW_MS as f64
    }

    fn evict(&mut self, now_ms: TimestampMs) {
        let cutoff = now_ms.saturating_sub(BLINK_WINDOW_MS);
        while self.blinks.front().is_some_and(|&t| t < cutoff) {
            self.blinks.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blink(tracker: &mut BlinkRateTracker, t: TimestampMs) -> bool {
        tracker.observe(0.1, t);
        tracker.observe(0.3, t + 100).1
    }

    #[test]
    fn test_counts_closed_to_open_transitions() {
        let mut tracker = BlinkRateTracker::new();
        assert!(blink(&mut tracker, 0));
        assert!(blink(&mut tracker, 1_000));
        assert_eq!(tracker.rate(), 2.0);
    }

    #[test]
    fn test_partial_reopen_does_not_count() {
        let mut tracker = BlinkRateTracker::new();
        tracker.observe(0.1, 0);
        let (_, blinked) = tracker.observe(0.22, 100);
        assert!(!blinked);
        assert_eq!(tracker.rate(), 0.0);
    }

    #[test]
    fn test_old_blinks_leave_window() {
        let mut tracker = BlinkRateTracker::new();
        blink(&mut tracker, 0);
        blink(&mut tracker, 30_000);
        let (rate, _) = tracker.observe(0.3, 61_000);
        assert_eq!(rate, 1.0);
    }

    #[test]
    fn test_non_finite_ear_ignored() {
        let mut tracker = BlinkRateTracker::new();
        tracker.observe(0.1, 0);
        tracker.observe(f64::NAN, 50);
        assert!(tracker.observe(0.3, 100).1);
    }
}
