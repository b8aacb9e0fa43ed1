//! Listener-side playback scheduling.
//!
//! Frames are played as soon as possible after a stream start or stall, and
//! with a small fixed lookahead while they arrive in a continuous run. The
//! relay's recommended `bufferTime` is not an input here.

use std::time::Instant;

use roomcast_config::PlaybackConfig;

/// A local playback clock, in seconds.
pub trait AudioClock: Send {
    fn current_time(&self) -> f64;
}

/// Monotonic clock that reads 0 at the moment it is started.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl AudioClock for MonotonicClock {
    fn current_time(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// One frame ready for output: converted, gain applied, with its start time
/// on the listener's audio clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledFrame {
    pub start_at: f64,
    /// Producer wall-clock timestamp, ms.
    pub timestamp: i64,
    pub samples: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    last_played_timestamp: Option<i64>,
    stall_threshold_ms: i64,
    lookahead: f64,
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::from_config(&PlaybackConfig::default())
    }
}

impl PlaybackScheduler {
    pub fn new(stall_threshold_ms: i64, lookahead_ms: u64) -> Self {
        Self {
            last_played_timestamp: None,
            stall_threshold_ms,
            lookahead: lookahead_ms as f64 / 1000.0,
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(config.stall_threshold_ms, config.lookahead_ms)
    }

    /// Pick the start time for a frame stamped `timestamp` given the clock
    /// position `now`. The frame becomes the last played one either way.
    pub fn schedule(&mut self, timestamp: i64, now: f64) -> f64 {
        let start_at = match self.last_played_timestamp {
            Some(last) if timestamp.saturating_sub(last) <= self.stall_threshold_ms => {
                now + self.lookahead
            }
            _ => now,
        };
        self.last_played_timestamp = Some(timestamp);
        start_at
    }

    pub fn last_played_timestamp(&self) -> Option<i64> {
        self.last_played_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn first_frame_plays_immediately() {
        let mut scheduler = PlaybackScheduler::default();
        assert_close(scheduler.schedule(10_000, 2.0), 2.0);
        assert_eq!(scheduler.last_played_timestamp(), Some(10_000));
    }

    #[test]
    fn continuous_run_gets_lookahead() {
        let mut scheduler = PlaybackScheduler::default();
        scheduler.schedule(10_000, 2.0);
        assert_close(scheduler.schedule(10_016, 2.016), 2.066);
        assert_close(scheduler.schedule(10_516, 2.5), 2.55);
    }

    #[test]
    fn gap_above_threshold_restarts() {
        let mut scheduler = PlaybackScheduler::default();
        scheduler.schedule(10_000, 2.0);
        assert_close(scheduler.schedule(10_501, 3.0), 3.0);
        assert_eq!(scheduler.last_played_timestamp(), Some(10_501));
    }

    #[test]
    fn out_of_order_frame_counts_as_continuous() {
        let mut scheduler = PlaybackScheduler::default();
        scheduler.schedule(10_000, 1.0);
        assert_close(scheduler.schedule(9_000, 1.0), 1.05);
        assert_eq!(scheduler.last_played_timestamp(), Some(9_000));
    }

    #[test]
    fn extreme_timestamps_do_not_overflow() {
        let mut scheduler = PlaybackScheduler::default();
        scheduler.schedule(i64::MAX, 0.0);
        assert_close(scheduler.schedule(i64::MIN, 1.0), 1.05);

        scheduler.schedule(i64::MIN, 2.0);
        assert_close(scheduler.schedule(i64::MAX, 3.0), 3.0);
        assert_eq!(scheduler.last_played_timestamp(), Some(i64::MAX));
    }

    #[test]
    fn custom_settings() {
        let mut scheduler = PlaybackScheduler::new(100, 20);
        scheduler.schedule(0, 0.0);
        assert_close(scheduler.schedule(100, 0.5), 0.52);
        assert_close(scheduler.schedule(201, 0.5), 0.5);
    }

    #[test]
    fn monotonic_clock_starts_near_zero() {
        let clock = MonotonicClock::start();
        let t0 = clock.current_time();
        assert!(t0 >= 0.0 && t0 < 1.0);
        assert!(clock.current_time() >= t0);
    }
}
