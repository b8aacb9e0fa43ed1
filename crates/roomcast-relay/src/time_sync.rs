//! Single-probe latency and buffer-time estimation.
//!
//! The probe carries only the listener's send time, so the gap between that
//! and the relay's receive time is taken as a full round trip and halved.
//! Under clock skew the estimate is wrong and may be negative; the buffer
//! floor keeps the recommendation usable anyway.

use roomcast_common::TimeSyncResult;
use roomcast_config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSyncEstimator {
    pub buffer_floor_ms: f64,
    pub buffer_margin: f64,
}

impl Default for TimeSyncEstimator {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl TimeSyncEstimator {
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            buffer_floor_ms: config.buffer_floor_ms,
            buffer_margin: config.buffer_margin,
        }
    }

    /// Stateless: no history is kept between probes.
    pub fn estimate(&self, client_time: i64, now: i64) -> TimeSyncResult {
        // Wire timestamps are untrusted; subtract in f64 so no pair overflows.
        let latency = (now as f64 - client_time as f64) / 2.0;
        TimeSyncResult {
            client_time,
            server_time: now,
            latency,
            buffer_time: self.buffer_time(latency),
        }
    }

    pub fn buffer_time(&self, latency: f64) -> f64 {
        self.buffer_floor_ms.max(latency * self.buffer_margin)
    }
}
