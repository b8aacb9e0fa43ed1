use serde::{Deserialize, Serialize};

/// Listener-side playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// A producer-timestamp gap above this (ms) is treated as a stream start
    /// or stall and played without delay.
    pub stall_threshold_ms: i64,
    /// Delay applied to frames arriving in a continuous run, in ms.
    pub lookahead_ms: u64,
    /// Output volume in percent.
    pub volume: u8,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            stall_threshold_ms: 500,
            lookahead_ms: 50,
            volume: 80,
        }
    }
}
