use serde::{Deserialize, Serialize};

/// Time-sync estimator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Lower bound on the recommended buffer time, in ms.
    pub buffer_floor_ms: f64,
    /// Multiplier applied to the latency estimate.
    pub buffer_margin: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            buffer_floor_ms: 100.0,
            buffer_margin: 1.5,
        }
    }
}
