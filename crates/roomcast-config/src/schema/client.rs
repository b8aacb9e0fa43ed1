use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings shared by the listener and host clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub connect_timeout_secs: u64,
    /// Failed connection attempts in a row before the listener gives up.
    pub reconnect_attempts: u32,
    /// First reconnect delay; doubles after each failure.
    pub reconnect_delay_ms: u64,
    pub max_reconnect_delay_ms: u64,
}

impl ClientConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn max_reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.max_reconnect_delay_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 20,
            reconnect_attempts: 5,
            reconnect_delay_ms: 1000,
            max_reconnect_delay_ms: 5000,
        }
    }
}
