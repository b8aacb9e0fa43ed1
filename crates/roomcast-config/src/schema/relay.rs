use serde::{Deserialize, Serialize};

/// Relay server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Interface to bind the WebSocket listener on.
    pub bind: String,
    pub port: u16,
    /// Messages buffered per connection before the oldest audio frame is dropped.
    pub outbound_queue_capacity: usize,
}

impl RelayConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 3000,
            outbound_queue_capacity: 256,
        }
    }
}

/// Room code settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    /// Length of generated room codes.
    pub code_length: usize,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self { code_length: 6 }
    }
}
