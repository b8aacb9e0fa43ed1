//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod client;
mod logging;
mod playback;
mod relay;
mod sync;

pub use client::*;
pub use logging::*;
pub use playback::*;
pub use relay::*;
pub use sync::*;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RoomcastConfig {
    pub relay: RelayConfig,
    pub rooms: RoomsConfig,
    pub sync: SyncConfig,
    pub playback: PlaybackConfig,
    pub client: ClientConfig,
    pub logging: LoggingConfig,
}
