//! Roomcast configuration.
//!
//! TOML-based configuration shared by the relay server and the listener
//! client. Every section uses serde defaults so partial files work.
//!
//! ```rust,no_run
//! use roomcast_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("relay port {}", config.relay.port);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    ClientConfig, LogLevel, LoggingConfig, PlaybackConfig, RelayConfig, RoomcastConfig,
    RoomsConfig, SyncConfig,
};
pub use toml_loader::{load_default, load_from_path};

use roomcast_common::ConfigError;

/// Load config from the platform default path and validate it.
pub fn load_config() -> Result<RoomcastConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}
