//! Full configuration validation.
//!
//! Each section is range-checked and all errors are collected into a single
//! `ConfigError`.

mod helpers;

#[cfg(test)]
mod tests;

use crate::schema::RoomcastConfig;
use roomcast_common::ConfigError;

use helpers::{validate_range, validate_range_f64};

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RoomcastConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_relay(&mut errors, config);
    validate_rooms(&mut errors, config);
    validate_sync(&mut errors, config);
    validate_playback(&mut errors, config);
    validate_client(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_relay(errors: &mut Vec<String>, config: &RoomcastConfig) {
    validate_range(errors, "relay.port", config.relay.port as u64, 1, 65535);
    validate_range(
        errors,
        "relay.outbound_queue_capacity",
        config.relay.outbound_queue_capacity as u64,
        1,
        65536,
    );
    if config.relay.bind.trim().is_empty() {
        errors.push("relay.bind must not be empty".into());
    }
}

fn validate_rooms(errors: &mut Vec<String>, config: &RoomcastConfig) {
    validate_range(
        errors,
        "rooms.code_length",
        config.rooms.code_length as u64,
        3,
        32,
    );
}

fn validate_sync(errors: &mut Vec<String>, config: &RoomcastConfig) {
    validate_range_f64(
        errors,
        "sync.buffer_floor_ms",
        config.sync.buffer_floor_ms,
        0.0,
        10_000.0,
    );
    validate_range_f64(
        errors,
        "sync.buffer_margin",
        config.sync.buffer_margin,
        1.0,
        10.0,
    );
}

fn validate_playback(errors: &mut Vec<String>, config: &RoomcastConfig) {
    if config.playback.stall_threshold_ms < 1 || config.playback.stall_threshold_ms > 60_000 {
        errors.push(format!(
            "playback.stall_threshold_ms = {} is out of range [1, 60000]",
            config.playback.stall_threshold_ms
        ));
    }
    validate_range(
        errors,
        "playback.lookahead_ms",
        config.playback.lookahead_ms,
        0,
        5000,
    );
    validate_range(
        errors,
        "playback.volume",
        config.playback.volume as u64,
        0,
        100,
    );
}

fn validate_client(errors: &mut Vec<String>, config: &RoomcastConfig) {
    let client = &config.client;
    validate_range(
        errors,
        "client.connect_timeout_secs",
        client.connect_timeout_secs,
        1,
        300,
    );
    validate_range(
        errors,
        "client.reconnect_attempts",
        client.reconnect_attempts as u64,
        0,
        100,
    );
    validate_range(
        errors,
        "client.reconnect_delay_ms",
        client.reconnect_delay_ms,
        1,
        60_000,
    );
    validate_range(
        errors,
        "client.max_reconnect_delay_ms",
        client.max_reconnect_delay_ms,
        1,
        300_000,
    );
    if client.max_reconnect_delay_ms < client.reconnect_delay_ms {
        errors.push("client.max_reconnect_delay_ms must be >= client.reconnect_delay_ms".into());
    }
}
