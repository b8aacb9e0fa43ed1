//! Tests for the full validation pipeline.

use super::*;

#[test]
fn default_config_validates() {
    assert!(validate(&RoomcastConfig::default()).is_ok());
}

#[test]
fn catches_port_zero() {
    let mut config = RoomcastConfig::default();
    config.relay.port = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.port"));
}

#[test]
fn catches_zero_queue_capacity() {
    let mut config = RoomcastConfig::default();
    config.relay.outbound_queue_capacity = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.outbound_queue_capacity"));
}

#[test]
fn catches_empty_bind() {
    let mut config = RoomcastConfig::default();
    config.relay.bind = "  ".into();
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.bind"));
}

#[test]
fn catches_short_room_codes() {
    let mut config = RoomcastConfig::default();
    config.rooms.code_length = 2;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("rooms.code_length"));
}

#[test]
fn catches_margin_below_one() {
    let mut config = RoomcastConfig::default();
    config.sync.buffer_margin = 0.5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("sync.buffer_margin"));
}

#[test]
fn catches_nan_floor() {
    let mut config = RoomcastConfig::default();
    config.sync.buffer_floor_ms = f64::NAN;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("sync.buffer_floor_ms"));
}

#[test]
fn catches_negative_stall_threshold() {
    let mut config = RoomcastConfig::default();
    config.playback.stall_threshold_ms = -5;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("playback.stall_threshold_ms"));
}

#[test]
fn catches_volume_over_100() {
    let mut config = RoomcastConfig::default();
    config.playback.volume = 101;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("playback.volume"));
}

#[test]
fn collects_multiple_errors() {
    let mut config = RoomcastConfig::default();
    config.relay.port = 0;
    config.playback.lookahead_ms = 10_000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("relay.port"));
    assert!(err.contains("playback.lookahead_ms"));
    assert!(err.contains("; "));
}

#[test]
fn catches_zero_connect_timeout() {
    let mut config = RoomcastConfig::default();
    config.client.connect_timeout_secs = 0;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("client.connect_timeout_secs"));
}

#[test]
fn catches_inverted_reconnect_delays() {
    let mut config = RoomcastConfig::default();
    config.client.reconnect_delay_ms = 4000;
    config.client.max_reconnect_delay_ms = 2000;
    let err = validate(&config).unwrap_err().to_string();
    assert!(err.contains("client.max_reconnect_delay_ms"));
}
