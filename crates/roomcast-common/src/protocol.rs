//! Wire protocol shared by the relay and its clients.
//!
//! Every frame is a JSON text message of the form
//! `{"type": "<event-name>", "data": {...}}`; events without a payload omit
//! `data`. Payload fields are camelCase.

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;
use crate::room_code::RoomCode;

/// Events a client (host or listener) sends to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Claim (or reset) a room; the sender becomes its host.
    CreateRoom { room_code: RoomCode },

    JoinRoom { room_code: RoomCode },

    /// One captured frame of unsigned 8-bit time-domain samples.
    AudioData {
        room_code: RoomCode,
        audio_data: Vec<u8>,
        timestamp: i64,
    },

    SyncTime { room_code: RoomCode, client_time: i64 },

    StopStreaming { room_code: RoomCode },
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn room_code(&self) -> &RoomCode {
        match self {
            ClientEvent::CreateRoom { room_code }
            | ClientEvent::JoinRoom { room_code }
            | ClientEvent::AudioData { room_code, .. }
            | ClientEvent::SyncTime { room_code, .. }
            | ClientEvent::StopStreaming { room_code } => room_code,
        }
    }
}

/// Result of one time-sync probe. All values are milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSyncResult {
    /// The probe's send time, echoed back unchanged.
    pub client_time: i64,
    pub server_time: i64,
    /// Estimated one-way delay. Can be negative when clocks are skewed.
    pub latency: f64,
    /// Recommended playback delay.
    pub buffer_time: f64,
}

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "kebab-case",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    RoomJoined,

    RoomNotFound,

    /// Sent to the host; `count` excludes the host itself.
    ClientJoined { count: usize },

    ClientLeft { count: usize },

    AudioData { audio_data: Vec<u8>, timestamp: i64 },

    TimeSyncResponse(TimeSyncResult),

    HostStoppedStreaming,
}

impl ServerEvent {
    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Audio frames may be dropped under backpressure; control events should not.
    pub fn is_lossy(&self) -> bool {
        matches!(self, ServerEvent::AudioData { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn code(s: &str) -> RoomCode {
        RoomCode::parse(s).unwrap()
    }

    #[test]
    fn create_room_wire_format() {
        let event = ClientEvent::from_json(r#"{"type":"create-room","data":{"roomCode":"ABCDEF"}}"#)
            .unwrap();
        assert_eq!(event, ClientEvent::CreateRoom { room_code: code("ABCDEF") });
    }

    #[test]
    fn join_room_normalizes_code() {
        let event =
            ClientEvent::from_json(r#"{"type":"join-room","data":{"roomCode":"abc-123"}}"#).unwrap();
        assert_eq!(event.room_code().as_str(), "ABC123");
    }

    #[test]
    fn audio_data_fields_are_camel_case() {
        let event = ClientEvent::AudioData {
            room_code: code("ABCDEF"),
            audio_data: vec![128, 130, 126],
            timestamp: 1_700_000_000_000,
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "audio-data",
                "data": {
                    "roomCode": "ABCDEF",
                    "audioData": [128, 130, 126],
                    "timestamp": 1_700_000_000_000i64
                }
            })
        );
    }

    #[test]
    fn sync_time_parses() {
        let event = ClientEvent::from_json(
            r#"{"type":"sync-time","data":{"roomCode":"ABCDEF","clientTime":1000}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::SyncTime {
                room_code: code("ABCDEF"),
                client_time: 1000
            }
        );
    }

    #[test]
    fn missing_field_is_rejected() {
        let err = ClientEvent::from_json(r#"{"type":"join-room","data":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn empty_room_code_is_rejected() {
        assert!(ClientEvent::from_json(r#"{"type":"join-room","data":{"roomCode":"-"}}"#).is_err());
    }

    #[test]
    fn out_of_range_sample_is_rejected() {
        let text = r#"{"type":"audio-data","data":{"roomCode":"A","audioData":[300],"timestamp":1}}"#;
        assert!(ClientEvent::from_json(text).is_err());
    }

    #[test]
    fn unknown_event_is_rejected() {
        assert!(ClientEvent::from_json(r#"{"type":"launch-rockets"}"#).is_err());
    }

    #[test]
    fn unit_server_events_omit_data() {
        assert_eq!(
            ServerEvent::RoomJoined.to_json().unwrap(),
            r#"{"type":"room-joined"}"#
        );
        assert_eq!(
            ServerEvent::HostStoppedStreaming.to_json().unwrap(),
            r#"{"type":"host-stopped-streaming"}"#
        );
        assert_eq!(
            ServerEvent::from_json(r#"{"type":"room-not-found"}"#).unwrap(),
            ServerEvent::RoomNotFound
        );
    }

    #[test]
    fn client_count_wire_format() {
        assert_eq!(
            ServerEvent::ClientJoined { count: 1 }.to_json().unwrap(),
            r#"{"type":"client-joined","data":{"count":1}}"#
        );
    }

    #[test]
    fn time_sync_response_wire_format() {
        let event = ServerEvent::TimeSyncResponse(TimeSyncResult {
            client_time: 1000,
            server_time: 1300,
            latency: 150.0,
            buffer_time: 225.0,
        });
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "time-sync-response",
                "data": {
                    "clientTime": 1000,
                    "serverTime": 1300,
                    "latency": 150.0,
                    "bufferTime": 225.0
                }
            })
        );
        assert_eq!(ServerEvent::from_json(&event.to_json().unwrap()).unwrap(), event);
    }

    #[test]
    fn only_audio_is_lossy() {
        assert!(ServerEvent::AudioData {
            audio_data: vec![],
            timestamp: 0
        }
        .is_lossy());
        assert!(!ServerEvent::HostStoppedStreaming.is_lossy());
        assert!(!ServerEvent::ClientLeft { count: 0 }.is_lossy());
    }
}
