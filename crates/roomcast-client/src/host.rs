//! Host session state machine: owns the room code and stamps outgoing frames.

use roomcast_common::{ClientEvent, RoomCode, ServerEvent};
use roomcast_config::RoomsConfig;

#[derive(Debug, Clone)]
pub struct HostSession {
    room_code: RoomCode,
    listener_count: usize,
    streaming: bool,
}

impl HostSession {
    /// Start a session under a freshly generated code.
    pub fn new(code_length: usize) -> Self {
        Self::with_code(RoomCode::generate(code_length))
    }

    pub fn from_config(config: &RoomsConfig) -> Self {
        Self::new(config.code_length)
    }

    pub fn with_code(room_code: RoomCode) -> Self {
        Self {
            room_code,
            listener_count: 0,
            streaming: false,
        }
    }

    /// Sent on every (re)connect to claim the room.
    pub fn create_event(&self) -> ClientEvent {
        ClientEvent::CreateRoom {
            room_code: self.room_code.clone(),
        }
    }

    pub fn start_streaming(&mut self) {
        self.streaming = true;
    }

    /// Wrap one captured frame, stamped with `now_ms`. `None` while not
    /// streaming.
    pub fn audio_frame(&self, samples: Vec<u8>, now_ms: i64) -> Option<ClientEvent> {
        self.streaming.then(|| ClientEvent::AudioData {
            room_code: self.room_code.clone(),
            audio_data: samples,
            timestamp: now_ms,
        })
    }

    pub fn stop_streaming(&mut self) -> ClientEvent {
        self.streaming = false;
        ClientEvent::StopStreaming {
            room_code: self.room_code.clone(),
        }
    }

    /// Track listener count. Returns the reported count for join/leave events.
    pub fn handle(&mut self, event: &ServerEvent) -> Option<usize> {
        match event {
            ServerEvent::ClientJoined { count } | ServerEvent::ClientLeft { count } => {
                self.listener_count = *count;
                Some(*count)
            }
            _ => None,
        }
    }

    pub fn room_code(&self) -> &RoomCode {
        &self.room_code
    }

    /// Code as shown to people: `ABC-DEF`.
    pub fn share_code(&self) -> String {
        self.room_code.grouped()
    }

    pub fn listener_count(&self) -> usize {
        self.listener_count
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }
}
