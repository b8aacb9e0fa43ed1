//! Listener session state machine.
//!
//! Pure state: feed it server events, get back what to do. The connection
//! loop owns the socket and forwards whatever this produces.

use roomcast_common::{ClientEvent, RoomCode, ServerEvent, TimeSyncResult};
use roomcast_config::PlaybackConfig;

use crate::errors::ClientError;
use crate::samples::{to_float_samples, Volume};
use crate::scheduler::{AudioClock, PlaybackScheduler, ScheduledFrame};

/// What a server event meant to this listener.
#[derive(Debug, Clone, PartialEq)]
pub enum ListenerUpdate {
    Joined,
    RoomNotFound,
    Play(ScheduledFrame),
    HostStopped,
    Synced(TimeSyncResult),
    /// Host-only events, or audio while not receiving.
    Ignored,
}

pub struct ListenerSession {
    room_code: Option<RoomCode>,
    joined: bool,
    /// Present while receiving.
    clock: Option<Box<dyn AudioClock>>,
    /// Set by `start_receiving`, cleared only by `stop_receiving`. A host stop
    /// drops the clock but keeps this.
    wants_receiving: bool,
    scheduler: PlaybackScheduler,
    volume: Volume,
    last_sync: Option<TimeSyncResult>,
}

impl ListenerSession {
    pub fn new(scheduler: PlaybackScheduler, volume: Volume) -> Self {
        Self {
            room_code: None,
            joined: false,
            clock: None,
            wants_receiving: false,
            scheduler,
            volume,
            last_sync: None,
        }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(
            PlaybackScheduler::from_config(config),
            Volume::new(config.volume),
        )
    }

    /// Remember `input` as the room to join and build the join request.
    pub fn join(&mut self, input: &str) -> Result<ClientEvent, ClientError> {
        let code = RoomCode::parse(input.trim()).map_err(|_| ClientError::EmptyRoomCode)?;
        self.room_code = Some(code.clone());
        self.joined = false;
        Ok(ClientEvent::JoinRoom { room_code: code })
    }

    /// Join request for the remembered room, used after a reconnect.
    pub fn rejoin(&mut self) -> Option<ClientEvent> {
        self.joined = false;
        self.room_code
            .clone()
            .map(|room_code| ClientEvent::JoinRoom { room_code })
    }

    /// Start scheduling audio against `clock`. Returns the sync probe to send,
    /// stamped with `now_ms`, if a room is known.
    pub fn start_receiving(&mut self, clock: Box<dyn AudioClock>, now_ms: i64) -> Option<ClientEvent> {
        self.clock = Some(clock);
        self.wants_receiving = true;
        self.room_code.clone().map(|room_code| ClientEvent::SyncTime {
            room_code,
            client_time: now_ms,
        })
    }

    pub fn stop_receiving(&mut self) {
        self.clock = None;
        self.wants_receiving = false;
    }

    /// True after a host stop when the user never asked to stop: the next
    /// audio frame should restart receiving.
    pub fn needs_resume(&self) -> bool {
        self.wants_receiving && self.clock.is_none()
    }

    pub fn handle(&mut self, event: ServerEvent) -> ListenerUpdate {
        match event {
            ServerEvent::RoomJoined => {
                self.joined = true;
                ListenerUpdate::Joined
            }
            ServerEvent::RoomNotFound => {
                self.joined = false;
                ListenerUpdate::RoomNotFound
            }
            ServerEvent::AudioData {
                audio_data,
                timestamp,
            } => {
                let Some(clock) = &self.clock else {
                    return ListenerUpdate::Ignored;
                };
                let start_at = self.scheduler.schedule(timestamp, clock.current_time());
                let mut samples = to_float_samples(&audio_data);
                self.volume.apply(&mut samples);
                ListenerUpdate::Play(ScheduledFrame {
                    start_at,
                    timestamp,
                    samples,
                })
            }
            ServerEvent::HostStoppedStreaming => {
                self.clock = None;
                ListenerUpdate::HostStopped
            }
            ServerEvent::TimeSyncResponse(result) => {
                // Kept for diagnostics; scheduling does not read it yet.
                self.last_sync = Some(result);
                ListenerUpdate::Synced(result)
            }
            ServerEvent::ClientJoined { .. } | ServerEvent::ClientLeft { .. } => {
                ListenerUpdate::Ignored
            }
        }
    }

    pub fn room_code(&self) -> Option<&RoomCode> {
        self.room_code.as_ref()
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_receiving(&self) -> bool {
        self.clock.is_some()
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn set_volume(&mut self, volume: Volume) {
        self.volume = volume;
    }

    pub fn last_sync(&self) -> Option<TimeSyncResult> {
        self.last_sync
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    /// Clock whose position (in ms) the test moves by hand.
    #[derive(Clone, Default)]
    struct ManualClock(Arc<AtomicU64>);

    impl ManualClock {
        fn set_ms(&self, ms: u64) {
            self.0.store(ms, Ordering::SeqCst);
        }
    }

    impl AudioClock for ManualClock {
        fn current_time(&self) -> f64 {
            self.0.load(Ordering::SeqCst) as f64 / 1000.0
        }
    }

    fn session() -> ListenerSession {
        ListenerSession::new(PlaybackScheduler::default(), Volume::new(100))
    }

    fn audio(data: Vec<u8>, timestamp: i64) -> ServerEvent {
        ServerEvent::AudioData {
            audio_data: data,
            timestamp,
        }
    }

    #[test]
    fn join_normalizes_code() {
        let mut listener = session();
        let event = listener.join("  abc-123 ").unwrap();
        assert_eq!(event.room_code().as_str(), "ABC123");
        assert_eq!(listener.room_code().unwrap().as_str(), "ABC123");
    }

    #[test]
    fn join_rejects_empty_code() {
        let mut listener = session();
        assert!(matches!(listener.join("   "), Err(ClientError::EmptyRoomCode)));
        assert!(matches!(listener.join("--"), Err(ClientError::EmptyRoomCode)));
        assert!(listener.room_code().is_none());
    }

    #[test]
    fn joined_and_not_found() {
        let mut listener = session();
        listener.join("ABCDEF").unwrap();
        assert_eq!(listener.handle(ServerEvent::RoomJoined), ListenerUpdate::Joined);
        assert!(listener.is_joined());
        assert_eq!(listener.handle(ServerEvent::RoomNotFound), ListenerUpdate::RoomNotFound);
        assert!(!listener.is_joined());
    }

    #[test]
    fn audio_ignored_until_receiving() {
        let mut listener = session();
        listener.join("ABCDEF").unwrap();
        listener.handle(ServerEvent::RoomJoined);
        assert_eq!(listener.handle(audio(vec![128], 1)), ListenerUpdate::Ignored);
    }

    #[test]
    fn start_receiving_emits_sync_probe() {
        let mut listener = session();
        listener.join("abc-def").unwrap();
        let probe = listener.start_receiving(Box::new(ManualClock::default()), 1_700_000_000_000);
        assert_eq!(
            probe,
            Some(ClientEvent::SyncTime {
                room_code: RoomCode::parse("ABCDEF").unwrap(),
                client_time: 1_700_000_000_000,
            })
        );
        assert!(listener.is_receiving());
    }

    #[test]
    fn start_receiving_without_room_sends_nothing() {
        let mut listener = session();
        assert!(listener
            .start_receiving(Box::new(ManualClock::default()), 0)
            .is_none());
        assert!(listener.is_receiving());
    }

    #[test]
    fn audio_is_converted_and_scheduled() {
        let clock = ManualClock::default();
        let mut listener = ListenerSession::new(PlaybackScheduler::default(), Volume::new(50));
        listener.join("ABCDEF").unwrap();
        listener.start_receiving(Box::new(clock.clone()), 0);

        clock.set_ms(1_000);
        let ListenerUpdate::Play(first) = listener.handle(audio(vec![0, 128, 192], 5_000)) else {
            panic!("expected a scheduled frame");
        };
        assert_eq!(first.start_at, 1.0);
        assert_eq!(first.timestamp, 5_000);
        assert_eq!(first.samples, vec![-0.5, 0.0, 0.25]);

        clock.set_ms(1_020);
        let ListenerUpdate::Play(second) = listener.handle(audio(vec![128], 5_020)) else {
            panic!("expected a scheduled frame");
        };
        assert!((second.start_at - 1.07).abs() < 1e-9);
    }

    #[test]
    fn host_stop_leaves_receiving_state() {
        let mut listener = session();
        listener.join("ABCDEF").unwrap();
        listener.start_receiving(Box::new(ManualClock::default()), 0);
        assert_eq!(
            listener.handle(ServerEvent::HostStoppedStreaming),
            ListenerUpdate::HostStopped
        );
        assert!(!listener.is_receiving());
        assert_eq!(listener.handle(audio(vec![128], 1)), ListenerUpdate::Ignored);
    }

    #[test]
    fn host_restart_can_resume_until_user_stops() {
        let clock = ManualClock::default();
        let mut listener = session();
        listener.join("ABCDEF").unwrap();
        assert!(!listener.needs_resume());

        listener.start_receiving(Box::new(clock.clone()), 0);
        listener.handle(audio(vec![128], 1_000));
        listener.handle(ServerEvent::HostStoppedStreaming);
        assert!(listener.needs_resume());

        let probe = listener.start_receiving(Box::new(clock.clone()), 5);
        assert!(matches!(probe, Some(ClientEvent::SyncTime { client_time: 5, .. })));
        assert!(!listener.needs_resume());
        clock.set_ms(3_000);
        let ListenerUpdate::Play(frame) = listener.handle(audio(vec![128], 60_000)) else {
            panic!("expected a scheduled frame after resuming");
        };
        assert_eq!(frame.start_at, 3.0);

        listener.stop_receiving();
        assert!(!listener.needs_resume());
        listener.handle(ServerEvent::HostStoppedStreaming);
        assert!(!listener.needs_resume());
    }

    #[test]
    fn sync_response_is_recorded() {
        let mut listener = session();
        let result = TimeSyncResult {
            client_time: 1000,
            server_time: 1300,
            latency: 150.0,
            buffer_time: 225.0,
        };
        assert_eq!(
            listener.handle(ServerEvent::TimeSyncResponse(result)),
            ListenerUpdate::Synced(result)
        );
        assert_eq!(listener.last_sync(), Some(result));
    }

    #[test]
    fn host_events_are_ignored() {
        let mut listener = session();
        assert_eq!(
            listener.handle(ServerEvent::ClientJoined { count: 3 }),
            ListenerUpdate::Ignored
        );
        assert_eq!(
            listener.handle(ServerEvent::ClientLeft { count: 2 }),
            ListenerUpdate::Ignored
        );
    }

    #[test]
    fn rejoin_reuses_remembered_code() {
        let mut listener = session();
        assert!(listener.rejoin().is_none());
        listener.join("xyz-789").unwrap();
        listener.handle(ServerEvent::RoomJoined);
        let event = listener.rejoin().unwrap();
        assert_eq!(event.room_code().as_str(), "XYZ789");
        assert!(!listener.is_joined());
    }
}
