//! Session manager: owns the room registry and every connection's outbound
//! queue, and turns connection events into registry mutations plus
//! notifications.
//!
//! Registry and queue table sit behind one lock so that a disconnect racing a
//! join on the same code cannot lose an update. Notifications are pushed onto
//! outbound queues while the lock is held; pushing never blocks.


use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_tungstenite::tungstenite::Utf8Bytes;
use tracing::{debug, info, warn};

use roomcast_common::{
    ClientEvent, ConnectionId, ConnectionIdAllocator, RoomCode, ServerEvent, TimeSyncResult,
};
use roomcast_config::RoomcastConfig;

use crate::outbound::{Outbound, OutboundQueue, PushOutcome};
use crate::registry::{Departure, Room, RoomRegistry};
use crate::relay::{fan_out, RelayReport};
use crate::time_sync::TimeSyncEstimator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("room not found")]
    RoomNotFound,
}

struct SessionState {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, OutboundQueue>,
}

impl SessionState {
    /// Queue one event for one connection. Unknown or closed connections are
    /// skipped.
    fn send(&self, conn: ConnectionId, event: &ServerEvent) -> bool {
        let Some(queue) = self.connections.get(&conn) else {
            return false;
        };
        let Some(text) = encode(event) else {
            return false;
        };
        let outcome = queue.push(Outbound {
            text,
            lossy: event.is_lossy(),
        });
        outcome != PushOutcome::Closed
    }

    /// Queue one event for every connection in `members` except `except`.
    fn broadcast(
        &self,
        members: &[ConnectionId],
        except: Option<ConnectionId>,
        event: &ServerEvent,
    ) -> usize {
        let Some(text) = encode(event) else {
            return 0;
        };
        fan_out(members, except, &self.connections, &text, event.is_lossy()).delivered
    }
}

fn encode(event: &ServerEvent) -> Option<Utf8Bytes> {
    match event.to_json() {
        Ok(text) => Some(text.into()),
        Err(e) => {
            warn!(error = %e, "failed to encode server event");
            None
        }
    }
}

/// Shared handle; clone one per connection task.
#[derive(Clone)]
pub struct SessionManager {
    state: Arc<RwLock<SessionState>>,
    ids: ConnectionIdAllocator,
    estimator: TimeSyncEstimator,
    queue_capacity: usize,
}

impl SessionManager {
    pub fn new(queue_capacity: usize, estimator: TimeSyncEstimator) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState {
                registry: RoomRegistry::new(),
                connections: HashMap::new(),
            })),
            ids: ConnectionIdAllocator::new(),
            estimator,
            queue_capacity,
        }
    }

    pub fn from_config(config: &RoomcastConfig) -> Self {
        Self::new(
            config.relay.outbound_queue_capacity,
            TimeSyncEstimator::from_config(&config.sync),
        )
    }

    /// Register a new connection and hand back its id and send queue.
    pub async fn connect(&self) -> (ConnectionId, OutboundQueue) {
        let conn = self.ids.allocate();
        let queue = OutboundQueue::new(self.queue_capacity);
        self.state
            .write()
            .await
            .connections
            .insert(conn, queue.clone());
        debug!(%conn, "connection registered");
        (conn, queue)
    }

    /// Leave every room, then drop and close the connection's queue.
    pub async fn disconnect(&self, conn: ConnectionId) -> Vec<Departure> {
        let mut state = self.state.write().await;
        let departures = Self::leave_inner(&mut state, conn);
        if let Some(queue) = state.connections.remove(&conn) {
            queue.close();
        }
        departures
    }

    /// Claim `code` with `host` as its only member. Any room already using the
    /// code is replaced.
    pub async fn create_room(&self, code: RoomCode, host: ConnectionId) {
        let mut state = self.state.write().await;
        if let Some(evicted) = state.registry.create(code.clone(), host) {
            warn!(
                room = %code,
                previous_host = ?evicted.host,
                members = evicted.members.len(),
                "room code reclaimed, previous room replaced"
            );
        }
        info!(room = %code, %host, "room created");
    }

    /// Add `conn` to `code`. Answers the caller with `room-joined` or
    /// `room-not-found` and tells the host the new listener count.
    pub async fn join_room(&self, code: &RoomCode, conn: ConnectionId) -> Result<usize, SessionError> {
        let mut state = self.state.write().await;

        let joined = state
            .registry
            .join(code, conn)
            .map(|room| (room.host, room.listener_count()));
        let (host, count) = match joined {
            Ok(joined) => joined,
            Err(_) => {
                state.send(conn, &ServerEvent::RoomNotFound);
                debug!(room = %code, %conn, "join for unknown room");
                return Err(SessionError::RoomNotFound);
            }
        };

        state.send(conn, &ServerEvent::RoomJoined);
        if let Some(host) = host {
            state.send(host, &ServerEvent::ClientJoined { count });
        }
        info!(room = %code, %conn, count, "listener joined");
        Ok(count)
    }

    /// Remove `conn` from every room it is in.
    pub async fn leave(&self, conn: ConnectionId) -> Vec<Departure> {
        let mut state = self.state.write().await;
        Self::leave_inner(&mut state, conn)
    }

    fn leave_inner(state: &mut SessionState, conn: ConnectionId) -> Vec<Departure> {
        let departures = state.registry.leave(conn);

        for departure in &departures {
            if departure.was_host {
                state.broadcast(&departure.remaining, None, &ServerEvent::HostStoppedStreaming);
                info!(room = %departure.code, %conn, "host left");
            } else if let Some(host) = departure.host {
                state.send(
                    host,
                    &ServerEvent::ClientLeft {
                        count: departure.listener_count,
                    },
                );
                info!(room = %departure.code, %conn, count = departure.listener_count, "listener left");
            }
            if departure.closed {
                info!(room = %departure.code, "room closed (empty)");
            }
        }

        departures
    }

    /// Tell every other member of `code` that the stream ended. Membership is
    /// unchanged. Returns the number of members notified.
    pub async fn stop_streaming(&self, sender: ConnectionId, code: &RoomCode) -> usize {
        let state = self.state.read().await;
        let Some(members) = state.registry.members(code) else {
            return 0;
        };
        let notified = state.broadcast(&members, Some(sender), &ServerEvent::HostStoppedStreaming);
        info!(room = %code, %sender, notified, "streaming stopped");
        notified
    }

    /// Relay one frame to every member of `code` except `sender`.
    pub async fn relay_audio(
        &self,
        sender: ConnectionId,
        code: &RoomCode,
        audio_data: Vec<u8>,
        timestamp: i64,
    ) -> RelayReport {
        let event = ServerEvent::AudioData {
            audio_data,
            timestamp,
        };
        let Some(text) = encode(&event) else {
            return RelayReport::default();
        };

        let state = self.state.read().await;
        let Some(room) = state.registry.get(code) else {
            return RelayReport::default();
        };
        fan_out(&room.members, Some(sender), &state.connections, &text, true)
    }

    /// Answer a sync probe, but only for a room that currently has a host.
    pub async fn sync_time(
        &self,
        conn: ConnectionId,
        code: &RoomCode,
        client_time: i64,
        now: i64,
    ) -> Option<TimeSyncResult> {
        let state = self.state.read().await;
        let hosted = state
            .registry
            .get(code)
            .is_some_and(|room| room.host.is_some());
        if !hosted {
            debug!(room = %code, %conn, "sync probe for room without host ignored");
            return None;
        }

        let result = self.estimator.estimate(client_time, now);
        state.send(conn, &ServerEvent::TimeSyncResponse(result));
        Some(result)
    }

    /// Dispatch one decoded client event from `conn`.
    pub async fn handle_event(&self, conn: ConnectionId, event: ClientEvent, now: i64) {
        match event {
            ClientEvent::CreateRoom { room_code } => self.create_room(room_code, conn).await,
            ClientEvent::JoinRoom { room_code } => {
                let _ = self.join_room(&room_code, conn).await;
            }
            ClientEvent::AudioData {
                room_code,
                audio_data,
                timestamp,
            } => {
                self.relay_audio(conn, &room_code, audio_data, timestamp)
                    .await;
            }
            ClientEvent::SyncTime {
                room_code,
                client_time,
            } => {
                self.sync_time(conn, &room_code, client_time, now).await;
            }
            ClientEvent::StopStreaming { room_code } => {
                self.stop_streaming(conn, &room_code).await;
            }
        }
    }

    /// Snapshot of one room.
    pub async fn room(&self, code: &RoomCode) -> Option<Room> {
        self.state.read().await.registry.get(code).cloned()
    }

    pub async fn room_count(&self) -> usize {
        self.state.read().await.registry.len()
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }
}
