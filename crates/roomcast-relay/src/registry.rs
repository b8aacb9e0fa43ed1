//! Room registry: the in-memory table of active rooms.
//!
//! Pure data and mutation rules; no I/O. A room is present exactly while it
//! has at least one member.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use roomcast_common::{ConnectionId, RoomCode};

/// One relay scope: an optional host plus listeners.
#[derive(Debug, Clone)]
pub struct Room {
    pub code: RoomCode,
    /// `None` once the host has left while listeners remain.
    pub host: Option<ConnectionId>,
    /// Every connection in the room, host included.
    pub members: BTreeSet<ConnectionId>,
    pub created_at: Instant,
}

impl Room {
    fn new(code: RoomCode, host: ConnectionId) -> Self {
        Self {
            code,
            host: Some(host),
            members: BTreeSet::from([host]),
            created_at: Instant::now(),
        }
    }

    /// Count reported to the host: every member but one.
    pub fn listener_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    pub fn is_headless(&self) -> bool {
        self.host.is_none()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.members.contains(&conn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomNotFound;

/// What happened to one room when a connection left it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub code: RoomCode,
    pub was_host: bool,
    /// Host still set after the departure.
    pub host: Option<ConnectionId>,
    /// Members left in the room, in id order.
    pub remaining: Vec<ConnectionId>,
    pub listener_count: usize,
    /// The room was deleted because it emptied.
    pub closed: bool,
}

#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `code` for `host`, replacing whatever room held it. Returns the
    /// evicted room, if any. Codes are not checked for collisions.
    pub fn create(&mut self, code: RoomCode, host: ConnectionId) -> Option<Room> {
        self.rooms.insert(code.clone(), Room::new(code, host))
    }

    pub fn join(&mut self, code: &RoomCode, conn: ConnectionId) -> Result<&Room, RoomNotFound> {
        let room = self.rooms.get_mut(code).ok_or(RoomNotFound)?;
        room.members.insert(conn);
        Ok(room)
    }

    /// Remove `conn` from every room it belongs to.
    pub fn leave(&mut self, conn: ConnectionId) -> Vec<Departure> {
        let mut departures = Vec::new();

        for room in self.rooms.values_mut() {
            if !room.members.remove(&conn) {
                continue;
            }
            let was_host = room.host == Some(conn);
            if was_host {
                room.host = None;
            }
            departures.push(Departure {
                code: room.code.clone(),
                was_host,
                host: room.host,
                remaining: room.members.iter().copied().collect(),
                listener_count: room.listener_count(),
                closed: room.members.is_empty(),
            });
        }

        for departure in departures.iter().filter(|d| d.closed) {
            self.rooms.remove(&departure.code);
        }
        departures.sort_by(|a, b| a.code.cmp(&b.code));
        departures
    }

    pub fn get(&self, code: &RoomCode) -> Option<&Room> {
        self.rooms.get(code)
    }

    /// Snapshot of a room's members.
    pub fn members(&self, code: &RoomCode) -> Option<Vec<ConnectionId>> {
        self.rooms
            .get(code)
            .map(|room| room.members.iter().copied().collect())
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
