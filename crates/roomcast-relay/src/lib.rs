//! roomcast-relay: room-based audio relay.
//!
//! A host claims a short room code and streams audio frames; listeners join
//! by code and receive every frame the relay gets for that room. The relay
//! also answers time-sync probes with a recommended playback buffer.

pub mod connection;
pub mod outbound;
pub mod registry;
pub mod relay;
pub mod session;
pub mod time_sync;

pub use connection::handle_connection;
pub use outbound::{Outbound, OutboundQueue, PushOutcome};
pub use registry::{Departure, Room, RoomNotFound, RoomRegistry};
pub use relay::{fan_out, RelayReport};
pub use session::{SessionError, SessionManager};
pub use time_sync::TimeSyncEstimator;
