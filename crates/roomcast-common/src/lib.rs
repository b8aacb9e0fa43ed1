pub mod errors;
pub mod id;
pub mod protocol;
pub mod room_code;
pub mod time;

pub use errors::{ConfigError, ProtocolError, RoomcastError};
pub use id::{ConnectionId, ConnectionIdAllocator};
pub use protocol::{ClientEvent, ServerEvent, TimeSyncResult};
pub use room_code::{RoomCode, ROOM_CODE_ALPHABET, DEFAULT_ROOM_CODE_LENGTH};
pub use time::unix_millis;

pub type Result<T> = std::result::Result<T, RoomcastError>;
