//! Roomcast client side: listener playback scheduling, listener and host
//! session state, the listener's WebSocket connection and the host streamer.

pub mod connection;
pub mod errors;
pub mod host;
pub mod listener;
pub mod samples;
pub mod scheduler;
pub mod streamer;

pub use connection::{ListenOptions, ListenerClient, ListenerEvent};
pub use errors::ClientError;
pub use host::HostSession;
pub use listener::{ListenerSession, ListenerUpdate};
pub use samples::{to_float_samples, Volume};
pub use scheduler::{AudioClock, MonotonicClock, PlaybackScheduler, ScheduledFrame};
pub use streamer::{stream_source, DEFAULT_FRAME_SAMPLES};
