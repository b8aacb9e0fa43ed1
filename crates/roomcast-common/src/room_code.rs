//! Human-shareable room codes.
//!
//! Codes are stored in their canonical form: upper-case, no separators.
//! Humans see them grouped into 3-character chunks (`ABC-DEF`), and whatever
//! they type back is canonicalized by dropping hyphens and upper-casing.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// Characters used for generated codes. `0`, `1`, `I` and `O` are left out
/// because they are easily confused when read aloud or off a screen.
pub const ROOM_CODE_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

pub const DEFAULT_ROOM_CODE_LENGTH: usize = 6;

const GROUP_SIZE: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Canonicalize user or wire input. Any character is accepted; only an
    /// input with nothing left after stripping hyphens is rejected.
    pub fn parse(input: &str) -> Result<Self, ProtocolError> {
        let canonical: String = input
            .chars()
            .filter(|c| *c != '-')
            .flat_map(char::to_uppercase)
            .collect();
        if canonical.is_empty() {
            return Err(ProtocolError::InvalidRoomCode(input.to_string()));
        }
        Ok(Self(canonical))
    }

    /// Draw a fresh random code of `len` characters from [`ROOM_CODE_ALPHABET`].
    /// A zero length falls back to [`DEFAULT_ROOM_CODE_LENGTH`].
    pub fn generate(len: usize) -> Self {
        Self::generate_with(&mut rand::thread_rng(), len)
    }

    pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Self {
        let len = if len == 0 { DEFAULT_ROOM_CODE_LENGTH } else { len };
        let alphabet = ROOM_CODE_ALPHABET.as_bytes();
        let code = (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form: `ABCDEF` → `ABC-DEF`, `ABCDEFG` → `ABC-DEF-G`.
    pub fn grouped(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        chars
            .chunks(GROUP_SIZE)
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("-")
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for RoomCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for RoomCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}
