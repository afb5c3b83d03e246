use std::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Utf8Bytes;

/// Signaling relay errors
#[derive(Debug, Error)]
pub enum SignalingError {
    #[error("internal error: {0}")]
    Internal(String),
}

const SESSION_ID_LEN: usize = 32;
const HEX_CHARS: &[u8] = b"0123456789abcdef";

/// Session ID: 32 lowercase hex chars (128 random bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId {
    bytes: [u8; SESSION_ID_LEN],
    len: u8,
}

impl SessionId {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let value: u128 = rng.random();

        let mut bytes = [0u8; SESSION_ID_LEN];
        for (i, byte) in bytes.iter_mut().enumerate() {
            let nibble = ((value >> (124 - i * 4)) & 0xF) as usize;
            *byte = HEX_CHARS[nibble];
        }
        Self {
            bytes,
            len: SESSION_ID_LEN as u8,
        }
    }

    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap_or("")
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        let mut bytes = [0u8; SESSION_ID_LEN];
        let src = s.as_bytes();
        let len = src.len().min(SESSION_ID_LEN);
        bytes[..len].copy_from_slice(&src[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }
}

impl Serialize for SessionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = <&str>::deserialize(deserializer)?;
        Ok(SessionId::from(s))
    }
}

const NAME_ADJECTIVES: &[&str] = &[
    "Amber", "Brave", "Crimson", "Dapper", "Eager", "Foggy", "Gentle", "Hasty", "Ivory", "Jolly",
    "Keen", "Lucky", "Mellow", "Nimble", "Opal", "Plucky", "Quiet", "Rustic", "Swift", "Tidy",
    "Umber", "Vivid", "Witty", "Zesty",
];

const NAME_NOUNS: &[&str] = &[
    "Badger", "Cricket", "Dolphin", "Egret", "Falcon", "Gecko", "Heron", "Ibis", "Jackal", "Koala",
    "Lemur", "Marmot", "Narwhal", "Otter", "Puffin", "Quokka", "Raven", "Seal", "Tapir", "Urchin",
    "Vole", "Walrus", "Yak", "Zebra",
];

/// Generate a readable "Adjective Noun" display name. Not guaranteed unique.
pub fn generate_display_name() -> String {
    let mut rng = rand::rng();
    let adjective = NAME_ADJECTIVES[rng.random_range(0..NAME_ADJECTIVES.len())];
    let noun = NAME_NOUNS[rng.random_range(0..NAME_NOUNS.len())];
    format!("{} {}", adjective, noun)
}

/// The serializable view of a session. This is the only session
/// representation that ever crosses the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: SessionId,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// Wrapper for outbound WebSocket frames using tungstenite's Utf8Bytes.
#[derive(Debug, Clone)]
pub struct OutboundMessage(Utf8Bytes);

impl OutboundMessage {
    /// Create a new outbound message from any string type
    pub fn new(s: impl Into<Utf8Bytes>) -> Self {
        Self(s.into())
    }

    /// Get the inner Utf8Bytes for tungstenite Message::Text
    pub fn into_inner(self) -> Utf8Bytes {
        self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<String> for OutboundMessage {
    fn from(s: String) -> Self {
        Self(Utf8Bytes::from(s))
    }
}

#[derive(Debug)]
pub(crate) struct Session {
    pub info: SessionInfo,
    /// Channel for outbound frames to this connection's writer task.
    /// Uses OutboundMessage for O(1) broadcast cloning.
    pub tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Session {
    /// Build a session with a fresh id and display name for a connection.
    pub fn create(tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            info: SessionInfo {
                id: SessionId::generate(),
                display_name: generate_display_name(),
            },
            tx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_generate_has_correct_length() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), 32);
    }

    #[test]
    fn session_id_generate_uses_hex_chars() {
        let id = SessionId::generate();
        for c in id.as_str().chars() {
            assert!(
                c.is_ascii_hexdigit() && !c.is_ascii_uppercase(),
                "Invalid char: {}",
                c
            );
        }
    }

    #[test]
    fn session_id_generate_is_distinct() {
        let a = SessionId::generate();
        let b = SessionId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_from_str() {
        let id = SessionId::from("c4ca4238a0b923820dcc509a6f75849b");
        assert_eq!(id.as_str(), "c4ca4238a0b923820dcc509a6f75849b");
    }

    #[test]
    fn session_id_display() {
        let id = SessionId::from("deadbeef");
        assert_eq!(format!("{}", id), "deadbeef");
    }

    #[test]
    fn session_id_serialization() {
        let id = SessionId::from("deadbeef");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"deadbeef\"");
    }

    #[test]
    fn session_id_deserialization() {
        let id: SessionId = serde_json::from_str("\"deadbeef\"").unwrap();
        assert_eq!(id.as_str(), "deadbeef");
    }

    #[test]
    fn session_id_is_copy() {
        let id = SessionId::generate();
        let copy = id;
        assert_eq!(id.as_str(), copy.as_str());
    }

    #[test]
    fn display_name_is_two_known_words() {
        let name = generate_display_name();
        let words: Vec<&str> = name.split(' ').collect();
        assert_eq!(words.len(), 2);
        assert!(NAME_ADJECTIVES.contains(&words[0]));
        assert!(NAME_NOUNS.contains(&words[1]));
    }

    #[test]
    fn session_info_serializes_id_and_display_name_only() {
        let info = SessionInfo {
            id: SessionId::from("deadbeef"),
            display_name: "Witty Otter".to_string(),
        };
        let value: serde_json::Value = serde_json::to_value(&info).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["id"], "deadbeef");
        assert_eq!(object["displayName"], "Witty Otter");
    }

    #[test]
    fn session_create_assigns_fresh_identity() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let session = Session::create(tx);
        assert_eq!(session.info.id.as_str().len(), 32);
        assert!(!session.info.display_name.is_empty());
    }
}
