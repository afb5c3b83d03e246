use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{SessionId, SessionInfo};

/// Directed negotiation messages sent from client to server.
///
/// Wire shape is `{"type": ..., "data": {...}}`; the `user` field names the
/// intended recipient. The `ice`/`description` payloads are opaque to the
/// relay and forwarded untouched.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientMessage {
    /// ICE candidate for the named recipient
    #[serde(rename = "ice")]
    Ice { user: SessionId, ice: Value },

    /// Session description offer for the named recipient
    #[serde(rename = "offer")]
    Offer { user: SessionId, description: Value },

    /// Session description answer for the named recipient
    #[serde(rename = "answer")]
    Answer { user: SessionId, description: Value },
}

impl ClientMessage {
    /// The session this message should be routed to.
    pub fn recipient(&self) -> SessionId {
        match self {
            ClientMessage::Ice { user, .. }
            | ClientMessage::Offer { user, .. }
            | ClientMessage::Answer { user, .. } => *user,
        }
    }

    /// Turn an inbound message into its outbound relay form: the `user`
    /// field is rewritten from the recipient to the sender, so the
    /// recipient learns who is contacting them.
    pub fn into_relay(self, sender: SessionId) -> ServerMessage {
        match self {
            ClientMessage::Ice { ice, .. } => ServerMessage::Ice { user: sender, ice },
            ClientMessage::Offer { description, .. } => ServerMessage::Offer {
                user: sender,
                description,
            },
            ClientMessage::Answer { description, .. } => ServerMessage::Answer {
                user: sender,
                description,
            },
        }
    }
}

/// Messages sent from server to client, all as `{"type": ..., "data": {...}}`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// A new session joined the relay
    #[serde(rename = "user-online")]
    UserOnline(SessionInfo),

    /// A session disconnected
    #[serde(rename = "user-offline")]
    UserOffline(SessionInfo),

    /// Roster snapshot, sent once to a newly connected client
    #[serde(rename = "users")]
    Users(Vec<SessionInfo>),

    /// Relayed ICE candidate; `user` is the sender
    #[serde(rename = "ice")]
    Ice { user: SessionId, ice: Value },

    /// Relayed offer; `user` is the sender
    #[serde(rename = "offer")]
    Offer { user: SessionId, description: Value },

    /// Relayed answer; `user` is the sender
    #[serde(rename = "answer")]
    Answer { user: SessionId, description: Value },
}
