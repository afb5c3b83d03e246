use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use super::messages::{ClientMessage, ServerMessage};
use super::types::{OutboundMessage, Session, SessionId, SessionInfo, SignalingError};

/// Commands sent to the session manager actor
pub(crate) enum SessionCommand {
    Add {
        conn_tx: mpsc::UnboundedSender<OutboundMessage>,
        reply: oneshot::Sender<SessionInfo>,
    },
    Remove {
        id: SessionId,
    },
    Relay {
        sender: SessionId,
        message: ClientMessage,
    },
}

/// Owns the registry of active sessions. All registry mutation and all
/// sends on session channels happen here, one command at a time.
pub(crate) async fn session_manager_actor(mut rx: mpsc::Receiver<SessionCommand>) {
    let mut sessions: HashMap<SessionId, Session> = HashMap::new();

    while let Some(cmd) = rx.recv().await {
        match cmd {
            SessionCommand::Add { conn_tx, reply } => {
                let session = Session::create(conn_tx);

                // Announce before inserting: the new session must not see
                // its own arrival, and its roster snapshot excludes itself.
                broadcast(&sessions, &ServerMessage::UserOnline(session.info.clone()));

                let roster: Vec<SessionInfo> =
                    sessions.values().map(|s| s.info.clone()).collect();
                send_to(&session, &ServerMessage::Users(roster));

                let info = session.info.clone();
                sessions.insert(info.id, session);

                info!("session {} online as \"{}\"", info.id, info.display_name);
                let _ = reply.send(info);
            }

            SessionCommand::Remove { id } => {
                // Duplicate close events land here too; removing an absent
                // key is a no-op and must not broadcast again.
                if let Some(session) = sessions.remove(&id) {
                    info!("session {} offline", id);
                    broadcast(&sessions, &ServerMessage::UserOffline(session.info));
                }
            }

            SessionCommand::Relay { sender, message } => {
                let recipient = message.recipient();
                match sessions.get(&recipient) {
                    Some(target) => send_to(target, &message.into_relay(sender)),
                    None => debug!("dropping relay from {} to unknown session {}", sender, recipient),
                }
            }
        }
    }
}

/// Serialize once and fan out to every registered session.
fn broadcast(sessions: &HashMap<SessionId, Session>, msg: &ServerMessage) {
    let json =
        serde_json::to_string(msg).expect("ServerMessage serialization should never fail");
    let msg = OutboundMessage::from(json);
    for session in sessions.values() {
        // A session whose connection is mid-close simply misses the frame.
        let _ = session.tx.send(msg.clone());
    }
}

fn send_to(session: &Session, msg: &ServerMessage) {
    let json =
        serde_json::to_string(msg).expect("ServerMessage serialization should never fail");
    let _ = session.tx.send(OutboundMessage::from(json));
}

/// Handle to communicate with the session manager actor
#[derive(Clone)]
pub struct SessionManagerHandle {
    pub(crate) tx: mpsc::Sender<SessionCommand>,
}

impl SessionManagerHandle {
    /// Register a new connection: assigns identity, fans out `user-online`,
    /// delivers the roster snapshot, and inserts into the registry.
    pub async fn add_session(
        &self,
        conn_tx: mpsc::UnboundedSender<OutboundMessage>,
    ) -> Result<SessionInfo, SignalingError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self
            .tx
            .send(SessionCommand::Add {
                conn_tx,
                reply: reply_tx,
            })
            .await;
        reply_rx
            .await
            .map_err(|_| SignalingError::Internal("actor channel closed".to_string()))
    }

    /// Remove a session and notify the remaining ones. Safe to call more
    /// than once for the same id.
    pub async fn remove_session(&self, id: SessionId) {
        let _ = self.tx.send(SessionCommand::Remove { id }).await;
    }

    /// Route a directed message to its recipient, attributed to `sender`.
    /// An unknown recipient drops the message silently.
    pub async fn relay(&self, sender: SessionId, message: ClientMessage) {
        let _ = self.tx.send(SessionCommand::Relay { sender, message }).await;
    }
}
