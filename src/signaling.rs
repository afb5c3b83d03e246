//! WebSocket signaling relay for P2P rendezvous

mod actor;
mod messages;
mod server;
mod types;

pub use actor::SessionManagerHandle;
pub use messages::{ClientMessage, ServerMessage};
pub use server::{DEFAULT_SIGNALING_PORT, SignalingServer};
pub use types::{
    OutboundMessage, SessionId, SessionInfo, SignalingError, generate_display_name,
};
