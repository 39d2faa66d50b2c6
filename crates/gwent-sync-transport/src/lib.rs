//! Transport layer between a game client and the relay.
//!
//! Provides:
//! - Wire protocol (JSON, `type`-tagged)
//! - WebSocket relay channel (client side)
//! - Development relay server (feature: relay)

pub mod channel;
pub mod protocol;

#[cfg(feature = "relay")]
pub mod relay;

pub use channel::{Inbound, RelayChannel, TransportError, connect};
pub use protocol::{ClientMessage, MovePayload, ServerMessage, SessionSnapshot};
