//! Storage implementations.

use std::fmt;

use async_trait::async_trait;
use gwent_sync_core::{PlayerId, SessionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "file")]
pub mod file;

#[cfg(feature = "memory")]
pub use memory::MemoryStore;

#[cfg(feature = "file")]
pub use file::FileStore;

/// How the game was launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Local play; nothing is synchronized.
    Single,
    /// Two remote players through the relay.
    Multiplayer,
}

/// Persisted marker left by the menu for the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchMarker {
    pub mode: GameMode,
    #[serde(rename = "game_id", default)]
    pub session_id: Option<SessionId>,
}

impl LaunchMarker {
    /// Marker for a multiplayer game.
    #[must_use]
    pub const fn multiplayer(session_id: SessionId) -> Self {
        Self {
            mode: GameMode::Multiplayer,
            session_id: Some(session_id),
        }
    }
}

/// Who this client is, as issued by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub player_id: PlayerId,
    pub auth_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("player_id", &self.player_id)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

/// Storage error.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Trait for launch state backends.
#[async_trait]
pub trait LaunchStore: Send + Sync {
    /// Read the launch marker, if one is set.
    async fn load_marker(&self) -> Result<Option<LaunchMarker>, StoreError>;

    /// Set the launch marker.
    async fn save_marker(&self, marker: LaunchMarker) -> Result<(), StoreError>;

    /// Remove the launch marker.
    async fn clear_marker(&self) -> Result<(), StoreError>;

    /// Read the stored credentials, if logged in.
    async fn load_credentials(&self) -> Result<Option<Credentials>, StoreError>;

    /// Store credentials after login.
    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError>;
}
