//! Session lifecycle: created at launch, destroyed on exit or disconnect.

use gwent_sync_core::{Session, SessionId};

use crate::storage::{Credentials, GameMode, LaunchMarker, LaunchStore, StoreError};

/// Launch error.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Multiplayer launch for game {0} without credentials")]
    NotAuthenticated(SessionId),
}

/// A multiplayer game ready to connect.
#[derive(Debug, Clone)]
pub struct Launch {
    pub session: Session,
    pub credentials: Credentials,
}

/// Reads and clears the launch marker around one game.
pub struct SessionLauncher<S: LaunchStore> {
    store: S,
}

impl<S: LaunchStore> SessionLauncher<S> {
    /// Create a launcher over a store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Record that the next launch is multiplayer game `session_id`.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    pub async fn prepare(&self, session_id: SessionId) -> Result<(), LaunchError> {
        self.store
            .save_marker(LaunchMarker::multiplayer(session_id))
            .await?;
        Ok(())
    }

    /// Build the session for this launch.
    ///
    /// Returns `None` unless the marker says multiplayer and names a game.
    ///
    /// # Errors
    /// Returns error if the store fails, or if a multiplayer marker is set
    /// but no credentials are stored.
    pub async fn launch(&self) -> Result<Option<Launch>, LaunchError> {
        let Some(marker) = self.store.load_marker().await? else {
            return Ok(None);
        };
        let (GameMode::Multiplayer, Some(session_id)) = (marker.mode, marker.session_id) else {
            tracing::debug!(?marker, "Not a multiplayer launch");
            return Ok(None);
        };

        let credentials = self
            .store
            .load_credentials()
            .await?
            .ok_or(LaunchError::NotAuthenticated(session_id))?;

        let session = Session::multiplayer(session_id, credentials.player_id);
        tracing::info!(%session_id, player = %session.local_player, "Multiplayer session created");
        Ok(Some(Launch {
            session,
            credentials,
        }))
    }

    /// Forget the current game so the next launch goes to the menu.
    ///
    /// # Errors
    /// Returns error if the store cannot be written.
    pub async fn exit(&self) -> Result<(), LaunchError> {
        self.store.clear_marker().await?;
        tracing::info!("Multiplayer session ended");
        Ok(())
    }
}
