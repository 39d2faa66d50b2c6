//! In-memory launch store.

use std::sync::RwLock;

use async_trait::async_trait;

use super::{Credentials, LaunchMarker, LaunchStore, StoreError};

/// In-memory storage implementation.
///
/// Useful for tests and embedders that keep launch state elsewhere.
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    marker: RwLock<Option<LaunchMarker>>,
    credentials: RwLock<Option<Credentials>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding a marker and credentials.
    #[must_use]
    pub fn with(marker: LaunchMarker, credentials: Credentials) -> Self {
        Self {
            marker: RwLock::new(Some(marker)),
            credentials: RwLock::new(Some(credentials)),
        }
    }
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl LaunchStore for MemoryStore {
    async fn load_marker(&self) -> Result<Option<LaunchMarker>, StoreError> {
        Ok(*self.marker.read().map_err(poisoned)?)
    }

    async fn save_marker(&self, marker: LaunchMarker) -> Result<(), StoreError> {
        *self.marker.write().map_err(poisoned)? = Some(marker);
        Ok(())
    }

    async fn clear_marker(&self) -> Result<(), StoreError> {
        *self.marker.write().map_err(poisoned)? = None;
        Ok(())
    }

    async fn load_credentials(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.credentials.read().map_err(poisoned)?.clone())
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        *self.credentials.write().map_err(poisoned)? = Some(credentials.clone());
        Ok(())
    }
}
