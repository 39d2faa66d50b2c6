//! JSON-file launch store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::{Credentials, LaunchMarker, LaunchStore, StoreError};

/// On-disk document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Contents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker: Option<LaunchMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<Credentials>,
}

/// Launch store backed by a single JSON file.
///
/// A missing file reads as empty. Writes replace the whole file.
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles.
    lock: Mutex<()>,
}

impl FileStore {
    /// Store at an explicit path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Store at `<config dir>/gwent-sync/launch.json`.
    ///
    /// # Errors
    /// Returns `Unavailable` if the platform has no config directory.
    pub fn in_config_dir() -> Result<Self, StoreError> {
        let dir = dirs::config_dir()
            .ok_or_else(|| StoreError::Unavailable("no config directory".to_string()))?;
        Ok(Self::new(dir.join("gwent-sync").join("launch.json")))
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Contents, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Contents::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, contents: &Contents) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(contents)?;
        tokio::fs::write(&self.path, bytes).await?;
        tracing::debug!(path = %self.path.display(), "Launch state written");
        Ok(())
    }

    async fn update(&self, f: impl FnOnce(&mut Contents) + Send) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut contents = self.read().await?;
        f(&mut contents);
        self.write(&contents).await
    }
}

#[async_trait]
impl LaunchStore for FileStore {
    async fn load_marker(&self) -> Result<Option<LaunchMarker>, StoreError> {
        Ok(self.read().await?.marker)
    }

    async fn save_marker(&self, marker: LaunchMarker) -> Result<(), StoreError> {
        self.update(|c| c.marker = Some(marker)).await
    }

    async fn clear_marker(&self) -> Result<(), StoreError> {
        self.update(|c| c.marker = None).await
    }

    async fn load_credentials(&self) -> Result<Option<Credentials>, StoreError> {
        Ok(self.read().await?.credentials)
    }

    async fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let credentials = credentials.clone();
        self.update(move |c| c.credentials = Some(credentials)).await
    }
}

#[cfg(test)]
mod tests {
    use gwent_sync_core::{PlayerId, SessionId};
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("launch.json"));
        assert!(store.load_marker().await.unwrap().is_none());
        assert!(store.load_credentials().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("launch.json");

        let store = FileStore::new(&path);
        store
            .save_credentials(&Credentials {
                player_id: PlayerId(4),
                auth_token: "tok".to_string(),
            })
            .await
            .unwrap();
        store
            .save_marker(LaunchMarker::multiplayer(SessionId(11)))
            .await
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.load_marker().await.unwrap(),
            Some(LaunchMarker::multiplayer(SessionId(11)))
        );
        assert_eq!(
            reopened.load_credentials().await.unwrap().map(|c| c.player_id),
            Some(PlayerId(4))
        );

        reopened.clear_marker().await.unwrap();
        assert!(store.load_marker().await.unwrap().is_none());
        assert!(store.load_credentials().await.unwrap().is_some());
    }
}
