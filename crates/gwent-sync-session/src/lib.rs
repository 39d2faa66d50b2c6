//! Multiplayer launch state and session lifecycle.
//!
//! Provides:
//! - `SessionLauncher` - Create a `Session` at launch, tear it down on exit
//! - `LaunchStore` trait and storage implementations (memory, file)

pub mod launcher;
pub mod storage;

pub use launcher::{Launch, LaunchError, SessionLauncher};
pub use storage::{Credentials, GameMode, LaunchMarker, LaunchStore, StoreError};
