//! Core abstractions for two-player move synchronization.
//!
//! This crate provides the fundamental building blocks:
//! - `Session` - Identity of one live multiplayer game
//! - `MoveEnvelope` / `LocalAction` - Typed move values
//! - `GameContext` - Explicit game context with a post-action hook
//! - `RulesEngine` and `ActionHook` traits
//! - `RelayConfig` - Relay endpoint configuration

pub mod config;
pub mod context;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod session;
pub mod traits;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::RelayConfig;
pub use context::GameContext;
pub use envelope::{ActionKind, LocalAction, MoveAction, MoveEnvelope};
pub use error::SyncError;
pub use ids::{CardId, PlayerId, SessionId};
pub use session::Session;
pub use traits::{ActionHook, CardRecord, RulesEngine, Seat};
