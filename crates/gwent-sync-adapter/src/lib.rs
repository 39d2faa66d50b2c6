//! Move synchronization between two remote players of one card game.
//!
//! Provides:
//! - Move encoder (local action -> envelope)
//! - Action interception (`ActionHook` that forwards local moves only)
//! - Move dispatcher (relay message -> replay on the opponent avatar)
//! - Presenter trait for the few things the player sees
//! - `MultiplayerAdapter` tying them to a relay channel

pub mod adapter;
pub mod dispatcher;
pub mod encoder;
pub mod interceptor;
pub mod presenter;

pub use adapter::{AdapterError, MultiplayerAdapter};
pub use dispatcher::{DesyncPolicy, DispatchOutcome, Dispatcher};
pub use encoder::encode;
pub use interceptor::{Interceptor, MoveSink};
pub use presenter::{NullPresenter, Presenter};
