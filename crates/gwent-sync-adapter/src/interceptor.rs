//! Observation of local player actions.
//!
//! The rules engine is never patched: a [`GameContext`] calls its registered
//! [`ActionHook`] after each user-level action completes. The interceptor is
//! that hook. It forwards an action only when the actor is the local avatar,
//! so replays applied to the opponent avatar never reach the send path.
//!
//! An action run on the local avatar by code rather than by the player is
//! indistinguishable from a real one and is forwarded too.
//!
//! [`GameContext`]: gwent_sync_core::GameContext

use std::sync::Arc;

use gwent_sync_core::{ActionHook, LocalAction, MoveEnvelope, PlayerId, Seat, SessionId};
use gwent_sync_transport::RelayChannel;

use crate::encoder::encode;

/// Destination for encoded local moves. Must not block.
pub trait MoveSink: Send + Sync {
    /// Hand off one envelope.
    fn submit(&self, envelope: &MoveEnvelope);
}

impl MoveSink for RelayChannel {
    fn submit(&self, envelope: &MoveEnvelope) {
        // A closed channel has already logged the drop.
        if self.send_move(envelope).is_ok() {
            tracing::debug!(
                session_id = %envelope.session_id,
                player = %envelope.player,
                action = envelope.kind().as_str(),
                "Local move sent"
            );
        }
    }
}

/// Action hook forwarding the local avatar's actions to a [`MoveSink`].
pub struct Interceptor {
    session_id: SessionId,
    local_player: PlayerId,
    sink: Arc<dyn MoveSink>,
}

impl Interceptor {
    /// Create an interceptor for `local_player` in `session_id`.
    #[must_use]
    pub fn new(session_id: SessionId, local_player: PlayerId, sink: Arc<dyn MoveSink>) -> Self {
        Self {
            session_id,
            local_player,
            sink,
        }
    }
}

impl ActionHook for Interceptor {
    fn action_completed(&self, actor: Seat, action: &LocalAction) {
        if actor != Seat::Local {
            tracing::trace!(?action, "Replayed action, not forwarding");
            return;
        }
        self.sink
            .submit(&encode(self.session_id, self.local_player, action));
    }
}
