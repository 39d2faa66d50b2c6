//! Move values: what the local engine reports and what travels to the peer.

use serde::{Deserialize, Serialize};

use crate::{CardId, PlayerId, SessionId};

/// Wire-level action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Pass the turn (and the round).
    Pass,
    /// Play a card, optionally into a named zone.
    PlayCard,
    /// Activate the leader ability.
    ActivateLeader,
}

impl ActionKind {
    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::PlayCard => "play_card",
            Self::ActivateLeader => "activate_leader",
        }
    }
}

/// A state-changing action that has already completed on a local engine.
///
/// Reported to the [`ActionHook`](crate::ActionHook) after the engine
/// operation returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalAction {
    /// The avatar passed its turn.
    PassTurn,
    /// A card was moved from hand into a specific zone.
    PlayCardToZone {
        /// Card that was played.
        card: CardId,
        /// Position of the zone in the engine's canonical zone ordering.
        zone_index: usize,
    },
    /// A card was played and placed by the engine's own resolution.
    PlayCard {
        /// Card that was played.
        card: CardId,
    },
    /// The leader ability was activated.
    ActivateLeader,
}

/// Action-specific part of an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveAction {
    /// Pass the turn.
    Pass,
    /// Play a card from hand.
    PlayCard {
        /// Card to play.
        card: CardId,
        /// `None` lets the receiver auto-resolve placement.
        zone_index: Option<usize>,
    },
    /// Activate the leader ability.
    ActivateLeader,
}

impl MoveAction {
    /// The wire kind of this action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::Pass => ActionKind::Pass,
            Self::PlayCard { .. } => ActionKind::PlayCard,
            Self::ActivateLeader => ActionKind::ActivateLeader,
        }
    }
}

/// One game action addressed to the relay.
///
/// Always names the acting player; receivers discard envelopes whose actor
/// is themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveEnvelope {
    /// Game the move belongs to.
    pub session_id: SessionId,
    /// Acting player.
    pub player: PlayerId,
    /// What the player did.
    pub action: MoveAction,
}

impl MoveEnvelope {
    /// The wire kind of the carried action.
    #[must_use]
    pub const fn kind(&self) -> ActionKind {
        self.action.kind()
    }

    /// Whether `player` is the actor of this envelope.
    #[must_use]
    pub fn is_from(&self, player: PlayerId) -> bool {
        self.player == player
    }
}
