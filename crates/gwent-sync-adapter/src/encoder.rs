//! Local action to move envelope.

use gwent_sync_core::{LocalAction, MoveAction, MoveEnvelope, PlayerId, SessionId};

/// Build the envelope for an action `player` just completed.
///
/// Pure mapping. A zone play carries its canonical zone index; an
/// untargeted play carries none, so the receiver auto-resolves placement.
#[must_use]
pub fn encode(session_id: SessionId, player: PlayerId, action: &LocalAction) -> MoveEnvelope {
    let action = match action {
        LocalAction::PassTurn => MoveAction::Pass,
        LocalAction::PlayCardToZone { card, zone_index } => MoveAction::PlayCard {
            card: card.clone(),
            zone_index: Some(*zone_index),
        },
        LocalAction::PlayCard { card } => MoveAction::PlayCard {
            card: card.clone(),
            zone_index: None,
        },
        LocalAction::ActivateLeader => MoveAction::ActivateLeader,
    };

    MoveEnvelope {
        session_id,
        player,
        action,
    }
}
