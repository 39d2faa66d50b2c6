//! Identity of one live multiplayer game.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, SessionId};

/// A running game as seen by one client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Relay game ID.
    pub id: SessionId,
    /// The player on this client.
    pub local_player: PlayerId,
    /// Learned lazily from the first server snapshot.
    #[serde(default)]
    pub opponent: Option<PlayerId>,
    /// False for single-player launches, where no sync happens.
    pub multiplayer: bool,
}

impl Session {
    /// Create a multiplayer session with an unknown opponent.
    #[must_use]
    pub const fn multiplayer(id: SessionId, local_player: PlayerId) -> Self {
        Self {
            id,
            local_player,
            opponent: None,
            multiplayer: true,
        }
    }

    /// Record the opponent from a `(player1, player2)` pair.
    ///
    /// Returns the opponent if it was newly learned or changed.
    pub fn learn_opponent(
        &mut self,
        player1: Option<PlayerId>,
        player2: Option<PlayerId>,
    ) -> Option<PlayerId> {
        let opponent = [player1, player2]
            .into_iter()
            .flatten()
            .find(|p| *p != self.local_player)?;

        if self.opponent == Some(opponent) {
            return None;
        }
        self.opponent = Some(opponent);
        Some(opponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learn_opponent_from_either_slot() {
        let mut session = Session::multiplayer(SessionId(1), PlayerId(10));
        assert_eq!(
            session.learn_opponent(Some(PlayerId(10)), Some(PlayerId(20))),
            Some(PlayerId(20))
        );

        let mut session = Session::multiplayer(SessionId(1), PlayerId(20));
        assert_eq!(
            session.learn_opponent(Some(PlayerId(10)), Some(PlayerId(20))),
            Some(PlayerId(10))
        );
    }

    #[test]
    fn test_learn_opponent_only_reports_changes() {
        let mut session = Session::multiplayer(SessionId(1), PlayerId(10));
        assert!(session.learn_opponent(Some(PlayerId(10)), None).is_none());
        assert!(session.opponent.is_none());

        assert!(session.learn_opponent(Some(PlayerId(10)), Some(PlayerId(20))).is_some());
        assert!(session.learn_opponent(Some(PlayerId(10)), Some(PlayerId(20))).is_none());
    }
}
