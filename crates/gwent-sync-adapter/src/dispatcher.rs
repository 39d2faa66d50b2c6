//! Relay messages to opponent replays.
//!
//! Message handling:
//! - `game_state` is advisory. It names the players and is kept for
//!   display; it never touches the engine.
//! - `game_update` carries `lastMove` and `lastMoveBy`; a move by someone
//!   other than the local player goes to the replay step.
//! - `opponent_move` goes to the replay step directly.
//!
//! The replay step discards any envelope whose actor is the local player,
//! then applies the move to `Seat::Opponent`. Moves that reference a card,
//! zone or leader ability the local copy does not have are dropped and
//! logged; the game goes on.

use gwent_sync_core::{
    ActionKind, CardRecord, GameContext, MoveAction, MoveEnvelope, PlayerId, RulesEngine, Seat,
    Session, SyncError, error::DesyncKind,
};
use gwent_sync_transport::{MovePayload, ServerMessage, SessionSnapshot};

/// What to do after a replay is dropped for desync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DesyncPolicy {
    /// Log and carry on.
    #[default]
    Drop,
    /// Log, carry on, and ask the relay for a fresh snapshot.
    RequestSnapshot,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A remote move was replayed on the opponent avatar.
    Applied(ActionKind),
    /// A snapshot was stored; carries the opponent if newly learned.
    Snapshot { opponent: Option<PlayerId> },
    /// The move was the local player's own, coming back.
    Echo,
    /// Nothing to do for this message.
    Ignored,
    /// The move could not be applied.
    Dropped(SyncError),
}

/// Applies relay messages to a [`GameContext`], one at a time.
#[derive(Debug)]
pub struct Dispatcher {
    session: Session,
    snapshot: Option<SessionSnapshot>,
}

impl Dispatcher {
    /// Create a dispatcher for `session`.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            snapshot: None,
        }
    }

    /// The session, including the opponent once learned.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Latest server snapshot, for display only.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.snapshot.as_ref()
    }

    /// Handle one inbound message to completion.
    ///
    /// Never fails: every problem is logged and reported in the outcome.
    pub async fn dispatch<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
        msg: ServerMessage,
    ) -> DispatchOutcome {
        match msg {
            ServerMessage::GameState { payload } => self.store_snapshot(payload),
            ServerMessage::GameUpdate { payload } => self.handle_update(game, payload).await,
            ServerMessage::OpponentMove { payload } => self.handle_move(game, payload).await,
            ServerMessage::Connected { .. } | ServerMessage::Unknown => DispatchOutcome::Ignored,
        }
    }

    fn store_snapshot(&mut self, snapshot: SessionSnapshot) -> DispatchOutcome {
        let opponent = self
            .session
            .learn_opponent(snapshot.player1, snapshot.player2);
        if let Some(opponent) = opponent {
            tracing::info!(session_id = %self.session.id, %opponent, "Opponent identified");
        }
        self.snapshot = Some(snapshot);
        DispatchOutcome::Snapshot { opponent }
    }

    async fn handle_update<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
        mut update: SessionSnapshot,
    ) -> DispatchOutcome {
        let Some(actor) = update.last_move_by else {
            return DispatchOutcome::Ignored;
        };
        if actor == self.session.local_player {
            tracing::trace!(session_id = %self.session.id, "Own move echoed back");
            return DispatchOutcome::Echo;
        }
        let Some(last_move) = update.last_move.take() else {
            return DispatchOutcome::Ignored;
        };

        match MovePayload::from_value(last_move) {
            Ok(payload) => self.handle_move(game, payload).await,
            Err(e) => self.dropped(e),
        }
    }

    async fn handle_move<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
        payload: MovePayload,
    ) -> DispatchOutcome {
        match payload.into_envelope(self.session.id) {
            Ok(envelope) => self.replay(game, envelope).await,
            Err(e) => self.dropped(e),
        }
    }

    /// Apply one remote move to the opponent avatar.
    pub async fn replay<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
        envelope: MoveEnvelope,
    ) -> DispatchOutcome {
        if envelope.is_from(self.session.local_player) {
            tracing::trace!(session_id = %self.session.id, "Discarding own move");
            return DispatchOutcome::Echo;
        }

        let kind = envelope.kind();
        match apply(game, envelope.action).await {
            Ok(()) => {
                tracing::debug!(
                    session_id = %self.session.id,
                    player = %envelope.player,
                    action = kind.as_str(),
                    "Opponent move replayed"
                );
                DispatchOutcome::Applied(kind)
            }
            Err(e) => self.dropped(e),
        }
    }

    fn dropped(&self, error: SyncError) -> DispatchOutcome {
        tracing::warn!(session_id = %self.session.id, %error, "Dropping opponent move");
        DispatchOutcome::Dropped(error)
    }
}

async fn apply<E: RulesEngine>(
    game: &mut GameContext<E>,
    action: MoveAction,
) -> Result<(), SyncError> {
    const SEAT: Seat = Seat::Opponent;

    match action {
        MoveAction::Pass => {
            game.set_passed(SEAT, true);
            game.end_turn(SEAT).await;
        }
        MoveAction::PlayCard { card, zone_index } => {
            if !game.hand(SEAT).iter().any(|c| c.card_id() == &card) {
                return Err(DesyncKind::CardNotInHand(card).into());
            }
            match zone_index {
                Some(index) => {
                    let zones = game.zones();
                    let zone = zones
                        .get(index)
                        .cloned()
                        .ok_or(DesyncKind::ZoneOutOfRange {
                            index,
                            len: zones.len(),
                        })?;
                    game.play_card_to_zone(SEAT, &card, &zone).await;
                }
                None => game.play_card(SEAT, &card).await,
            }
            game.end_turn(SEAT).await;
        }
        MoveAction::ActivateLeader => {
            if !game.leader_available(SEAT) {
                return Err(DesyncKind::LeaderUnavailable.into());
            }
            game.activate_leader(SEAT).await;
            game.end_turn(SEAT).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use gwent_sync_core::{
        CardId, LocalAction, SessionId,
        testing::{EngineCall, Row, TableEngine},
    };
    use serde_json::json;

    use super::*;
    use crate::encoder::encode;

    const SESSION: SessionId = SessionId(50);
    const ME: PlayerId = PlayerId(1);
    const PEER: PlayerId = PlayerId(2);

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Session::multiplayer(SESSION, ME))
    }

    fn game() -> GameContext<TableEngine> {
        GameContext::unobserved(TableEngine::new(["Ciri"], ["Geralt", "Yennefer", "Triss"]))
    }

    fn opponent_move(value: serde_json::Value) -> ServerMessage {
        ServerMessage::OpponentMove {
            payload: serde_json::from_value(value).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_pass_sets_flag_and_ends_turn() {
        let (mut d, mut g) = (dispatcher(), game());
        let outcome = d
            .dispatch(&mut g, opponent_move(json!({"action": "pass", "player": 2})))
            .await;

        assert_eq!(outcome, DispatchOutcome::Applied(ActionKind::Pass));
        assert!(g.engine().passed(Seat::Opponent));
        assert_eq!(
            g.engine().calls(),
            &[
                EngineCall::SetPassed(Seat::Opponent, true),
                EngineCall::EndTurn(Seat::Opponent),
            ]
        );
    }

    #[tokio::test]
    async fn test_untargeted_play_auto_resolves() {
        let (mut d, mut g) = (dispatcher(), game());
        let outcome = d
            .dispatch(
                &mut g,
                opponent_move(json!({"action": "play_card", "player": 2, "card_name": "Geralt"})),
            )
            .await;

        assert_eq!(outcome, DispatchOutcome::Applied(ActionKind::PlayCard));
        assert_eq!(
            g.engine().calls(),
            &[
                EngineCall::AutoResolve(Seat::Opponent, CardId::new("Geralt")),
                EngineCall::EndTurn(Seat::Opponent),
            ]
        );
    }

    #[tokio::test]
    async fn test_encoded_zone_play_reproduces_same_zone() {
        let envelope = encode(
            SESSION,
            PEER,
            &LocalAction::PlayCardToZone {
                card: CardId::new("Yennefer"),
                zone_index: 1,
            },
        );
        let wire = serde_json::to_string(&MovePayload::from(&envelope)).unwrap();
        let payload: MovePayload = serde_json::from_str(&wire).unwrap();

        let (mut d, mut g) = (dispatcher(), game());
        let outcome = d
            .dispatch(&mut g, ServerMessage::OpponentMove { payload })
            .await;

        assert_eq!(outcome, DispatchOutcome::Applied(ActionKind::PlayCard));
        assert_eq!(
            g.engine().calls()[0],
            EngineCall::MoveToZone(Seat::Opponent, CardId::new("Yennefer"), Row::Ranged)
        );
        assert_eq!(
            g.engine().played(Seat::Opponent),
            &[(CardId::new("Yennefer"), Some(Row::Ranged))]
        );
    }

    #[tokio::test]
    async fn test_missing_card_is_dropped_and_next_move_still_applies() {
        let (mut d, mut g) = (dispatcher(), game());
        let outcome = d
            .dispatch(
                &mut g,
                opponent_move(json!({"action": "play_card", "player": 2, "card_name": "Dandelion"})),
            )
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped(SyncError::DesyncLookup(DesyncKind::CardNotInHand(
                CardId::new("Dandelion")
            )))
        );
        assert!(g.engine().calls().is_empty());

        let outcome = d
            .dispatch(&mut g, opponent_move(json!({"action": "pass", "player": 2})))
            .await;
        assert_eq!(outcome, DispatchOutcome::Applied(ActionKind::Pass));
    }

    #[tokio::test]
    async fn test_zone_out_of_range_is_dropped() {
        let (mut d, mut g) = (dispatcher(), game());
        let outcome = d
            .dispatch(
                &mut g,
                opponent_move(
                    json!({"action": "play_card", "player": 2, "card_name": "Triss", "row_index": 7}),
                ),
            )
            .await;
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped(SyncError::DesyncLookup(DesyncKind::ZoneOutOfRange {
                index: 7,
                len: 3
            }))
        );
        assert_eq!(g.hand(Seat::Opponent).len(), 3);
    }

    #[tokio::test]
    async fn test_leader_used_once() {
        let (mut d, mut g) = (dispatcher(), game());
        let leader = || opponent_move(json!({"action": "activate_leader", "player": 2}));

        assert_eq!(
            d.dispatch(&mut g, leader()).await,
            DispatchOutcome::Applied(ActionKind::ActivateLeader)
        );
        assert_eq!(
            g.engine().calls(),
            &[
                EngineCall::ActivateLeader(Seat::Opponent),
                EngineCall::DisableLeader(Seat::Opponent),
                EngineCall::EndTurn(Seat::Opponent),
            ]
        );

        assert_eq!(
            d.dispatch(&mut g, leader()).await,
            DispatchOutcome::Dropped(SyncError::DesyncLookup(DesyncKind::LeaderUnavailable))
        );
        assert_eq!(g.engine().calls().len(), 3);
    }

    #[tokio::test]
    async fn test_own_moves_never_touch_state() {
        let (mut d, mut g) = (dispatcher(), game());
        for value in [
            json!({"action": "pass", "player": 1}),
            json!({"action": "play_card", "player": 1, "card_name": "Geralt"}),
            json!({"action": "play_card", "player": 1, "card_name": "Geralt", "row_index": 0}),
            json!({"action": "activate_leader", "player": 1}),
        ] {
            assert_eq!(d.dispatch(&mut g, opponent_move(value)).await, DispatchOutcome::Echo);
        }
        assert!(g.engine().calls().is_empty());
        assert!(!g.engine().passed(Seat::Opponent));
        assert!(g.leader_available(Seat::Opponent));
    }

    #[tokio::test]
    async fn test_moves_apply_in_arrival_order() {
        let (mut d, mut g) = (dispatcher(), game());
        let first = opponent_move(json!({"action": "play_card", "player": 2, "card_name": "Geralt"}));
        let second =
            opponent_move(json!({"action": "play_card", "player": 2, "card_name": "Triss", "row_index": 2}));

        d.dispatch(&mut g, first).await;
        d.dispatch(&mut g, second).await;

        assert_eq!(
            g.engine().calls(),
            &[
                EngineCall::AutoResolve(Seat::Opponent, CardId::new("Geralt")),
                EngineCall::EndTurn(Seat::Opponent),
                EngineCall::MoveToZone(Seat::Opponent, CardId::new("Triss"), Row::Siege),
                EngineCall::EndTurn(Seat::Opponent),
            ]
        );
    }

    #[tokio::test]
    async fn test_game_update_from_opponent_replays_last_move() {
        let (mut d, mut g) = (dispatcher(), game());
        let update = ServerMessage::GameUpdate {
            payload: serde_json::from_value(json!({
                "player1": 1,
                "player2": 2,
                "lastMove": {"action": "pass", "player": 2},
                "lastMoveBy": 2
            }))
            .unwrap(),
        };

        assert_eq!(
            d.dispatch(&mut g, update).await,
            DispatchOutcome::Applied(ActionKind::Pass)
        );
        assert!(g.engine().passed(Seat::Opponent));
    }

    #[tokio::test]
    async fn test_game_update_from_self_is_echo() {
        let (mut d, mut g) = (dispatcher(), game());
        let update = ServerMessage::GameUpdate {
            payload: serde_json::from_value(json!({
                "lastMove": {"action": "pass", "player": 1},
                "lastMoveBy": 1
            }))
            .unwrap(),
        };
        assert_eq!(d.dispatch(&mut g, update).await, DispatchOutcome::Echo);
        assert!(g.engine().calls().is_empty());
    }

    #[tokio::test]
    async fn test_game_update_without_actor_is_ignored() {
        let (mut d, mut g) = (dispatcher(), game());
        let update = ServerMessage::GameUpdate {
            payload: SessionSnapshot::default(),
        };
        assert_eq!(d.dispatch(&mut g, update).await, DispatchOutcome::Ignored);
    }

    #[tokio::test]
    async fn test_malformed_last_move_is_dropped() {
        let (mut d, mut g) = (dispatcher(), game());
        let update = ServerMessage::GameUpdate {
            payload: serde_json::from_value(json!({
                "lastMove": {"action": "teleport"},
                "lastMoveBy": 2
            }))
            .unwrap(),
        };
        assert!(matches!(
            d.dispatch(&mut g, update).await,
            DispatchOutcome::Dropped(SyncError::MalformedMessage(_))
        ));
    }

    #[tokio::test]
    async fn test_snapshot_is_advisory() {
        let (mut d, mut g) = (dispatcher(), game());
        let state = ServerMessage::GameState {
            payload: serde_json::from_value(json!({
                "player1": 2,
                "player2": 1,
                "currentPlayer": 2,
                "lastMove": {"action": "pass", "player": 2},
                "lastMoveBy": 2
            }))
            .unwrap(),
        };

        assert_eq!(
            d.dispatch(&mut g, state.clone()).await,
            DispatchOutcome::Snapshot {
                opponent: Some(PEER)
            }
        );
        assert_eq!(
            d.dispatch(&mut g, state).await,
            DispatchOutcome::Snapshot { opponent: None }
        );
        assert!(g.engine().calls().is_empty());
        assert_eq!(d.snapshot().and_then(|s| s.current_player), Some(PEER));
    }
}
