//! Wire protocol for client-relay communication.

use gwent_sync_core::{
    ActionKind, CardId, MoveAction, MoveEnvelope, PlayerId, SessionId, SyncError,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message from client to relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A move the sender just made.
    Move {
        game_id: SessionId,
        user_id: PlayerId,
        payload: MovePayload,
    },
    /// Ask for a full `game_state` snapshot.
    GameStateRequest {
        game_id: SessionId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        user_id: Option<PlayerId>,
    },
}

impl ClientMessage {
    /// Wrap an envelope for sending.
    #[must_use]
    pub fn from_envelope(envelope: &MoveEnvelope) -> Self {
        Self::Move {
            game_id: envelope.session_id,
            user_id: envelope.player,
            payload: MovePayload::from(envelope),
        }
    }

    /// Snapshot request for `game_id` on behalf of `user_id`.
    #[must_use]
    pub const fn state_request(game_id: SessionId, user_id: PlayerId) -> Self {
        Self::GameStateRequest {
            game_id,
            user_id: Some(user_id),
        }
    }
}

/// Flat wire form of a move.
///
/// `card_name` and `row_index` are omitted when absent; a `play_card`
/// without `row_index` asks the receiver to auto-resolve placement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub action: ActionKind,
    pub player: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_name: Option<CardId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_index: Option<usize>,
}

impl From<&MoveEnvelope> for MovePayload {
    fn from(envelope: &MoveEnvelope) -> Self {
        let (card_name, row_index) = match &envelope.action {
            MoveAction::PlayCard { card, zone_index } => (Some(card.clone()), *zone_index),
            MoveAction::Pass | MoveAction::ActivateLeader => (None, None),
        };
        Self {
            action: envelope.kind(),
            player: envelope.player,
            card_name,
            row_index,
        }
    }
}

impl MovePayload {
    /// Parse a loosely-typed payload (e.g. a snapshot's `lastMove`).
    ///
    /// # Errors
    /// Returns `MalformedMessage` if the value is not a move payload.
    pub fn from_value(value: Value) -> Result<Self, SyncError> {
        serde_json::from_value(value).map_err(|e| SyncError::MalformedMessage(e.to_string()))
    }

    /// Validate into a typed envelope for `session_id`.
    ///
    /// # Errors
    /// Returns `MalformedMessage` for a `play_card` without `card_name`.
    pub fn into_envelope(self, session_id: SessionId) -> Result<MoveEnvelope, SyncError> {
        let action = match self.action {
            ActionKind::Pass => MoveAction::Pass,
            ActionKind::ActivateLeader => MoveAction::ActivateLeader,
            ActionKind::PlayCard => MoveAction::PlayCard {
                card: self.card_name.ok_or_else(|| {
                    SyncError::MalformedMessage("play_card without card_name".to_string())
                })?,
                zone_index: self.row_index,
            },
        };
        Ok(MoveEnvelope {
            session_id,
            player: self.player,
            action,
        })
    }
}

/// Full relay-held session state.
///
/// Advisory on the client: it names the players and the last move, but the
/// local engine stays authoritative for the board. Fields the sync layer
/// does not read (board, AI flag, ...) are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub player1: Option<PlayerId>,
    pub player2: Option<PlayerId>,
    pub current_player: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move_by: Option<PlayerId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionSnapshot {
    /// A fresh two-seat state with `player1` to move.
    #[must_use]
    pub fn new_game(player1: PlayerId) -> Self {
        Self {
            player1: Some(player1),
            current_player: Some(player1),
            round: Some(1),
            player1_score: Some(0),
            player2_score: Some(0),
            ..Self::default()
        }
    }
}

/// Message from relay to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Greeting sent on join.
    Connected {
        #[serde(default)]
        payload: Value,
    },
    /// Full state, on join or on request.
    GameState { payload: SessionSnapshot },
    /// State after a move, carrying `lastMove` and `lastMoveBy`.
    GameUpdate { payload: SessionSnapshot },
    /// A peer's move, forwarded directly.
    OpponentMove { payload: MovePayload },
    /// Any message type this client does not handle.
    #[serde(other)]
    Unknown,
}

impl ServerMessage {
    /// Parse one inbound text frame.
    ///
    /// # Errors
    /// Returns `MalformedMessage` if the text is not a known message shape.
    pub fn parse(text: &str) -> Result<Self, SyncError> {
        serde_json::from_str(text).map_err(|e| SyncError::MalformedMessage(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn play(card: &str, zone_index: Option<usize>) -> MoveEnvelope {
        MoveEnvelope {
            session_id: SessionId(5),
            player: PlayerId(1),
            action: MoveAction::PlayCard {
                card: CardId::new(card),
                zone_index,
            },
        }
    }

    #[test]
    fn test_move_message_shape() {
        let msg = ClientMessage::from_envelope(&play("Geralt", Some(2)));
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "move",
                "game_id": 5,
                "user_id": 1,
                "payload": {
                    "action": "play_card",
                    "player": 1,
                    "card_name": "Geralt",
                    "row_index": 2
                }
            })
        );
    }

    #[test]
    fn test_untargeted_play_omits_row_index() {
        let payload = MovePayload::from(&play("Geralt", None));
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"action": "play_card", "player": 1, "card_name": "Geralt"})
        );
    }

    #[test]
    fn test_pass_payload_has_no_card() {
        let envelope = MoveEnvelope {
            session_id: SessionId(5),
            player: PlayerId(1),
            action: MoveAction::Pass,
        };
        let value = serde_json::to_value(MovePayload::from(&envelope)).unwrap();
        assert_eq!(value, json!({"action": "pass", "player": 1}));
    }

    #[test]
    fn test_state_request_shape() {
        let value =
            serde_json::to_value(ClientMessage::state_request(SessionId(9), PlayerId(3))).unwrap();
        assert_eq!(
            value,
            json!({"type": "game_state_request", "game_id": 9, "user_id": 3})
        );
    }

    #[test]
    fn test_play_card_without_name_is_malformed() {
        let payload: MovePayload =
            serde_json::from_value(json!({"action": "play_card", "player": 2})).unwrap();
        let err = payload.into_envelope(SessionId(1)).unwrap_err();
        assert!(matches!(err, SyncError::MalformedMessage(_)));
    }

    #[test]
    fn test_parse_game_update_from_relay() {
        let text = r#"{
            "type": "game_update",
            "game_id": 4,
            "user_id": 2,
            "payload": {
                "player1": 1,
                "player2": 2,
                "currentPlayer": 1,
                "round": 1,
                "player1Score": 0,
                "player2Score": 0,
                "board": {"player1": {"close": []}},
                "lastMove": {"action": "pass", "player": 2},
                "lastMoveBy": 2
            }
        }"#;
        let ServerMessage::GameUpdate { payload } = ServerMessage::parse(text).unwrap() else {
            panic!("Wrong message type");
        };
        assert_eq!(payload.last_move_by, Some(PlayerId(2)));
        assert!(payload.extra.contains_key("board"));

        let last = MovePayload::from_value(payload.last_move.unwrap()).unwrap();
        assert_eq!(last.action, ActionKind::Pass);
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let msg = ServerMessage::parse(r#"{"type":"chat","payload":{"text":"gg"}}"#).unwrap();
        assert_eq!(msg, ServerMessage::Unknown);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            ServerMessage::parse("not json"),
            Err(SyncError::MalformedMessage(_))
        ));
        assert!(matches!(
            ServerMessage::parse(r#"{"type":"opponent_move","payload":{"action":"dance"}}"#),
            Err(SyncError::MalformedMessage(_))
        ));
    }
}
