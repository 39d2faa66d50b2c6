//! Development relay for local two-client play.
//!
//! Mirrors the production relay's contract closely enough for end-to-end
//! tests: one room per game, `game_state` on join and on request, and every
//! `move` recorded as `lastMove`/`lastMoveBy` and broadcast as
//! `game_update` to everyone in the room, sender included.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Router,
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use futures::{SinkExt, StreamExt};
use gwent_sync_core::{PlayerId, SessionId};
use serde_json::json;
use tokio::sync::{RwLock, mpsc};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::protocol::{ClientMessage, MovePayload, ServerMessage, SessionSnapshot};

/// Resolves a connection token to the player it authenticates.
pub trait TokenVerifier: Send + Sync + 'static {
    /// The player for `token`, or `None` to reject the connection.
    fn verify(&self, token: &str) -> Option<PlayerId>;
}

/// Development verifier: the token is the decimal player ID.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlayerIdTokens;

impl TokenVerifier for PlayerIdTokens {
    fn verify(&self, token: &str) -> Option<PlayerId> {
        token.parse().ok().map(PlayerId)
    }
}

struct Client {
    conn_id: Uuid,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

struct Room {
    clients: HashMap<PlayerId, Client>,
    state: SessionSnapshot,
}

impl Room {
    fn new(first: PlayerId) -> Self {
        Self {
            clients: HashMap::new(),
            state: SessionSnapshot::new_game(first),
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for client in self.clients.values() {
            let _ = client.tx.send(msg.clone());
        }
    }
}

/// All live rooms.
#[derive(Default)]
pub struct RelayHub {
    rooms: RwLock<HashMap<SessionId, Room>>,
}

impl RelayHub {
    /// Create an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms with at least one client.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Current state of a room, if it exists.
    pub async fn snapshot(&self, session_id: SessionId) -> Option<SessionSnapshot> {
        self.rooms
            .read()
            .await
            .get(&session_id)
            .map(|room| room.state.clone())
    }

    async fn join(
        &self,
        session_id: SessionId,
        player: PlayerId,
        conn_id: Uuid,
        tx: mpsc::UnboundedSender<ServerMessage>,
    ) {
        let mut rooms = self.rooms.write().await;
        let room = rooms
            .entry(session_id)
            .or_insert_with(|| Room::new(player));

        if room.state.player1 != Some(player) && room.state.player2.is_none() {
            room.state.player2 = Some(player);
        }

        let _ = tx.send(ServerMessage::Connected {
            payload: json!({"message": "Connected to game"}),
        });
        let _ = tx.send(ServerMessage::GameState {
            payload: room.state.clone(),
        });
        room.clients.insert(player, Client { conn_id, tx });
        tracing::info!(%session_id, %player, "Player joined room");
    }

    async fn leave(&self, session_id: SessionId, player: PlayerId, conn_id: Uuid) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&session_id) else {
            return;
        };
        // A newer connection of the same player stays.
        if room.clients.get(&player).is_some_and(|c| c.conn_id == conn_id) {
            room.clients.remove(&player);
            tracing::info!(%session_id, %player, "Player left room");
        }
        if room.clients.is_empty() {
            rooms.remove(&session_id);
        }
    }

    async fn record_move(&self, session_id: SessionId, player: PlayerId, payload: &MovePayload) {
        let mut rooms = self.rooms.write().await;
        let Some(room) = rooms.get_mut(&session_id) else {
            return;
        };

        let last_move = match serde_json::to_value(payload) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("Failed to serialize move: {e}");
                return;
            }
        };
        room.state.last_move = Some(last_move);
        room.state.last_move_by = Some(player);

        room.broadcast(&ServerMessage::GameUpdate {
            payload: room.state.clone(),
        });
    }

    async fn send_state(&self, session_id: SessionId, player: PlayerId) {
        let rooms = self.rooms.read().await;
        if let Some(room) = rooms.get(&session_id) {
            if let Some(client) = room.clients.get(&player) {
                let _ = client.tx.send(ServerMessage::GameState {
                    payload: room.state.clone(),
                });
            }
        }
    }
}

/// Relay handler state.
#[derive(Clone)]
pub struct RelayState {
    /// Room registry.
    pub hub: Arc<RelayHub>,
    verifier: Arc<dyn TokenVerifier>,
}

impl RelayState {
    /// Create relay state with the given token verifier.
    #[must_use]
    pub fn new(verifier: impl TokenVerifier) -> Self {
        Self {
            hub: Arc::new(RelayHub::new()),
            verifier: Arc::new(verifier),
        }
    }
}

/// Create the relay router (`/ws/game/{session_id}?token=..`).
///
/// # Example
/// ```ignore
/// let state = RelayState::new(PlayerIdTokens);
/// axum::serve(listener, relay_router(state)).await?;
/// ```
#[must_use]
pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/ws/game/{session_id}", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// WebSocket upgrade handler.
async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<i64>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<RelayState>,
) -> Response {
    let Some(token) = params.get("token") else {
        return (StatusCode::UNAUTHORIZED, "Token required").into_response();
    };
    let Some(player) = state.verifier.verify(token) else {
        return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state.hub, SessionId(session_id), player))
}

async fn handle_socket(socket: WebSocket, hub: Arc<RelayHub>, session_id: SessionId, player: PlayerId) {
    let (mut sender, mut receiver) = socket.split();
    let conn_id = Uuid::new_v4();

    // Channel for sending messages to the client
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    // Spawn task to forward messages to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(j) => j,
                Err(e) => {
                    tracing::error!("Failed to serialize message: {e}");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    hub.join(session_id, player, conn_id, tx).await;

    // Handle incoming messages
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!("WebSocket error: {e}");
                break;
            }
        };

        let client_msg: ClientMessage = match serde_json::from_str(&msg) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(%session_id, %player, "Invalid client message: {e}");
                continue;
            }
        };

        // The authenticated player acts, whatever user_id the message claims.
        match client_msg {
            ClientMessage::Move { payload, .. } => {
                hub.record_move(session_id, player, &payload).await;
            }
            ClientMessage::GameStateRequest { .. } => {
                hub.send_state(session_id, player).await;
            }
        }
    }

    hub.leave(session_id, player, conn_id).await;
    send_task.abort();
}
