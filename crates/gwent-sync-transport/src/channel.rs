//! WebSocket channel to the relay for one game session.
//!
//! `connect()` returns two halves:
//! - [`RelayChannel`] sends. Frames go through an unbounded queue to a
//!   writer task, so sending never waits on the network.
//! - [`Inbound`] receives. It has exactly one owner, which reads parsed
//!   messages one at a time in arrival order.
//!
//! A lost connection is terminal: nothing reconnects, and every later send
//! is a logged no-op.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::{SinkExt, StreamExt, stream::SplitStream};
use gwent_sync_core::{MoveEnvelope, PlayerId, RelayConfig, SessionId, SyncError};
use thiserror::Error;
use tokio::{net::TcpStream, sync::mpsc};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};

use crate::protocol::{ClientMessage, ServerMessage};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Connect failed: {0}")]
    Connect(Box<tungstenite::Error>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Channel closed")]
    Closed,
}

impl From<TransportError> for SyncError {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Json(e) => Self::MalformedMessage(e.to_string()),
            TransportError::Connect(_) | TransportError::Closed => Self::ConnectionLost,
        }
    }
}

/// Open/closed flag shared by both halves and the writer task.
#[derive(Debug)]
struct ChannelState {
    session_id: SessionId,
    open: AtomicBool,
}

impl ChannelState {
    fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            open: AtomicBool::new(true),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Mark the channel closed. Only the first caller gets `true`.
    fn shut(&self, reason: &str) -> bool {
        let was_open = self.open.swap(false, Ordering::SeqCst);
        if was_open {
            tracing::info!(session_id = %self.session_id, reason, "Disconnected from game");
        }
        was_open
    }
}

/// Sending half of a relay connection.
#[derive(Debug, Clone)]
pub struct RelayChannel {
    player: PlayerId,
    outbound: mpsc::UnboundedSender<Message>,
    state: Arc<ChannelState>,
}

/// Receiving half of a relay connection.
pub struct Inbound {
    reader: SplitStream<WsStream>,
    state: Arc<ChannelState>,
}

/// Connect to the relay for `session_id` as `player`.
///
/// On open, a `game_state_request` is queued immediately so a client
/// joining mid-game can reconcile.
///
/// # Errors
/// Returns error if the WebSocket handshake fails.
pub async fn connect(
    config: &RelayConfig,
    session_id: SessionId,
    player: PlayerId,
    token: &str,
) -> Result<(RelayChannel, Inbound), TransportError> {
    let url = config.game_url(session_id, token);
    let (socket, _response) = connect_async(url.as_str()).await.map_err(|e| {
        tracing::error!(%session_id, error = %e, "Relay connection failed");
        TransportError::Connect(Box::new(e))
    })?;

    tracing::info!(%session_id, %player, "Connected to game");
    Ok(RelayChannel::start(socket, session_id, player))
}

impl RelayChannel {
    /// Split an open socket into channel halves and spawn the writer task.
    fn start(socket: WsStream, session_id: SessionId, player: PlayerId) -> (Self, Inbound) {
        let (mut sink, reader) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
        let state = Arc::new(ChannelState::new(session_id));

        let writer_state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let closing = matches!(frame, Message::Close(_));
                if let Err(e) = sink.send(frame).await {
                    tracing::error!(session_id = %writer_state.session_id, error = %e, "Relay write failed");
                    writer_state.shut("write failed");
                    break;
                }
                if closing {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        let channel = Self {
            player,
            outbound: tx,
            state: Arc::clone(&state),
        };
        // Queued before anything else can be sent.
        let _ = channel.send(&ClientMessage::state_request(session_id, player));

        (channel, Inbound { reader, state })
    }

    /// Session this channel belongs to.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.state.session_id
    }

    /// Whether the connection is still usable.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Queue a move envelope.
    ///
    /// # Errors
    /// Returns `Closed` (after logging) if the channel is not open.
    pub fn send_move(&self, envelope: &MoveEnvelope) -> Result<(), TransportError> {
        self.send(&ClientMessage::from_envelope(envelope))
    }

    /// Ask the relay for a fresh `game_state`.
    ///
    /// # Errors
    /// Returns `Closed` (after logging) if the channel is not open.
    pub fn request_state(&self) -> Result<(), TransportError> {
        self.send(&ClientMessage::state_request(self.state.session_id, self.player))
    }

    /// Queue any client message.
    ///
    /// # Errors
    /// Returns `Closed` (after logging) if the channel is not open, or a
    /// JSON error if the message cannot be serialized.
    pub fn send(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        if !self.state.is_open() {
            tracing::warn!(session_id = %self.state.session_id, ?msg, "Relay channel not open, dropping message");
            return Err(TransportError::Closed);
        }

        let json = serde_json::to_string(msg)?;
        tracing::debug!(session_id = %self.state.session_id, %json, "Sending to relay");
        if self.outbound.send(Message::Text(json)).is_err() {
            self.state.shut("writer stopped");
            tracing::warn!(session_id = %self.state.session_id, "Relay writer gone, dropping message");
            return Err(TransportError::Closed);
        }
        Ok(())
    }

    /// Close the connection.
    ///
    /// Idempotent: only the first call has any effect. Returns whether this
    /// call was the one that closed the channel.
    pub fn close(&self) -> bool {
        if !self.state.shut("closed by client") {
            return false;
        }
        let _ = self.outbound.send(Message::Close(None));
        true
    }
}

impl Inbound {
    /// Session this stream belongs to.
    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.state.session_id
    }

    /// Next parsed message, in arrival order.
    ///
    /// Malformed frames are logged and skipped. Returns `None` once the
    /// connection is gone, and keeps returning `None` after that.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        loop {
            if !self.state.is_open() {
                return None;
            }

            let frame = match self.reader.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    tracing::error!(session_id = %self.state.session_id, error = %e, "Relay connection error");
                    self.state.shut("connection error");
                    return None;
                }
                None => {
                    self.state.shut("connection ended");
                    return None;
                }
            };

            let text = match frame {
                Message::Text(text) => text,
                Message::Binary(data) => match String::from_utf8(data) {
                    Ok(text) => text,
                    Err(_) => {
                        tracing::warn!(session_id = %self.state.session_id, "Dropping non-UTF-8 binary frame");
                        continue;
                    }
                },
                Message::Close(_) => {
                    self.state.shut("closed by relay");
                    return None;
                }
                _ => continue,
            };

            match ServerMessage::parse(&text) {
                Ok(msg) => return Some(msg),
                Err(e) => {
                    tracing::warn!(session_id = %self.state.session_id, error = %e, "Dropping relay message");
                }
            }
        }
    }
}
