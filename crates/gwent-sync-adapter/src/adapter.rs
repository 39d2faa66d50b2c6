//! Multiplayer adapter: one relay connection driving one game context.

use std::sync::Arc;

use gwent_sync_core::{
    ActionHook, GameContext, RelayConfig, RulesEngine, Session, SyncError,
};
use gwent_sync_session::{Launch, LaunchError, LaunchStore, SessionLauncher};
use gwent_sync_transport::{Inbound, RelayChannel, ServerMessage, TransportError, connect};
use thiserror::Error;

use crate::{
    dispatcher::{DesyncPolicy, DispatchOutcome, Dispatcher},
    interceptor::Interceptor,
    presenter::Presenter,
};

/// Adapter error.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),
}

/// Owns the relay connection for one session and replays what arrives.
///
/// Inbound messages are handled strictly one at a time: each replay runs to
/// completion before the next message is read.
pub struct MultiplayerAdapter {
    channel: RelayChannel,
    inbound: Inbound,
    dispatcher: Dispatcher,
    presenter: Arc<dyn Presenter>,
    policy: DesyncPolicy,
    lost_reported: bool,
}

impl MultiplayerAdapter {
    /// Connect to the relay for a launched session.
    ///
    /// # Errors
    /// Returns error if the relay cannot be reached.
    pub async fn connect(
        config: &RelayConfig,
        launch: Launch,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, AdapterError> {
        let Launch {
            session,
            credentials,
        } = launch;

        let (channel, inbound) = connect(
            config,
            session.id,
            session.local_player,
            &credentials.auth_token,
        )
        .await?;

        presenter.exit_offered();
        Ok(Self {
            channel,
            inbound,
            dispatcher: Dispatcher::new(session),
            presenter,
            policy: DesyncPolicy::default(),
            lost_reported: false,
        })
    }

    /// Set what happens after a move is dropped for desync.
    #[must_use]
    pub const fn with_policy(mut self, policy: DesyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The session, including the opponent once learned.
    #[must_use]
    pub const fn session(&self) -> &Session {
        self.dispatcher.session()
    }

    /// The sending half, for callers that need to send directly.
    #[must_use]
    pub const fn channel(&self) -> &RelayChannel {
        &self.channel
    }

    /// Whether the relay connection is still up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.channel.is_open()
    }

    /// Hook to register on the [`GameContext`] so local moves reach the relay.
    #[must_use]
    pub fn action_hook(&self) -> Arc<dyn ActionHook> {
        let session = self.dispatcher.session();
        Arc::new(Interceptor::new(
            session.id,
            session.local_player,
            Arc::new(self.channel.clone()),
        ))
    }

    /// Wait for the next relay message.
    ///
    /// Returns `None` once the connection is gone; the presenter hears
    /// about it the first time.
    pub async fn next_message(&mut self) -> Option<ServerMessage> {
        let msg = self.inbound.recv().await;
        if msg.is_none() && !self.lost_reported {
            self.lost_reported = true;
            tracing::warn!(
                session_id = %self.session().id,
                error = %SyncError::ConnectionLost,
                "Multiplayer session over"
            );
            self.presenter.connection_lost();
        }
        msg
    }

    /// Handle one message against `game`.
    pub async fn dispatch<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
        msg: ServerMessage,
    ) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch(game, msg).await;
        match &outcome {
            DispatchOutcome::Snapshot {
                opponent: Some(opponent),
            } => {
                self.presenter.opponent_named(&format!("Player {opponent}"));
            }
            DispatchOutcome::Dropped(SyncError::DesyncLookup(_))
                if self.policy == DesyncPolicy::RequestSnapshot =>
            {
                // Closed channels have already logged; nothing else to do.
                let _ = self.channel.request_state();
            }
            _ => {}
        }
        outcome
    }

    /// Read and handle one message.
    ///
    /// Returns `None` once the connection is gone.
    pub async fn pump<E: RulesEngine>(
        &mut self,
        game: &mut GameContext<E>,
    ) -> Option<DispatchOutcome> {
        let msg = self.next_message().await?;
        Some(self.dispatch(game, msg).await)
    }

    /// Handle messages until the connection is gone.
    pub async fn run<E: RulesEngine>(&mut self, game: &mut GameContext<E>) {
        while self.pump(game).await.is_some() {}
        tracing::debug!(session_id = %self.session().id, "Relay loop finished");
    }

    /// Close the relay connection. Idempotent.
    pub fn close(&self) -> bool {
        self.channel.close()
    }

    /// Leave the game: close the connection and clear the launch marker.
    ///
    /// # Errors
    /// Returns error if the launch marker cannot be cleared.
    pub async fn exit<S: LaunchStore>(
        self,
        launcher: &SessionLauncher<S>,
    ) -> Result<(), AdapterError> {
        self.close();
        launcher.exit().await?;
        Ok(())
    }
}
