//! Synchronization failure taxonomy.

use thiserror::Error;

use crate::CardId;

/// Failure raised while keeping two clients in step.
///
/// Only [`SyncError::ConnectionLost`] is user-visible; the other variants
/// are logged and the offending move is dropped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The relay channel closed or errored. Terminal for the session.
    #[error("Connection to relay lost")]
    ConnectionLost,
    /// A replayed move referenced something the local copy does not have.
    #[error("Desync: {0}")]
    DesyncLookup(#[from] DesyncKind),
    /// An inbound payload could not be interpreted.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}

/// What a replay failed to find.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DesyncKind {
    /// The named card is not in the opponent's hand.
    #[error("card {0} not in opponent hand")]
    CardNotInHand(CardId),
    /// The zone index is past the end of the canonical ordering.
    #[error("zone index {index} outside {len} zones")]
    ZoneOutOfRange {
        /// Index carried by the move.
        index: usize,
        /// Number of zones on this client.
        len: usize,
    },
    /// The opponent's leader ability was already used.
    #[error("opponent leader ability unavailable")]
    LeaderUnavailable,
}
