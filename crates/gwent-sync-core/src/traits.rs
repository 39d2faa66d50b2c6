//! Core traits for the rules engine boundary and action observation.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CardId, LocalAction};

/// Which avatar an engine operation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Seat {
    /// The avatar driven by this client's UI.
    Local,
    /// The avatar mirrored from the peer.
    Opponent,
}

/// A card record held in an avatar's hand.
pub trait CardRecord {
    /// Stable identifier, shared by both clients.
    fn card_id(&self) -> &CardId;
}

/// The card-game rules engine, seen from the sync layer.
///
/// Operations may await animations or effect resolution; callers always
/// await them to completion before doing anything else. The engine knows
/// nothing about the network.
#[async_trait]
pub trait RulesEngine: Send {
    /// Hand entry type.
    type Card: CardRecord + Send + Sync;
    /// Board zone (row) type.
    type Zone: Clone + PartialEq + fmt::Debug + Send + Sync;

    /// Cards currently in `seat`'s hand, in hand order.
    fn hand(&self, seat: Seat) -> &[Self::Card];

    /// Canonical ordering of board zones, identical on both clients.
    fn zones(&self) -> &[Self::Zone];

    /// Whether `seat` can still use its leader ability.
    fn leader_available(&self, seat: Seat) -> bool;

    /// Pass the turn as a player action.
    async fn pass_turn(&mut self, seat: Seat);

    /// Hand the turn to the other avatar.
    async fn end_turn(&mut self, seat: Seat);

    /// Move a hand card into `zone`.
    async fn move_card_to_zone(&mut self, seat: Seat, card: &CardId, zone: &Self::Zone);

    /// Play a hand card with the engine's default placement.
    async fn auto_resolve_card(&mut self, seat: Seat, card: &CardId);

    /// Run the leader ability's effect.
    async fn activate_leader_ability(&mut self, seat: Seat);

    /// Mark the leader ability as used.
    fn disable_leader(&mut self, seat: Seat);

    /// Set whether `seat` has passed this round.
    fn set_passed(&mut self, seat: Seat, passed: bool);
}

/// Observer of completed player actions.
///
/// Registered once when a [`GameContext`](crate::GameContext) is built and
/// called after every user-level action, for both avatars. Implementations
/// must return promptly and must not fail.
pub trait ActionHook: Send + Sync {
    /// `action` has finished executing on `actor`'s avatar.
    fn action_completed(&self, actor: Seat, action: &LocalAction);
}
