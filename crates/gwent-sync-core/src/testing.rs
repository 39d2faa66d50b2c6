//! In-memory rules engine for tests.
//!
//! `TableEngine` keeps just enough state to observe replays (hands, played
//! cards, passed flags, leader availability, whose turn it is) and records
//! every primitive call in order. Each async operation yields once to the
//! scheduler, standing in for an animation.

use async_trait::async_trait;

use crate::{CardId, CardRecord, RulesEngine, Seat};

/// Board rows, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Row {
    Close,
    Ranged,
    Siege,
}

/// Canonical row ordering used by [`TableEngine`].
pub const ROWS: [Row; 3] = [Row::Close, Row::Ranged, Row::Siege];

/// A card in a [`TableEngine`] hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCard {
    pub id: CardId,
}

impl CardRecord for TableCard {
    fn card_id(&self) -> &CardId {
        &self.id
    }
}

/// A primitive engine call, as recorded by [`TableEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    PassTurn(Seat),
    EndTurn(Seat),
    MoveToZone(Seat, CardId, Row),
    AutoResolve(Seat, CardId),
    ActivateLeader(Seat),
    DisableLeader(Seat),
    SetPassed(Seat, bool),
}

#[derive(Debug)]
struct Avatar {
    hand: Vec<TableCard>,
    played: Vec<(CardId, Option<Row>)>,
    passed: bool,
    leader_available: bool,
}

impl Avatar {
    fn with_hand<'a>(cards: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            hand: cards
                .into_iter()
                .map(|name| TableCard { id: CardId::new(name) })
                .collect(),
            played: Vec::new(),
            passed: false,
            leader_available: true,
        }
    }

    fn play(&mut self, card: &CardId, row: Option<Row>) {
        if let Some(pos) = self.hand.iter().position(|c| &c.id == card) {
            let card = self.hand.remove(pos);
            self.played.push((card.id, row));
        }
    }
}

/// Recording rules engine with two avatars.
#[derive(Debug)]
pub struct TableEngine {
    local: Avatar,
    opponent: Avatar,
    turn: Seat,
    calls: Vec<EngineCall>,
}

impl TableEngine {
    /// Create an engine with the given hands; `Seat::Local` moves first.
    #[must_use]
    pub fn new<'a>(
        local_hand: impl IntoIterator<Item = &'a str>,
        opponent_hand: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            local: Avatar::with_hand(local_hand),
            opponent: Avatar::with_hand(opponent_hand),
            turn: Seat::Local,
            calls: Vec::new(),
        }
    }

    /// Every primitive call so far.
    #[must_use]
    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }

    /// Cards `seat` has played, with the row when one was chosen.
    #[must_use]
    pub fn played(&self, seat: Seat) -> &[(CardId, Option<Row>)] {
        &self.avatar(seat).played
    }

    /// Whether `seat` has passed.
    #[must_use]
    pub fn passed(&self, seat: Seat) -> bool {
        self.avatar(seat).passed
    }

    /// Whose turn it is.
    #[must_use]
    pub const fn turn(&self) -> Seat {
        self.turn
    }

    const fn avatar(&self, seat: Seat) -> &Avatar {
        match seat {
            Seat::Local => &self.local,
            Seat::Opponent => &self.opponent,
        }
    }

    const fn avatar_mut(&mut self, seat: Seat) -> &mut Avatar {
        match seat {
            Seat::Local => &mut self.local,
            Seat::Opponent => &mut self.opponent,
        }
    }
}

const fn other(seat: Seat) -> Seat {
    match seat {
        Seat::Local => Seat::Opponent,
        Seat::Opponent => Seat::Local,
    }
}

#[async_trait]
impl RulesEngine for TableEngine {
    type Card = TableCard;
    type Zone = Row;

    fn hand(&self, seat: Seat) -> &[TableCard] {
        &self.avatar(seat).hand
    }

    fn zones(&self) -> &[Row] {
        &ROWS
    }

    fn leader_available(&self, seat: Seat) -> bool {
        self.avatar(seat).leader_available
    }

    async fn pass_turn(&mut self, seat: Seat) {
        tokio::task::yield_now().await;
        self.calls.push(EngineCall::PassTurn(seat));
        self.avatar_mut(seat).passed = true;
        self.turn = other(seat);
    }

    async fn end_turn(&mut self, seat: Seat) {
        tokio::task::yield_now().await;
        self.calls.push(EngineCall::EndTurn(seat));
        self.turn = other(seat);
    }

    async fn move_card_to_zone(&mut self, seat: Seat, card: &CardId, zone: &Row) {
        tokio::task::yield_now().await;
        self.calls
            .push(EngineCall::MoveToZone(seat, card.clone(), *zone));
        self.avatar_mut(seat).play(card, Some(*zone));
    }

    async fn auto_resolve_card(&mut self, seat: Seat, card: &CardId) {
        tokio::task::yield_now().await;
        self.calls.push(EngineCall::AutoResolve(seat, card.clone()));
        self.avatar_mut(seat).play(card, None);
    }

    async fn activate_leader_ability(&mut self, seat: Seat) {
        tokio::task::yield_now().await;
        self.calls.push(EngineCall::ActivateLeader(seat));
    }

    fn disable_leader(&mut self, seat: Seat) {
        self.calls.push(EngineCall::DisableLeader(seat));
        self.avatar_mut(seat).leader_available = false;
    }

    fn set_passed(&mut self, seat: Seat, passed: bool) {
        self.calls.push(EngineCall::SetPassed(seat, passed));
        self.avatar_mut(seat).passed = passed;
    }
}
