//! Explicit game context shared by the UI and the sync layer.

use std::sync::Arc;

use crate::{ActionHook, CardId, LocalAction, RulesEngine, Seat};

/// One running game: the rules engine plus the observer of player actions.
///
/// Both avatars and the board live inside the engine; callers address an
/// avatar with a [`Seat`] instead of reaching for global references. The
/// UI drives `Seat::Local`, the replay path drives `Seat::Opponent`.
pub struct GameContext<E: RulesEngine> {
    engine: E,
    hook: Option<Arc<dyn ActionHook>>,
}

impl<E: RulesEngine> GameContext<E> {
    /// Create a context, registering the action hook up front.
    #[must_use]
    pub fn new(engine: E, hook: Option<Arc<dyn ActionHook>>) -> Self {
        Self { engine, hook }
    }

    /// Create a context for a game nobody observes (single player).
    #[must_use]
    pub fn unobserved(engine: E) -> Self {
        Self::new(engine, None)
    }

    /// Read access to the engine.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Consume the context, returning the engine.
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Cards in `seat`'s hand.
    #[must_use]
    pub fn hand(&self, seat: Seat) -> &[E::Card] {
        self.engine.hand(seat)
    }

    /// Canonical zone ordering.
    #[must_use]
    pub fn zones(&self) -> &[E::Zone] {
        self.engine.zones()
    }

    /// Whether `seat`'s leader ability is still usable.
    #[must_use]
    pub fn leader_available(&self, seat: Seat) -> bool {
        self.engine.leader_available(seat)
    }

    /// Pass the turn.
    pub async fn pass_turn(&mut self, seat: Seat) {
        self.engine.pass_turn(seat).await;
        self.notify(seat, &LocalAction::PassTurn);
    }

    /// Play `card` from `seat`'s hand into `zone`.
    pub async fn play_card_to_zone(&mut self, seat: Seat, card: &CardId, zone: &E::Zone) {
        self.engine.move_card_to_zone(seat, card, zone).await;

        let action = match self.engine.zones().iter().position(|z| z == zone) {
            Some(zone_index) => LocalAction::PlayCardToZone {
                card: card.clone(),
                zone_index,
            },
            None => {
                tracing::warn!(%card, ?zone, "Zone missing from canonical ordering, reporting untargeted play");
                LocalAction::PlayCard { card: card.clone() }
            }
        };
        self.notify(seat, &action);
    }

    /// Play `card` from `seat`'s hand with default placement.
    pub async fn play_card(&mut self, seat: Seat, card: &CardId) {
        self.engine.auto_resolve_card(seat, card).await;
        self.notify(seat, &LocalAction::PlayCard { card: card.clone() });
    }

    /// Activate `seat`'s leader ability and mark it used.
    pub async fn activate_leader(&mut self, seat: Seat) {
        self.engine.activate_leader_ability(seat).await;
        self.engine.disable_leader(seat);
        self.notify(seat, &LocalAction::ActivateLeader);
    }

    /// Set `seat`'s passed flag without ending anything.
    pub fn set_passed(&mut self, seat: Seat, passed: bool) {
        self.engine.set_passed(seat, passed);
    }

    /// End `seat`'s turn.
    pub async fn end_turn(&mut self, seat: Seat) {
        self.engine.end_turn(seat).await;
    }

    fn notify(&self, actor: Seat, action: &LocalAction) {
        if let Some(hook) = &self.hook {
            hook.action_completed(actor, action);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::testing::{EngineCall, TableEngine};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Seat, LocalAction)>>);

    impl ActionHook for Recorder {
        fn action_completed(&self, actor: Seat, action: &LocalAction) {
            self.0.lock().unwrap().push((actor, action.clone()));
        }
    }

    fn context() -> (GameContext<TableEngine>, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let engine = TableEngine::new(["Geralt", "Ciri"], ["Yennefer"]);
        let hook: Arc<dyn ActionHook> = recorder.clone();
        (GameContext::new(engine, Some(hook)), recorder)
    }

    #[tokio::test]
    async fn test_hook_runs_after_engine_operation() {
        let (mut ctx, recorder) = context();
        ctx.play_card(Seat::Local, &CardId::new("Geralt")).await;

        assert_eq!(
            ctx.engine().calls(),
            &[EngineCall::AutoResolve(Seat::Local, CardId::new("Geralt"))]
        );
        assert_eq!(
            recorder.0.lock().unwrap().as_slice(),
            &[(Seat::Local, LocalAction::PlayCard { card: CardId::new("Geralt") })]
        );
    }

    #[tokio::test]
    async fn test_zone_play_reports_canonical_index() {
        let (mut ctx, recorder) = context();
        let ranged = ctx.zones()[1];
        ctx.play_card_to_zone(Seat::Local, &CardId::new("Ciri"), &ranged).await;

        assert_eq!(
            recorder.0.lock().unwrap().as_slice(),
            &[(
                Seat::Local,
                LocalAction::PlayCardToZone {
                    card: CardId::new("Ciri"),
                    zone_index: 1,
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_hook_sees_actor_seat() {
        let (mut ctx, recorder) = context();
        ctx.activate_leader(Seat::Opponent).await;

        assert!(!ctx.leader_available(Seat::Opponent));
        assert_eq!(
            recorder.0.lock().unwrap().as_slice(),
            &[(Seat::Opponent, LocalAction::ActivateLeader)]
        );
    }

    #[test]
    fn test_unobserved_context_runs_without_hook() {
        let mut ctx = GameContext::unobserved(TableEngine::new(["Geralt"], ["Ciri"]));
        tokio_test::block_on(ctx.pass_turn(Seat::Local));
        assert_eq!(ctx.engine().calls(), &[EngineCall::PassTurn(Seat::Local)]);
    }
}
