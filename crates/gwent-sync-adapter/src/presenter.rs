//! Presentation boundary.
//!
//! The sync layer only pushes to the UI; it never reads UI state back.

/// What the player gets to see from the sync layer.
///
/// Implement this trait to integrate with your menus and HUD.
pub trait Presenter: Send + Sync {
    /// The opponent's display name is known (or changed).
    fn opponent_named(&self, name: &str);

    /// Offer a way back to the menu for the running multiplayer game.
    fn exit_offered(&self);

    /// The relay connection is gone; the game cannot continue.
    ///
    /// Called at most once per adapter.
    fn connection_lost(&self);
}

/// No-op presenter.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn opponent_named(&self, _name: &str) {}

    fn exit_offered(&self) {}

    fn connection_lost(&self) {}
}
