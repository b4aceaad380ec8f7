use crossterm::event::Event as CrosstermEvent;

#[derive(Debug, Clone, derive_more::From)]
pub(super) enum TuiEvent {
    /// Fixed-step game update.
    Tick,
    /// Redraw after a tick or an input event.
    Render,
    /// Key input, resize and other terminal events.
    Crossterm(CrosstermEvent),
}
