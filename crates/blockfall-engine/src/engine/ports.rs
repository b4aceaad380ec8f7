use std::collections::VecDeque;

use arrayvec::ArrayVec;

use crate::{Coord, ShapeKind};

/// Receives changes of the visible cells.
///
/// The session never reads anything back from the renderer.
pub trait Renderer {
    fn draw_cells(&mut self, cells: &[(Coord, ShapeKind)]);
    fn clear_cells(&mut self, cells: &[Coord]);
    fn clear_all(&mut self);
}

/// Discrete player commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCw,
    RotateCcw,
}

impl InputEvent {
    pub const LEN: usize = 6;

    pub const ALL: [Self; Self::LEN] = [
        InputEvent::MoveLeft,
        InputEvent::MoveRight,
        InputEvent::SoftDrop,
        InputEvent::HardDrop,
        InputEvent::RotateCw,
        InputEvent::RotateCcw,
    ];
}

/// Events collected during one tick. Each event appears at most once.
pub type InputBatch = ArrayVec<InputEvent, { InputEvent::LEN }>;

/// Collects a batch from `events`, dropping repeats.
pub fn input_batch(events: impl IntoIterator<Item = InputEvent>) -> InputBatch {
    let mut batch = InputBatch::new();
    for event in events {
        if !batch.contains(&event) {
            batch.push(event);
        }
    }
    batch
}

/// Edge-triggered input, polled exactly once per tick.
pub trait InputSource {
    fn poll(&mut self) -> InputBatch;
}

/// Notified when the score total changes and when the game ends.
pub trait ScoreSink {
    fn on_score_changed(&mut self, total: u64);
    fn on_game_over(&mut self);
}

impl Renderer for () {
    fn draw_cells(&mut self, _cells: &[(Coord, ShapeKind)]) {}
    fn clear_cells(&mut self, _cells: &[Coord]) {}
    fn clear_all(&mut self) {}
}

impl InputSource for () {
    fn poll(&mut self) -> InputBatch {
        InputBatch::new()
    }
}

impl ScoreSink for () {
    fn on_score_changed(&mut self, _total: u64) {}
    fn on_game_over(&mut self) {}
}

/// Replays a prepared list of per-tick batches.
///
/// Once the script runs out every poll returns an empty batch.
///
/// # Example
///
/// ```
/// use blockfall_engine::{InputEvent, InputSource as _, ScriptedInput};
///
/// let mut input = ScriptedInput::new().idle(1).then([InputEvent::MoveLeft]);
/// assert!(input.poll().is_empty());
/// assert_eq!(input.poll().as_slice(), [InputEvent::MoveLeft]);
/// assert!(input.is_finished());
/// ```
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    ticks: VecDeque<InputBatch>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one tick carrying `events`.
    #[must_use]
    pub fn then(mut self, events: impl IntoIterator<Item = InputEvent>) -> Self {
        self.push(events);
        self
    }

    /// Appends `ticks` ticks without input.
    #[must_use]
    pub fn idle(mut self, ticks: usize) -> Self {
        self.ticks
            .extend(std::iter::repeat_n(InputBatch::new(), ticks));
        self
    }

    pub fn push(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.ticks.push_back(input_batch(events));
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ticks.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputBatch {
        self.ticks.pop_front().unwrap_or_default()
    }
}
