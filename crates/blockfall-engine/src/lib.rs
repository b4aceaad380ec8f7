//! Rules engine for a falling-block puzzle game.
//!
//! The crate is split into two layers:
//!
//! - [`core`] - static shape data, coordinates and the occupancy [`Grid`]
//! - [`engine`] - the [`ActivePiece`] state machine and the tick-driven [`GameSession`]
//!
//! Rendering, input and score reporting are reached only through the
//! [`Renderer`], [`InputSource`] and [`ScoreSink`] traits, so the engine is
//! synchronous, deterministic for a given seed, and has no I/O of its own.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

/// The requested cells are out of bounds or overlap settled cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("piece does not fit at the requested position")]
pub struct InvalidPlacementError;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ConfigError {
    #[display("board size must be between 1 and 256 cells per side, got {width}x{height}")]
    InvalidBoardSize { width: i32, height: i32 },
    #[display("fall interval must not be zero")]
    ZeroFallInterval,
    #[display("{kind} piece does not fit on the board when spawned at {spawn}")]
    SpawnOutOfBounds { kind: ShapeKind, spawn: Coord },
}
