//! Game logic built on top of the [`core`](crate::core) data.
//!
//! - [`ActivePiece`] - the falling piece and its `Falling`/`Locking` state machine
//! - [`GameSession`] - owns grid, piece and timers; drives spawn, lock and game over
//! - [`ShapeSource`] - seedable shape sequences ([`UniformShapes`], [`BagShapes`])
//! - [`ScorePolicy`] - converts cleared rows into points ([`LinearScore`], [`ProgressiveScore`])
//! - [`Renderer`], [`InputSource`], [`ScoreSink`] - the boundary to the outside world
//!
//! # Game Flow
//!
//! 1. [`GameSession::new`] validates the [`SessionConfig`] and spawns the first piece
//! 2. The host calls [`GameSession::tick`] at a fixed step; gravity and lock delay run,
//!    then the polled input is applied one event at a time
//! 3. When the piece locks, completed rows are cleared, the score is updated and the
//!    next piece spawns
//! 4. A piece that cannot spawn ends the game
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use blockfall_engine::{GameSession, InputEvent, ScriptedInput, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::default(), (), ()).unwrap();
//! let mut input = ScriptedInput::new().then([InputEvent::HardDrop]);
//!
//! session.tick(Duration::from_millis(16), &mut input);
//! assert_eq!(session.stats().locked_pieces(), 1);
//! ```

pub use self::{
    active_piece::*, canvas::*, config::*, game_session::*, ports::*, scoring::*,
    shape_source::*,
};

mod active_piece;
mod canvas;
mod config;
mod game_session;
mod ports;
mod scoring;
mod shape_source;
