use std::time::Duration;

use rand::Rng as _;
use serde::{Deserialize, Serialize};

use crate::{
    ConfigError, Coord, PieceSettings, Randomizer, Rotation, ScorePolicy, ScoringMode,
    ShapeCatalog, ShapeSeed, ShapeSource,
};

/// Options of a [`GameSession`](crate::GameSession).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```
/// use blockfall_engine::{ScoringMode, SessionConfig};
///
/// let config: SessionConfig =
///     serde_json::from_str(r#"{ "board_width": 8, "scoring": "progressive" }"#).unwrap();
/// assert_eq!(config.board_width, 8);
/// assert_eq!(config.board_height, 20);
/// assert_eq!(config.scoring, ScoringMode::Progressive);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub board_width: i32,
    pub board_height: i32,
    /// Where the pivot of every new piece is placed.
    pub spawn: Coord,
    /// Time between two gravity steps.
    pub fall_interval_ms: u64,
    /// How long a grounded piece may still be moved before it locks.
    pub lock_delay_ms: u64,
    /// Move the piece one row down after every successful rotation.
    pub drop_on_rotate: bool,
    /// Points per cleared row.
    pub base_score: u64,
    pub scoring: ScoringMode,
    pub randomizer: Randomizer,
    /// Fixed seed for the shape sequence. A random seed is drawn when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<ShapeSeed>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            board_width: 10,
            board_height: 20,
            spawn: Coord::new(4, 18),
            fall_interval_ms: 1000,
            lock_delay_ms: 500,
            drop_on_rotate: false,
            base_score: 100,
            scoring: ScoringMode::Linear,
            randomizer: Randomizer::Uniform,
            seed: None,
        }
    }
}

impl SessionConfig {
    /// Largest accepted board width or height.
    pub const MAX_BOARD_SIZE: i32 = 256;

    /// Checks that a session can be built from this configuration.
    ///
    /// The board dimensions must lie in `1..=MAX_BOARD_SIZE`, gravity must be running, and every
    /// shape must fit inside the board in its spawn orientation at `spawn`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let Self {
            board_width: width,
            board_height: height,
            spawn,
            ..
        } = *self;
        let size = 1..=Self::MAX_BOARD_SIZE;
        if !size.contains(&width) || !size.contains(&height) {
            return Err(ConfigError::InvalidBoardSize { width, height });
        }
        if self.fall_interval_ms == 0 {
            return Err(ConfigError::ZeroFallInterval);
        }
        let inside = |c: Coord| (0..width).contains(&c.x) && (0..height).contains(&c.y);
        let catalog = ShapeCatalog::new();
        for definition in catalog.definitions() {
            let cells = definition.cells(Rotation::SPAWN);
            if !cells.iter().all(|&offset| inside(offset + spawn)) {
                return Err(ConfigError::SpawnOutOfBounds {
                    kind: definition.kind(),
                    spawn,
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn fall_interval(&self) -> Duration {
        Duration::from_millis(self.fall_interval_ms)
    }

    #[must_use]
    pub fn lock_delay(&self) -> Duration {
        Duration::from_millis(self.lock_delay_ms)
    }

    #[must_use]
    pub fn piece_settings(&self) -> PieceSettings {
        PieceSettings {
            fall_interval: self.fall_interval(),
            lock_delay: self.lock_delay(),
            drop_on_rotate: self.drop_on_rotate,
        }
    }

    #[must_use]
    pub fn score_policy(&self) -> Box<dyn ScorePolicy> {
        self.scoring.policy(self.base_score)
    }

    /// Builds the configured shape source, drawing a fresh seed if none is set.
    #[must_use]
    pub fn shape_source(&self) -> Box<dyn ShapeSource> {
        let seed = self.seed.unwrap_or_else(|| rand::rng().random());
        self.randomizer.shape_source(seed)
    }
}
