use serde::{Deserialize, Serialize};

/// Integer cell coordinate shared by the grid and the falling piece.
///
/// The origin is the bottom-left cell of the board. `x` grows to the right and
/// `y` grows upward, so row 0 is the floor.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::Add,
    derive_more::Sub,
    derive_more::AddAssign,
)]
#[display("({x}, {y})")]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const ZERO: Self = Self::new(0, 0);
    pub const LEFT: Self = Self::new(-1, 0);
    pub const RIGHT: Self = Self::new(1, 0);
    pub const DOWN: Self = Self::new(0, -1);

    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
