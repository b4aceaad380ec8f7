use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::coord::Coord;

/// Number of candidate offsets tried for each rotation transition.
pub const WALL_KICK_TESTS: usize = 5;

/// Number of rotation transitions (4 rotation states × 2 directions).
pub const WALL_KICK_SLOTS: usize = Rotation::COUNT * 2;

/// Candidate translations per rotation transition, in priority order.
pub type WallKickTable = [[Coord; WALL_KICK_TESTS]; WALL_KICK_SLOTS];

/// The seven tetromino kinds.
#[derive(
    Debug,
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
)]
#[repr(u8)]
pub enum ShapeKind {
    /// I-piece (4-long bar).
    I = 0,
    /// O-piece (square).
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<ShapeKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ShapeKind {
        ShapeKind::ALL[rng.random_range(0..ShapeKind::LEN)]
    }
}

impl ShapeKind {
    /// Number of shape kinds (7).
    pub const LEN: usize = 7;

    /// All kinds, in discriminant order.
    pub const ALL: [Self; Self::LEN] = [
        ShapeKind::I,
        ShapeKind::O,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::J,
        ShapeKind::L,
        ShapeKind::T,
    ];

    /// Returns the pivot this shape rotates about.
    ///
    /// The bar and the square turn about the corner shared by their four central
    /// cells, so they spin in place; every other shape turns about a cell center.
    #[must_use]
    pub const fn pivot(self) -> Pivot {
        match self {
            ShapeKind::I | ShapeKind::O => Pivot::HalfCell,
            ShapeKind::S | ShapeKind::Z | ShapeKind::J | ShapeKind::L | ShapeKind::T => {
                Pivot::Cell
            }
        }
    }

    const fn wall_kicks(self) -> &'static WallKickTable {
        match self {
            ShapeKind::I => &WALL_KICKS_I,
            _ => &WALL_KICKS_JLOSTZ,
        }
    }

    /// Returns the single character representation of this shape kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::I.as_char(), 'I');
    /// assert_eq!(ShapeKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            ShapeKind::I => 'I',
            ShapeKind::O => 'O',
            ShapeKind::S => 'S',
            ShapeKind::Z => 'Z',
            ShapeKind::J => 'J',
            ShapeKind::L => 'L',
            ShapeKind::T => 'T',
        }
    }

    /// Parses a shape kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use blockfall_engine::ShapeKind;
    ///
    /// assert_eq!(ShapeKind::from_char('O'), Some(ShapeKind::O));
    /// assert_eq!(ShapeKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(ShapeKind::I),
            'O' => Some(ShapeKind::O),
            'S' => Some(ShapeKind::S),
            'Z' => Some(ShapeKind::Z),
            'J' => Some(ShapeKind::J),
            'L' => Some(ShapeKind::L),
            'T' => Some(ShapeKind::T),
            _ => None,
        }
    }
}

/// Direction of a quarter turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum RotationDirection {
    /// Quarter turn clockwise (`+1`).
    Clockwise,
    /// Quarter turn counter-clockwise (`-1`).
    CounterClockwise,
}

impl RotationDirection {
    /// Returns `+1` for clockwise and `-1` for counter-clockwise.
    #[must_use]
    pub const fn sign(self) -> i32 {
        match self {
            RotationDirection::Clockwise => 1,
            RotationDirection::CounterClockwise => -1,
        }
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            RotationDirection::Clockwise => RotationDirection::CounterClockwise,
            RotationDirection::CounterClockwise => RotationDirection::Clockwise,
        }
    }

    const fn factor(self) -> f32 {
        match self {
            RotationDirection::Clockwise => 1.0,
            RotationDirection::CounterClockwise => -1.0,
        }
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: one quarter turn clockwise
/// - `2`: half turn
/// - `3`: one quarter turn counter-clockwise
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rotation(u8);

impl Rotation {
    /// Number of rotation states.
    pub const COUNT: usize = 4;
    /// Spawn orientation.
    pub const SPAWN: Self = Self(0);

    /// Creates a rotation state from its index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not in `0..4`.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < Self::COUNT, "rotation index out of range");
        Self(index)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        Self(wrap(self.0 as i32 + direction.sign(), Self::COUNT as i32) as u8)
    }
}

/// Non-negative modulo: `((x % m) + m) % m`.
pub(crate) const fn wrap(x: i32, m: i32) -> i32 {
    x.rem_euclid(m)
}

/// Index into a [`WallKickTable`] for the transition leaving `before` in `direction`.
#[must_use]
#[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub const fn wall_kick_slot(before: Rotation, direction: RotationDirection) -> usize {
    let offset = if matches!(direction, RotationDirection::CounterClockwise) {
        -1
    } else {
        0
    };
    wrap(before.0 as i32 * 2 + offset, WALL_KICK_SLOTS as i32) as usize
}

/// Fixed 90° rotation matrix `[cos, sin, -sin, cos]`.
const ROTATION_MATRIX: [f32; 4] = [0.0, 1.0, -1.0, 0.0];

/// Point a shape rotates about, which also selects the rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pivot {
    /// Rotates about the center of the `(0, 0)` cell; results are rounded to nearest.
    Cell,
    /// Rotates about the corner at `(0.5, 0.5)`; results are rounded up.
    HalfCell,
}

impl Pivot {
    /// Applies one quarter turn in `direction` to a relative cell offset.
    ///
    /// Turning back in the inverse direction restores the original offset exactly.
    #[must_use]
    #[expect(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn rotate(self, cell: Coord, direction: RotationDirection) -> Coord {
        let [m0, m1, m2, m3] = ROTATION_MATRIX;
        let d = direction.factor();
        let (mut x, mut y) = (cell.x as f32, cell.y as f32);
        match self {
            Pivot::Cell => {
                let rx = (x * m0 * d) + (y * m1 * d);
                let ry = (x * m2 * d) + (y * m3 * d);
                Coord::new(rx.round() as i32, ry.round() as i32)
            }
            Pivot::HalfCell => {
                x -= 0.5;
                y -= 0.5;
                let rx = (x * m0 * d) + (y * m1 * d);
                let ry = (x * m2 * d) + (y * m3 * d);
                Coord::new(rx.ceil() as i32, ry.ceil() as i32)
            }
        }
    }
}

/// Static data of one shape: its orientations and its wall-kick table.
///
/// All four orientations are computed once, when the definition is built, by
/// turning the spawn orientation clockwise with [`Pivot::rotate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShapeDefinition {
    kind: ShapeKind,
    rotations: [[Coord; 4]; Rotation::COUNT],
    wall_kicks: &'static WallKickTable,
}

impl ShapeDefinition {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        let pivot = kind.pivot();
        let mut rotations = [SPAWN_CELLS[kind as usize]; Rotation::COUNT];
        for i in 1..Rotation::COUNT {
            rotations[i] = rotations[i - 1].map(|c| pivot.rotate(c, RotationDirection::Clockwise));
        }
        Self {
            kind,
            rotations,
            wall_kicks: kind.wall_kicks(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    #[must_use]
    pub fn pivot(&self) -> Pivot {
        self.kind.pivot()
    }

    /// Relative cell offsets at the given rotation.
    #[must_use]
    pub fn cells(&self, rotation: Rotation) -> [Coord; 4] {
        self.rotations[rotation.index()]
    }

    /// Candidate translations for the transition leaving `before` in `direction`.
    ///
    /// The first candidate is always `(0, 0)`.
    #[must_use]
    pub fn wall_kicks(&self, before: Rotation, direction: RotationDirection) -> &'static [Coord] {
        &self.wall_kicks[wall_kick_slot(before, direction)]
    }
}

/// The set of all seven shape definitions.
///
/// # Example
///
/// ```
/// use blockfall_engine::{Rotation, ShapeCatalog, ShapeKind};
///
/// let catalog = ShapeCatalog::new();
/// let cells = catalog.cells_for(ShapeKind::I, Rotation::new(1));
/// assert!(cells.iter().all(|c| c.x == 1));
/// ```
#[derive(Debug, Clone)]
pub struct ShapeCatalog {
    definitions: [ShapeDefinition; ShapeKind::LEN],
}

impl Default for ShapeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: ShapeKind::ALL.map(ShapeDefinition::new),
        }
    }

    #[must_use]
    pub fn definition(&self, kind: ShapeKind) -> &ShapeDefinition {
        &self.definitions[kind as usize]
    }

    pub fn definitions(&self) -> impl Iterator<Item = &ShapeDefinition> + '_ {
        self.definitions.iter()
    }

    #[must_use]
    pub fn cells_for(&self, kind: ShapeKind, rotation: Rotation) -> [Coord; 4] {
        self.definition(kind).cells(rotation)
    }

    #[must_use]
    pub fn wall_kick_candidates(
        &self,
        kind: ShapeKind,
        before: Rotation,
        direction: RotationDirection,
    ) -> &'static [Coord] {
        self.definition(kind).wall_kicks(before, direction)
    }
}

const fn c(x: i32, y: i32) -> Coord {
    Coord::new(x, y)
}

/// Spawn orientation of each shape, indexed by `ShapeKind as usize`.
const SPAWN_CELLS: [[Coord; 4]; ShapeKind::LEN] = [
    // I
    [c(-1, 1), c(0, 1), c(1, 1), c(2, 1)],
    // O
    [c(0, 1), c(1, 1), c(0, 0), c(1, 0)],
    // S
    [c(0, 1), c(1, 1), c(-1, 0), c(0, 0)],
    // Z
    [c(-1, 1), c(0, 1), c(0, 0), c(1, 0)],
    // J
    [c(-1, 1), c(-1, 0), c(0, 0), c(1, 0)],
    // L
    [c(1, 1), c(-1, 0), c(0, 0), c(1, 0)],
    // T
    [c(0, 1), c(-1, 0), c(0, 0), c(1, 0)],
];

// Slot order: 0→1, 1→0, 1→2, 2→1, 2→3, 3→2, 3→0, 0→3
static WALL_KICKS_I: WallKickTable = [
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, -1), c(1, 2)],
    [c(0, 0), c(2, 0), c(-1, 0), c(2, 1), c(-1, -2)],
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, 2), c(2, -1)],
    [c(0, 0), c(1, 0), c(-2, 0), c(1, -2), c(-2, 1)],
    [c(0, 0), c(2, 0), c(-1, 0), c(2, 1), c(-1, -2)],
    [c(0, 0), c(-2, 0), c(1, 0), c(-2, -1), c(1, 2)],
    [c(0, 0), c(1, 0), c(-2, 0), c(1, -2), c(-2, 1)],
    [c(0, 0), c(-1, 0), c(2, 0), c(-1, 2), c(2, -1)],
];

static WALL_KICKS_JLOSTZ: WallKickTable = [
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)],
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],
    [c(0, 0), c(1, 0), c(1, -1), c(0, 2), c(1, 2)],
    [c(0, 0), c(-1, 0), c(-1, 1), c(0, -2), c(-1, -2)],
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)],
    [c(0, 0), c(-1, 0), c(-1, -1), c(0, 2), c(-1, 2)],
    [c(0, 0), c(1, 0), c(1, 1), c(0, -2), c(1, -2)],
];

#[cfg(test)]
mod tests {
    use super::*;

    const CW: RotationDirection = RotationDirection::Clockwise;
    const CCW: RotationDirection = RotationDirection::CounterClockwise;

    fn rotations() -> impl Iterator<Item = Rotation> {
        (0..4).map(Rotation::new)
    }

    fn sorted(mut cells: [Coord; 4]) -> [Coord; 4] {
        cells.sort();
        cells
    }

    #[test]
    fn test_every_orientation_has_four_distinct_cells() {
        let catalog = ShapeCatalog::new();
        for kind in ShapeKind::ALL {
            for rotation in rotations() {
                let cells = sorted(catalog.cells_for(kind, rotation));
                assert!(
                    cells.windows(2).all(|w| w[0] != w[1]),
                    "{kind} at {rotation:?} has duplicate cells: {cells:?}"
                );
            }
        }
    }

    #[test]
    fn test_rotation_round_trip() {
        let catalog = ShapeCatalog::new();
        for def in catalog.definitions() {
            let pivot = def.pivot();
            for rotation in rotations() {
                let cells = def.cells(rotation);
                for dir in [CW, CCW] {
                    let there = cells.map(|c| pivot.rotate(c, dir));
                    let back = there.map(|c| pivot.rotate(c, dir.inverse()));
                    assert_eq!(back, cells, "{} {rotation:?} {dir:?}", def.kind());
                }
            }
        }
    }

    #[test]
    fn test_runtime_transform_matches_precomputed_orientations() {
        let catalog = ShapeCatalog::new();
        for def in catalog.definitions() {
            let pivot = def.pivot();
            for rotation in rotations() {
                let turned = def.cells(rotation).map(|c| pivot.rotate(c, CW));
                assert_eq!(turned, def.cells(rotation.rotated(CW)));
                let turned = def.cells(rotation).map(|c| pivot.rotate(c, CCW));
                assert_eq!(turned, def.cells(rotation.rotated(CCW)));
            }
        }
    }

    #[test]
    fn test_clockwise_turns() {
        let catalog = ShapeCatalog::new();
        // T points right after one clockwise turn
        assert_eq!(
            sorted(catalog.cells_for(ShapeKind::T, Rotation::new(1))),
            sorted([c(1, 0), c(0, 1), c(0, 0), c(0, -1)])
        );
        // I becomes the vertical column right of center
        assert_eq!(
            catalog.cells_for(ShapeKind::I, Rotation::new(1)),
            [c(1, 2), c(1, 1), c(1, 0), c(1, -1)]
        );
    }

    #[test]
    fn test_square_does_not_travel() {
        let catalog = ShapeCatalog::new();
        let spawn = sorted(catalog.cells_for(ShapeKind::O, Rotation::SPAWN));
        for rotation in rotations() {
            assert_eq!(sorted(catalog.cells_for(ShapeKind::O, rotation)), spawn);
        }
    }

    #[test]
    fn test_bar_period_is_four() {
        let def = ShapeDefinition::new(ShapeKind::I);
        let pivot = def.pivot();
        let start = def.cells(Rotation::SPAWN);
        let mut cells = start;
        for turn in 1..=4 {
            cells = cells.map(|c| pivot.rotate(c, CW));
            if turn < 4 {
                assert_ne!(sorted(cells), sorted(start), "returned early after {turn}");
            }
        }
        assert_eq!(cells, start);
    }

    #[test]
    fn test_wall_kicks_try_in_place_first() {
        let catalog = ShapeCatalog::new();
        for kind in ShapeKind::ALL {
            for rotation in rotations() {
                for dir in [CW, CCW] {
                    let kicks = catalog.wall_kick_candidates(kind, rotation, dir);
                    assert_eq!(kicks.len(), WALL_KICK_TESTS);
                    assert_eq!(kicks[0], Coord::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_wall_kick_slot() {
        assert_eq!(wall_kick_slot(Rotation::new(0), CW), 0);
        assert_eq!(wall_kick_slot(Rotation::new(1), CCW), 1);
        assert_eq!(wall_kick_slot(Rotation::new(1), CW), 2);
        assert_eq!(wall_kick_slot(Rotation::new(3), CW), 6);
        assert_eq!(wall_kick_slot(Rotation::new(0), CCW), 7);
    }

    #[test]
    fn test_rotation_wraps() {
        assert_eq!(Rotation::new(3).rotated(CW), Rotation::new(0));
        assert_eq!(Rotation::new(0).rotated(CCW), Rotation::new(3));
        assert_eq!(wrap(-1, 8), 7);
        assert_eq!(wrap(9, 8), 1);
    }

    #[test]
    fn test_shape_kind_char_conversion() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(kind.to_string(), kind.as_char().to_string());
        }
        assert_eq!(ShapeKind::from_char('x'), None);
    }
}
