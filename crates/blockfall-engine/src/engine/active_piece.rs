use std::time::Duration;

use crate::{
    InvalidPlacementError,
    core::{
        coord::Coord,
        grid::Grid,
        shape::{Rotation, RotationDirection, ShapeDefinition, ShapeKind},
    },
};

/// Lifecycle of an [`ActivePiece`].
///
/// ```text
/// Uninitialized ──initialize──▶ Falling ◀──successful move── Locking
///                                  │                            ▲
///                                  └──failed downward move──────┘
///                       Falling / Locking ──lock──▶ Committed ──initialize──▶ Falling
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum PieceState {
    /// No shape has been placed yet.
    Uninitialized,
    /// Free to move; the lock timer is not running.
    Falling,
    /// Resting on something; the lock timer counts down every tick.
    Locking,
    /// Cells have been written to the grid. The piece must be re-initialized.
    Committed,
}

/// Timing and rotation settings applied to every spawned piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceSettings {
    pub fall_interval: Duration,
    pub lock_delay: Duration,
    pub drop_on_rotate: bool,
}

/// A countdown timer that reports when it runs past zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration: Duration,
    remaining: Duration,
}

impl Countdown {
    #[must_use]
    pub const fn new(duration: Duration) -> Self {
        Self {
            duration,
            remaining: duration,
        }
    }

    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Subtracts `dt` and returns `true` if the timer went below zero.
    ///
    /// Reaching exactly zero does not count; the next non-zero step does.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if let Some(remaining) = self.remaining.checked_sub(dt) {
            self.remaining = remaining;
            false
        } else {
            self.remaining = Duration::ZERO;
            true
        }
    }

    pub fn reset(&mut self) {
        self.remaining = self.duration;
    }
}

/// Result of one [`ActivePiece::advance`] step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GravityOutcome {
    Continue,
    /// The lock delay has run out; the caller must [`ActivePiece::lock`] now.
    LockDue,
}

/// A piece whose cells have just been committed to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedPiece {
    pub kind: ShapeKind,
    pub cells: [Coord; 4],
    pub cleared_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Body {
    definition: ShapeDefinition,
    rotation: Rotation,
    position: Coord,
    offsets: [Coord; 4],
}

impl Body {
    fn cells_at(&self, position: Coord) -> [Coord; 4] {
        self.offsets.map(|offset| offset + position)
    }

    fn cells(&self) -> [Coord; 4] {
        self.cells_at(self.position)
    }

    fn apply_rotation(&mut self, direction: RotationDirection) {
        let pivot = self.definition.pivot();
        self.offsets = self.offsets.map(|offset| pivot.rotate(offset, direction));
    }
}

/// The currently falling piece.
///
/// The piece never writes to the [`Grid`] except through [`ActivePiece::lock`];
/// every other operation borrows the grid read-only to validate candidate cells.
/// Because its own cells are not in the grid while it falls, no self-collision
/// exclusion is needed.
///
/// # Contract
///
/// Moving, rotating, dropping or locking a piece that is [`PieceState::Uninitialized`]
/// or [`PieceState::Committed`] panics. In particular `lock` can only succeed once per
/// spawn.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{
///     ActivePiece, Coord, Grid, PieceSettings, RotationDirection, ShapeCatalog, ShapeKind,
/// };
///
/// let catalog = ShapeCatalog::new();
/// let mut grid = Grid::new(10, 20);
/// let mut piece = ActivePiece::new(PieceSettings {
///     fall_interval: Duration::from_secs(1),
///     lock_delay: Duration::from_millis(500),
///     drop_on_rotate: false,
/// });
///
/// piece
///     .initialize(catalog.definition(ShapeKind::T), Coord::new(4, 18), &grid)
///     .unwrap();
/// piece.move_by(Coord::LEFT, &grid).unwrap();
/// piece.rotate(RotationDirection::Clockwise, &grid).unwrap();
///
/// let locked = piece.hard_drop(&mut grid);
/// assert_eq!(locked.cleared_rows, 0);
/// assert!(grid.occupied_cells().count() == 4);
/// ```
#[derive(Debug, Clone)]
pub struct ActivePiece {
    settings: PieceSettings,
    state: PieceState,
    body: Option<Body>,
    fall_timer: Countdown,
    lock_timer: Countdown,
}

impl ActivePiece {
    #[must_use]
    pub fn new(settings: PieceSettings) -> Self {
        Self {
            settings,
            state: PieceState::Uninitialized,
            body: None,
            fall_timer: Countdown::new(settings.fall_interval),
            lock_timer: Countdown::new(settings.lock_delay),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PieceSettings {
        &self.settings
    }

    #[must_use]
    pub fn state(&self) -> PieceState {
        self.state
    }

    /// Returns `true` while the piece can be moved (falling or locking).
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state.is_falling() || self.state.is_locking()
    }

    #[must_use]
    pub fn fall_timer(&self) -> &Countdown {
        &self.fall_timer
    }

    #[must_use]
    pub fn lock_timer(&self) -> &Countdown {
        &self.lock_timer
    }

    #[must_use]
    pub fn kind(&self) -> Option<ShapeKind> {
        self.body.map(|body| body.definition.kind())
    }

    #[must_use]
    pub fn rotation(&self) -> Option<Rotation> {
        self.body.map(|body| body.rotation)
    }

    #[must_use]
    pub fn position(&self) -> Option<Coord> {
        self.body.map(|body| body.position)
    }

    /// Cell offsets relative to the position, in the current orientation.
    #[must_use]
    pub fn offsets(&self) -> Option<[Coord; 4]> {
        self.body.map(|body| body.offsets)
    }

    /// Absolute cell coordinates of the piece.
    #[must_use]
    pub fn cells(&self) -> Option<[Coord; 4]> {
        self.body.as_ref().map(Body::cells)
    }

    fn live_body(&self) -> &Body {
        assert!(
            self.is_live(),
            "operation on a piece that is {:?}",
            self.state
        );
        self.body.as_ref().expect("live piece has a body")
    }

    fn live_body_mut(&mut self) -> &mut Body {
        assert!(
            self.is_live(),
            "operation on a piece that is {:?}",
            self.state
        );
        self.body.as_mut().expect("live piece has a body")
    }

    /// Places a new shape at `spawn` in its spawn orientation and resets both timers.
    ///
    /// Returns an error, leaving the piece untouched, if any cell would be out of
    /// bounds or on a settled cell. The caller treats that as game over.
    pub fn initialize(
        &mut self,
        definition: &ShapeDefinition,
        spawn: Coord,
        grid: &Grid,
    ) -> Result<(), InvalidPlacementError> {
        let body = Body {
            definition: *definition,
            rotation: Rotation::SPAWN,
            position: spawn,
            offsets: definition.cells(Rotation::SPAWN),
        };
        if !Self::is_valid_position(&body.cells(), grid) {
            return Err(InvalidPlacementError);
        }
        self.body = Some(body);
        self.state = PieceState::Falling;
        self.fall_timer.reset();
        self.lock_timer.reset();
        Ok(())
    }

    /// Returns `true` if every candidate cell is in bounds and not settled.
    #[must_use]
    pub fn is_valid_position(cells: &[Coord; 4], grid: &Grid) -> bool {
        grid.is_valid_position(cells)
    }

    /// Translates the piece by `delta`.
    ///
    /// On success the lock timer is reset and the piece is `Falling` again.
    /// On failure nothing changes.
    pub fn move_by(&mut self, delta: Coord, grid: &Grid) -> Result<(), InvalidPlacementError> {
        let body = self.live_body();
        let target = body.position + delta;
        if !Self::is_valid_position(&body.cells_at(target), grid) {
            return Err(InvalidPlacementError);
        }
        self.live_body_mut().position = target;
        self.lock_timer.reset();
        self.state = PieceState::Falling;
        Ok(())
    }

    /// Moves one row down. If blocked, the piece starts (or keeps) locking.
    pub fn soft_drop(&mut self, grid: &Grid) -> Result<(), InvalidPlacementError> {
        let result = self.move_by(Coord::DOWN, grid);
        if result.is_err() {
            self.state = PieceState::Locking;
        }
        result
    }

    /// Runs gravity and the lock delay for one tick of length `dt`.
    ///
    /// When the fall timer runs out the piece tries to drop one row and the timer
    /// restarts whether or not that worked. While the piece is locking, the lock
    /// timer counts down and [`GravityOutcome::LockDue`] is returned as soon as it
    /// runs out.
    pub fn advance(&mut self, dt: Duration, grid: &Grid) -> GravityOutcome {
        let _ = self.live_body();
        if self.fall_timer.advance(dt) {
            self.fall_timer.reset();
            let _ = self.soft_drop(grid);
        }
        if self.state.is_locking() && self.lock_timer.advance(dt) {
            return GravityOutcome::LockDue;
        }
        GravityOutcome::Continue
    }

    /// Rotates a quarter turn, trying each wall-kick candidate in order.
    ///
    /// If no candidate fits, the rotation and cells are restored exactly as they
    /// were. With drop-on-rotate enabled, a successful rotation is followed by one
    /// soft drop, so a piece that cannot go lower starts locking.
    pub fn rotate(
        &mut self,
        direction: RotationDirection,
        grid: &Grid,
    ) -> Result<(), InvalidPlacementError> {
        let body = self.live_body_mut();
        let before = body.rotation;
        body.rotation = before.rotated(direction);
        body.apply_rotation(direction);

        let kicks = body.definition.wall_kicks(before, direction);
        let kicked = kicks.iter().any(|&kick| self.move_by(kick, grid).is_ok());
        if !kicked {
            let body = self.live_body_mut();
            body.rotation = before;
            body.apply_rotation(direction.inverse());
            return Err(InvalidPlacementError);
        }

        if self.settings.drop_on_rotate {
            let _ = self.soft_drop(grid);
        }
        Ok(())
    }

    /// Lowest position the piece could fall to from where it is now.
    ///
    /// Pure: neither the piece nor the grid is modified.
    #[must_use]
    pub fn ghost_cells(&self, grid: &Grid) -> [Coord; 4] {
        let body = self.live_body();
        let mut position = body.position;
        while Self::is_valid_position(&body.cells_at(position + Coord::DOWN), grid) {
            position += Coord::DOWN;
        }
        body.cells_at(position)
    }

    /// Drops the piece as far as it goes and locks it immediately.
    pub fn hard_drop(&mut self, grid: &mut Grid) -> LockedPiece {
        while self.move_by(Coord::DOWN, grid).is_ok() {}
        self.lock(grid)
    }

    /// Writes the piece into the grid and clears completed rows.
    ///
    /// After this the piece is [`PieceState::Committed`].
    pub fn lock(&mut self, grid: &mut Grid) -> LockedPiece {
        let body = *self.live_body();
        let cells = body.cells();
        let kind = body.definition.kind();
        for cell in cells {
            grid.set_cell(cell, Some(kind));
        }
        self.state = PieceState::Committed;
        let cleared_rows = grid.resolve_completed_rows();
        LockedPiece {
            kind,
            cells,
            cleared_rows,
        }
    }
}
