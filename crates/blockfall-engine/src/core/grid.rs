use super::{coord::Coord, shape::ShapeKind};

/// Occupancy model of the board.
///
/// A `width × height` rectangle of cells, each either empty or holding the
/// [`ShapeKind`] that was locked into it. Only settled cells live here; the
/// falling piece is never written until it locks.
///
/// # Layout
///
/// - Row 0 is the floor and row `height - 1` is the top row
/// - Cells are stored row-major, bottom row first
/// - There is no sentinel border: bounds are checked explicitly with [`Grid::in_bounds`]
///
/// # Contract
///
/// [`Grid::is_occupied`], [`Grid::cell`] and [`Grid::set_cell`] only accept in-bounds
/// coordinates and panic otherwise. Callers are expected to check
/// [`Grid::in_bounds`] first (as [`Grid::is_valid_position`] does).
///
/// # Example
///
/// ```
/// use blockfall_engine::{Coord, Grid, ShapeKind};
///
/// let mut grid = Grid::new(10, 20);
/// for x in 0..10 {
///     grid.set_cell(Coord::new(x, 0), Some(ShapeKind::I));
/// }
/// assert_eq!(grid.resolve_completed_rows(), 1);
/// assert!(!grid.is_occupied(Coord::new(0, 0)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Option<ShapeKind>>,
}

impl Grid {
    /// Creates an empty grid.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is not positive.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        assert!(
            width > 0 && height > 0,
            "grid dimensions must be positive, got {width}x{height}"
        );
        Self {
            width,
            height,
            cells: vec![None; Self::area(width, height)],
        }
    }

    #[expect(clippy::cast_sign_loss)]
    fn area(width: i32, height: i32) -> usize {
        width as usize * height as usize
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Returns `true` iff `coord` lies within `[0, width) × [0, height)`.
    #[must_use]
    pub fn in_bounds(&self, coord: Coord) -> bool {
        (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y)
    }

    #[expect(clippy::cast_sign_loss)]
    fn index(&self, coord: Coord) -> usize {
        assert!(
            self.in_bounds(coord),
            "cell {coord} is outside the {}x{} grid",
            self.width,
            self.height
        );
        (coord.y * self.width + coord.x) as usize
    }

    #[expect(clippy::cast_sign_loss)]
    fn row_range(&self, row: i32) -> std::ops::Range<usize> {
        assert!(
            (0..self.height).contains(&row),
            "row {row} is outside the {}x{} grid",
            self.width,
            self.height
        );
        let start = (row * self.width) as usize;
        start..start + self.width as usize
    }

    /// Returns the tile locked at `coord`, or `None` if the cell is empty.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<ShapeKind> {
        self.cells[self.index(coord)]
    }

    /// Returns `true` if the in-bounds cell at `coord` holds a tile.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    #[must_use]
    pub fn is_occupied(&self, coord: Coord) -> bool {
        self.cell(coord).is_some()
    }

    /// Writes a tile (or clears it with `None`) unconditionally.
    ///
    /// # Panics
    ///
    /// Panics if `coord` is out of bounds.
    pub fn set_cell(&mut self, coord: Coord, tile: Option<ShapeKind>) {
        let index = self.index(coord);
        self.cells[index] = tile;
    }

    /// Returns `true` if every cell of `cells` is in bounds and empty.
    #[must_use]
    pub fn is_valid_position(&self, cells: &[Coord]) -> bool {
        cells
            .iter()
            .all(|&cell| self.in_bounds(cell) && !self.is_occupied(cell))
    }

    /// Returns `true` iff every column of `row` is occupied.
    #[must_use]
    pub fn is_row_complete(&self, row: i32) -> bool {
        self.cells[self.row_range(row)].iter().all(Option::is_some)
    }

    /// Empties `row` and shifts every row above it down by one.
    ///
    /// The top row is left empty.
    pub fn clear_row(&mut self, row: i32) {
        let range = self.row_range(row);
        let width = range.len();
        let len = self.cells.len();
        self.cells.copy_within(range.end.., range.start);
        self.cells[len - width..].fill(None);
    }

    /// Clears every complete row and returns how many were cleared.
    ///
    /// Rows are scanned from the floor upward. After a clear the same row index
    /// is checked again, since the row above has just moved into it.
    pub fn resolve_completed_rows(&mut self) -> usize {
        let mut cleared = 0;
        let mut row = 0;
        while row < self.height {
            if self.is_row_complete(row) {
                self.clear_row(row);
                cleared += 1;
            } else {
                row += 1;
            }
        }
        cleared
    }

    /// Returns an iterator over all occupied cells and their tiles.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (Coord, ShapeKind)> + '_ {
        let width = self.width;
        (0_i32..)
            .zip(&self.cells)
            .filter_map(move |(i, tile)| tile.map(|t| (Coord::new(i % width, i / width), t)))
    }

    /// Empties every cell.
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }
}
