use crate::{Coord, Renderer, ShapeKind};

/// A [`Renderer`] that mirrors drawn cells into a fixed-size buffer.
///
/// Front ends read the buffer back to paint the board. Cells drawn outside the
/// buffer are ignored.
///
/// # Example
///
/// ```
/// use blockfall_engine::{CellCanvas, Coord, Renderer as _, ShapeKind};
///
/// let mut canvas = CellCanvas::new(10, 20);
/// canvas.draw_cells(&[(Coord::new(3, 0), ShapeKind::T)]);
/// assert_eq!(canvas.cell(Coord::new(3, 0)), Some(ShapeKind::T));
///
/// canvas.clear_all();
/// assert_eq!(canvas.cell(Coord::new(3, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellCanvas {
    width: i32,
    height: i32,
    cells: Vec<Option<ShapeKind>>,
}

impl CellCanvas {
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        let area = usize::try_from(width).unwrap_or(0) * usize::try_from(height).unwrap_or(0);
        Self {
            width,
            height,
            cells: vec![None; area],
        }
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[expect(clippy::cast_sign_loss)]
    fn index(&self, coord: Coord) -> Option<usize> {
        let inside = (0..self.width).contains(&coord.x) && (0..self.height).contains(&coord.y);
        inside.then(|| (coord.y * self.width + coord.x) as usize)
    }

    /// Returns the drawn tile at `coord`, `None` if blank or outside the buffer.
    #[must_use]
    pub fn cell(&self, coord: Coord) -> Option<ShapeKind> {
        self.index(coord).and_then(|i| self.cells[i])
    }

    pub fn drawn_cells(&self) -> impl Iterator<Item = (Coord, ShapeKind)> + '_ {
        let width = self.width;
        (0_i32..)
            .zip(&self.cells)
            .filter_map(move |(i, tile)| tile.map(|t| (Coord::new(i % width, i / width), t)))
    }
}

impl Renderer for CellCanvas {
    fn draw_cells(&mut self, cells: &[(Coord, ShapeKind)]) {
        for &(coord, kind) in cells {
            if let Some(i) = self.index(coord) {
                self.cells[i] = Some(kind);
            }
        }
    }

    fn clear_cells(&mut self, cells: &[Coord]) {
        for &coord in cells {
            if let Some(i) = self.index(coord) {
                self.cells[i] = None;
            }
        }
    }

    fn clear_all(&mut self) {
        self.cells.fill(None);
    }
}
