use std::iter;

use blockfall_engine::{CellCanvas, Coord};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};

use crate::view::widgets::{BlockDisplay, CellView};

/// Paints the cells mirrored by a [`CellCanvas`], top row first.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    canvas: &'a CellCanvas,
    ghost: Option<[Coord; 4]>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(canvas: &'a CellCanvas) -> Self {
        Self {
            canvas,
            ghost: None,
            block: None,
        }
    }

    pub fn ghost(self, cells: [Coord; 4]) -> Self {
        Self {
            ghost: Some(cells),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn columns(&self) -> u16 {
        u16::try_from(self.canvas.width()).unwrap_or(0)
    }

    fn rows(&self) -> u16 {
        u16::try_from(self.canvas.height()).unwrap_or(0)
    }

    pub fn width(&self) -> u16 {
        self.columns() * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        self.rows() * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    fn cell_view(&self, coord: Coord) -> CellView {
        if let Some(kind) = self.canvas.cell(coord) {
            CellView::Tile(kind)
        } else if self.ghost.is_some_and(|ghost| ghost.contains(&coord)) {
            CellView::Ghost
        } else {
            CellView::Empty
        }
    }
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints =
            (0..self.columns()).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints = (0..self.rows()).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        // screen rows run top-down while board rows count up from the floor
        let board_rows = (0..self.canvas.height()).rev();
        for (row_area, y) in iter::zip(vertical.split(area).iter(), board_rows) {
            let cell_areas = horizontal.split(*row_area);
            for (cell_area, x) in iter::zip(cell_areas.iter(), 0..self.canvas.width()) {
                let view = self.cell_view(Coord::new(x, y));
                BlockDisplay::from_cell(view).render(*cell_area, buf);
            }
        }
    }
}
