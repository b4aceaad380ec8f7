//! Static game data and the settled-cell model.
//!
//! - [`Coord`] - integer cell coordinate, y pointing up, row 0 at the floor
//! - [`ShapeCatalog`] - precomputed orientations and wall-kick tables of the seven shapes
//! - [`Grid`] - occupancy of settled cells, row completion and clearing

pub use self::{coord::*, grid::*, shape::*};

pub(crate) mod coord;
pub(crate) mod grid;
pub(crate) mod shape;
