//! Footprint resolution.
//!
//! A footprint is the rectangle of cells an entity covers when anchored at a
//! given cell. Cells are enumerated column by column: `x` in the outer loop,
//! `y` in the inner loop.

use crate::cell::{CellCoordinate, EntitySize};
use crate::error::GridError;
use crate::spatial::SpatialIndex;

/// Enumerate the cells covered by a `size` footprint anchored at `anchor`.
///
/// Yields exactly `size.width * size.height` distinct cells inside
/// `[anchor.x, anchor.x + width) × [anchor.y, anchor.y + height)`.
///
/// # Errors
///
/// Returns [`GridError::OutOfRange`] if the far corner of the footprint lies
/// outside the `i32` coordinate range.
pub fn footprint_cells(
    anchor: CellCoordinate,
    size: EntitySize,
) -> Result<impl Iterator<Item = CellCoordinate>, GridError> {
    let out_of_range = || GridError::OutOfRange { anchor, size };
    let width = i32::try_from(size.width).map_err(|_| out_of_range())?;
    let height = i32::try_from(size.height).map_err(|_| out_of_range())?;
    anchor
        .checked_offset((width - 1).max(0), (height - 1).max(0))
        .ok_or_else(out_of_range)?;

    // The far corner is in range, so no cell in between can overflow.
    Ok((0..width).flat_map(move |i| (0..height).map(move |j| CellCoordinate::new(anchor.x + i, anchor.y + j))))
}

/// Covered cells plus the verdict on whether they form a legal target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    /// Covered cells in enumeration order.
    pub cells: Vec<CellCoordinate>,
    /// For placement: every cell is empty. For destroy: the cell is occupied.
    pub available: bool,
}

/// Resolves footprints against the current state of a [`SpatialIndex`].
#[derive(Debug, Clone, Copy)]
pub struct FootprintResolver<'a> {
    index: &'a SpatialIndex,
}

impl<'a> FootprintResolver<'a> {
    /// Create a resolver reading from `index`.
    #[must_use]
    pub fn new(index: &'a SpatialIndex) -> Self {
        Self { index }
    }

    /// Resolve a placement footprint. Available only if every covered cell
    /// is in range and unoccupied.
    ///
    /// A size that is empty or larger than the grid, or a footprint that runs
    /// past the coordinate range, resolves to no cells and is unavailable.
    #[must_use]
    pub fn resolve(&self, anchor: CellCoordinate, size: EntitySize) -> Footprint {
        let cells = size
            .validate()
            .and_then(|size| self.index.bounds().ensure_fits(size))
            .and_then(|size| footprint_cells(anchor, size));
        match cells {
            Ok(cells) => {
                let cells: Vec<_> = cells.collect();
                let available = cells.iter().all(|&cell| self.index.is_empty(cell));
                Footprint { cells, available }
            }
            Err(_) => Footprint {
                cells: Vec::new(),
                available: false,
            },
        }
    }

    /// Resolve a destroy target: always the single cell under the cursor,
    /// available only if something occupies it.
    #[must_use]
    pub fn resolve_destroy_target(&self, anchor: CellCoordinate) -> Footprint {
        Footprint {
            cells: vec![anchor],
            available: self.index.occupant_count(anchor) > 0,
        }
    }
}
