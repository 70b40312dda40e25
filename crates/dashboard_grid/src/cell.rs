//! Cell coordinates, footprint sizes, and grid extent.

use std::fmt;
use std::str::FromStr;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// An integer cell position on the simulation grid.
///
/// Coordinates carry no bounds of their own. Whether a cell is addressable is
/// decided by the [`GridBounds`] the dashboard was configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoordinate {
    /// Column, growing to the right.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl CellCoordinate {
    /// The grid origin `(0, 0)`.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate shifted by `(dx, dy)`, or `None` if either
    /// component leaves the `i32` range.
    #[must_use]
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self::new(self.x.checked_add(dx)?, self.y.checked_add(dy)?))
    }

    /// Returns the coordinate as a `glam` integer vector.
    #[must_use]
    pub const fn as_ivec2(self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

impl fmt::Display for CellCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Parses the `(x,y)` form produced by [`Display`](fmt::Display).
impl FromStr for CellCoordinate {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridError::InvalidPoint(s.to_string());
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;
        let (x, y) = inner.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse().map_err(|_| invalid())?;
        let y = y.trim().parse().map_err(|_| invalid())?;
        Ok(Self::new(x, y))
    }
}

/// Rectangular footprint of an entity, measured in cells.
///
/// The footprint is anchored at the entity's top-left cell and extends toward
/// increasing `x` (width) and increasing `y` (height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntitySize {
    /// Number of rows covered.
    pub height: u32,
    /// Number of columns covered.
    pub width: u32,
}

impl EntitySize {
    /// The single-cell footprint used by units and by destroy targeting.
    pub const SINGLE: Self = Self {
        height: 1,
        width: 1,
    };

    /// Create a size. Use [`EntitySize::validate`] for untrusted input.
    #[must_use]
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }

    /// Returns the size unchanged if both dimensions are positive.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySize`] if either dimension is zero.
    pub fn validate(self) -> Result<Self, GridError> {
        if self.height == 0 || self.width == 0 {
            return Err(GridError::EmptySize {
                height: self.height,
                width: self.width,
            });
        }
        Ok(self)
    }

    /// Number of cells covered by this footprint.
    #[must_use]
    pub const fn cell_count(self) -> u64 {
        self.height as u64 * self.width as u64
    }
}

impl Default for EntitySize {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl fmt::Display for EntitySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.height, self.width)
    }
}

/// The addressable extent of the grid: cells `[0, width) × [0, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl GridBounds {
    /// Create bounds for a `width × height` grid.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn extent(self) -> IVec2 {
        IVec2::new(
            i32::try_from(self.width).unwrap_or(i32::MAX),
            i32::try_from(self.height).unwrap_or(i32::MAX),
        )
    }

    /// Returns `true` if `cell` lies inside the grid.
    #[must_use]
    pub fn contains(self, cell: CellCoordinate) -> bool {
        let p = cell.as_ivec2();
        p.cmpge(IVec2::ZERO).all() && p.cmplt(self.extent()).all()
    }

    /// Returns `size` unchanged if a footprint of that size fits inside the
    /// grid at all.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Oversized`] if either dimension exceeds the grid.
    pub fn ensure_fits(self, size: EntitySize) -> Result<EntitySize, GridError> {
        if size.width > self.width || size.height > self.height {
            return Err(GridError::Oversized {
                size,
                width: self.width,
                height: self.height,
            });
        }
        Ok(size)
    }

    /// Iterate every addressable cell, row by row.
    pub fn cells(self) -> impl Iterator<Item = CellCoordinate> {
        let extent = self.extent();
        (0..extent.y).flat_map(move |y| (0..extent.x).map(move |x| CellCoordinate::new(x, y)))
    }
}
