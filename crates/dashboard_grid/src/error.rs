//! Grid-model error types.

use crate::cell::{CellCoordinate, EntitySize};

/// Errors produced while parsing or validating grid values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    /// A textual point was not of the form `(x,y)`.
    #[error("invalid cell point: {0:?}")]
    InvalidPoint(String),

    /// An entity size had a zero dimension.
    #[error("entity size must be positive, got {height}x{width}")]
    EmptySize {
        /// The offending height.
        height: u32,
        /// The offending width.
        width: u32,
    },

    /// A footprint would extend past the `i32` coordinate range.
    #[error("footprint {size} at {anchor} leaves the coordinate range")]
    OutOfRange {
        /// The footprint's anchor.
        anchor: CellCoordinate,
        /// The footprint's size.
        size: EntitySize,
    },

    /// An entity size is larger than the grid it would be placed on.
    #[error("entity size {size} does not fit a {width}-wide, {height}-high grid")]
    Oversized {
        /// The offending size.
        size: EntitySize,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
}
