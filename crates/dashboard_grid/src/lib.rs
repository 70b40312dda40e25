//! # dashboard_grid
//!
//! The spatial model of the operator dashboard: what occupies which cell of
//! the simulation grid.
//!
//! This crate provides:
//!
//! - [`CellCoordinate`] — integer `(x, y)` cell keys.
//! - [`EntitySize`] — rectangular footprint dimensions.
//! - [`GridBounds`] — the addressable extent of the grid.
//! - [`EntityRef`] / [`EntitySnapshot`] — entity identity and the immutable
//!   data received from the simulation.
//! - [`SpatialIndex`] — cell → occupying entities.
//! - [`FootprintResolver`] — covered cells and placement availability.

pub mod cell;
pub mod entity;
pub mod error;
pub mod footprint;
pub mod spatial;

pub use cell::{CellCoordinate, EntitySize, GridBounds};
pub use entity::{EntityRef, EntitySnapshot, EntitySpec};
pub use error::GridError;
pub use footprint::{Footprint, FootprintResolver, footprint_cells};
pub use spatial::SpatialIndex;
