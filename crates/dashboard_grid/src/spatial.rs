//! Spatial index: which entities cover which cell.
//!
//! The [`SpatialIndex`] is the dashboard's local picture of the grid. It is
//! written only by the sync engine; everything else reads it.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::cell::{CellCoordinate, GridBounds};
use crate::entity::{EntityRef, EntitySnapshot};

/// Occupants of a single cell, keyed by entity reference.
///
/// A `BTreeMap` keeps enumeration order deterministic, so "the first occupant"
/// of a cell is stable between calls.
type Occupants = BTreeMap<EntityRef, Arc<EntitySnapshot>>;

/// Mapping from cell to the set of entities whose footprint covers it.
///
/// Cells with no occupants are not stored. Snapshots are shared between all
/// cells of a footprint through [`Arc`].
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Addressable extent of the grid.
    bounds: GridBounds,
    /// Occupied cells only.
    cells: HashMap<CellCoordinate, Occupants>,
}

impl SpatialIndex {
    /// Create an empty index for a grid with the given bounds.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            cells: HashMap::new(),
        }
    }

    /// Returns the grid bounds used by [`SpatialIndex::is_empty`].
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Replace the grid bounds. Occupancy is left untouched.
    pub fn set_bounds(&mut self, bounds: GridBounds) {
        self.bounds = bounds;
    }

    /// Iterate the entities covering `cell`. Yields nothing for unknown or
    /// out-of-range cells.
    pub fn occupants_of(&self, cell: CellCoordinate) -> impl Iterator<Item = &EntitySnapshot> + '_ {
        self.cells
            .get(&cell)
            .into_iter()
            .flat_map(|occupants| occupants.values())
            .map(Arc::as_ref)
    }

    /// References of the entities covering `cell`, in enumeration order.
    #[must_use]
    pub fn occupant_refs(&self, cell: CellCoordinate) -> Vec<EntityRef> {
        self.cells
            .get(&cell)
            .map(|occupants| occupants.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// The first-enumerated occupant of `cell`, if any.
    #[must_use]
    pub fn first_occupant(&self, cell: CellCoordinate) -> Option<&EntitySnapshot> {
        self.occupants_of(cell).next()
    }

    /// Number of entities covering `cell`.
    #[must_use]
    pub fn occupant_count(&self, cell: CellCoordinate) -> usize {
        self.cells.get(&cell).map_or(0, BTreeMap::len)
    }

    /// Returns `true` if `entity_ref` is recorded at `cell`.
    #[must_use]
    pub fn contains(&self, cell: CellCoordinate, entity_ref: &EntityRef) -> bool {
        self.cells
            .get(&cell)
            .is_some_and(|occupants| occupants.contains_key(entity_ref))
    }

    /// Returns `true` if `cell` is inside the grid and nothing covers it.
    ///
    /// Out-of-range cells are never empty, so a footprint that spills past the
    /// grid edge is never reported as available.
    #[must_use]
    pub fn is_empty(&self, cell: CellCoordinate) -> bool {
        self.bounds.contains(cell) && self.occupant_count(cell) == 0
    }

    /// Insert or replace `entity` at `cell`, keyed by its reference.
    pub fn put(&mut self, cell: CellCoordinate, entity: Arc<EntitySnapshot>) {
        self.cells
            .entry(cell)
            .or_default()
            .insert(entity.entity_ref.clone(), entity);
    }

    /// Remove `entity_ref` from `cell`. Removing an absent reference is a
    /// no-op. Returns `true` if something was removed.
    pub fn remove(&mut self, cell: CellCoordinate, entity_ref: &EntityRef) -> bool {
        let Some(occupants) = self.cells.get_mut(&cell) else {
            return false;
        };
        let removed = occupants.remove(entity_ref).is_some();
        if occupants.is_empty() {
            self.cells.remove(&cell);
        }
        removed
    }

    /// Drop all occupancy, keeping the bounds.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Iterate every cell that has at least one occupant, in no particular
    /// order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = CellCoordinate> + '_ {
        self.cells.keys().copied()
    }

    /// Number of cells with at least one occupant.
    #[must_use]
    pub fn occupied_cell_count(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::EntitySize;

    fn entity(raw: &str) -> Arc<EntitySnapshot> {
        Arc::new(EntitySnapshot::new(raw, CellCoordinate::ORIGIN, EntitySize::SINGLE))
    }

    #[test]
    fn test_unknown_cell_has_no_occupants() {
        let index = SpatialIndex::new(GridBounds::new(4, 4));
        assert_eq!(index.occupants_of(CellCoordinate::new(1, 1)).count(), 0);
        assert_eq!(index.occupants_of(CellCoordinate::new(-9, 99)).count(), 0);
        assert!(index.first_occupant(CellCoordinate::ORIGIN).is_none());
    }

    #[test]
    fn test_put_is_idempotent_upsert() {
        let mut index = SpatialIndex::new(GridBounds::new(4, 4));
        let cell = CellCoordinate::new(1, 1);
        index.put(cell, entity("UnitRef(1)"));
        index.put(cell, entity("UnitRef(1)"));
        assert_eq!(index.occupant_count(cell), 1);

        index.put(cell, entity("UnitRef(2)"));
        assert_eq!(index.occupant_count(cell), 2);
        assert_eq!(
            index.occupant_refs(cell),
            vec![EntityRef::new("UnitRef(1)"), EntityRef::new("UnitRef(2)")]
        );
    }

    #[test]
    fn test_remove_absent_ref_is_noop() {
        let mut index = SpatialIndex::new(GridBounds::new(4, 4));
        let cell = CellCoordinate::new(2, 2);
        index.put(cell, entity("UnitRef(1)"));

        assert!(!index.remove(cell, &EntityRef::new("UnitRef(9)")));
        assert!(!index.remove(CellCoordinate::new(3, 3), &EntityRef::new("UnitRef(1)")));
        assert_eq!(index.occupant_refs(cell), vec![EntityRef::new("UnitRef(1)")]);
    }

    #[test]
    fn test_remove_last_occupant_drops_cell() {
        let mut index = SpatialIndex::new(GridBounds::new(4, 4));
        let cell = CellCoordinate::new(2, 2);
        index.put(cell, entity("UnitRef(1)"));
        assert!(index.remove(cell, &EntityRef::new("UnitRef(1)")));
        assert_eq!(index.occupied_cell_count(), 0);
        assert!(index.is_empty(cell));
    }

    #[test]
    fn test_is_empty_polarity() {
        let mut index = SpatialIndex::new(GridBounds::new(4, 4));
        let occupied = CellCoordinate::new(0, 0);
        index.put(occupied, entity("UnitRef(1)"));

        assert!(index.is_empty(CellCoordinate::new(1, 0)));
        assert!(!index.is_empty(occupied));
        assert!(!index.is_empty(CellCoordinate::new(4, 0)));
        assert!(!index.is_empty(CellCoordinate::new(0, -1)));
    }

    #[test]
    fn test_clear_keeps_bounds() {
        let mut index = SpatialIndex::new(GridBounds::new(4, 4));
        index.put(CellCoordinate::ORIGIN, entity("UnitRef(1)"));
        index.clear();
        assert_eq!(index.occupied_cell_count(), 0);
        assert_eq!(index.bounds(), GridBounds::new(4, 4));
    }
}
