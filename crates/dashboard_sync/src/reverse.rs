//! Reverse lookup from entity reference to its current placement.

use std::collections::HashMap;

use dashboard_grid::{CellCoordinate, EntityRef, EntitySize, footprint_cells};

/// Where an entity currently sits: its anchor and the size it was indexed
/// with, which together give back every cell it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Anchor (top-left) cell.
    pub anchor: CellCoordinate,
    /// Footprint size at indexing time.
    pub size: EntitySize,
}

impl Placement {
    /// Cells covered by this placement.
    ///
    /// Placements are only recorded once their footprint has been enumerated,
    /// so this yields the same cells that were indexed.
    pub fn cells(self) -> impl Iterator<Item = CellCoordinate> {
        footprint_cells(self.anchor, self.size).into_iter().flatten()
    }
}

/// Mapping from entity reference to its current [`Placement`].
///
/// Written in lock-step with the spatial index by the sync engine.
#[derive(Debug, Clone, Default)]
pub struct ReverseIndex {
    placements: HashMap<EntityRef, Placement>,
}

impl ReverseIndex {
    /// Create an empty reverse index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the placement recorded for `entity_ref`.
    #[must_use]
    pub fn get(&self, entity_ref: &EntityRef) -> Option<Placement> {
        self.placements.get(entity_ref).copied()
    }

    /// Returns the anchor recorded for `entity_ref`.
    #[must_use]
    pub fn anchor_of(&self, entity_ref: &EntityRef) -> Option<CellCoordinate> {
        self.get(entity_ref).map(|p| p.anchor)
    }

    /// Record (or replace) the placement of `entity_ref`.
    pub fn insert(&mut self, entity_ref: EntityRef, placement: Placement) {
        self.placements.insert(entity_ref, placement);
    }

    /// Forget `entity_ref`, returning its last placement.
    pub fn remove(&mut self, entity_ref: &EntityRef) -> Option<Placement> {
        self.placements.remove(entity_ref)
    }

    /// Number of tracked entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Returns `true` if no entity is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Forget every entity.
    pub fn clear(&mut self) {
        self.placements.clear();
    }

    /// Iterate tracked entities and their placements.
    pub fn iter(&self) -> impl Iterator<Item = (&EntityRef, &Placement)> {
        self.placements.iter()
    }
}
