//! The entity sync engine.
//!
//! [`EntitySyncEngine`] owns the [`SpatialIndex`] and the [`ReverseIndex`] and
//! is the only thing that writes to them. Events are applied one at a time in
//! arrival order; each is either applied completely or rejected without
//! touching either index.

use std::sync::Arc;

use dashboard_grid::{CellCoordinate, EntityRef, EntitySnapshot, GridBounds, GridError, SpatialIndex, footprint_cells};
use dashboard_net::messages::{EntityEventMessage, GridSnapshot};
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::event::{EntityEvent, EntityEventKind};
use crate::reverse::{Placement, ReverseIndex};

/// Counters describing what the engine has done since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Events applied.
    pub applied: u64,
    /// Events rejected as malformed or of unknown kind.
    pub rejected: u64,
    /// Moves for entities with no known prior placement.
    pub stale_moves: u64,
}

/// Outcome of applying one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedEvent {
    /// Kind of the applied event.
    pub kind: EntityEventKind,
    /// Entity affected.
    pub entity_ref: EntityRef,
    /// Anchor the event targeted.
    pub target_cell: CellCoordinate,
    /// Anchor the entity had before the event, if it was known.
    pub previous_anchor: Option<CellCoordinate>,
}

/// Applies entity events to the spatial index.
#[derive(Debug, Clone)]
pub struct EntitySyncEngine {
    /// Cell → occupying entities.
    index: SpatialIndex,
    /// Entity → current placement.
    reverse: ReverseIndex,
    /// Running counters.
    stats: SyncStats,
}

impl EntitySyncEngine {
    /// Create an engine with an empty grid of the given bounds.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            index: SpatialIndex::new(bounds),
            reverse: ReverseIndex::new(),
            stats: SyncStats::default(),
        }
    }

    /// Read-only view of the spatial index.
    #[must_use]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Read-only view of the reverse index.
    #[must_use]
    pub fn reverse(&self) -> &ReverseIndex {
        &self.reverse
    }

    /// Returns the running counters.
    #[must_use]
    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    /// Number of entities currently on the grid.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.reverse.len()
    }

    /// Current anchor of `entity_ref`, if known.
    #[must_use]
    pub fn anchor_of(&self, entity_ref: &EntityRef) -> Option<CellCoordinate> {
        self.reverse.anchor_of(entity_ref)
    }

    /// Validate and apply one channel message, reporting rejections to the
    /// log instead of the caller.
    pub fn ingest(&mut self, msg: &EntityEventMessage) -> Option<AppliedEvent> {
        match self.apply_message(msg) {
            Ok(applied) => Some(applied),
            Err(e) => {
                warn!(id = msg.id, error = %e, "rejected entity event");
                None
            }
        }
    }

    /// Validate and apply one channel message.
    ///
    /// # Errors
    ///
    /// Returns a [`SyncError`] if the message is malformed, of unknown kind,
    /// or carries an entity that cannot be placed on the grid. Neither index
    /// is modified in that case.
    pub fn apply_message(&mut self, msg: &EntityEventMessage) -> Result<AppliedEvent, SyncError> {
        let result = EntityEvent::try_from(msg).and_then(|event| self.apply(event));
        if result.is_err() {
            self.stats.rejected += 1;
        }
        result
    }

    /// Apply a validated event.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidEntity`] if the entity's footprint does
    /// not fit the grid or runs past the coordinate range.
    pub fn apply(&mut self, event: EntityEvent) -> Result<AppliedEvent, SyncError> {
        let entity_ref = event.entity.entity_ref.clone();
        let target_cell = event.target_cell;
        let previous_anchor = match event.kind {
            EntityEventKind::Created => self.on_created(target_cell, event.entity)?,
            EntityEventKind::Destroyed => self.on_destroyed(target_cell, &event.entity)?,
            EntityEventKind::Moved => self.on_moved(target_cell, event.entity)?,
        };
        self.stats.applied += 1;

        debug!(
            kind = %event.kind,
            entity_ref = %entity_ref,
            cell = %target_cell,
            previous = ?previous_anchor,
            "applied entity event"
        );

        Ok(AppliedEvent {
            kind: event.kind,
            entity_ref,
            target_cell,
            previous_anchor,
        })
    }

    /// Index `entity` over its footprint at `target_cell`.
    ///
    /// A repeated create for an already indexed entity first clears the cells
    /// of its previous placement. Returns that previous anchor, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidEntity`] if the footprint cannot be
    /// placed. Neither index is modified in that case.
    pub fn on_created(
        &mut self,
        target_cell: CellCoordinate,
        entity: Arc<EntitySnapshot>,
    ) -> Result<Option<CellCoordinate>, SyncError> {
        let cells = self.footprint(target_cell, &entity)?;
        let previous = self.clear_placement(&entity.entity_ref);
        self.place(target_cell, &cells, entity);
        Ok(previous.map(|p| p.anchor))
    }

    /// Remove `entity` from its footprint at `target_cell` and forget it.
    ///
    /// If the entity was known at a different anchor, that placement is
    /// cleared as well. Returns the anchor that was known, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidEntity`] if the footprint cannot be
    /// placed. Neither index is modified in that case.
    pub fn on_destroyed(
        &mut self,
        target_cell: CellCoordinate,
        entity: &EntitySnapshot,
    ) -> Result<Option<CellCoordinate>, SyncError> {
        for cell in self.footprint(target_cell, entity)? {
            self.index.remove(cell, &entity.entity_ref);
        }
        Ok(self.clear_placement(&entity.entity_ref).map(|p| p.anchor))
    }

    /// Move `entity` to `target_cell`: clear its previous footprint, if known,
    /// then index it at the new anchor.
    ///
    /// With no known previous placement the removal step is skipped and the
    /// entity is simply indexed at `target_cell`. The previous footprint is
    /// cleared with the size it was indexed with, even if the move carries a
    /// different one.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::InvalidEntity`] if the new footprint cannot be
    /// placed. Neither index is modified in that case.
    pub fn on_moved(
        &mut self,
        target_cell: CellCoordinate,
        entity: Arc<EntitySnapshot>,
    ) -> Result<Option<CellCoordinate>, SyncError> {
        let cells = self.footprint(target_cell, &entity)?;
        let previous = self.clear_placement(&entity.entity_ref);
        if previous.is_none() {
            self.stats.stale_moves += 1;
            debug!(entity_ref = %entity.entity_ref, cell = %target_cell, "move without known prior anchor");
        }
        self.place(target_cell, &cells, entity);
        Ok(previous.map(|p| p.anchor))
    }

    /// Replace all state with the contents of a full grid snapshot.
    ///
    /// Used on startup and after the connection to the simulation is
    /// re-established. Entities are anchored at their `parentCell`; entities
    /// that cannot be placed are skipped.
    pub fn bootstrap(&mut self, snapshot: GridSnapshot) {
        self.index.clear();
        self.reverse.clear();
        if let Some(bounds) = snapshot.bounds {
            self.index.set_bounds(bounds);
        }

        let total = snapshot.entities.len();
        let mut skipped = 0usize;
        for entity in snapshot.entities {
            let anchor = entity.parent_cell;
            if let Err(e) = self.on_created(anchor, Arc::new(entity)) {
                warn!(cell = %anchor, error = %e, "skipping snapshot entity");
                skipped += 1;
            }
        }

        info!(
            entities = total - skipped,
            skipped,
            occupied_cells = self.index.occupied_cell_count(),
            "bootstrapped spatial index"
        );
    }

    /// Cells `entity` would cover at `anchor`.
    ///
    /// The size must be non-empty and no larger than the grid, and the far
    /// corner must stay inside the coordinate range.
    fn footprint(&self, anchor: CellCoordinate, entity: &EntitySnapshot) -> Result<Vec<CellCoordinate>, SyncError> {
        let invalid = |e: GridError| SyncError::InvalidEntity {
            entity_ref: entity.entity_ref.to_string(),
            reason: e.to_string(),
        };
        let size = entity
            .size()
            .validate()
            .and_then(|size| self.index.bounds().ensure_fits(size))
            .map_err(invalid)?;
        Ok(footprint_cells(anchor, size).map_err(invalid)?.collect())
    }

    /// Index `entity` over `cells` and record its placement at `anchor`.
    fn place(&mut self, anchor: CellCoordinate, cells: &[CellCoordinate], entity: Arc<EntitySnapshot>) {
        for &cell in cells {
            self.index.put(cell, Arc::clone(&entity));
        }
        self.reverse.insert(
            entity.entity_ref.clone(),
            Placement {
                anchor,
                size: entity.size(),
            },
        );
    }

    /// Remove `entity_ref` from every cell of its recorded placement and
    /// forget the placement.
    fn clear_placement(&mut self, entity_ref: &EntityRef) -> Option<Placement> {
        let placement = self.reverse.remove(entity_ref)?;
        for cell in placement.cells() {
            self.index.remove(cell, entity_ref);
        }
        Some(placement)
    }
}
