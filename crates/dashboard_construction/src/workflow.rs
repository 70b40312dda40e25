//! The construction workflow state machine.
//!
//! Transitions happen only on explicit operator actions: selecting a tool,
//! cancelling, or right-clicking while a tool is active. Inbound entity
//! events never change the mode; they only change what `hover` and `commit`
//! see in the spatial index.

use dashboard_grid::{CellCoordinate, EntityRef, EntitySize, FootprintResolver, GridError, SpatialIndex};
use dashboard_net::messages::{CreateEntityCommand, DestroyEntityCommand, EntityCommand};
use tracing::debug;

use crate::catalog::Selection;
use crate::state::ConstructionState;

/// Which tool produced a [`ValidityReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementMode {
    /// Placement of a new entity.
    Create,
    /// Destruction of an existing one.
    Destroy,
}

/// Hover feedback for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidityReport {
    /// Tool being previewed.
    pub mode: PlacementMode,
    /// Cells to highlight.
    pub cells: Vec<CellCoordinate>,
    /// Whether a click here would issue a command.
    pub valid: bool,
}

/// What a secondary action (right-click) resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecondaryOutcome {
    /// A tool was active and has been cancelled.
    Cancelled,
    /// No tool was active: the operator asked for details of this cell.
    Inspect {
        /// Cell that was inspected.
        cell: CellCoordinate,
        /// Entities occupying it, possibly none.
        entity_refs: Vec<EntityRef>,
    },
}

/// Owns the [`ConstructionState`] and evaluates operator actions against a
/// read-only [`SpatialIndex`].
#[derive(Debug, Clone, Default)]
pub struct ConstructionWorkflow {
    state: ConstructionState,
}

impl ConstructionWorkflow {
    /// Create a workflow in [`ConstructionState::Idle`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &ConstructionState {
        &self.state
    }

    /// Enter placement mode for `entity_type`. Any active tool is cancelled
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptySize`] for a size with a zero dimension; the
    /// state is left unchanged.
    pub fn select_create(&mut self, entity_type: impl Into<String>, size: EntitySize) -> Result<(), GridError> {
        let size = size.validate()?;
        self.cancel();
        self.state = ConstructionState::PlacingCreate {
            entity_type: entity_type.into(),
            size,
        };
        debug!(state = %self.state, "construction mode selected");
        Ok(())
    }

    /// Enter destroy mode. Any active tool is cancelled first.
    pub fn select_destroy(&mut self) {
        self.cancel();
        self.state = ConstructionState::PlacingDestroy;
        debug!(state = %self.state, "construction mode selected");
    }

    /// Apply a catalog [`Selection`].
    ///
    /// # Errors
    ///
    /// See [`ConstructionWorkflow::select_create`].
    pub fn select(&mut self, selection: Selection) -> Result<(), GridError> {
        match selection {
            Selection::Create { entity_type, size } => self.select_create(entity_type, size),
            Selection::Destroy => {
                self.select_destroy();
                Ok(())
            }
        }
    }

    /// Return to [`ConstructionState::Idle`].
    pub fn cancel(&mut self) {
        if !self.state.is_idle() {
            debug!(previous = %self.state, "construction mode cancelled");
        }
        self.state = ConstructionState::Idle;
    }

    /// Evaluate the cell under the cursor. Returns `None` while idle.
    ///
    /// Always recomputed from the current index, since other operators may
    /// have changed the grid since the previous hover.
    #[must_use]
    pub fn hover(&self, index: &SpatialIndex, cell: CellCoordinate) -> Option<ValidityReport> {
        let resolver = FootprintResolver::new(index);
        match &self.state {
            ConstructionState::Idle => None,
            ConstructionState::PlacingCreate { size, .. } => {
                let footprint = resolver.resolve(cell, *size);
                Some(ValidityReport {
                    mode: PlacementMode::Create,
                    cells: footprint.cells,
                    valid: footprint.available,
                })
            }
            ConstructionState::PlacingDestroy => {
                let target = resolver.resolve_destroy_target(cell);
                Some(ValidityReport {
                    mode: PlacementMode::Destroy,
                    cells: target.cells,
                    valid: target.available,
                })
            }
        }
    }

    /// Primary click on `cell`.
    ///
    /// Emits a create command when the footprint is free, or a destroy
    /// command for the first occupant of the cell. The guard is evaluated
    /// against the index as it is now; a failing guard yields `None`. The mode
    /// stays active after a successful commit.
    #[must_use]
    pub fn commit(&self, index: &SpatialIndex, cell: CellCoordinate) -> Option<EntityCommand> {
        match &self.state {
            ConstructionState::Idle => None,
            ConstructionState::PlacingCreate { entity_type, size } => {
                if !FootprintResolver::new(index).resolve(cell, *size).available {
                    debug!(%cell, entity_type, "placement blocked");
                    return None;
                }
                Some(EntityCommand::Create(CreateEntityCommand {
                    x: cell.x,
                    y: cell.y,
                    entity_type: entity_type.clone(),
                }))
            }
            ConstructionState::PlacingDestroy => {
                let target = index.first_occupant(cell)?;
                Some(EntityCommand::Destroy(DestroyEntityCommand {
                    entity_id: target.entity_ref.clone(),
                }))
            }
        }
    }

    /// Secondary click on `cell`: cancels an active tool, otherwise asks for
    /// the details of the cell's occupants.
    pub fn secondary_action(&mut self, index: &SpatialIndex, cell: CellCoordinate) -> SecondaryOutcome {
        if self.state.is_idle() {
            SecondaryOutcome::Inspect {
                cell,
                entity_refs: index.occupant_refs(cell),
            }
        } else {
            self.cancel();
            SecondaryOutcome::Cancelled
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dashboard_grid::{EntitySnapshot, GridBounds};

    use super::*;

    fn index_with(entries: &[(&str, CellCoordinate)]) -> SpatialIndex {
        let mut index = SpatialIndex::new(GridBounds::new(8, 8));
        for &(raw, cell) in entries {
            index.put(cell, Arc::new(EntitySnapshot::new(raw, cell, EntitySize::SINGLE)));
        }
        index
    }

    fn house() -> EntitySize {
        EntitySize::new(2, 2)
    }

    #[test]
    fn test_starts_idle_and_idle_is_inert() {
        let workflow = ConstructionWorkflow::new();
        let index = index_with(&[("UnitRef(1)", CellCoordinate::ORIGIN)]);
        assert!(workflow.state().is_idle());
        assert!(workflow.hover(&index, CellCoordinate::ORIGIN).is_none());
        assert!(workflow.commit(&index, CellCoordinate::ORIGIN).is_none());
    }

    #[test]
    fn test_scenario_blocked_house_placement() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_create("House", house()).unwrap();
        let index = index_with(&[
            ("UnitRef(1)", CellCoordinate::new(0, 0)),
            ("UnitRef(2)", CellCoordinate::new(1, 1)),
        ]);

        let report = workflow.hover(&index, CellCoordinate::ORIGIN).unwrap();
        assert_eq!(report.mode, PlacementMode::Create);
        assert_eq!(report.cells.len(), 4);
        assert!(!report.valid);
        assert!(workflow.commit(&index, CellCoordinate::ORIGIN).is_none());
    }

    #[test]
    fn test_scenario_destroy_single_occupant() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_destroy();
        let target = CellCoordinate::new(3, 3);
        let index = index_with(&[("UnitRef(5)", target)]);

        let report = workflow.hover(&index, target).unwrap();
        assert_eq!(report.mode, PlacementMode::Destroy);
        assert_eq!(report.cells, vec![target]);
        assert!(report.valid);

        assert_eq!(
            workflow.commit(&index, target),
            Some(EntityCommand::Destroy(DestroyEntityCommand {
                entity_id: EntityRef::new("UnitRef(5)")
            }))
        );
        assert_eq!(workflow.state(), &ConstructionState::PlacingDestroy);
    }

    #[test]
    fn test_destroy_on_empty_cell_is_noop() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_destroy();
        let index = index_with(&[]);
        assert!(!workflow.hover(&index, CellCoordinate::new(2, 2)).unwrap().valid);
        assert!(workflow.commit(&index, CellCoordinate::new(2, 2)).is_none());
    }

    #[test]
    fn test_placement_is_sticky_across_commits() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_create("House", house()).unwrap();
        let index = index_with(&[]);

        let first = workflow.commit(&index, CellCoordinate::new(0, 0));
        let second = workflow.commit(&index, CellCoordinate::new(4, 4));

        assert_eq!(
            first,
            Some(EntityCommand::Create(CreateEntityCommand {
                x: 0,
                y: 0,
                entity_type: "House".to_string()
            }))
        );
        assert!(second.is_some());
        assert!(matches!(workflow.state(), ConstructionState::PlacingCreate { .. }));
    }

    #[test]
    fn test_commit_rechecks_guard_against_current_index() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_create("House", house()).unwrap();

        let before = index_with(&[]);
        assert!(workflow.hover(&before, CellCoordinate::ORIGIN).unwrap().valid);

        let after = index_with(&[("UnitRef(9)", CellCoordinate::new(1, 0))]);
        assert!(workflow.commit(&after, CellCoordinate::ORIGIN).is_none());
    }

    #[test]
    fn test_commit_past_grid_edge_is_noop() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_create("House", house()).unwrap();
        let index = index_with(&[]);
        assert!(workflow.commit(&index, CellCoordinate::new(7, 7)).is_none());
    }

    #[test]
    fn test_unplaceable_sizes_never_commit() {
        let mut workflow = ConstructionWorkflow::new();
        let index = index_with(&[]);

        workflow.select_create("Wall", EntitySize::new(1, 3)).unwrap();
        let edge = CellCoordinate::new(i32::MAX, 0);
        assert!(!workflow.hover(&index, edge).unwrap().valid);
        assert!(workflow.commit(&index, edge).is_none());

        workflow.select_create("Continent", EntitySize::new(4_000_000_000, 4_000_000_000)).unwrap();
        let report = workflow.hover(&index, CellCoordinate::ORIGIN).unwrap();
        assert!(report.cells.is_empty());
        assert!(!report.valid);
        assert!(workflow.commit(&index, CellCoordinate::ORIGIN).is_none());
    }

    #[test]
    fn test_reselect_replaces_mode() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_create("House", house()).unwrap();
        workflow.select_destroy();
        assert_eq!(workflow.state(), &ConstructionState::PlacingDestroy);

        workflow.select_create("Well", EntitySize::SINGLE).unwrap();
        assert_eq!(
            workflow.state(),
            &ConstructionState::PlacingCreate {
                entity_type: "Well".to_string(),
                size: EntitySize::SINGLE
            }
        );
    }

    #[test]
    fn test_zero_size_selection_rejected() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_destroy();
        assert!(workflow.select_create("Void", EntitySize::new(0, 2)).is_err());
        assert_eq!(workflow.state(), &ConstructionState::PlacingDestroy);
    }

    #[test]
    fn test_secondary_action_cancels_active_tool() {
        let mut workflow = ConstructionWorkflow::new();
        workflow.select_destroy();
        let index = index_with(&[("UnitRef(1)", CellCoordinate::ORIGIN)]);

        assert_eq!(
            workflow.secondary_action(&index, CellCoordinate::ORIGIN),
            SecondaryOutcome::Cancelled
        );
        assert!(workflow.state().is_idle());
    }

    #[test]
    fn test_secondary_action_inspects_when_idle() {
        let mut workflow = ConstructionWorkflow::new();
        let index = index_with(&[("UnitRef(1)", CellCoordinate::ORIGIN), ("UnitRef(2)", CellCoordinate::ORIGIN)]);

        assert_eq!(
            workflow.secondary_action(&index, CellCoordinate::ORIGIN),
            SecondaryOutcome::Inspect {
                cell: CellCoordinate::ORIGIN,
                entity_refs: vec![EntityRef::new("UnitRef(1)"), EntityRef::new("UnitRef(2)")],
            }
        );
        assert!(workflow.state().is_idle());
    }
}
