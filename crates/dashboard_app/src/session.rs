//! Dashboard session state.
//!
//! [`DashboardSession`] owns the synchronized grid, the construction
//! workflow and the catalog. It turns channel payloads and operator input into
//! [`Effect`]s without touching the network, so the runner stays a thin loop
//! around it.

use dashboard_construction::{CatalogError, ConstructCatalog, ConstructionWorkflow, SecondaryOutcome, ValidityReport};
use dashboard_grid::{CellCoordinate, EntityRef, GridBounds, GridError};
use dashboard_net::messages::{EntityCommand, EntityEventMessage, ExchangeSnapshot, GridSnapshot, LogEvent};
use dashboard_sync::{AppliedEvent, EntitySyncEngine};
use tracing::{debug, warn};

use crate::operator::OperatorCommand;
use crate::render;

/// Errors from operator commands the session refuses.
///
/// A refused command leaves the construction mode as it was.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The selected construct is not in the catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The requested footprint size is not usable.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Something the runner has to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send a construction command to the simulation.
    Publish(EntityCommand),
    /// Fetch and show the details of these entities.
    Inspect {
        /// Inspected cell.
        cell: CellCoordinate,
        /// Its occupants.
        entity_refs: Vec<EntityRef>,
    },
    /// Show text to the operator.
    Render(String),
    /// Stop the dashboard.
    Quit,
}

/// The operator's view of one simulation.
#[derive(Debug)]
pub struct DashboardSession {
    sync: EntitySyncEngine,
    workflow: ConstructionWorkflow,
    catalog: ConstructCatalog,
    cursor: Option<CellCoordinate>,
}

impl DashboardSession {
    /// Create a session over an empty grid.
    #[must_use]
    pub fn new(bounds: GridBounds, catalog: ConstructCatalog) -> Self {
        Self {
            sync: EntitySyncEngine::new(bounds),
            workflow: ConstructionWorkflow::new(),
            catalog,
            cursor: None,
        }
    }

    /// Returns the synchronized grid.
    #[must_use]
    pub fn sync(&self) -> &EntitySyncEngine {
        &self.sync
    }

    /// Returns the construction workflow.
    #[must_use]
    pub fn workflow(&self) -> &ConstructionWorkflow {
        &self.workflow
    }

    /// Replace the grid with a full snapshot.
    pub fn bootstrap(&mut self, snapshot: GridSnapshot) {
        self.sync.bootstrap(snapshot);
    }

    /// Hover report for the last hovered cell, against the current grid.
    #[must_use]
    pub fn hover_report(&self) -> Option<ValidityReport> {
        let cell = self.cursor?;
        self.workflow.hover(self.sync.index(), cell)
    }

    // ── Channels ────────────────────────────────────────────────────

    /// Handle a payload from the entity channel.
    pub fn on_entity_payload(&mut self, payload: &[u8]) -> Option<AppliedEvent> {
        let msg: EntityEventMessage = match dashboard_net::decode(payload) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, "undecodable entity payload");
                return None;
            }
        };
        self.sync.ingest(&msg)
    }

    /// Handle a payload from the exchange channel.
    #[must_use]
    pub fn on_exchange_payload(&self, payload: &[u8]) -> Option<String> {
        match dashboard_net::decode::<ExchangeSnapshot>(payload) {
            Ok(snapshot) => Some(render::exchange(&snapshot)),
            Err(e) => {
                warn!(error = %e, "undecodable exchange payload");
                None
            }
        }
    }

    /// Handle a payload from the log channel.
    #[must_use]
    pub fn on_log_payload(&self, payload: &[u8]) -> Option<String> {
        match dashboard_net::decode::<LogEvent>(payload) {
            Ok(event) => Some(render::log_event(&event)),
            Err(e) => {
                warn!(error = %e, "undecodable log payload");
                None
            }
        }
    }

    // ── Operator ────────────────────────────────────────────────────

    /// Apply one operator command.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] for an unknown construct or an empty size;
    /// the construction mode is unchanged in that case.
    pub fn handle(&mut self, command: OperatorCommand) -> Result<Option<Effect>, SessionError> {
        let index = self.sync.index();
        let effect = match command {
            OperatorCommand::Select(name) => {
                let selection = self.catalog.selection(&name)?;
                self.workflow.select(selection)?;
                Some(self.mode_line())
            }
            OperatorCommand::Create { entity_type, size } => {
                self.workflow.select_create(entity_type, size)?;
                Some(self.mode_line())
            }
            OperatorCommand::Destroy => {
                self.workflow.select_destroy();
                Some(self.mode_line())
            }
            OperatorCommand::Cancel => {
                self.workflow.cancel();
                Some(self.mode_line())
            }
            OperatorCommand::Hover(cell) => {
                self.cursor = Some(cell);
                let mut text = render::cell_tooltip(index, cell);
                let classes = render::cell_classes(index, cell);
                if !classes.is_empty() {
                    text = format!("{text}\n[{}]", classes.join(" "));
                }
                if let Some(report) = self.workflow.hover(index, cell) {
                    text = format!("{}\n{text}", render::validity(&report));
                }
                Some(Effect::Render(text))
            }
            OperatorCommand::Click(cell) => match self.workflow.commit(index, cell) {
                Some(command) => Some(Effect::Publish(command)),
                None => {
                    debug!(%cell, state = %self.workflow.state(), "click ignored");
                    None
                }
            },
            OperatorCommand::Right(cell) => match self.workflow.secondary_action(self.sync.index(), cell) {
                SecondaryOutcome::Cancelled => Some(self.mode_line()),
                SecondaryOutcome::Inspect { cell, entity_refs } => Some(Effect::Inspect { cell, entity_refs }),
            },
            OperatorCommand::Show => Some(Effect::Render(self.view())),
            OperatorCommand::Quit => Some(Effect::Quit),
        };
        Ok(effect)
    }

    /// The grid with the current hover overlay and a status line.
    #[must_use]
    pub fn view(&self) -> String {
        let report = self.hover_report();
        let stats = self.sync.stats();
        format!(
            "{}mode: {} | entities: {} | applied: {} rejected: {}",
            render::grid_view(self.sync.index(), report.as_ref()),
            self.workflow().state(),
            self.sync.entity_count(),
            stats.applied,
            stats.rejected
        )
    }

    fn mode_line(&self) -> Effect {
        Effect::Render(format!("mode: {}", self.workflow.state()))
    }
}

#[cfg(test)]
mod tests {
    use dashboard_grid::EntitySize;
    use dashboard_net::messages::{CreateEntityCommand, DestroyEntityCommand};
    use serde_json::json;

    use super::*;

    fn session() -> DashboardSession {
        let catalog = ConstructCatalog::from_json(
            r#"{"constructs": [{"name": "House", "type": "structure", "size": {"height": 2, "width": 2}}]}"#,
        )
        .unwrap();
        DashboardSession::new(GridBounds::new(6, 6), catalog)
    }

    fn created(raw: &str, x: i32, y: i32) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "EntityCreated",
            "targetCell": {"x": x, "y": y},
            "mapEntity": {
                "entityRef": raw,
                "parentCell": {"x": x, "y": y},
                "spec": {"size": {"height": 1, "width": 1}}
            }
        }))
        .unwrap()
    }

    fn run(session: &mut DashboardSession, line: &str) -> Option<Effect> {
        session.handle(line.parse().unwrap()).unwrap()
    }

    #[test]
    fn test_place_house_on_free_cells() {
        let mut session = session();
        run(&mut session, "select House");
        assert_eq!(
            run(&mut session, "click 1 1"),
            Some(Effect::Publish(EntityCommand::Create(CreateEntityCommand {
                x: 1,
                y: 1,
                entity_type: "House".to_string()
            })))
        );
    }

    #[test]
    fn test_click_blocked_by_inbound_entity() {
        let mut session = session();
        run(&mut session, "select House");
        assert!(session.on_entity_payload(&created("UnitRef(1)", 2, 2)).is_some());
        assert_eq!(run(&mut session, "click 1 1"), None);
    }

    #[test]
    fn test_hover_overlay_follows_grid_changes() {
        let mut session = session();
        run(&mut session, "select House");
        run(&mut session, "hover 0 0");
        assert!(session.hover_report().unwrap().valid);

        session.on_entity_payload(&created("UnitRef(1)", 1, 0));
        assert!(!session.hover_report().unwrap().valid);
        assert!(session.view().contains("  0 !!"));
    }

    #[test]
    fn test_destroy_and_inspect() {
        let mut session = session();
        session.on_entity_payload(&created("UnitRef(7)", 3, 3));

        assert_eq!(
            run(&mut session, "right 3 3"),
            Some(Effect::Inspect {
                cell: CellCoordinate::new(3, 3),
                entity_refs: vec![EntityRef::new("UnitRef(7)")]
            })
        );

        run(&mut session, "destroy");
        assert_eq!(
            run(&mut session, "click 3 3"),
            Some(Effect::Publish(EntityCommand::Destroy(DestroyEntityCommand {
                entity_id: EntityRef::new("UnitRef(7)")
            })))
        );

        assert_eq!(run(&mut session, "right 3 3"), Some(Effect::Render("mode: idle".to_string())));
        assert!(session.workflow().state().is_idle());
    }

    #[test]
    fn test_rejected_selections_keep_mode() {
        let mut session = session();
        run(&mut session, "destroy");
        assert!(matches!(
            session.handle(OperatorCommand::Select("Castle".to_string())),
            Err(SessionError::Catalog(_))
        ));
        assert!(matches!(
            session.handle(OperatorCommand::Create {
                entity_type: "Void".to_string(),
                size: EntitySize::new(0, 1)
            }),
            Err(SessionError::Grid(_))
        ));
        assert_eq!(session.workflow().state().to_string(), "destroying");
    }

    #[test]
    fn test_bad_payloads_are_dropped() {
        let mut session = session();
        assert!(session.on_entity_payload(b"not json").is_none());
        assert!(session.on_exchange_payload(b"[").is_none());
        assert_eq!(
            session.on_log_payload(br#"{"id": "TickCompleted"}"#).as_deref(),
            Some("TickCompleted\nNo additional data")
        );
        assert_eq!(session.sync().entity_count(), 0);
    }

    #[test]
    fn test_rebootstrap_discards_missed_changes() {
        let mut session = session();
        session.on_entity_payload(&created("UnitRef(1)", 2, 2));

        // UnitRef(1) was destroyed and UnitRef(2) created while disconnected.
        let snapshot: GridSnapshot = serde_json::from_value(json!({
            "entities": [
                {"entityRef": "UnitRef(2)", "parentCell": {"x": 4, "y": 4},
                 "spec": {"size": {"height": 1, "width": 1}}}
            ]
        }))
        .unwrap();
        session.bootstrap(snapshot);

        let index = session.sync().index();
        assert!(index.is_empty(CellCoordinate::new(2, 2)));
        assert!(index.contains(CellCoordinate::new(4, 4), &EntityRef::new("UnitRef(2)")));
        assert_eq!(session.sync().entity_count(), 1);
    }
}
