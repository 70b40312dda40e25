//! Text presentation of the grid, cell tooltips, and inbound channel data.
//!
//! Everything here is a pure function of its inputs; the runner decides
//! where the text goes.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use dashboard_construction::{PlacementMode, ValidityReport};
use dashboard_grid::{CellCoordinate, EntitySnapshot, SpatialIndex};
use dashboard_net::messages::{EntityDetails, ExchangeSnapshot, LogEvent};
use serde_json::Value;

// ── Cells ───────────────────────────────────────────────────────────

/// CSS-style classes of a cell: one `cell-entity-<kind>` per distinct
/// occupant kind, in sorted order.
#[must_use]
pub fn cell_classes(index: &SpatialIndex, cell: CellCoordinate) -> Vec<String> {
    index
        .occupants_of(cell)
        .map(|entity| format!("cell-entity-{}", entity.kind().to_lowercase()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Tooltip for a cell: a count header followed by one line per occupant.
#[must_use]
pub fn cell_tooltip(index: &SpatialIndex, cell: CellCoordinate) -> String {
    let count = index.occupant_count(cell);
    let noun = if count == 1 { "entity" } else { "entities" };
    let mut out = format!("{count} {noun} @ {cell}");
    for entity in index.occupants_of(cell) {
        out.push('\n');
        out.push_str(&entity_line(entity));
    }
    out
}

/// `Kind | HxW @ (x,y) | actor`
#[must_use]
pub fn entity_line(entity: &EntitySnapshot) -> String {
    format!(
        "  {} | {} @ {} | {}",
        entity.kind(),
        entity.size(),
        entity.parent_cell,
        entity.entity_ref.actor_id().unwrap_or("-")
    )
}

/// Map a cell to one character.
///
/// Priority: hover overlay > mixed occupants > single kind > empty.
fn cell_char(index: &SpatialIndex, cell: CellCoordinate, hover: Option<&ValidityReport>) -> char {
    if let Some(report) = hover.filter(|r| r.cells.contains(&cell)) {
        return match (report.mode, report.valid) {
            (PlacementMode::Create, true) => 'o',
            (PlacementMode::Destroy, true) => 'x',
            (_, false) => '!',
        };
    }

    let mut kinds = index.occupants_of(cell).map(EntitySnapshot::kind);
    let Some(first) = kinds.next() else {
        return '.';
    };
    if kinds.any(|k| k != first) {
        return '*';
    }
    first.chars().next().map_or('?', |c| c.to_ascii_uppercase())
}

/// Render the whole grid with column and row headers, overlaying the
/// current hover report if there is one.
#[must_use]
pub fn grid_view(index: &SpatialIndex, hover: Option<&ValidityReport>) -> String {
    let bounds = index.bounds();
    let mut out = String::new();

    out.push_str("    ");
    for x in 0..bounds.width {
        let _ = write!(out, "{}", x % 10);
    }
    out.push('\n');

    let mut row = 0;
    let mut line = String::new();
    for cell in bounds.cells() {
        if cell.y != row {
            let _ = writeln!(out, "{row:>3} {line}");
            line.clear();
            row = cell.y;
        }
        line.push(cell_char(index, cell, hover));
    }
    if !line.is_empty() {
        let _ = writeln!(out, "{row:>3} {line}");
    }
    out
}

/// One-line summary of a hover report.
#[must_use]
pub fn validity(report: &ValidityReport) -> String {
    let mode = match report.mode {
        PlacementMode::Create => "create",
        PlacementMode::Destroy => "destroy",
    };
    let verdict = if report.valid { "available" } else { "unavailable" };
    let cells = report
        .cells
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    format!("{mode} {verdict}: {cells}")
}

// ── Channels ────────────────────────────────────────────────────────

/// Pretty-print an exchange snapshot section by section.
#[must_use]
pub fn exchange(snapshot: &ExchangeSnapshot) -> String {
    format!(
        "== exchange ==\nstats: {:#}\ncommodities: {:#}\nentities: {:#}",
        snapshot.stats, snapshot.commodities, snapshot.entities
    )
}

/// Render a log event as `id @ (x,y)` followed by its entity, if any.
#[must_use]
pub fn log_event(event: &LogEvent) -> String {
    let mut out = event.id.clone().unwrap_or_else(|| "Unknown".to_string());
    if let Some(cell) = event.target_cell {
        let _ = write!(out, " @ {cell}");
    }
    out.push('\n');
    match &event.map_entity {
        Some(entity) => {
            let _ = write!(out, "{entity:#}");
        }
        None => out.push_str("No additional data"),
    }
    out
}

/// Render the details of one inspected entity.
#[must_use]
pub fn entity_details(details: &EntityDetails) -> String {
    let mut out = details.id.clone();
    for (label, value) in [
        ("properties", &details.properties),
        ("state", &details.state),
        ("modifiers", &details.modifiers),
    ] {
        if let Some(text) = non_empty(value) {
            let _ = write!(out, "\n{label}: {text}");
        }
    }
    out
}

fn non_empty(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        other => Some(format!("{other:#}")),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dashboard_grid::{EntitySize, GridBounds};
    use serde_json::json;

    use super::*;

    const WALKER: &str = "WalkerRef(Actor[akka://application/user/grid/cell-0-0#-1201456])";

    fn index() -> SpatialIndex {
        let mut index = SpatialIndex::new(GridBounds::new(4, 3));
        let walker = Arc::new(EntitySnapshot::new(WALKER, CellCoordinate::ORIGIN, EntitySize::SINGLE));
        index.put(CellCoordinate::ORIGIN, walker);
        let house = Arc::new(EntitySnapshot::new(
            "StructureRef(Actor[akka://application/user/grid/cell-1-0#77])",
            CellCoordinate::new(1, 0),
            EntitySize::new(1, 2),
        ));
        index.put(CellCoordinate::new(1, 0), Arc::clone(&house));
        index.put(CellCoordinate::new(2, 0), house);
        index
    }

    #[test]
    fn test_cell_classes() {
        let index = index();
        assert_eq!(cell_classes(&index, CellCoordinate::ORIGIN), vec!["cell-entity-walker"]);
        assert!(cell_classes(&index, CellCoordinate::new(3, 2)).is_empty());
    }

    #[test]
    fn test_tooltip() {
        let index = index();
        assert_eq!(
            cell_tooltip(&index, CellCoordinate::ORIGIN),
            "1 entity @ (0,0)\n  Walker | 1x1 @ (0,0) | -1201456"
        );
        assert_eq!(cell_tooltip(&index, CellCoordinate::new(3, 2)), "0 entities @ (3,2)");
    }

    #[test]
    fn test_grid_view_with_overlay() {
        let index = index();
        assert_eq!(grid_view(&index, None), "    0123\n  0 WSS.\n  1 ....\n  2 ....\n");

        let report = ValidityReport {
            mode: PlacementMode::Create,
            cells: vec![CellCoordinate::new(2, 1), CellCoordinate::new(2, 2)],
            valid: true,
        };
        assert_eq!(grid_view(&index, Some(&report)), "    0123\n  0 WSS.\n  1 ..o.\n  2 ..o.\n");
    }

    #[test]
    fn test_validity_line() {
        let report = ValidityReport {
            mode: PlacementMode::Destroy,
            cells: vec![CellCoordinate::new(1, 2)],
            valid: false,
        };
        assert_eq!(validity(&report), "destroy unavailable: (1,2)");
    }

    #[test]
    fn test_log_event() {
        let bare: LogEvent = serde_json::from_value(json!({"id": "TickCompleted"})).unwrap();
        assert_eq!(log_event(&bare), "TickCompleted\nNo additional data");

        let located: LogEvent = serde_json::from_value(json!({
            "id": "EntityCreated",
            "targetCell": {"x": 2, "y": 5},
            "mapEntity": {"entityRef": "UnitRef(1)"}
        }))
        .unwrap();
        assert!(log_event(&located).starts_with("EntityCreated @ (2,5)\n{"));
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(&json!({})), None);
        assert_eq!(non_empty(&Value::Null), None);
        assert_eq!(non_empty(&json!(3)), Some("3".to_string()));
    }
}
