//! Offline map generator.
//!
//! A draft grid is painted cell by cell with terrain types and turned into
//! the grid-update table the simulation loads at startup.

use std::collections::BTreeMap;

use dashboard_grid::{CellCoordinate, GridBounds};
use serde::Deserialize;
use tracing::debug;

/// Terrain every cell starts as. Land cells are left out of the output.
pub const LAND: &str = "land";

/// Painting with this construct resets the whole draft to land.
pub const CLEAR: &str = "destroy";

/// One painting step of a layout file.
#[derive(Debug, Clone, Deserialize)]
pub struct Stroke {
    /// Terrain to paint, lower-case (`water`, `tree`, ...), or `destroy`.
    pub construct: String,
    /// Cells to paint. Ignored for `destroy`.
    #[serde(default)]
    pub cells: Vec<CellCoordinate>,
}

/// A layout file: the grid size and the strokes to apply in order.
#[derive(Debug, Clone, Deserialize)]
pub struct MapLayout {
    /// Grid extent.
    pub bounds: GridBounds,
    /// Painting steps.
    #[serde(default)]
    pub strokes: Vec<Stroke>,
}

/// A grid of terrain types under construction.
#[derive(Debug, Clone)]
pub struct MapDraft {
    bounds: GridBounds,
    painted: BTreeMap<CellCoordinate, String>,
}

impl MapDraft {
    /// Create an all-land draft.
    #[must_use]
    pub fn new(bounds: GridBounds) -> Self {
        Self {
            bounds,
            painted: BTreeMap::new(),
        }
    }

    /// Build a draft by applying every stroke of `layout`.
    #[must_use]
    pub fn from_layout(layout: &MapLayout) -> Self {
        let mut draft = Self::new(layout.bounds);
        for stroke in &layout.strokes {
            draft.apply(stroke);
        }
        draft
    }

    /// Apply one stroke.
    pub fn apply(&mut self, stroke: &Stroke) {
        if stroke.construct == CLEAR {
            self.clear();
        } else {
            self.paint(&stroke.cells, &stroke.construct);
        }
    }

    /// Paint `cells` with `construct`. Cells outside the grid are skipped.
    pub fn paint(&mut self, cells: &[CellCoordinate], construct: &str) {
        for &cell in cells {
            if !self.bounds.contains(cell) {
                debug!(%cell, construct, "skipping cell outside the draft");
                continue;
            }
            if construct == LAND {
                self.painted.remove(&cell);
            } else {
                self.painted.insert(cell, construct.to_string());
            }
        }
    }

    /// Reset every cell to land.
    pub fn clear(&mut self) {
        self.painted.clear();
    }

    /// Terrain of `cell`; out-of-grid cells have none.
    #[must_use]
    pub fn construct_at(&self, cell: CellCoordinate) -> Option<&str> {
        if !self.bounds.contains(cell) {
            return None;
        }
        Some(self.painted.get(&cell).map_or(LAND, String::as_str))
    }

    /// Emit the grid-update table for every non-land cell, row by row.
    #[must_use]
    pub fn generate_code(&self) -> String {
        let mut lines = vec!["val gridUpdates: Map[Point, Seq[Cell.Message]] = Map(".to_string()];
        for cell in self.bounds.cells() {
            match self.construct_at(cell) {
                Some(LAND) | None => {}
                Some(construct) => lines.push(format!(
                    "   Point({}, {}) -> Seq(UpdateType(Cell.Type.{})),",
                    cell.x,
                    cell.y,
                    type_name(construct)
                )),
            }
        }
        lines.push(")".to_string());
        lines.push(String::new());
        lines.join("\n")
    }
}

/// `water` → `Water`
fn type_name(construct: &str) -> String {
    let mut chars = construct.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_draft() {
        let draft = MapDraft::new(GridBounds::new(3, 3));
        assert_eq!(
            draft.generate_code(),
            "val gridUpdates: Map[Point, Seq[Cell.Message]] = Map(\n)\n"
        );
        assert_eq!(draft.construct_at(CellCoordinate::ORIGIN), Some(LAND));
        assert_eq!(draft.construct_at(CellCoordinate::new(3, 0)), None);
    }

    #[test]
    fn test_painted_cells_in_reading_order() {
        let mut draft = MapDraft::new(GridBounds::new(4, 4));
        draft.paint(&[CellCoordinate::new(2, 1), CellCoordinate::new(0, 1)], "water");
        draft.paint(&[CellCoordinate::new(3, 0)], "tree");
        draft.paint(&[CellCoordinate::new(9, 9)], "tree");

        assert_eq!(
            draft.generate_code(),
            "val gridUpdates: Map[Point, Seq[Cell.Message]] = Map(\n\
             \x20  Point(3, 0) -> Seq(UpdateType(Cell.Type.Tree)),\n\
             \x20  Point(0, 1) -> Seq(UpdateType(Cell.Type.Water)),\n\
             \x20  Point(2, 1) -> Seq(UpdateType(Cell.Type.Water)),\n\
             )\n"
        );
    }

    #[test]
    fn test_repaint_and_clear() {
        let mut draft = MapDraft::new(GridBounds::new(2, 2));
        draft.paint(&[CellCoordinate::ORIGIN], "water");
        draft.paint(&[CellCoordinate::ORIGIN], "tree");
        assert_eq!(draft.construct_at(CellCoordinate::ORIGIN), Some("tree"));

        draft.paint(&[CellCoordinate::ORIGIN], LAND);
        assert_eq!(draft.construct_at(CellCoordinate::ORIGIN), Some(LAND));

        draft.paint(&[CellCoordinate::new(1, 1)], "water");
        draft.apply(&Stroke {
            construct: CLEAR.to_string(),
            cells: Vec::new(),
        });
        assert_eq!(draft.construct_at(CellCoordinate::new(1, 1)), Some(LAND));
    }

    #[test]
    fn test_from_layout() {
        let layout: MapLayout = serde_json::from_str(
            r#"{
                "bounds": {"width": 2, "height": 1},
                "strokes": [
                    {"construct": "water", "cells": [{"x": 0, "y": 0}, {"x": 1, "y": 0}]},
                    {"construct": "destroy"},
                    {"construct": "tree", "cells": [{"x": 1, "y": 0}]}
                ]
            }"#,
        )
        .unwrap();
        let draft = MapDraft::from_layout(&layout);
        assert_eq!(draft.construct_at(CellCoordinate::ORIGIN), Some(LAND));
        assert_eq!(draft.construct_at(CellCoordinate::new(1, 0)), Some("tree"));
    }
}
