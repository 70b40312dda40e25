//! # dashboard_construction
//!
//! The operator's construction mode: choosing what to build or destroy,
//! validating the cell under the cursor, and turning clicks into commands.
//!
//! The workflow only ever *reads* the spatial index. A committed placement
//! shows up on the grid once the simulation's event for it comes back
//! through the sync engine.

pub mod catalog;
pub mod state;
pub mod workflow;

pub use catalog::{CatalogError, ConstructCatalog, ConstructDefinition, ConstructType, Selection};
pub use state::ConstructionState;
pub use workflow::{ConstructionWorkflow, PlacementMode, SecondaryOutcome, ValidityReport};
