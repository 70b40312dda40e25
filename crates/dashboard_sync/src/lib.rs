//! # dashboard_sync
//!
//! Keeps the dashboard's [`SpatialIndex`](dashboard_grid::SpatialIndex)
//! consistent with the simulation's append-only stream of entity events.
//!
//! - [`event`] — validation of raw channel messages into typed events.
//! - [`reverse`] — entity reference → current placement lookup.
//! - [`engine`] — the [`EntitySyncEngine`] applying events one at a time.
//! - [`error`] — rejection reasons.

pub mod engine;
pub mod error;
pub mod event;
pub mod reverse;

pub use engine::{AppliedEvent, EntitySyncEngine, SyncStats};
pub use error::SyncError;
pub use event::{EntityEvent, EntityEventKind};
pub use reverse::{Placement, ReverseIndex};
