//! Wire shapes exchanged with the simulation.
//!
//! Inbound messages are decoded leniently: fields the dashboard needs to
//! validate (`targetCell`, `mapEntity`) are optional here so that a missing
//! field is reported as a malformed event by the sync engine rather than as
//! an opaque decode failure. Routing metadata (token, instance) travels in
//! NATS headers, not in the payload.

use dashboard_grid::{CellCoordinate, EntityRef, EntitySnapshot, GridBounds};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Entity channel ──────────────────────────────────────────────────────────

/// Event ids recognised on the entity channel.
pub mod event_ids {
    /// An entity appeared on the grid.
    pub const ENTITY_CREATED: &str = "EntityCreated";
    /// An entity left the grid.
    pub const ENTITY_DESTROYED: &str = "EntityDestroyed";
    /// An entity changed its anchor cell.
    pub const ENTITY_MOVED: &str = "EntityMoved";
}

/// One message on the entity channel, as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityEventMessage {
    /// Event kind (see [`event_ids`]).
    #[serde(default)]
    pub id: String,
    /// Anchor cell the event applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cell: Option<CellCoordinate>,
    /// Raw entity snapshot, validated by the sync engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_entity: Option<Value>,
}

// ── Aggregate and log channels ──────────────────────────────────────────────

/// Aggregate exchange snapshot. Opaque to the dashboard core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExchangeSnapshot {
    /// Exchange-wide statistics.
    #[serde(default)]
    pub stats: Value,
    /// Commodity book.
    #[serde(default)]
    pub commodities: Value,
    /// Participating entities.
    #[serde(default)]
    pub entities: Value,
}

/// A free-form simulation log event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    /// Event name, when the simulation provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Cell the event refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_cell: Option<CellCoordinate>,
    /// Entity the event refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_entity: Option<Value>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Outbound commands ───────────────────────────────────────────────────────

/// Request to place a new entity anchored at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityCommand {
    /// Anchor column.
    pub x: i32,
    /// Anchor row.
    pub y: i32,
    /// Construct name, e.g. `"House"`.
    pub entity_type: String,
}

/// Request to destroy an existing entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestroyEntityCommand {
    /// Reference of the entity to destroy.
    pub entity_id: EntityRef,
}

/// Any command the construction workflow can emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityCommand {
    /// Place an entity.
    Create(CreateEntityCommand),
    /// Destroy an entity.
    Destroy(DestroyEntityCommand),
}

impl EntityCommand {
    /// Header value describing the command kind.
    #[must_use]
    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Create(_) => CREATE_MSG_TYPE,
            Self::Destroy(_) => DESTROY_MSG_TYPE,
        }
    }
}

// ── Request/reply ───────────────────────────────────────────────────────────

/// Detail lookup for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetailsRequest {
    /// Reference of the entity to describe.
    pub entity_id: EntityRef,
}

/// Detailed description of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    /// Entity reference, as a string.
    pub id: String,
    /// Static properties.
    #[serde(default)]
    pub properties: Value,
    /// Current state.
    #[serde(default)]
    pub state: Value,
    /// Active modifiers.
    #[serde(default)]
    pub modifiers: Value,
}

/// Request for a full grid snapshot. Carries no parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshotRequest {}

/// Full picture of the grid, used to seed or re-seed the spatial index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Grid extent, when the simulation reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<GridBounds>,
    /// Every entity currently on the grid, anchored at its `parentCell`.
    #[serde(default)]
    pub entities: Vec<EntitySnapshot>,
}

// ── NATS header keys ────────────────────────────────────────────────────────

/// Header keys carried on outbound commands.
pub mod headers {
    /// Anti-forgery token issued to the operator session.
    pub const CSRF_TOKEN: &str = "Csrf-Token";
    /// The message type (`"create"` or `"destroy"`).
    pub const MSG_TYPE: &str = "msg-type";
    /// The dashboard instance that issued the command.
    pub const INSTANCE_ID: &str = "instance-id";
}

/// Header value for a [`CreateEntityCommand`].
pub const CREATE_MSG_TYPE: &str = "create";

/// Header value for a [`DestroyEntityCommand`].
pub const DESTROY_MSG_TYPE: &str = "destroy";
