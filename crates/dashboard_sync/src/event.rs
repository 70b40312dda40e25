//! Typed entity events.
//!
//! Channel messages arrive as [`EntityEventMessage`]s with every field
//! optional. Converting one into an [`EntityEvent`] checks everything the
//! engine relies on, so that applying a validated event cannot fail halfway.

use std::fmt;
use std::sync::Arc;

use dashboard_grid::{CellCoordinate, EntitySnapshot};
use dashboard_net::messages::{EntityEventMessage, event_ids};
use serde_json::Value;

use crate::error::SyncError;

/// The three kinds of entity change the simulation reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    /// `EntityCreated`
    Created,
    /// `EntityDestroyed`
    Destroyed,
    /// `EntityMoved`
    Moved,
}

impl EntityEventKind {
    /// Map a wire id to a kind.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            event_ids::ENTITY_CREATED => Some(Self::Created),
            event_ids::ENTITY_DESTROYED => Some(Self::Destroyed),
            event_ids::ENTITY_MOVED => Some(Self::Moved),
            _ => None,
        }
    }

    /// The wire id of this kind.
    #[must_use]
    pub fn as_id(self) -> &'static str {
        match self {
            Self::Created => event_ids::ENTITY_CREATED,
            Self::Destroyed => event_ids::ENTITY_DESTROYED,
            Self::Moved => event_ids::ENTITY_MOVED,
        }
    }
}

impl fmt::Display for EntityEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_id())
    }
}

/// A validated entity event, ready to be applied.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEvent {
    /// What happened.
    pub kind: EntityEventKind,
    /// Anchor cell the event applies to.
    pub target_cell: CellCoordinate,
    /// The entity snapshot carried by the event.
    pub entity: Arc<EntitySnapshot>,
}

impl TryFrom<&EntityEventMessage> for EntityEvent {
    type Error = SyncError;

    fn try_from(msg: &EntityEventMessage) -> Result<Self, Self::Error> {
        let kind = EntityEventKind::from_id(&msg.id).ok_or_else(|| SyncError::UnknownEntityKind {
            id: msg.id.clone(),
        })?;
        let target_cell = msg.target_cell.ok_or(SyncError::MalformedEvent {
            field: "targetCell",
        })?;
        let raw = msg.map_entity.as_ref().ok_or(SyncError::MalformedEvent {
            field: "mapEntity",
        })?;
        let entity = parse_snapshot(raw)?;
        Ok(Self {
            kind,
            target_cell,
            entity: Arc::new(entity),
        })
    }
}

/// Interpret a raw `mapEntity` value.
fn parse_snapshot(raw: &Value) -> Result<EntitySnapshot, SyncError> {
    let entity_ref = raw
        .get("entityRef")
        .and_then(Value::as_str)
        .ok_or(SyncError::MalformedEvent {
            field: "mapEntity.entityRef",
        })?;

    let invalid = |reason: String| SyncError::InvalidEntity {
        entity_ref: entity_ref.to_string(),
        reason,
    };

    let snapshot: EntitySnapshot =
        serde_json::from_value(raw.clone()).map_err(|e| invalid(e.to_string()))?;
    snapshot.size().validate().map_err(|e| invalid(e.to_string()))?;
    Ok(snapshot)
}
