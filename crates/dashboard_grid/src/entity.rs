//! Entity identity and snapshots.
//!
//! An [`EntitySnapshot`] is the simulation's view of one map entity at the
//! moment an event was emitted. Snapshots are never edited in place: a move
//! arrives as a whole new snapshot that replaces the previous one.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cell::{CellCoordinate, EntitySize};

/// Opaque, globally unique entity reference.
///
/// The simulation encodes the entity kind and the address of the backing
/// actor in the string, e.g.
/// `StructureRef(Actor[akka://application/user/grid/structure-1#-5321])`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(String);

impl EntityRef {
    /// Wrap a raw reference string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The entity kind encoded in the reference: everything before the last
    /// `Ref(` marker (`"StructureRef(..)"` → `"Structure"`).
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        let end = self.0.rfind("Ref(")?;
        let kind = &self.0[..end];
        (!kind.is_empty()).then_some(kind)
    }

    /// The backing actor's identifier: the fragment between the last `#` and
    /// the closing `]` of the `Actor[...]` address, if present.
    #[must_use]
    pub fn actor_id(&self) -> Option<&str> {
        let start = self.0.find("Actor[")?;
        let address = &self.0[start..];
        let hash = address.rfind('#')?;
        let tail = &address[hash + 1..];
        let end = tail.rfind(']')?;
        let id = &tail[..end];
        (!id.is_empty()).then_some(id)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityRef {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The static part of an entity description. Only `size` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    /// Footprint dimensions.
    pub size: EntitySize,
    /// Remaining `spec` fields, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entity as last reported by the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitySnapshot {
    /// Unique reference.
    pub entity_ref: EntityRef,
    /// Anchor (top-left) cell reported by the simulation.
    pub parent_cell: CellCoordinate,
    /// Static description, including the footprint size.
    pub spec: EntitySpec,
    /// Domain properties, state and modifiers, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EntitySnapshot {
    /// Create a snapshot with no opaque domain data.
    #[must_use]
    pub fn new(entity_ref: impl Into<EntityRef>, parent_cell: CellCoordinate, size: EntitySize) -> Self {
        Self {
            entity_ref: entity_ref.into(),
            parent_cell,
            spec: EntitySpec {
                size,
                extra: Map::new(),
            },
            extra: Map::new(),
        }
    }

    /// Footprint size of the entity.
    #[must_use]
    pub fn size(&self) -> EntitySize {
        self.spec.size
    }

    /// Entity kind derived from the reference, or `"Unknown"`.
    #[must_use]
    pub fn kind(&self) -> &str {
        self.entity_ref.kind().unwrap_or("Unknown")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const STRUCTURE_REF: &str =
        "StructureRef(Actor[akka://application/user/grid/structure-1#-532107])";

    #[test]
    fn test_kind_from_ref() {
        assert_eq!(EntityRef::new(STRUCTURE_REF).kind(), Some("Structure"));
        assert_eq!(EntityRef::new("UnitRef(1)").kind(), Some("Unit"));
        assert_eq!(EntityRef::new("Ref(1)").kind(), None);
        assert_eq!(EntityRef::new("plain").kind(), None);
    }

    #[test]
    fn test_actor_id_from_ref() {
        assert_eq!(EntityRef::new(STRUCTURE_REF).actor_id(), Some("-532107"));
        assert_eq!(EntityRef::new("UnitRef(1)").actor_id(), None);
    }

    #[test]
    fn test_snapshot_from_wire_keeps_opaque_fields() {
        let snapshot: EntitySnapshot = serde_json::from_value(json!({
            "entityRef": "UnitRef(1)",
            "parentCell": {"x": 1, "y": 2},
            "spec": {"size": {"height": 1, "width": 2}, "speed": 3},
            "properties": {"name": "walker"},
            "state": {"hp": 10}
        }))
        .unwrap();

        assert_eq!(snapshot.entity_ref.as_str(), "UnitRef(1)");
        assert_eq!(snapshot.parent_cell, CellCoordinate::new(1, 2));
        assert_eq!(snapshot.size(), EntitySize::new(1, 2));
        assert_eq!(snapshot.spec.extra["speed"], json!(3));
        assert_eq!(snapshot.extra["properties"], json!({"name": "walker"}));
        assert_eq!(snapshot.extra["state"], json!({"hp": 10}));
        assert_eq!(snapshot.kind(), "Unit");

        let back = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(back["state"], json!({"hp": 10}));
        assert_eq!(back["entityRef"], json!("UnitRef(1)"));
    }
}
