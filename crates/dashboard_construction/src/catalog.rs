//! Catalog of constructs the operator can select.
//!
//! Structures carry their own footprint size; every other construct type is
//! placed as a single cell. The reserved name `destroy` always selects
//! destroy mode.

use std::collections::BTreeMap;

use dashboard_grid::{EntitySize, GridError};
use serde::{Deserialize, Serialize};

/// Name that selects destroy mode.
pub const DESTROY: &str = "destroy";

/// Errors raised while loading or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The catalog document could not be parsed.
    #[error("invalid construct catalog: {0}")]
    Parse(#[from] serde_json::Error),

    /// No construct with that name.
    #[error("unknown construct: {0}")]
    UnknownConstruct(String),

    /// A structure was declared without a size.
    #[error("structure {0} has no size")]
    MissingSize(String),

    /// A declared size had a zero dimension.
    #[error("construct {name}: {source}")]
    InvalidSize {
        /// Construct name.
        name: String,
        /// Underlying size error.
        #[source]
        source: GridError,
    },
}

/// Broad category of a construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstructType {
    /// Multi-cell building; uses the declared size.
    Structure,
    /// Mobile unit; always 1×1.
    Unit,
    /// Anything else the simulation can construct; 1×1.
    #[serde(other)]
    Other,
}

/// One selectable construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructDefinition {
    /// Name sent as `entityType` in create commands.
    pub name: String,
    /// Category.
    #[serde(rename = "type")]
    pub construct_type: ConstructType,
    /// Footprint, required for structures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<EntitySize>,
}

impl ConstructDefinition {
    /// Footprint used when placing this construct.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingSize`] for a structure without a size,
    /// or [`CatalogError::InvalidSize`] for an empty one.
    pub fn footprint(&self) -> Result<EntitySize, CatalogError> {
        match self.construct_type {
            ConstructType::Structure => {
                let size = self
                    .size
                    .ok_or_else(|| CatalogError::MissingSize(self.name.clone()))?;
                size.validate().map_err(|source| CatalogError::InvalidSize {
                    name: self.name.clone(),
                    source,
                })
            }
            ConstructType::Unit | ConstructType::Other => Ok(EntitySize::SINGLE),
        }
    }
}

/// A resolved operator selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Place `entity_type` with footprint `size`.
    Create {
        /// Construct name.
        entity_type: String,
        /// Footprint.
        size: EntitySize,
    },
    /// Destroy mode.
    Destroy,
}

#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    constructs: Vec<ConstructDefinition>,
}

/// All constructs known to the dashboard, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructCatalog {
    constructs: BTreeMap<String, ConstructDefinition>,
}

impl ConstructCatalog {
    /// Create an empty catalog. Only `destroy` can be selected from it.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from its JSON form:
    /// `{"constructs": [{"name": "House", "type": "structure", "size": {"height": 2, "width": 2}}]}`.
    ///
    /// Every structure's size is checked up front.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the document is invalid or a structure
    /// has a missing or empty size.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for definition in document.constructs {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Add or replace a construct.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the construct's footprint is invalid.
    pub fn insert(&mut self, definition: ConstructDefinition) -> Result<(), CatalogError> {
        definition.footprint()?;
        self.constructs.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Look up a construct by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ConstructDefinition> {
        self.constructs.get(name)
    }

    /// Number of constructs, not counting `destroy`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructs.len()
    }

    /// Returns `true` if no construct is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructs.is_empty()
    }

    /// Resolve an operator's tool choice.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownConstruct`] for a name that is neither
    /// `destroy` nor in the catalog.
    pub fn selection(&self, name: &str) -> Result<Selection, CatalogError> {
        if name == DESTROY {
            return Ok(Selection::Destroy);
        }
        let definition = self
            .get(name)
            .ok_or_else(|| CatalogError::UnknownConstruct(name.to_string()))?;
        Ok(Selection::Create {
            entity_type: definition.name.clone(),
            size: definition.footprint()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "constructs": [
            {"name": "House", "type": "structure", "size": {"height": 2, "width": 3}},
            {"name": "Walker", "type": "unit"},
            {"name": "Road", "type": "infrastructure", "size": {"height": 5, "width": 5}}
        ]
    }"#;

    #[test]
    fn test_structure_uses_declared_size() {
        let catalog = ConstructCatalog::from_json(CATALOG).unwrap();
        assert_eq!(
            catalog.selection("House").unwrap(),
            Selection::Create {
                entity_type: "House".to_string(),
                size: EntitySize::new(2, 3)
            }
        );
    }

    #[test]
    fn test_non_structures_are_single_cell() {
        let catalog = ConstructCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.get("Road").unwrap().construct_type, ConstructType::Other);
        for name in ["Walker", "Road"] {
            match catalog.selection(name).unwrap() {
                Selection::Create { size, .. } => assert_eq!(size, EntitySize::SINGLE),
                Selection::Destroy => panic!("unexpected destroy"),
            }
        }
    }

    #[test]
    fn test_destroy_is_always_available() {
        assert_eq!(ConstructCatalog::new().selection(DESTROY).unwrap(), Selection::Destroy);
    }

    #[test]
    fn test_unknown_construct() {
        let catalog = ConstructCatalog::from_json(CATALOG).unwrap();
        assert!(matches!(
            catalog.selection("Castle"),
            Err(CatalogError::UnknownConstruct(name)) if name == "Castle"
        ));
    }

    #[test]
    fn test_structure_without_size_rejected() {
        let result = ConstructCatalog::from_json(r#"{"constructs": [{"name": "Tower", "type": "structure"}]}"#);
        assert!(matches!(result, Err(CatalogError::MissingSize(_))));

        let result = ConstructCatalog::from_json(
            r#"{"constructs": [{"name": "Tower", "type": "structure", "size": {"height": 0, "width": 1}}]}"#,
        );
        assert!(matches!(result, Err(CatalogError::InvalidSize { .. })));
    }
}
