//! Construction mode state.

use std::fmt;

use dashboard_grid::EntitySize;

/// Which construction mode the operator is in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConstructionState {
    /// No tool selected. Clicks do nothing; right-click inspects.
    #[default]
    Idle,
    /// Placing entities of `entity_type` with the given footprint.
    PlacingCreate {
        /// Construct name sent with the create command.
        entity_type: String,
        /// Footprint validated on hover and commit.
        size: EntitySize,
    },
    /// Picking entities to destroy.
    PlacingDestroy,
}

impl ConstructionState {
    /// Returns `true` in [`ConstructionState::Idle`].
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

impl fmt::Display for ConstructionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::PlacingCreate { entity_type, size } => {
                write!(f, "placing {entity_type} ({size})")
            }
            Self::PlacingDestroy => f.write_str("destroying"),
        }
    }
}
