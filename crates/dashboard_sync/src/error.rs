//! Reasons an inbound entity event is rejected.

/// Errors raised while validating an entity channel message.
///
/// None of these are fatal: the offending event is dropped and the spatial
/// index is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// A required field was absent.
    #[error("malformed entity event: missing {field}")]
    MalformedEvent {
        /// Wire path of the missing field.
        field: &'static str,
    },

    /// The entity snapshot was present but could not be interpreted.
    #[error("malformed entity snapshot {entity_ref}: {reason}")]
    InvalidEntity {
        /// Reference of the rejected entity.
        entity_ref: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The event id is not one of the recognised kinds.
    #[error("unknown entity event kind: {id:?}")]
    UnknownEntityKind {
        /// The id that was received.
        id: String,
    },
}
