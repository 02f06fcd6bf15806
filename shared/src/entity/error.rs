use thiserror::Error;

use propdelta_serde::SerdeErr;

use crate::{property::ChangeError, types::EntityId};

/// Errors that can occur while building, mutating, or updating an Entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityError {
    /// A property change failed
    #[error("{0}")]
    Change(#[from] ChangeError),

    /// An update message could not be read
    #[error("Failed to read entity update: {0}")]
    Stream(#[from] SerdeErr),

    /// Two properties of the same entity type share a name
    #[error("Entity type {entity_type} declares property {property} more than once")]
    DuplicateProperty {
        entity_type: String,
        property: String,
    },

    /// A property name that the entity type does not declare
    #[error("Entity {entity_id} has no property named {property}")]
    UnknownProperty {
        entity_id: EntityId,
        property: String,
    },

    /// An update addressed a property slot the entity does not have
    #[error("Entity {entity_id} has no property at index {index}")]
    PropertyIndexOutOfRange { entity_id: EntityId, index: usize },

    /// The operation is not valid for the role this copy of the entity plays
    #[error("{role} Entity {entity_id} should never {operation}")]
    WrongRole {
        entity_id: EntityId,
        role: &'static str,
        operation: &'static str,
    },

    /// A ghost update's routing index disagrees with the path it carries
    #[error("Ghost update for Entity {entity_id} is routed to property {routed} but changes property {changed}")]
    RootIndexMismatch {
        entity_id: EntityId,
        routed: usize,
        changed: usize,
    },
}
