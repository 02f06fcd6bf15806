#[allow(clippy::module_inception)]
mod entity;
mod entity_owner;
mod entity_properties;
mod entity_type;
mod entity_update;
mod error;

pub use entity::Entity;
pub use entity_owner::EntityRole;
pub use entity_type::{EntityType, EntityTypeBuilder, PropertyDescription, PropertyScope};
pub use entity_update::{MessageKind, OutgoingUpdate, PropertyChangedEvent, UpdateTarget};
pub use error::EntityError;
