use crate::{
    change::{DecodedChange, DecodedKind},
    property::PathKey,
    types::EntityId,
    value::Value,
};

/// Who an outgoing update is for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateTarget {
    /// Every ghost of the entity, on other servers
    Ghosts,
    /// Every client that sees the entity, apart from its owner
    OtherClients,
    /// The client that owns the entity
    OwnClient,
}

/// The message an update payload is carried in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// An i32 property index followed by a change in the uncompressed layout
    GhostedDataUpdate,
    /// The bare new value of the client property with this index
    EntityProperty { client_index: usize },
    /// A single-value change in the bit-packed layout
    NestedEntityProperty,
    /// A slice change in the bit-packed layout
    SliceEntityProperty,
}

/// An encoded property change waiting to be sent
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingUpdate {
    pub entity_id: EntityId,
    pub target: UpdateTarget,
    pub kind: MessageKind,
    pub payload: Vec<u8>,
}

/// Describes a property change that arrived from the network and has been
/// applied to an entity
#[derive(Clone, Debug, PartialEq)]
pub struct PropertyChangedEvent {
    pub entity_id: EntityId,
    /// Name of the top-level property the change happened under
    pub property: String,
    pub change: DecodedChange,
}

impl PropertyChangedEvent {
    pub fn is_slice(&self) -> bool {
        self.change.is_slice()
    }

    pub fn key_path(&self) -> &[PathKey] {
        self.change.key_path()
    }

    /// The replaced value of a single-value change
    pub fn old_value(&self) -> Option<&Value> {
        match self.change.kind() {
            DecodedKind::Single { old_value, .. } => Some(old_value),
            DecodedKind::Slice { .. } => None,
        }
    }

    /// The replaced elements of a slice change
    pub fn old_values(&self) -> Option<&[Value]> {
        match self.change.kind() {
            DecodedKind::Single { .. } => None,
            DecodedKind::Slice { old_values, .. } => Some(old_values),
        }
    }
}
