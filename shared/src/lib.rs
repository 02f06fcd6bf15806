//! # Propdelta Shared
//! Replication of nested property changes between the authoritative copy of
//! an entity, its ghosts on other servers, and the clients that see it.
//!
//! A change anywhere in an entity's property tree is described as a path of
//! slot indices plus the new value(s), and encoded in one of two layouts: an
//! uncompressed one for server-to-server ghost updates, and a bit-packed one
//! for clients whose field widths depend on the tree's current shape.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use propdelta_serde::{
    bits_required, BitCounter, BitReader, BitWrite, BitWriter, Serde, SerdeErr, StreamWriter,
    MAX_BUFFER_BITS, MAX_BUFFER_BYTES, MAX_PACKED_COUNT,
};

mod change;
mod config;
mod entity;
mod property;
mod types;
mod value;

pub use change::{
    apply_compressed_path, apply_simple_path, ChangeKind, ChangePath, DecodedChange, DecodedKind,
    PathEntry, PropertyChange, SingleChange, SliceChange, FLAG_IS_NESTED, FLAG_IS_SLICE,
};
pub use config::ReplicationConfig;
pub use entity::{
    Entity, EntityError, EntityRole, EntityType, EntityTypeBuilder, MessageKind, OutgoingUpdate,
    PropertyChangedEvent, PropertyDescription, PropertyScope, UpdateTarget,
};
pub use property::{
    ChangeError, NestedLink, OwnerLink, PathKey, PropertyComparator, PropertyCursor,
    PropertyOwner, TopLevelOwner,
};
pub use types::EntityId;
pub use value::{
    clamp_slice, ArrayInstance, ArrayType, DataType, FieldType, FixedDictInstance, FixedDictType,
    Value, ValueError,
};
