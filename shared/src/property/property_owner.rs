use std::fmt;

use propdelta_serde::BitReader;

use crate::{
    property::ChangeError,
    value::{ArrayInstance, DataType, Value},
};

/// Something that owns an ordered set of property slots: an entity, an
/// array, or a record. Owners nest through container values, and a change
/// anywhere in the tree is addressed by the path of slot indices leading to
/// it.
pub trait PropertyOwner {
    /// Number of slots this owner holds
    fn num_owned_properties(&self) -> usize;

    fn owned_property(&self, index: usize) -> Option<&Value>;

    fn owned_property_type(&self, index: usize) -> Option<&DataType>;

    /// The container held in slot `index`, or None if that slot does not
    /// exist or holds a plain value
    fn child_owner(&mut self, index: usize) -> Option<&mut dyn PropertyOwner>;

    /// Puts `value` into slot `index` and returns the previous value. Nobody
    /// is notified.
    fn swap_owned_property(&mut self, index: usize, value: Value) -> Result<Value, ChangeError>;

    /// Reads a value of the slot's type from the stream and swaps it in
    fn set_owned_property(
        &mut self,
        index: usize,
        reader: &mut BitReader,
    ) -> Result<Value, ChangeError> {
        let size = self.num_owned_properties();
        let data_type = self
            .owned_property_type(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        let value = data_type.create_from_stream(reader)?;
        self.swap_owned_property(index, value)
    }

    /// Replaces slots `start..end` with values read until the stream is
    /// exhausted, returning the replaced values
    fn set_owned_slice(
        &mut self,
        _start: usize,
        _end: usize,
        _reader: &mut BitReader,
    ) -> Result<Vec<Value>, ChangeError> {
        Err(ChangeError::SliceNotSupported {
            owner_type: self.owner_type_name(),
        })
    }

    /// The key a script-facing observer would use for slot `index`
    fn index_as_key(&self, index: usize) -> PathKey;

    fn as_sequence_mut(&mut self) -> Option<&mut ArrayInstance> {
        None
    }

    fn owner_type_name(&self) -> &'static str;
}

/// One step of a key path: an array position or a named field
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathKey {
    Index(usize),
    Name(String),
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKey::Index(index) => write!(f, "[{}]", index),
            PathKey::Name(name) => write!(f, ".{}", name),
        }
    }
}

/// Decides whether an assignment is a change worth replicating
pub trait PropertyComparator {
    /// Whether the assignment can be skipped entirely, slot untouched
    fn can_ignore_assignment(&self, _old_value: &Value, _new_value: &Value) -> bool {
        false
    }

    fn has_changed(&self, old_value: &Value, new_value: &Value) -> bool;
}
