use std::sync::Arc;

use propdelta_serde::{BitReader, SerdeErr};

use crate::{
    property::{ChangeError, PathKey, PropertyOwner},
    value::{check_packed_length, rehome, ArrayType, DataType, Value, ValueError},
};

/// A live array value. Every element that is itself a container knows its
/// position in the array through its owner ref, which is kept current across
/// every insertion and removal.
#[derive(Clone, Debug)]
pub struct ArrayInstance {
    data_type: Arc<ArrayType>,
    values: Vec<Value>,
    owner_ref: Option<usize>,
}

impl ArrayInstance {
    /// Builds an array from values, checking each against the element type
    pub fn new(data_type: Arc<ArrayType>, values: Vec<Value>) -> Result<Self, ValueError> {
        for value in &values {
            data_type.element().check(value)?;
        }
        if data_type.strict_size().is_none() {
            check_packed_length(values.len())?;
        }
        let values = values
            .into_iter()
            .map(|value| data_type.element().normalize(value))
            .collect::<Vec<_>>();
        if let Some(size) = data_type.strict_size() {
            if size != values.len() {
                return Err(ValueError::FixedSizeMismatch {
                    expected: size,
                    actual: values.len(),
                });
            }
        }
        Ok(Self::from_values(data_type, values))
    }

    pub(crate) fn with_default(data_type: Arc<ArrayType>) -> Self {
        let size = data_type.strict_size().unwrap_or(0);
        let values = (0..size).map(|_| data_type.element().default_value()).collect();
        Self::from_values(data_type, values)
    }

    pub(crate) fn from_values(data_type: Arc<ArrayType>, mut values: Vec<Value>) -> Self {
        for (index, value) in values.iter_mut().enumerate() {
            value.attach(index);
        }
        Self {
            data_type,
            values,
            owner_ref: None,
        }
    }

    pub fn data_type(&self) -> &Arc<ArrayType> {
        &self.data_type
    }

    pub fn element_type(&self) -> &DataType {
        self.data_type.element()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }

    pub fn owner_ref(&self) -> Option<usize> {
        self.owner_ref
    }

    pub(crate) fn set_owner_ref(&mut self, owner_ref: Option<usize>) {
        self.owner_ref = owner_ref;
    }

    /// Number of elements equal to `value`
    pub fn count(&self, value: &Value) -> usize {
        self.values.iter().filter(|element| *element == value).count()
    }

    /// Position of the first element equal to `value`
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.values.iter().position(|element| element == value)
    }

    /// Checks that replacing `start..end` with `new_values` keeps the array valid
    pub(crate) fn check_slice(
        &self,
        start: usize,
        end: usize,
        new_values: &[Value],
    ) -> Result<(), ChangeError> {
        // elements that stream to nothing can't be counted back out of a slice
        if self.element_type().is_zero_width() {
            return Err(ChangeError::ZeroWidthElements {
                element_type: self.element_type().type_name(),
            });
        }
        for value in new_values {
            self.element_type().check(value)?;
        }

        let new_len = self.values.len() - (end - start) + new_values.len();
        match self.data_type.strict_size() {
            Some(size) if new_len != size => Err(ChangeError::SliceSizeMismatch {
                expected: size,
                actual: new_len,
            }),
            Some(_) => Ok(()),
            None => Ok(check_packed_length(new_len)?),
        }
    }

    /// Replaces `start..end` with `new_values` without notifying anyone.
    /// Returns the removed elements, detached.
    pub(crate) fn splice(&mut self, start: usize, end: usize, new_values: Vec<Value>) -> Vec<Value> {
        let mut removed: Vec<Value> = self.values.splice(start..end, new_values).collect();
        for value in removed.iter_mut() {
            value.detach();
        }
        for (index, value) in self.values.iter_mut().enumerate().skip(start) {
            value.attach(index);
        }
        removed
    }
}

/// Clamps possibly-negative slice bounds into `0..=size`, with `end >= start`
pub fn clamp_slice(start: isize, end: isize, size: usize) -> (usize, usize) {
    let clamp = |bound: isize| usize::try_from(bound).map_or(0, |bound| bound.min(size));
    let start = clamp(start);
    let end = clamp(end).max(start);
    (start, end)
}

impl PartialEq for ArrayInstance {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl PropertyOwner for ArrayInstance {
    fn num_owned_properties(&self) -> usize {
        self.values.len()
    }

    fn owned_property(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    fn owned_property_type(&self, index: usize) -> Option<&DataType> {
        (index < self.values.len()).then(|| self.data_type.element())
    }

    fn child_owner(&mut self, index: usize) -> Option<&mut dyn PropertyOwner> {
        self.values.get_mut(index)?.as_owner_mut()
    }

    fn swap_owned_property(&mut self, index: usize, value: Value) -> Result<Value, ChangeError> {
        let size = self.values.len();
        self.data_type.element().check(&value)?;
        let slot = self
            .values
            .get_mut(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        Ok(rehome(slot, value, index))
    }

    fn set_owned_slice(
        &mut self,
        start: usize,
        end: usize,
        reader: &mut BitReader,
    ) -> Result<Vec<Value>, ChangeError> {
        let size = self.values.len();
        if start > end || end > size {
            return Err(ChangeError::InvalidSliceBounds { start, end, size });
        }

        // decode everything before touching the array
        let mut new_values = Vec::new();
        while reader.has_remaining_bytes() {
            let remaining = reader.bits_remaining();
            new_values.push(self.element_type().create_from_stream(reader)?);
            if reader.bits_remaining() == remaining {
                return Err(SerdeErr::malformed("slice element read no data").into());
            }
        }

        self.check_slice(start, end, &new_values)?;
        Ok(self.splice(start, end, new_values))
    }

    fn index_as_key(&self, index: usize) -> PathKey {
        PathKey::Index(index)
    }

    fn as_sequence_mut(&mut self) -> Option<&mut ArrayInstance> {
        Some(self)
    }

    fn owner_type_name(&self) -> &'static str {
        "ARRAY"
    }
}
