use std::sync::Arc;

use crate::{
    property::{ChangeError, PathKey, PropertyOwner},
    value::{rehome, DataType, FixedDictType, Value, ValueError},
};

/// A live record value, one slot per declared field
#[derive(Clone, Debug)]
pub struct FixedDictInstance {
    data_type: Arc<FixedDictType>,
    values: Vec<Value>,
    owner_ref: Option<usize>,
}

impl FixedDictInstance {
    /// Builds a record from field values given in declaration order
    pub fn new(data_type: Arc<FixedDictType>, values: Vec<Value>) -> Result<Self, ValueError> {
        if values.len() != data_type.fields().len() {
            return Err(ValueError::FixedSizeMismatch {
                expected: data_type.fields().len(),
                actual: values.len(),
            });
        }
        for (field, value) in data_type.fields().iter().zip(&values) {
            field.data_type().check(value)?;
        }
        let values = data_type
            .fields()
            .iter()
            .zip(values)
            .map(|(field, value)| field.data_type().normalize(value))
            .collect();
        Ok(Self::from_values(data_type, values))
    }

    pub(crate) fn with_default(data_type: Arc<FixedDictType>) -> Self {
        let values = data_type
            .fields()
            .iter()
            .map(|field| field.data_type().default_value())
            .collect();
        Self::from_values(data_type, values)
    }

    pub(crate) fn from_values(data_type: Arc<FixedDictType>, mut values: Vec<Value>) -> Self {
        for (index, value) in values.iter_mut().enumerate() {
            value.attach(index);
        }
        Self {
            data_type,
            values,
            owner_ref: None,
        }
    }

    pub fn data_type(&self) -> &Arc<FixedDictType> {
        &self.data_type
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(self.data_type.field_index(name)?)
    }

    pub fn owner_ref(&self) -> Option<usize> {
        self.owner_ref
    }

    pub(crate) fn set_owner_ref(&mut self, owner_ref: Option<usize>) {
        self.owner_ref = owner_ref;
    }
}

impl PartialEq for FixedDictInstance {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl PropertyOwner for FixedDictInstance {
    fn num_owned_properties(&self) -> usize {
        self.values.len()
    }

    fn owned_property(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    fn owned_property_type(&self, index: usize) -> Option<&DataType> {
        Some(self.data_type.field(index)?.data_type())
    }

    fn child_owner(&mut self, index: usize) -> Option<&mut dyn PropertyOwner> {
        self.values.get_mut(index)?.as_owner_mut()
    }

    fn swap_owned_property(&mut self, index: usize, value: Value) -> Result<Value, ChangeError> {
        let size = self.values.len();
        let field = self
            .data_type
            .field(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        field.data_type().check(&value)?;
        Ok(rehome(&mut self.values[index], value, index))
    }

    fn index_as_key(&self, index: usize) -> PathKey {
        match self.data_type.field(index) {
            Some(field) => PathKey::Name(field.name().to_string()),
            None => PathKey::Index(index),
        }
    }

    fn owner_type_name(&self) -> &'static str {
        "FIXED_DICT"
    }
}
