use std::sync::Arc;

use crate::{
    entity::{EntityType, PropertyDescription},
    property::{ChangeError, PathKey, PropertyOwner},
    value::{rehome, DataType, Value},
};

/// Which properties a copy of an entity holds, and how its slots are numbered
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EntityView {
    /// Every property, numbered by local index
    Cell,
    /// Client-exposed properties only, numbered by client index
    Client,
}

/// The top-level property values of an entity
pub(crate) struct EntityProperties {
    entity_type: Arc<EntityType>,
    slots: Vec<usize>,
    values: Vec<Value>,
}

impl EntityProperties {
    pub fn new(entity_type: Arc<EntityType>, view: EntityView) -> Self {
        let slots: Vec<usize> = match view {
            EntityView::Cell => (0..entity_type.properties().len()).collect(),
            EntityView::Client => entity_type.client_local_indices().to_vec(),
        };

        let mut values = Vec::with_capacity(slots.len());
        for (slot, local_index) in slots.iter().enumerate() {
            let mut value = entity_type.properties()[*local_index]
                .data_type()
                .default_value();
            value.attach(slot);
            values.push(value);
        }

        Self {
            entity_type,
            slots,
            values,
        }
    }

    pub fn description(&self, slot: usize) -> Option<&PropertyDescription> {
        self.entity_type.property(*self.slots.get(slot)?)
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|local_index| {
            self.entity_type
                .property(*local_index)
                .is_some_and(|description| description.name() == name)
        })
    }
}

impl PropertyOwner for EntityProperties {
    fn num_owned_properties(&self) -> usize {
        self.values.len()
    }

    fn owned_property(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    fn owned_property_type(&self, index: usize) -> Option<&DataType> {
        Some(self.description(index)?.data_type())
    }

    fn child_owner(&mut self, index: usize) -> Option<&mut dyn PropertyOwner> {
        self.values.get_mut(index)?.as_owner_mut()
    }

    fn swap_owned_property(&mut self, index: usize, value: Value) -> Result<Value, ChangeError> {
        let size = self.values.len();
        let description = self
            .description(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        description.data_type().check(&value)?;
        Ok(rehome(&mut self.values[index], value, index))
    }

    fn index_as_key(&self, index: usize) -> PathKey {
        match self.description(index) {
            Some(description) => PathKey::Name(description.name().to_string()),
            None => PathKey::Index(index),
        }
    }

    fn owner_type_name(&self) -> &'static str {
        "ENTITY"
    }
}
