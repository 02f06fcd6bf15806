use std::{collections::HashSet, sync::Arc};

use crate::{entity::EntityError, value::DataType};

/// Where a property is replicated to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PropertyScope {
    /// Only on the real entity
    CellPrivate,
    /// On the real entity and its ghosts
    CellPublic,
    /// On the real entity and the client that owns it
    OwnClient,
    /// On ghosts, and on every client except the owner
    OtherClients,
    /// On ghosts, and on every client including the owner
    AllClients,
}

impl PropertyScope {
    pub fn is_ghosted(&self) -> bool {
        matches!(
            self,
            PropertyScope::CellPublic | PropertyScope::OtherClients | PropertyScope::AllClients
        )
    }

    pub fn is_other_clients(&self) -> bool {
        matches!(self, PropertyScope::OtherClients | PropertyScope::AllClients)
    }

    pub fn is_own_client(&self) -> bool {
        matches!(self, PropertyScope::OwnClient | PropertyScope::AllClients)
    }

    pub fn is_client_exposed(&self) -> bool {
        self.is_other_clients() || self.is_own_client()
    }
}

/// A declared property of an entity type
#[derive(Clone, Debug)]
pub struct PropertyDescription {
    name: String,
    data_type: DataType,
    scope: PropertyScope,
    local_index: usize,
    client_index: Option<usize>,
    send_latest_only: bool,
}

impl PropertyDescription {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &DataType {
        &self.data_type
    }

    pub fn scope(&self) -> PropertyScope {
        self.scope
    }

    /// Position among all properties of the type
    pub fn local_index(&self) -> usize {
        self.local_index
    }

    /// Position among the client-exposed properties, if the property is one
    pub fn client_index(&self) -> Option<usize> {
        self.client_index
    }

    /// Whether clients are sent the whole property instead of partial
    /// changes to it
    pub fn send_latest_only(&self) -> bool {
        self.send_latest_only
    }
}

/// The set of properties every entity of a type carries
#[derive(Debug)]
pub struct EntityType {
    name: String,
    properties: Vec<PropertyDescription>,
    client_properties: Vec<usize>,
}

impl EntityType {
    pub fn builder<N: Into<String>>(name: N) -> EntityTypeBuilder {
        EntityTypeBuilder {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn properties(&self) -> &[PropertyDescription] {
        &self.properties
    }

    pub fn property(&self, local_index: usize) -> Option<&PropertyDescription> {
        self.properties.get(local_index)
    }

    pub fn property_by_name(&self, name: &str) -> Option<&PropertyDescription> {
        self.properties.iter().find(|property| property.name == name)
    }

    pub fn client_property(&self, client_index: usize) -> Option<&PropertyDescription> {
        let local_index = *self.client_properties.get(client_index)?;
        self.properties.get(local_index)
    }

    pub fn client_property_count(&self) -> usize {
        self.client_properties.len()
    }

    /// Local indices of the client-exposed properties, in client index order
    pub(crate) fn client_local_indices(&self) -> &[usize] {
        &self.client_properties
    }
}

pub struct EntityTypeBuilder {
    name: String,
    properties: Vec<(String, DataType, PropertyScope, bool)>,
}

impl EntityTypeBuilder {
    pub fn add_property<N: Into<String>>(
        mut self,
        name: N,
        data_type: DataType,
        scope: PropertyScope,
    ) -> Self {
        self.properties.push((name.into(), data_type, scope, false));
        self
    }

    /// Marks the property added last as send-latest-only
    pub fn send_latest_only(mut self) -> Self {
        if let Some(property) = self.properties.last_mut() {
            property.3 = true;
        }
        self
    }

    /// Assigns local indices in declaration order, and client indices in
    /// declaration order among client-exposed properties
    pub fn build(self) -> Result<Arc<EntityType>, EntityError> {
        let mut names = HashSet::new();
        let mut properties = Vec::with_capacity(self.properties.len());
        let mut client_properties = Vec::new();

        for (local_index, (name, data_type, scope, send_latest_only)) in
            self.properties.into_iter().enumerate()
        {
            if !names.insert(name.clone()) {
                return Err(EntityError::DuplicateProperty {
                    entity_type: self.name,
                    property: name,
                });
            }

            let client_index = if scope.is_client_exposed() {
                client_properties.push(local_index);
                Some(client_properties.len() - 1)
            } else {
                None
            };

            properties.push(PropertyDescription {
                name,
                data_type,
                scope,
                local_index,
                client_index,
                send_latest_only,
            });
        }

        Ok(Arc::new(EntityType {
            name: self.name,
            properties,
            client_properties,
        }))
    }
}
