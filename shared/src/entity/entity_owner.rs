use std::{fmt, sync::Arc};

use log::{debug, warn};

use propdelta_serde::{Serde, StreamWriter};

use crate::{
    change::{wire_index, ChangePath, PropertyChange},
    config::ReplicationConfig,
    entity::{
        entity_properties::EntityProperties, EntityType, MessageKind, OutgoingUpdate,
        PropertyDescription, UpdateTarget,
    },
    property::{ChangeError, OwnerLink, PropertyOwner, TopLevelOwner},
    types::EntityId,
};

/// The part a copy of an entity plays
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityRole {
    /// The authoritative copy, the only one that may be mutated locally
    Real,
    /// A read-only copy on another server, kept current by ghost updates
    Ghost,
    /// A read-only copy on a client, kept current by client updates
    Client,
}

impl EntityRole {
    pub fn name(&self) -> &'static str {
        match self {
            EntityRole::Real => "Real",
            EntityRole::Ghost => "Ghost",
            EntityRole::Client => "Client",
        }
    }
}

impl fmt::Display for EntityRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The top-level owner of an entity's property tree. Turns each local change
/// into the updates its property's scope calls for.
pub(crate) struct EntityOwner {
    id: EntityId,
    entity_type: Arc<EntityType>,
    role: EntityRole,
    config: ReplicationConfig,
    has_witness: bool,
    outbox: Vec<OutgoingUpdate>,
    // send-latest-only properties changed in part since they were last sent
    stale_latest_only: Vec<usize>,
}

impl EntityOwner {
    pub fn new(
        id: EntityId,
        entity_type: Arc<EntityType>,
        role: EntityRole,
        config: ReplicationConfig,
    ) -> Self {
        Self {
            id,
            entity_type,
            role,
            config,
            has_witness: false,
            outbox: Vec::new(),
            stale_latest_only: Vec::new(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn role(&self) -> EntityRole {
        self.role
    }

    pub fn set_has_witness(&mut self, has_witness: bool) {
        self.has_witness = has_witness;
    }

    pub fn take_updates(&mut self) -> Vec<OutgoingUpdate> {
        std::mem::take(&mut self.outbox)
    }

    /// Queues the whole current value of every send-latest-only property
    /// that was changed in part
    pub fn send_stale_latest_only(&mut self, properties: &EntityProperties) {
        let size = properties.num_owned_properties();
        for local_index in std::mem::take(&mut self.stale_latest_only) {
            let Some(description) = self.entity_type.property(local_index) else {
                continue;
            };
            let data_type = description.data_type().clone();
            let Some(value) = properties.owned_property(local_index) else {
                continue;
            };

            let change =
                PropertyChange::single(ChangePath::new(), local_index, size, value, &data_type);
            if let Err(err) = self.on_owned_property_changed(&change) {
                warn!(
                    "Entity {}: full update of property {} was not sent: {}",
                    self.id, local_index, err
                );
            }
        }
    }

    fn encode_for_client(
        &self,
        description: &PropertyDescription,
        client_index: usize,
        change: &PropertyChange,
    ) -> Result<(MessageKind, Vec<u8>), ChangeError> {
        let mut writer = StreamWriter::new();

        let kind = if !change.is_nested()
            && !change.is_slice()
            && client_index < self.config.direct_property_message_count
        {
            change.add_value_to_stream(&mut writer)?;
            MessageKind::EntityProperty { client_index }
        } else {
            change.add_to_external_stream(
                &mut writer,
                client_index,
                self.entity_type.client_property_count(),
            )?;
            if change.is_slice() {
                MessageKind::SliceEntityProperty
            } else {
                MessageKind::NestedEntityProperty
            }
        };

        let payload = writer.to_bytes();
        if payload.len() > self.config.max_client_message_bytes {
            warn!(
                "Entity {} ({}): client update of {} bytes for property {} exceeds the limit of {} bytes and was not sent",
                self.id,
                self.entity_type.name(),
                payload.len(),
                description.name(),
                self.config.max_client_message_bytes
            );
            return Err(ChangeError::MessageTooLarge {
                size: payload.len(),
                max_size: self.config.max_client_message_bytes,
            });
        }

        Ok((kind, payload))
    }

    fn push_update(&mut self, target: UpdateTarget, kind: MessageKind, payload: Vec<u8>) {
        debug!(
            "Entity {}: queued {:?} of {} bytes for {:?}",
            self.id,
            kind,
            payload.len(),
            target
        );
        self.outbox.push(OutgoingUpdate {
            entity_id: self.id,
            target,
            kind,
            payload,
        });
    }
}

impl OwnerLink for EntityOwner {
    fn top_level_owner(&mut self, _path: &mut ChangePath) -> Result<&mut dyn TopLevelOwner, ChangeError> {
        if self.role != EntityRole::Real {
            warn!(
                "Can't change a property of {} Entity {} ({})",
                self.role,
                self.id,
                self.entity_type.name()
            );
            return Err(ChangeError::NoTopLevelOwner {
                reason: format!("{} Entity {} is read-only", self.role, self.id),
            });
        }
        Ok(self)
    }
}

impl TopLevelOwner for EntityOwner {
    fn on_owned_property_changed(&mut self, change: &PropertyChange) -> Result<(), ChangeError> {
        let root_index = change.root_index();
        let entity_type = self.entity_type.clone();
        let description = entity_type
            .property(root_index)
            .ok_or(ChangeError::IndexOutOfRange {
                index: root_index,
                size: entity_type.properties().len(),
            })?;

        let depth = change.path().len();
        if depth > self.config.max_change_path_depth {
            warn!(
                "Entity {}: change to {} is {} levels deep, deeper than the limit of {}",
                self.id,
                description.name(),
                depth,
                self.config.max_change_path_depth
            );
            return Err(ChangeError::PathTooDeep {
                depth,
                max_depth: self.config.max_change_path_depth,
            });
        }

        let scope = description.scope();
        if change.is_nested() && scope.is_other_clients() && description.send_latest_only() {
            warn!(
                "Entity {} ({}): {} is send-latest-only and was partially changed. Sending full property.",
                self.id,
                self.entity_type.name(),
                description.name()
            );
            if !self.stale_latest_only.contains(&root_index) {
                self.stale_latest_only.push(root_index);
            }
            return Ok(());
        }
        if !change.is_nested() {
            self.stale_latest_only.retain(|stale| *stale != root_index);
        }

        let to_other_clients = scope.is_other_clients();
        let to_own_client = scope.is_own_client() && self.has_witness;

        // encode everything first so an oversize update reaches nobody
        let client_update = match description.client_index() {
            Some(client_index) if to_other_clients || to_own_client => {
                Some(self.encode_for_client(description, client_index, change)?)
            }
            _ => None,
        };

        let ghost_update = if scope.is_ghosted() {
            let mut writer = StreamWriter::new();
            wire_index(description.local_index())?.ser(&mut writer);
            change.add_to_internal_stream(&mut writer)?;
            Some(writer.to_bytes())
        } else {
            None
        };

        if let Some((kind, payload)) = client_update {
            if to_other_clients {
                self.push_update(UpdateTarget::OtherClients, kind, payload.clone());
            }
            if to_own_client {
                self.push_update(UpdateTarget::OwnClient, kind, payload);
            }
        }
        if let Some(payload) = ghost_update {
            self.push_update(UpdateTarget::Ghosts, MessageKind::GhostedDataUpdate, payload);
        }

        Ok(())
    }
}
