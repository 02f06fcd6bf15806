use std::sync::Arc;

use log::warn;

use propdelta_serde::{BitReader, Serde, SerdeErr};

use crate::{
    change::{
        apply_compressed_path, apply_simple_path, peek_simple_root_index, ChangePath,
        DecodedChange, DecodedKind,
    },
    config::ReplicationConfig,
    entity::{
        entity_owner::EntityOwner,
        entity_properties::{EntityProperties, EntityView},
        EntityError, EntityRole, EntityType, MessageKind, OutgoingUpdate, PropertyChangedEvent,
    },
    property::{ChangeError, PropertyCursor, PropertyOwner},
    types::EntityId,
    value::Value,
};

/// One copy of a replicated entity.
///
/// A real entity is mutated through [`Entity::properties_mut`] and queues an
/// [`OutgoingUpdate`] for every peer that should see each change. Ghost and
/// client copies reject local mutation and are kept current by applying the
/// updates a real entity produced.
pub struct Entity {
    properties: EntityProperties,
    owner: EntityOwner,
}

impl Entity {
    pub fn new_real(id: EntityId, entity_type: Arc<EntityType>, config: ReplicationConfig) -> Self {
        Self::new(id, entity_type, EntityRole::Real, config)
    }

    pub fn new_ghost(id: EntityId, entity_type: Arc<EntityType>) -> Self {
        Self::new(id, entity_type, EntityRole::Ghost, ReplicationConfig::default())
    }

    /// A client copy holds only the client-exposed properties, numbered by
    /// client index
    pub fn new_client(id: EntityId, entity_type: Arc<EntityType>) -> Self {
        Self::new(id, entity_type, EntityRole::Client, ReplicationConfig::default())
    }

    fn new(
        id: EntityId,
        entity_type: Arc<EntityType>,
        role: EntityRole,
        config: ReplicationConfig,
    ) -> Self {
        let view = match role {
            EntityRole::Real | EntityRole::Ghost => EntityView::Cell,
            EntityRole::Client => EntityView::Client,
        };
        Self {
            properties: EntityProperties::new(entity_type.clone(), view),
            owner: EntityOwner::new(id, entity_type, role, config),
        }
    }

    pub fn id(&self) -> EntityId {
        self.owner.id()
    }

    pub fn role(&self) -> EntityRole {
        self.owner.role()
    }

    /// Whether a client owns this entity, and so receives own-client updates
    pub fn set_has_witness(&mut self, has_witness: bool) {
        self.owner.set_has_witness(has_witness);
    }

    pub fn slot_of(&self, name: &str) -> Option<usize> {
        self.properties.slot_of(name)
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.owned_property(self.slot_of(name)?)
    }

    /// A cursor over the top-level properties, through which every mutation
    /// is replicated
    pub fn properties_mut(&mut self) -> PropertyCursor<'_> {
        PropertyCursor::new(&mut self.properties, &mut self.owner)
    }

    pub fn set_property(&mut self, name: &str, value: Value) -> Result<(), EntityError> {
        let slot = self.slot_of(name).ok_or_else(|| EntityError::UnknownProperty {
            entity_id: self.id(),
            property: name.to_string(),
        })?;
        self.properties_mut().set(slot, value)?;
        Ok(())
    }

    /// Takes every update queued since the last call
    pub fn take_updates(&mut self) -> Vec<OutgoingUpdate> {
        self.owner.send_stale_latest_only(&self.properties);
        self.owner.take_updates()
    }

    /// Applies the payload of a ghosted data update from the real entity
    pub fn apply_ghost_update(&mut self, payload: &[u8]) -> Result<PropertyChangedEvent, EntityError> {
        self.require_role(EntityRole::Ghost, "apply ghost updates")?;

        let mut reader = BitReader::new(payload);
        let routed = usize::try_from(i32::de(&mut reader)?)
            .map_err(|_| SerdeErr::malformed("negative property index in ghost update"))?;
        if self.properties.description(routed).is_none() {
            return Err(EntityError::PropertyIndexOutOfRange {
                entity_id: self.id(),
                index: routed,
            });
        }

        let changed = peek_simple_root_index(&payload[4..])?;
        if changed != routed {
            warn!(
                "Ghost update for Entity {} is routed to property {} but changes property {}",
                self.id(),
                routed,
                changed
            );
            return Err(EntityError::RootIndexMismatch {
                entity_id: self.id(),
                routed,
                changed,
            });
        }

        let change = apply_simple_path(&mut reader, &mut self.properties)
            .map_err(|err| self.decode_failed(Some(routed), err))?;
        Ok(self.changed_event(change))
    }

    /// Applies a direct update carrying the whole new value of one property
    pub fn apply_client_property(
        &mut self,
        client_index: usize,
        payload: &[u8],
    ) -> Result<PropertyChangedEvent, EntityError> {
        self.require_role(EntityRole::Client, "apply client updates")?;

        if client_index >= self.properties.num_owned_properties() {
            return Err(EntityError::PropertyIndexOutOfRange {
                entity_id: self.id(),
                index: client_index,
            });
        }

        let mut reader = BitReader::new(payload);
        let key = self.properties.index_as_key(client_index);
        let old_value = self
            .properties
            .set_owned_property(client_index, &mut reader)
            .map_err(|err| self.decode_failed(Some(client_index), err))?;

        let change = DecodedChange::new(
            ChangePath::new(),
            vec![key],
            DecodedKind::Single {
                leaf_index: client_index,
                old_value,
            },
        );
        Ok(self.changed_event(change))
    }

    /// Applies a bit-packed update. Whether it is a slice change comes from
    /// the message kind it arrived as.
    pub fn apply_client_nested(
        &mut self,
        payload: &[u8],
        is_slice: bool,
    ) -> Result<PropertyChangedEvent, EntityError> {
        self.require_role(EntityRole::Client, "apply client updates")?;

        let mut reader = BitReader::new(payload);
        let change = apply_compressed_path(&mut reader, &mut self.properties, is_slice)
            .map_err(|err| self.decode_failed(descended_root(&err), err))?;
        Ok(self.changed_event(change))
    }

    /// Applies an update to whichever copy it was addressed to
    pub fn apply_update(
        &mut self,
        kind: MessageKind,
        payload: &[u8],
    ) -> Result<PropertyChangedEvent, EntityError> {
        match kind {
            MessageKind::GhostedDataUpdate => self.apply_ghost_update(payload),
            MessageKind::EntityProperty { client_index } => {
                self.apply_client_property(client_index, payload)
            }
            MessageKind::NestedEntityProperty => self.apply_client_nested(payload, false),
            MessageKind::SliceEntityProperty => self.apply_client_nested(payload, true),
        }
    }

    fn require_role(&self, role: EntityRole, operation: &'static str) -> Result<(), EntityError> {
        if self.role() == role {
            return Ok(());
        }
        Err(EntityError::WrongRole {
            entity_id: self.id(),
            role: self.role().name(),
            operation,
        })
    }

    fn decode_failed(&self, slot: Option<usize>, err: ChangeError) -> EntityError {
        match slot.and_then(|slot| self.properties.description(slot)) {
            Some(description) => warn!(
                "Entity {} ({} copy): failed to apply update near property {}: {}",
                self.id(),
                self.role(),
                description.name(),
                err
            ),
            None => warn!(
                "Entity {} ({} copy): failed to apply update: {}",
                self.id(),
                self.role(),
                err
            ),
        }
        EntityError::Change(err)
    }

    fn changed_event(&self, change: DecodedChange) -> PropertyChangedEvent {
        let property = self
            .properties
            .description(change.root_index())
            .map(|description| description.name().to_string())
            .unwrap_or_default();
        PropertyChangedEvent {
            entity_id: self.id(),
            property,
            change,
        }
    }
}

/// The top-level slot a bit-packed change was headed for, when the failure
/// tells us
fn descended_root(err: &ChangeError) -> Option<usize> {
    match err {
        ChangeError::PathDescendFailed { root_index, .. } => Some(*root_index),
        _ => None,
    }
}
