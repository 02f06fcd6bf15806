/// END-TO-END TESTS: a real entity replicating to its ghost and clients
///
/// Every mutation goes through the real entity's property cursor, every
/// queued update is delivered to the copy it is addressed to, and the copies
/// are then compared with the real entity.
use propdelta_shared::{DataType, EntityType, MessageKind, PathKey, PropertyScope, UpdateTarget, Value};
use propdelta_test::{
    array_value, assert_replicated, assert_untouched, avatar_type, int_array, int_matrix,
    ReplicationHarness,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn targets(harness: &mut ReplicationHarness) -> Vec<UpdateTarget> {
    harness.flush().into_iter().map(|delivery| delivery.target).collect()
}

#[test]
fn test_all_clients_property_reaches_every_copy() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());

    harness.real.set_property("health", Value::Int(75)).unwrap();
    let deliveries = harness.flush();

    let delivered: Vec<(UpdateTarget, MessageKind)> = deliveries
        .iter()
        .map(|delivery| (delivery.target, delivery.kind))
        .collect();
    assert_eq!(
        delivered,
        vec![
            (UpdateTarget::OtherClients, MessageKind::EntityProperty { client_index: 0 }),
            (UpdateTarget::OwnClient, MessageKind::EntityProperty { client_index: 0 }),
            (UpdateTarget::Ghosts, MessageKind::GhostedDataUpdate),
        ]
    );
    assert_eq!(deliveries[0].payload, 75_i32.to_le_bytes().to_vec());

    assert_replicated!(harness, ghost, "health");
    assert_replicated!(harness, owner, "health");
    assert_replicated!(harness, observer, "health");

    for delivery in &deliveries {
        assert_eq!(delivery.event.property, "health");
        assert_eq!(delivery.event.old_value(), Some(&Value::Int(0)));
        assert_eq!(delivery.event.key_path(), &[PathKey::Name("health".to_string())]);
    }
}

#[test]
fn test_cell_private_property_never_leaves_the_real_entity() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());

    harness.real.set_property("secret", Value::UInt(7)).unwrap();

    assert!(harness.flush().is_empty());
    assert_untouched!(harness.ghost, "secret", Value::UInt(0));
    assert_eq!(harness.owner.property("secret"), None);
}

#[test]
fn test_cell_public_property_reaches_only_ghosts() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());

    harness.real.set_property("home_cell", Value::Int(-3)).unwrap();
    let deliveries = harness.flush();

    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].target, UpdateTarget::Ghosts);

    // routing index, flags, path length, leaf index, then the int64 value
    let mut expected = 5_i32.to_le_bytes().to_vec();
    expected.extend_from_slice(&[0, 0]);
    expected.extend_from_slice(&5_i32.to_le_bytes());
    expected.extend_from_slice(&(-3_i64).to_le_bytes());
    assert_eq!(deliveries[0].payload, expected);

    assert_replicated!(harness, ghost, "home_cell");
}

#[test]
fn test_unchanged_assignment_is_not_replicated() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());

    harness.real.set_property("health", Value::Int(0)).unwrap();
    assert!(harness.flush().is_empty());

    harness
        .real
        .properties_mut()
        .set_with(0, Value::Int(0), &DataType::Int32, true)
        .unwrap();
    assert_eq!(harness.flush().len(), 3);
}

#[test]
fn test_own_client_property_follows_witness() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());
    let slot = harness.real.slot_of("inventory").unwrap();

    let mut properties = harness.real.properties_mut();
    let mut inventory = properties.child(slot).unwrap();
    inventory
        .extend(vec![
            Value::from("sword"),
            Value::from("shield"),
            Value::from("potion"),
        ])
        .unwrap();
    assert_eq!(inventory.pop(-1).unwrap(), Value::from("potion"));
    inventory.remove(&Value::from("sword")).unwrap();

    let deliveries = harness.flush();
    assert_eq!(deliveries.len(), 3);
    for delivery in &deliveries {
        assert_eq!(delivery.target, UpdateTarget::OwnClient);
        assert_eq!(delivery.kind, MessageKind::SliceEntityProperty);
    }
    assert_eq!(
        deliveries[1].event.old_values(),
        Some(&[Value::from("potion")][..])
    );

    assert_replicated!(harness, owner, "inventory");
    let string_array = DataType::array_of(DataType::String);
    assert_untouched!(harness.observer, "inventory", array_value(&string_array, vec![]));
    assert_untouched!(harness.ghost, "inventory", array_value(&string_array, vec![]));

    harness.real.set_has_witness(false);
    harness
        .real
        .properties_mut()
        .child(slot)
        .unwrap()
        .clear()
        .unwrap();
    assert!(harness.flush().is_empty());
}

#[test]
fn test_nested_changes_reach_other_clients() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());
    let row_type = DataType::array_of(DataType::Int16);
    let slot = harness.real.slot_of("waypoints").unwrap();

    let mut properties = harness.real.properties_mut();
    let mut waypoints = properties.child(slot).unwrap();
    waypoints.append(int_array(&row_type, &[1, 2, 3])).unwrap();
    waypoints.child(0).unwrap().set(1, Value::Int(20)).unwrap();

    let deliveries = harness.flush();
    assert_eq!(
        deliveries
            .iter()
            .map(|delivery| (delivery.target, delivery.kind))
            .collect::<Vec<_>>(),
        vec![
            (UpdateTarget::OtherClients, MessageKind::SliceEntityProperty),
            (UpdateTarget::Ghosts, MessageKind::GhostedDataUpdate),
            (UpdateTarget::OtherClients, MessageKind::NestedEntityProperty),
            (UpdateTarget::Ghosts, MessageKind::GhostedDataUpdate),
        ]
    );
    assert_eq!(
        deliveries[2].event.key_path(),
        &[
            PathKey::Name("waypoints".to_string()),
            PathKey::Index(0),
            PathKey::Index(1)
        ]
    );

    assert_replicated!(harness, observer, "waypoints");
    assert_replicated!(harness, ghost, "waypoints");
    let waypoints_type = DataType::array_of(row_type);
    assert_untouched!(harness.owner, "waypoints", int_matrix(&waypoints_type, &[]));
}

#[test]
fn test_insert_reindexes_later_elements() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());
    let row_type = DataType::array_of(DataType::Int16);
    let waypoints_type = DataType::array_of(row_type.clone());
    let slot = harness.real.slot_of("waypoints").unwrap();

    harness
        .real
        .set_property("waypoints", int_matrix(&waypoints_type, &[&[1], &[2]]))
        .unwrap();
    assert_eq!(
        targets(&mut harness),
        vec![UpdateTarget::OtherClients, UpdateTarget::Ghosts]
    );

    {
        let mut properties = harness.real.properties_mut();
        let mut waypoints = properties.child(slot).unwrap();
        waypoints.insert(0, int_array(&row_type, &[9])).unwrap();
        // the row that was at 0 is now at 1
        waypoints.child(1).unwrap().set(0, Value::Int(5)).unwrap();
    }

    let expected = int_matrix(&waypoints_type, &[&[9], &[5], &[2]]);
    let real_waypoints = harness.real.property("waypoints").unwrap();
    assert_eq!(real_waypoints, &expected);
    let rows = real_waypoints.as_array().unwrap();
    for (index, row) in rows.iter().enumerate() {
        assert_eq!(row.owner_ref(), Some(index));
    }

    harness.flush();
    assert_eq!(harness.observer.property("waypoints"), Some(&expected));
    assert_eq!(harness.ghost.property("waypoints"), Some(&expected));
}

#[test]
fn test_fixed_dict_fields_replicate() {
    init();
    let mut harness = ReplicationHarness::new(avatar_type());
    let slot = harness.real.slot_of("stats").unwrap();

    {
        let mut properties = harness.real.properties_mut();
        let mut stats = properties.child(slot).unwrap();
        stats.set(0, Value::UInt(12)).unwrap();
        stats.child(1).unwrap().append(Value::from("hero")).unwrap();
    }

    let deliveries = harness.flush();
    assert_eq!(deliveries.len(), 6);
    let observed: Vec<_> = deliveries
        .iter()
        .filter(|delivery| delivery.target == UpdateTarget::OtherClients)
        .collect();
    assert_eq!(observed[0].kind, MessageKind::NestedEntityProperty);
    assert_eq!(
        observed[0].event.key_path(),
        &[
            PathKey::Name("stats".to_string()),
            PathKey::Name("strength".to_string())
        ]
    );
    assert_eq!(observed[1].kind, MessageKind::SliceEntityProperty);

    assert_replicated!(harness, ghost, "stats");
    assert_replicated!(harness, owner, "stats");
    assert_replicated!(harness, observer, "stats");
}

#[test]
fn test_slice_assignment_over_the_wire() {
    init();
    let bytes_type = DataType::array_of(DataType::UInt8);
    let entity_type = EntityType::builder("Crate")
        .add_property("open", DataType::Bool, PropertyScope::AllClients)
        .add_property("locked", DataType::Bool, PropertyScope::AllClients)
        .add_property("contents", bytes_type.clone(), PropertyScope::AllClients)
        .add_property("hidden", DataType::Bool, PropertyScope::AllClients)
        .build()
        .unwrap();
    let mut harness = ReplicationHarness::new(entity_type);
    let uints = |values: &[u64]| values.iter().copied().map(Value::UInt).collect::<Vec<_>>();

    harness
        .real
        .set_property("contents", array_value(&bytes_type, uints(&[10, 20, 30, 40, 50])))
        .unwrap();
    harness.flush();

    let removed = harness
        .real
        .properties_mut()
        .child(2)
        .unwrap()
        .set_slice(1, 3, uints(&[99, 98, 97, 96]))
        .unwrap();
    assert_eq!(removed, uints(&[20, 30]));

    let deliveries = harness.flush();
    let observed = deliveries
        .iter()
        .find(|delivery| delivery.target == UpdateTarget::OtherClients)
        .unwrap();
    assert_eq!(observed.kind, MessageKind::SliceEntityProperty);
    assert_eq!(observed.payload, vec![0xC2, 0xC0, 99, 98, 97, 96]);
    assert_eq!(observed.event.old_values(), Some(&uints(&[20, 30])[..]));

    let expected = array_value(&bytes_type, uints(&[10, 99, 98, 97, 96, 40, 50]));
    assert_eq!(harness.observer.property("contents"), Some(&expected));
    assert_eq!(harness.owner.property("contents"), Some(&expected));
    assert_eq!(harness.ghost.property("contents"), Some(&expected));
}

#[test]
fn test_property_without_direct_message_uses_packed_path() {
    init();
    let mut builder = EntityType::builder("Panel");
    for index in 0..8 {
        builder = builder.add_property(
            format!("p{}", index),
            DataType::Int8,
            PropertyScope::AllClients,
        );
    }
    let entity_type = builder.build().unwrap();

    let mut direct = ReplicationHarness::new(entity_type.clone());
    direct.real.set_property("p5", Value::Int(-1)).unwrap();
    let deliveries = direct.flush();
    assert_eq!(deliveries[0].kind, MessageKind::EntityProperty { client_index: 5 });
    assert_eq!(deliveries[0].payload, vec![0xFF]);

    let config = propdelta_shared::ReplicationConfig {
        direct_property_message_count: 0,
        ..Default::default()
    };
    let mut packed = ReplicationHarness::with_config(entity_type, config);
    packed.real.set_property("p5", Value::Int(-1)).unwrap();
    let deliveries = packed.flush();
    assert_eq!(deliveries[0].kind, MessageKind::NestedEntityProperty);
    // not nested, then 5 in three bits, then the int8 value
    assert_eq!(deliveries[0].payload, vec![0x50, 0xFF]);
    assert_eq!(deliveries[0].event.property, "p5");
    assert_replicated!(packed, observer, "p5");
}

#[test]
fn test_partial_change_to_latest_only_property_sends_whole_value() {
    init();
    let trail_type = DataType::array_of(DataType::Int16);
    let entity_type = EntityType::builder("Walker")
        .add_property("health", DataType::Int32, PropertyScope::AllClients)
        .add_property("trail", trail_type.clone(), PropertyScope::OtherClients)
        .send_latest_only()
        .build()
        .unwrap();
    let mut harness = ReplicationHarness::new(entity_type);

    {
        let mut properties = harness.real.properties_mut();
        let mut trail = properties.child(1).unwrap();
        trail.append(Value::Int(4)).unwrap();
        trail.append(Value::Int(5)).unwrap();
    }
    let deliveries = harness.flush();

    // both appends collapse into one update carrying the whole array
    let delivered: Vec<(UpdateTarget, MessageKind)> = deliveries
        .iter()
        .map(|delivery| (delivery.target, delivery.kind))
        .collect();
    assert_eq!(
        delivered,
        vec![
            (UpdateTarget::OtherClients, MessageKind::EntityProperty { client_index: 1 }),
            (UpdateTarget::Ghosts, MessageKind::GhostedDataUpdate),
        ]
    );
    assert_eq!(deliveries[0].payload, vec![2, 4, 0, 5, 0]);
    assert_replicated!(harness, observer, "trail");
    assert_replicated!(harness, ghost, "trail");
    assert_untouched!(harness.owner, "trail", trail_type.default_value());

    harness
        .real
        .set_property("trail", int_array(&trail_type, &[9]))
        .unwrap();
    assert_eq!(targets(&mut harness), vec![UpdateTarget::OtherClients, UpdateTarget::Ghosts]);
    assert_replicated!(harness, observer, "trail");
}

#[test]
fn test_float32_property_matches_across_copies() {
    init();
    let headings_type = DataType::array_of(DataType::Float32);
    let entity_type = EntityType::builder("Mover")
        .add_property("speed", DataType::Float32, PropertyScope::AllClients)
        .add_property("headings", headings_type, PropertyScope::OtherClients)
        .build()
        .unwrap();
    let mut harness = ReplicationHarness::new(entity_type);

    harness.real.set_property("speed", Value::Float(0.1)).unwrap();
    harness
        .real
        .properties_mut()
        .child(1)
        .unwrap()
        .append(Value::Float(0.3))
        .unwrap();
    harness.flush();

    assert_eq!(
        harness.real.property("speed"),
        Some(&Value::Float(f64::from(0.1_f32)))
    );
    assert_replicated!(harness, ghost, "speed");
    assert_replicated!(harness, owner, "speed");
    assert_replicated!(harness, observer, "speed");
    assert_replicated!(harness, ghost, "headings");
    assert_replicated!(harness, observer, "headings");

    // the stored value already is 0.1 at single precision
    harness.real.set_property("speed", Value::Float(0.1)).unwrap();
    assert!(harness.flush().is_empty());
}
