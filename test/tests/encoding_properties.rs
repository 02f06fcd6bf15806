/// PROPERTY-BASED TESTS: change encodings
///
/// Uses proptest to check that a change written in either layout and read
/// back against a tree of the same shape lands on the same slot.
///
/// Key invariants:
/// 1. The decoded path matches the path that was written
/// 2. Only the addressed slot changes
/// 3. A corrupt stream either fails or leaves the tree as it was
use proptest::prelude::*;

use propdelta_shared::{
    apply_compressed_path, apply_simple_path, ArrayInstance, BitReader, ChangePath, DataType,
    DecodedKind, PathEntry, PropertyChange, StreamWriter, Value,
};
use propdelta_test::{array_value, int_array};

/// The nested levels above the leaf array: (child count, child on the path)
fn shape_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec(
        (1usize..6).prop_flat_map(|count| (Just(count), 0..count)),
        0..=8,
    )
}

fn leaf_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1usize..10).prop_flat_map(|count| (Just(count), 0..count))
}

fn type_at(level: usize, depth: usize) -> DataType {
    if level == depth {
        DataType::array_of(DataType::Int32)
    } else {
        DataType::array_of(type_at(level + 1, depth))
    }
}

/// Builds a tree where only the children on the path are populated
fn build(shape: &[(usize, usize)], level: usize, leaf_count: usize) -> Value {
    let data_type = type_at(level, shape.len());
    if level == shape.len() {
        let values: Vec<i64> = (0..leaf_count as i64).collect();
        return int_array(&data_type, &values);
    }

    let (count, on_path) = shape[level];
    let DataType::Array(array_type) = &data_type else {
        unreachable!()
    };
    let children = (0..count)
        .map(|index| {
            if index == on_path {
                build(shape, level + 1, leaf_count)
            } else {
                array_type.element().default_value()
            }
        })
        .collect();
    array_value(&data_type, children)
}

fn root(shape: &[(usize, usize)], leaf_count: usize) -> ArrayInstance {
    match build(shape, 0, leaf_count) {
        Value::Array(array) => array,
        _ => unreachable!(),
    }
}

/// One entry per level between the root and the leaf array
fn change_path(shape: &[(usize, usize)]) -> ChangePath {
    shape
        .iter()
        .map(|(count, index)| PathEntry::new(*index, *count))
        .collect()
}

/// The top-level field of an external stream. A change that isn't nested
/// has the leaf itself at the top.
fn root_field(shape: &[(usize, usize)], leaf: (usize, usize)) -> (usize, usize) {
    shape.first().copied().unwrap_or(leaf)
}

fn leaf_array<'t>(tree: &'t ArrayInstance, shape: &[(usize, usize)]) -> &'t ArrayInstance {
    let mut node = tree;
    for (_, index) in shape {
        node = node.get(*index).and_then(Value::as_array).unwrap();
    }
    node
}

#[test]
fn test_top_level_slice_round_trips_compressed() {
    let ints = DataType::array_of(DataType::Int32);
    let Value::Array(sender) = int_array(&ints, &[1, 2, 3]) else {
        unreachable!()
    };
    let values = vec![Value::Int(7), Value::Int(8)];

    let change = PropertyChange::slice(ChangePath::new(), 1, 2, 3, &values, &DataType::Int32);
    let mut writer = StreamWriter::new();
    change.add_to_external_stream(&mut writer, 0, 0).unwrap();
    let bytes = writer.to_bytes();

    let mut receiver = sender.clone();
    let decoded = apply_compressed_path(&mut BitReader::new(&bytes), &mut receiver, true).unwrap();

    assert!(!decoded.is_nested());
    assert_eq!(
        decoded.kind(),
        &DecodedKind::Slice {
            start_index: 1,
            end_index: 2,
            old_values: vec![Value::Int(2)]
        }
    );
    assert_eq!(
        receiver.values(),
        &[Value::Int(1), Value::Int(7), Value::Int(8), Value::Int(3)]
    );
}

proptest! {
    #[test]
    fn prop_single_change_round_trips_uncompressed(
        shape in shape_strategy(),
        (leaf_count, leaf_index) in leaf_strategy(),
        new_value in any::<i32>(),
    ) {
        let sender = root(&shape, leaf_count);
        let mut receiver = sender.clone();
        let value = Value::Int(new_value.into());

        let change = PropertyChange::single(change_path(&shape), leaf_index, leaf_count, &value, &DataType::Int32);
        let mut writer = StreamWriter::new();
        change.add_to_internal_stream(&mut writer).unwrap();
        let bytes = writer.to_bytes();

        let decoded = apply_simple_path(&mut BitReader::new(&bytes), &mut receiver).unwrap();

        prop_assert_eq!(decoded.path(), change.path());
        let expected_old = Value::Int(leaf_index as i64);
        prop_assert_eq!(decoded.kind(), &DecodedKind::Single { leaf_index, old_value: expected_old });
        let leaf = leaf_array(&receiver, &shape);
        for (index, element) in leaf.iter().enumerate() {
            if index == leaf_index {
                prop_assert_eq!(element, &value);
            } else {
                prop_assert_eq!(element, &Value::Int(index as i64));
            }
        }
    }

    #[test]
    fn prop_single_change_round_trips_compressed(
        shape in shape_strategy(),
        (leaf_count, leaf_index) in leaf_strategy(),
        new_value in any::<i32>(),
    ) {
        let sender = root(&shape, leaf_count);
        let mut receiver = sender.clone();
        let value = Value::Int(new_value.into());
        let (root_count, root_index) = root_field(&shape, (leaf_count, leaf_index));

        let change = PropertyChange::single(change_path(&shape), leaf_index, leaf_count, &value, &DataType::Int32);
        let mut writer = StreamWriter::new();
        change.add_to_external_stream(&mut writer, root_index, root_count).unwrap();
        let bytes = writer.to_bytes();

        let decoded = apply_compressed_path(&mut BitReader::new(&bytes), &mut receiver, false).unwrap();

        prop_assert_eq!(decoded.path(), change.path());
        prop_assert_eq!(leaf_array(&receiver, &shape).get(leaf_index), Some(&value));
    }

    #[test]
    fn prop_slice_change_round_trips_both_layouts(
        shape in shape_strategy(),
        leaf_count in 0usize..10,
        bounds in (0usize..10, 0usize..10),
        new_values in prop::collection::vec(any::<i32>(), 0..6),
    ) {
        let start = bounds.0.min(bounds.1).min(leaf_count);
        let end = bounds.0.max(bounds.1).min(leaf_count);
        let values: Vec<Value> = new_values.iter().map(|v| Value::Int((*v).into())).collect();
        let sender = root(&shape, leaf_count);
        let (root_count, root_index) = root_field(&shape, (leaf_count, 0));

        let mut expected: Vec<Value> = leaf_array(&sender, &shape).values().to_vec();
        expected.splice(start..end, values.iter().cloned());

        let change = PropertyChange::slice(change_path(&shape), start, end, leaf_count, &values, &DataType::Int32);

        let mut internal = StreamWriter::new();
        change.add_to_internal_stream(&mut internal).unwrap();
        let bytes = internal.to_bytes();
        let mut receiver = sender.clone();
        apply_simple_path(&mut BitReader::new(&bytes), &mut receiver).unwrap();
        prop_assert_eq!(leaf_array(&receiver, &shape).values(), &expected[..]);

        let mut external = StreamWriter::new();
        change.add_to_external_stream(&mut external, root_index, root_count).unwrap();
        let bytes = external.to_bytes();
        let mut receiver = sender.clone();
        let decoded = apply_compressed_path(&mut BitReader::new(&bytes), &mut receiver, true).unwrap();
        prop_assert!(decoded.is_slice());
        prop_assert_eq!(leaf_array(&receiver, &shape).values(), &expected[..]);
    }

    #[test]
    fn prop_corrupt_stream_leaves_tree_untouched(
        shape in shape_strategy(),
        (leaf_count, _) in leaf_strategy(),
        bytes in prop::collection::vec(any::<u8>(), 0..40),
        is_slice in any::<bool>(),
    ) {
        let before = root(&shape, leaf_count);

        let mut tree = before.clone();
        if apply_simple_path(&mut BitReader::new(&bytes), &mut tree).is_err() {
            prop_assert_eq!(&tree, &before);
        }

        let mut tree = before.clone();
        if apply_compressed_path(&mut BitReader::new(&bytes), &mut tree, is_slice).is_err() {
            prop_assert_eq!(&tree, &before);
        }
    }

    #[test]
    fn prop_string_values_survive_packed_layout(
        text in ".{0,300}",
    ) {
        let strings = DataType::array_of(DataType::String);
        let Value::Array(sender) = array_value(&strings, vec![Value::from(""), Value::from("")]) else {
            unreachable!()
        };
        let value = Value::from(text.as_str());
        let change = PropertyChange::single(ChangePath::new(), 1, 2, &value, &DataType::String);

        let mut writer = StreamWriter::new();
        change.add_to_external_stream(&mut writer, 1, 2).unwrap();
        let bytes = writer.to_bytes();
        let mut receiver = sender.clone();
        apply_compressed_path(&mut BitReader::new(&bytes), &mut receiver, false).unwrap();

        prop_assert_eq!(receiver.get(1), Some(&value));
        prop_assert_eq!(receiver.get(0), Some(&Value::from("")));
    }
}
