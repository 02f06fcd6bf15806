use crate::{
    change::ChangePath,
    value::{DataType, Value},
};

pub const FLAG_IS_SLICE: u8 = 0x01;
pub const FLAG_IS_NESTED: u8 = 0x02;

/// A description of one mutation somewhere in a property tree, borrowed from
/// the tree just after the mutation was made. It carries everything needed to
/// encode the change for another peer: where it happened, and the new
/// value(s) with their type.
#[derive(Debug)]
pub struct PropertyChange<'v> {
    path: ChangePath,
    kind: ChangeKind<'v>,
}

#[derive(Debug)]
pub enum ChangeKind<'v> {
    Single(SingleChange<'v>),
    Slice(SliceChange<'v>),
}

/// Slot `leaf_index` of an owner with `leaf_sibling_count` slots now holds `value`
#[derive(Debug)]
pub struct SingleChange<'v> {
    leaf_index: usize,
    leaf_sibling_count: usize,
    value: &'v Value,
    data_type: &'v DataType,
}

/// Elements `start_index..end_index` of an array that had `original_size`
/// elements were replaced with `values`
#[derive(Debug)]
pub struct SliceChange<'v> {
    start_index: usize,
    end_index: usize,
    original_size: usize,
    values: &'v [Value],
    element_type: &'v DataType,
}

impl<'v> PropertyChange<'v> {
    pub fn single(
        path: ChangePath,
        leaf_index: usize,
        leaf_sibling_count: usize,
        value: &'v Value,
        data_type: &'v DataType,
    ) -> Self {
        assert!(
            leaf_index < leaf_sibling_count,
            "leaf index {} outside owner of {} slots",
            leaf_index,
            leaf_sibling_count
        );
        Self {
            path,
            kind: ChangeKind::Single(SingleChange {
                leaf_index,
                leaf_sibling_count,
                value,
                data_type,
            }),
        }
    }

    pub fn slice(
        path: ChangePath,
        start_index: usize,
        end_index: usize,
        original_size: usize,
        values: &'v [Value],
        element_type: &'v DataType,
    ) -> Self {
        assert!(
            start_index <= end_index && end_index <= original_size,
            "slice {}..{} outside array of {} elements",
            start_index,
            end_index,
            original_size
        );
        Self {
            path,
            kind: ChangeKind::Slice(SliceChange {
                start_index,
                end_index,
                original_size,
                values,
                element_type,
            }),
        }
    }

    pub fn path(&self) -> &ChangePath {
        &self.path
    }

    pub fn kind(&self) -> &ChangeKind<'v> {
        &self.kind
    }

    pub fn is_slice(&self) -> bool {
        matches!(self.kind, ChangeKind::Slice(_))
    }

    pub fn is_nested(&self) -> bool {
        !self.path.is_empty()
    }

    /// Slot of the top-level owner the change happened under
    pub fn root_index(&self) -> usize {
        match (self.path.first(), &self.kind) {
            (Some(entry), _) => entry.index(),
            (None, ChangeKind::Single(change)) => change.leaf_index,
            (None, ChangeKind::Slice(_)) => 0,
        }
    }

    pub fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.is_slice() {
            flags |= FLAG_IS_SLICE;
        }
        if self.is_nested() {
            flags |= FLAG_IS_NESTED;
        }
        flags
    }
}

impl<'v> SingleChange<'v> {
    pub fn leaf_index(&self) -> usize {
        self.leaf_index
    }

    pub fn leaf_sibling_count(&self) -> usize {
        self.leaf_sibling_count
    }

    pub fn value(&self) -> &'v Value {
        self.value
    }

    pub fn data_type(&self) -> &'v DataType {
        self.data_type
    }
}

impl<'v> SliceChange<'v> {
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn end_index(&self) -> usize {
        self.end_index
    }

    pub fn original_size(&self) -> usize {
        self.original_size
    }

    pub fn values(&self) -> &'v [Value] {
        self.values
    }

    pub fn element_type(&self) -> &'v DataType {
        self.element_type
    }
}
