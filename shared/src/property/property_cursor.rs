use log::warn;

use crate::{
    change::{ChangePath, PropertyChange},
    property::{
        ChangeError, NestedLink, OwnerLink, PropertyComparator, PropertyOwner, TopLevelOwner,
    },
    value::{clamp_slice, Value},
};

/// A mutable view of one owner in a property tree, together with the chain
/// of links leading back to the tree's top-level owner.
///
/// Every mutation made through a cursor is described as a [`PropertyChange`]
/// and handed to the top-level owner, which decides where it is replicated.
pub struct PropertyCursor<'a> {
    node: &'a mut dyn PropertyOwner,
    link: CursorLink<'a>,
}

enum CursorLink<'a> {
    Top(&'a mut dyn OwnerLink),
    Nested(NestedLink<'a>),
}

impl OwnerLink for CursorLink<'_> {
    fn top_level_owner(&mut self, path: &mut ChangePath) -> Result<&mut dyn TopLevelOwner, ChangeError> {
        match self {
            CursorLink::Top(link) => link.top_level_owner(path),
            CursorLink::Nested(link) => link.top_level_owner(path),
        }
    }
}

impl<'a> PropertyCursor<'a> {
    pub fn new(node: &'a mut dyn PropertyOwner, link: &'a mut dyn OwnerLink) -> Self {
        Self {
            node,
            link: CursorLink::Top(link),
        }
    }

    pub fn len(&self) -> usize {
        self.node.num_owned_properties()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.node.owned_property(index)
    }

    /// A cursor on the container in slot `index`, if that slot holds one
    pub fn child(&mut self, index: usize) -> Option<PropertyCursor<'_>> {
        let sibling_count = self.node.num_owned_properties();
        let node = self.node.child_owner(index)?;
        Some(PropertyCursor {
            node,
            link: CursorLink::Nested(NestedLink::new(&mut self.link, index, sibling_count)),
        })
    }

    /// Assigns slot `index`, replicating the change if the slot's data type
    /// considers it one
    pub fn set(&mut self, index: usize, value: Value) -> Result<(), ChangeError> {
        let size = self.node.num_owned_properties();
        let data_type = self
            .node
            .owned_property_type(index)
            .cloned()
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        self.set_with(index, value, &data_type, false)
    }

    /// Assigns slot `index` using `comparator` to decide whether the
    /// assignment is a change. With `force_change` it always is.
    pub fn set_with(
        &mut self,
        index: usize,
        value: Value,
        comparator: &dyn PropertyComparator,
        force_change: bool,
    ) -> Result<(), ChangeError> {
        let size = self.node.num_owned_properties();
        let data_type = self
            .node
            .owned_property_type(index)
            .cloned()
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        data_type.check(&value)?;
        let value = data_type.normalize(value);

        let old_value = self
            .node
            .owned_property(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        if comparator.can_ignore_assignment(old_value, &value) {
            return Ok(());
        }
        let changed = force_change || comparator.has_changed(old_value, &value);

        let mut path = ChangePath::new();
        let top_level_owner = if changed {
            Some(self.link.top_level_owner(&mut path)?)
        } else {
            None
        };

        self.node.swap_owned_property(index, value)?;

        let Some(top_level_owner) = top_level_owner else {
            return Ok(());
        };
        let value = self
            .node
            .owned_property(index)
            .ok_or(ChangeError::IndexOutOfRange { index, size })?;
        let change = PropertyChange::single(path, index, size, value, &data_type);
        top_level_owner.on_owned_property_changed(&change)
    }

    /// Replaces elements `start..end` of this array with `new_values`.
    /// Bounds are clamped to the array; the replaced elements are returned.
    pub fn set_slice(
        &mut self,
        start: isize,
        end: isize,
        new_values: Vec<Value>,
    ) -> Result<Vec<Value>, ChangeError> {
        let owner_type = self.node.owner_type_name();
        let array = self
            .node
            .as_sequence_mut()
            .ok_or(ChangeError::SliceNotSupported { owner_type })?;

        let new_values: Vec<Value> = new_values
            .into_iter()
            .map(|value| array.element_type().normalize(value))
            .collect();
        let original_size = array.len();
        let (start, end) = clamp_slice(start, end, original_size);
        if let Err(err) = array.check_slice(start, end, &new_values) {
            warn!("Rejected assignment to slice {}..{}: {}", start, end, err);
            return Err(err);
        }

        let mut path = ChangePath::new();
        let top_level_owner = self.link.top_level_owner(&mut path)?;

        let inserted = new_values.len();
        let removed = array.splice(start, end, new_values);

        let change = PropertyChange::slice(
            path,
            start,
            end,
            original_size,
            &array.values()[start..start + inserted],
            array.element_type(),
        );
        top_level_owner.on_owned_property_changed(&change)?;

        Ok(removed)
    }

    pub fn append(&mut self, value: Value) -> Result<(), ChangeError> {
        self.extend(vec![value])
    }

    pub fn extend(&mut self, values: Vec<Value>) -> Result<(), ChangeError> {
        let end = self.end_bound();
        self.set_slice(end, end, values).map(drop)
    }

    /// Inserts before `before`; positions past either end clamp to that end
    pub fn insert(&mut self, before: isize, value: Value) -> Result<(), ChangeError> {
        self.set_slice(before, before, vec![value]).map(drop)
    }

    /// Removes and returns the element at `index`, counting from the back
    /// when negative
    pub fn pop(&mut self, index: isize) -> Result<Value, ChangeError> {
        let size = self.len();
        let position = if index < 0 {
            index + self.end_bound()
        } else {
            index
        };
        if position < 0 || position >= self.end_bound() {
            return Err(ChangeError::IndexOutOfRange {
                index: index.unsigned_abs(),
                size,
            });
        }

        let mut removed = self.set_slice(position, position + 1, Vec::new())?;
        removed.pop().ok_or(ChangeError::IndexOutOfRange {
            index: index.unsigned_abs(),
            size,
        })
    }

    /// Removes the first element equal to `value`
    pub fn remove(&mut self, value: &Value) -> Result<(), ChangeError> {
        let position = (0..self.len())
            .find(|index| self.node.owned_property(*index) == Some(value))
            .ok_or_else(|| ChangeError::ValueNotFound {
                value: value.to_string(),
            })?;
        let position = position as isize;
        self.set_slice(position, position + 1, Vec::new()).map(drop)
    }

    pub fn clear(&mut self) -> Result<(), ChangeError> {
        let end = self.end_bound();
        self.set_slice(0, end, Vec::new()).map(drop)
    }

    fn end_bound(&self) -> isize {
        isize::try_from(self.len()).unwrap_or(isize::MAX)
    }
}
