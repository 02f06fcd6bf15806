use propdelta_serde::{bits_required, BitReader, Serde, SerdeErr};

use crate::{
    change::{ChangePath, PathEntry, FLAG_IS_NESTED, FLAG_IS_SLICE},
    property::{ChangeError, PathKey, PropertyOwner},
    value::Value,
};

/// A change that has been read from a stream and applied to a property tree
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedChange {
    path: ChangePath,
    key_path: Vec<PathKey>,
    kind: DecodedKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DecodedKind {
    Single {
        leaf_index: usize,
        old_value: Value,
    },
    Slice {
        start_index: usize,
        end_index: usize,
        old_values: Vec<Value>,
    },
}

impl DecodedChange {
    pub(crate) fn new(path: ChangePath, key_path: Vec<PathKey>, kind: DecodedKind) -> Self {
        Self {
            path,
            key_path,
            kind,
        }
    }

    /// Levels descended, with each level's slot count as found on this side
    pub fn path(&self) -> &ChangePath {
        &self.path
    }

    /// The descended levels, plus the leaf for a single-value change, as
    /// keys an observer would use
    pub fn key_path(&self) -> &[PathKey] {
        &self.key_path
    }

    pub fn kind(&self) -> &DecodedKind {
        &self.kind
    }

    pub fn is_slice(&self) -> bool {
        matches!(self.kind, DecodedKind::Slice { .. })
    }

    pub fn is_nested(&self) -> bool {
        !self.path.is_empty()
    }

    pub fn root_index(&self) -> usize {
        match (self.path.first(), &self.kind) {
            (Some(entry), _) => entry.index(),
            (None, DecodedKind::Single { leaf_index, .. }) => *leaf_index,
            (None, DecodedKind::Slice { .. }) => 0,
        }
    }
}

/// Reads a change in the uncompressed layout and applies it under `root`.
///
/// The whole header is read before the tree is touched, and the value
/// payload is fully decoded before it is swapped in, so a corrupt stream
/// leaves the tree as it was.
pub fn apply_simple_path(
    reader: &mut BitReader,
    root: &mut dyn PropertyOwner,
) -> Result<DecodedChange, ChangeError> {
    let flags = u8::de(reader)?;
    if flags & !(FLAG_IS_SLICE | FLAG_IS_NESTED) != 0 {
        return Err(SerdeErr::malformed("unknown bits in change flags").into());
    }
    let is_slice = flags & FLAG_IS_SLICE != 0;
    let is_nested = flags & FLAG_IS_NESTED != 0;

    let path_len = usize::from(u8::de(reader)?);
    if is_nested != (path_len > 0) {
        return Err(SerdeErr::malformed("path length disagrees with nested flag").into());
    }

    let mut indices = Vec::with_capacity(path_len);
    for _ in 0..path_len {
        indices.push(read_index(reader)?);
    }
    let trailing = if is_slice {
        (read_index(reader)?, read_index(reader)?)
    } else {
        (read_index(reader)?, 0)
    };

    let root_index = match indices.first() {
        Some(index) => *index,
        None if is_slice => 0,
        None => trailing.0,
    };

    let mut path = ChangePath::new();
    let mut key_path = Vec::with_capacity(path_len + 1);
    let mut node: &mut dyn PropertyOwner = root;
    for (depth, index) in indices.into_iter().enumerate() {
        path.push(PathEntry::new(index, node.num_owned_properties()));
        key_path.push(node.index_as_key(index));
        node = descend(node, index, root_index, depth)?;
    }

    let kind = if is_slice {
        let (start_index, end_index) = trailing;
        let old_values = node.set_owned_slice(start_index, end_index, reader)?;
        DecodedKind::Slice {
            start_index,
            end_index,
            old_values,
        }
    } else {
        let leaf_index = trailing.0;
        key_path.push(node.index_as_key(leaf_index));
        let old_value = node.set_owned_property(leaf_index, reader)?;
        DecodedKind::Single {
            leaf_index,
            old_value,
        }
    };

    Ok(DecodedChange {
        path,
        key_path,
        kind,
    })
}

/// Reads a change in the bit-packed layout and applies it under `root`.
///
/// Field widths are derived from the slot counts found while descending
/// this side's tree, so the tree must have the shape the sender's had.
/// Whether the change is a slice is not in the stream and must be known
/// from the message it arrived in.
pub fn apply_compressed_path(
    reader: &mut BitReader,
    root: &mut dyn PropertyOwner,
    is_slice: bool,
) -> Result<DecodedChange, ChangeError> {
    let mut path = ChangePath::new();
    let mut key_path = Vec::new();
    let mut node: &mut dyn PropertyOwner = root;

    if reader.read_bit()? {
        let mut root_index = None;
        let mut depth = 0;
        loop {
            let count = node.num_owned_properties();
            let index = reader.read_bits(bits_required(count))? as usize;
            let root = *root_index.get_or_insert(index);

            path.push(PathEntry::new(index, count));
            key_path.push(node.index_as_key(index));
            node = descend(node, index, root, depth)?;
            depth += 1;

            if !reader.read_bit()? {
                break;
            }
        }
    }

    let count = node.num_owned_properties();
    let kind = if is_slice {
        let nbits = bits_required(count + 1);
        let start_index = reader.read_bits(nbits)? as usize;
        let end_index = reader.read_bits(nbits)? as usize;
        reader.align();

        let old_values = node.set_owned_slice(start_index, end_index, reader)?;
        DecodedKind::Slice {
            start_index,
            end_index,
            old_values,
        }
    } else {
        let leaf_index = reader.read_bits(bits_required(count))? as usize;
        reader.align();

        key_path.push(node.index_as_key(leaf_index));
        let old_value = node.set_owned_property(leaf_index, reader)?;
        DecodedKind::Single {
            leaf_index,
            old_value,
        }
    };

    Ok(DecodedChange {
        path,
        key_path,
        kind,
    })
}

/// Reads the top-level index of an uncompressed change without applying it
pub(crate) fn peek_simple_root_index(bytes: &[u8]) -> Result<usize, ChangeError> {
    let mut reader = BitReader::new(bytes);
    let flags = u8::de(&mut reader)?;
    let path_len = u8::de(&mut reader)?;
    if path_len == 0 && flags & FLAG_IS_SLICE != 0 {
        return Ok(0);
    }
    read_index(&mut reader)
}

fn descend<'o>(
    node: &'o mut dyn PropertyOwner,
    index: usize,
    root_index: usize,
    depth: usize,
) -> Result<&'o mut dyn PropertyOwner, ChangeError> {
    node.child_owner(index).ok_or(ChangeError::PathDescendFailed {
        root_index,
        depth,
        index,
    })
}

fn read_index(reader: &mut BitReader) -> Result<usize, ChangeError> {
    let index = i32::de(reader)?;
    usize::try_from(index).map_err(|_| SerdeErr::malformed("negative index in change").into())
}
