use thiserror::Error;

use propdelta_serde::SerdeErr;

use crate::value::ValueError;

/// Errors that can occur while changing a property, or while encoding or
/// applying a property change
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChangeError {
    /// The change stream could not be read
    #[error("Failed to read change: {0}")]
    Stream(#[from] SerdeErr),

    /// A value was of the wrong type or could not be streamed
    #[error("{0}")]
    Value(#[from] ValueError),

    /// An index addressed a slot past the end of its owner
    #[error("Index {index} out of range for owner with {size} properties")]
    IndexOutOfRange { index: usize, size: usize },

    /// A change path named a child that is not a container at the receiving end
    #[error("Could not descend into child {index} at depth {depth} of path rooted at property {root_index}")]
    PathDescendFailed {
        root_index: usize,
        depth: usize,
        index: usize,
    },

    /// Received slice bounds that do not fit the receiving array
    #[error("Slice {start}..{end} is out of bounds for array of {size} elements")]
    InvalidSliceBounds {
        start: usize,
        end: usize,
        size: usize,
    },

    /// A slice assignment would change the length of a fixed-size array
    #[error("Slice assignment would resize fixed-size array of {expected} elements to {actual}")]
    SliceSizeMismatch { expected: usize, actual: usize },

    /// Slice operations on an owner that is not a sequence
    #[error("{owner_type} does not support slice assignment")]
    SliceNotSupported { owner_type: &'static str },

    /// Slices of an array whose elements stream to zero bytes
    #[error("ARRAY of {element_type} elements that stream to zero bytes does not support slice assignment")]
    ZeroWidthElements { element_type: &'static str },

    /// Removal of a value the sequence does not hold
    #[error("Value {value} is not in the array")]
    ValueNotFound { value: String },

    /// The change could not be traced to an owner allowed to accept it
    #[error("No top-level owner accepts this change: {reason}")]
    NoTopLevelOwner { reason: String },

    /// The compressed header of a change does not fit a header buffer
    #[error("Change header needs {needed_bits} bits, only {max_bits} are available")]
    HeaderOverflow { needed_bits: u32, max_bits: u32 },

    /// The change path is deeper than the stream format or config allows
    #[error("Change path has {depth} levels, the limit is {max_depth}")]
    PathTooDeep { depth: usize, max_depth: usize },

    /// An index does not fit the 32-bit fields of the uncompressed format
    #[error("Index {index} does not fit in a 32-bit stream field")]
    IndexTooLarge { index: usize },

    /// An encoded change is larger than the receiving side accepts
    #[error("Change message of {size} bytes exceeds the limit of {max_size} bytes")]
    MessageTooLarge { size: usize, max_size: usize },
}
