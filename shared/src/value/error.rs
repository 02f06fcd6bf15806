use thiserror::Error;

use propdelta_serde::SerdeErr;

/// Errors that can occur while checking, building, or streaming a Value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    /// The value does not match the data type it is being assigned to
    #[error("Expected a value of type {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// A fixed-size array was given the wrong number of elements
    #[error("Fixed-size array expects {expected} elements, got {actual}")]
    FixedSizeMismatch { expected: usize, actual: usize },

    /// A string or variable-length array too long for its packed count
    #[error("Length {length} exceeds the streamable maximum of {max_length}")]
    TooLong { length: usize, max_length: usize },

    /// The stream could not be read
    #[error("Failed to read value from stream: {0}")]
    Stream(#[from] SerdeErr),
}
