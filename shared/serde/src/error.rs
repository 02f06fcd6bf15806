use thiserror::Error;

/// Errors that can occur while reading a bit or byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the field being read was complete
    #[error("Stream truncated: needed {needed_bits} bits but only {available_bits} remain")]
    StreamTruncated {
        needed_bits: usize,
        available_bits: usize,
    },

    /// The stream contained a value that cannot be produced by a valid writer
    #[error("Malformed stream: {reason}")]
    StreamMalformed { reason: &'static str },
}

impl SerdeErr {
    pub fn truncated(needed_bits: usize, available_bits: usize) -> Self {
        Self::StreamTruncated {
            needed_bits,
            available_bits,
        }
    }

    pub fn malformed(reason: &'static str) -> Self {
        Self::StreamMalformed { reason }
    }
}
