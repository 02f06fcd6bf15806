//! # Propdelta Serde
//! Bit-level stream primitives used by the property change codec: a bounded
//! bit writer for change headers, a growable stream writer for whole
//! messages, a bit reader that mixes bit fields with byte-aligned data, and
//! the `bits_required` width rule both sides of the wire share.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

mod bit_reader;
mod bit_writer;
mod bits;
mod constants;
mod error;
mod serde;
mod stream_writer;

pub use bit_reader::BitReader;
pub use bit_writer::{BitCounter, BitWrite, BitWriter};
pub use bits::bits_required;
pub use constants::{MAX_BUFFER_BITS, MAX_BUFFER_BYTES};
pub use error::SerdeErr;
pub use serde::{read_packed_count, write_packed_count, Serde, MAX_PACKED_COUNT};
pub use stream_writer::StreamWriter;
