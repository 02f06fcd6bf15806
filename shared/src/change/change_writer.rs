use propdelta_serde::{
    bits_required, BitCounter, BitWrite, BitWriter, Serde, StreamWriter, MAX_BUFFER_BITS,
};

use crate::{
    change::{ChangeKind, PropertyChange, SliceChange},
    property::ChangeError,
};

/// Converts an index into a fixed 32-bit stream field
pub(crate) fn wire_index(index: usize) -> Result<i32, ChangeError> {
    i32::try_from(index).map_err(|_| ChangeError::IndexTooLarge { index })
}

impl PropertyChange<'_> {
    /// Writes the change in the uncompressed layout used between servers:
    /// flags byte, path length byte, one i32 per path level, the leaf index
    /// or slice bounds as i32s, then the value payload.
    pub fn add_to_internal_stream(&self, writer: &mut dyn BitWrite) -> Result<(), ChangeError> {
        let depth = self.path().len();
        let path_len = u8::try_from(depth).map_err(|_| ChangeError::PathTooDeep {
            depth,
            max_depth: u8::MAX as usize,
        })?;

        // validate every field before anything reaches the stream
        let mut fields = Vec::with_capacity(depth + 2);
        for entry in self.path().iter() {
            fields.push(wire_index(entry.index())?);
        }
        match self.kind() {
            ChangeKind::Single(change) => fields.push(wire_index(change.leaf_index())?),
            ChangeKind::Slice(change) => {
                fields.push(wire_index(change.start_index())?);
                fields.push(wire_index(change.end_index())?);
            }
        }

        self.flags().ser(writer);
        path_len.ser(writer);
        for field in fields {
            field.ser(writer);
        }

        self.add_value_to_stream(writer)
    }

    /// Writes the change in the bit-packed layout sent to clients.
    ///
    /// `root_index` and `root_sibling_count` stand in for the top level of
    /// the path, so the receiving side can number top-level slots
    /// differently. Every other field is as wide as `bits_required` of the
    /// sibling count recorded at its level.
    pub fn add_to_external_stream(
        &self,
        writer: &mut StreamWriter,
        root_index: usize,
        root_sibling_count: usize,
    ) -> Result<(), ChangeError> {
        let mut counter = BitCounter::new(0, 0, MAX_BUFFER_BITS);
        self.write_compressed_header(&mut counter, root_index, root_sibling_count);
        if counter.overflowed() {
            return Err(ChangeError::HeaderOverflow {
                needed_bits: counter.bits_needed(),
                max_bits: MAX_BUFFER_BITS,
            });
        }

        let mut header = BitWriter::new();
        self.write_compressed_header(&mut header, root_index, root_sibling_count);
        writer.append_bits(&header);

        self.add_value_to_stream(writer)
    }

    /// Writes only the new value(s), in their data type's payload layout
    pub fn add_value_to_stream(&self, writer: &mut dyn BitWrite) -> Result<(), ChangeError> {
        match self.kind() {
            ChangeKind::Single(change) => {
                change.data_type().add_to_stream(change.value(), writer)?;
            }
            ChangeKind::Slice(change) => {
                for value in change.values() {
                    change.element_type().add_to_stream(value, writer)?;
                }
            }
        }
        Ok(())
    }

    fn write_compressed_header(
        &self,
        writer: &mut dyn BitWrite,
        root_index: usize,
        root_sibling_count: usize,
    ) {
        let mut entries = self.path().iter();

        match entries.next() {
            None => {
                writer.write_bit(false);
                match self.kind() {
                    ChangeKind::Single(_) => {
                        write_field(writer, root_index, root_sibling_count);
                    }
                    ChangeKind::Slice(change) => write_slice_bounds(writer, change),
                }
            }
            Some(_) => {
                writer.write_bit(true);
                write_field(writer, root_index, root_sibling_count);
                for entry in entries {
                    writer.write_bit(true);
                    write_field(writer, entry.index(), entry.sibling_count());
                }
                writer.write_bit(false);

                match self.kind() {
                    ChangeKind::Single(change) => {
                        write_field(writer, change.leaf_index(), change.leaf_sibling_count());
                    }
                    ChangeKind::Slice(change) => write_slice_bounds(writer, change),
                }
            }
        }
    }
}

fn write_field(writer: &mut dyn BitWrite, index: usize, sibling_count: usize) {
    writer.write_bits(bits_required(sibling_count), index as u32);
}

// bounds range over 0..=size, so one more value than there are elements
fn write_slice_bounds(writer: &mut dyn BitWrite, change: &SliceChange) {
    let nbits = bits_required(change.original_size() + 1);
    writer.write_bits(nbits, change.start_index() as u32);
    writer.write_bits(nbits, change.end_index() as u32);
}
