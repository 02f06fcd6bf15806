use crate::{bit_reader::BitReader, bit_writer::BitWrite, error::SerdeErr};

/// A type that can be written to and read back from a property stream.
///
/// Implementations for primitives are byte oriented and little-endian, which
/// is the layout of fixed-width fields in the uncompressed change format and
/// of every value payload.
pub trait Serde: Sized + Clone + PartialEq {
    /// Writes the value into the outgoing stream
    fn ser(&self, writer: &mut dyn BitWrite);

    /// Parses a value out of the incoming stream
    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr>;

    /// Number of bits `ser` will write
    fn bit_length(&self) -> u32;
}

macro_rules! impl_serde_for_number {
    ($($impl_type:ty),*) => {$(
        impl Serde for $impl_type {
            fn ser(&self, writer: &mut dyn BitWrite) {
                writer.write_bytes(&self.to_le_bytes());
            }

            fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
                let mut bytes = [0u8; std::mem::size_of::<$impl_type>()];
                for byte in bytes.iter_mut() {
                    *byte = reader.read_byte()?;
                }
                Ok(<$impl_type>::from_le_bytes(bytes))
            }

            fn bit_length(&self) -> u32 {
                (std::mem::size_of::<$impl_type>() as u32) * 8
            }
        }
    )*};
}

impl_serde_for_number!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Serde for bool {
    fn ser(&self, writer: &mut dyn BitWrite) {
        writer.write_byte(*self as u8);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match reader.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SerdeErr::malformed("bool byte was neither 0 nor 1")),
        }
    }

    fn bit_length(&self) -> u32 {
        8
    }
}

impl Serde for String {
    fn ser(&self, writer: &mut dyn BitWrite) {
        write_packed_count(writer, self.len());
        writer.write_bytes(self.as_bytes());
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let length = read_packed_count(reader)?;
        let bytes = reader.read_bytes(length)?;
        String::from_utf8(bytes).map_err(|_| SerdeErr::malformed("string is not valid utf-8"))
    }

    fn bit_length(&self) -> u32 {
        (packed_count_len(self.len()) + self.len()) as u32 * 8
    }
}

const PACKED_COUNT_ESCAPE: u8 = 0xFF;
/// Largest count a packed count can carry (24 bits after the escape byte)
pub const MAX_PACKED_COUNT: usize = 0x00FF_FFFF;

/// Writes a length as one byte when it is below 255, otherwise as an escape
/// byte followed by a 3-byte little-endian length. Panics past
/// `MAX_PACKED_COUNT`; values are length-checked before they are written.
pub fn write_packed_count(writer: &mut dyn BitWrite, count: usize) {
    assert!(count <= MAX_PACKED_COUNT, "packed count {} too large", count);
    if count < PACKED_COUNT_ESCAPE as usize {
        writer.write_byte(count as u8);
    } else {
        writer.write_byte(PACKED_COUNT_ESCAPE);
        writer.write_bytes(&(count as u32).to_le_bytes()[..3]);
    }
}

pub fn read_packed_count(reader: &mut BitReader) -> Result<usize, SerdeErr> {
    let first = reader.read_byte()?;
    if first != PACKED_COUNT_ESCAPE {
        return Ok(first as usize);
    }
    let bytes = reader.read_bytes(3)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) as usize)
}

fn packed_count_len(count: usize) -> usize {
    if count < PACKED_COUNT_ESCAPE as usize {
        1
    } else {
        4
    }
}
