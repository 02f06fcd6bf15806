/// Capacity of the fixed buffer a bit-packed change header is written into.
pub const MAX_BUFFER_BYTES: usize = 224;
/// Upper bound on the width of any one bit-packed change header.
pub const MAX_BUFFER_BITS: u32 = (MAX_BUFFER_BYTES as u32) * 8;
