use crate::constants::{MAX_BUFFER_BITS, MAX_BUFFER_BYTES};

/// Anything that can receive a stream of bits.
///
/// Bits are packed most-significant first: the first bit written to a byte
/// lands in its high bit. A byte written while the stream is byte aligned
/// therefore appears unchanged in the output.
pub trait BitWrite {
    fn write_bit(&mut self, bit: bool);
    fn write_byte(&mut self, byte: u8);
    fn count_bits(&mut self, bits: u32);
    fn is_counter(&self) -> bool;

    /// Writes the low `nbits` bits of `value`, most significant first.
    fn write_bits(&mut self, nbits: u32, value: u32) {
        debug_assert!(nbits <= 32);
        for shift in (0..nbits).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.write_byte(*byte);
        }
    }
}

/// A bounded bit writer, used for the bit-packed header of a property
/// change. Its capacity is a hard ceiling on the width of any one header.
pub struct BitWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: [u8; MAX_BUFFER_BYTES],
    buffer_index: usize,
    current_bits: u32,
    max_bits: u32,
}

impl BitWriter {
    /// Create a new BitWriter with the full header capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_BUFFER_BITS)
    }

    /// Create a new BitWriter that refuses to grow past `bit_capacity`
    pub fn with_capacity(bit_capacity: u32) -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: [0; MAX_BUFFER_BYTES],
            buffer_index: 0,
            current_bits: 0,
            max_bits: bit_capacity.min(MAX_BUFFER_BITS),
        }
    }

    /// Number of bits written so far
    pub fn bits_written(&self) -> u32 {
        self.current_bits
    }

    pub fn bits_free(&self) -> u32 {
        self.max_bits - self.current_bits
    }

    /// Number of whole bytes needed to hold what has been written, with the
    /// final partial byte rounded up.
    pub fn used_bytes(&self) -> usize {
        ((self.current_bits + 7) / 8) as usize
    }

    /// Returns a BitCounter with the same remaining capacity
    pub fn counter(&self) -> BitCounter {
        BitCounter::new(self.current_bits, self.current_bits, self.max_bits)
    }

    /// The written bits, zero-padded up to the next byte boundary
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut output = self.buffer[..self.buffer_index].to_vec();
        if self.scratch_index > 0 {
            output.push(self.scratch << (8 - self.scratch_index));
        }
        output
    }

    pub fn to_bytes(self) -> Box<[u8]> {
        self.as_bytes().into_boxed_slice()
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for BitWriter {
    fn write_bit(&mut self, bit: bool) {
        if self.current_bits >= self.max_bits {
            panic!("Write overflow!");
        }

        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.current_bits += 1;

        if self.scratch_index >= 8 {
            self.buffer[self.buffer_index] = self.scratch;
            self.buffer_index += 1;
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        self.write_bits(8, byte as u32);
    }

    fn count_bits(&mut self, _: u32) {
        panic!("This method should not be called for BitWriter!");
    }

    fn is_counter(&self) -> bool {
        false
    }
}

/// Measures how many bits a sequence of writes would take, without writing.
pub struct BitCounter {
    start_bits: u32,
    current_bits: u32,
    max_bits: u32,
}

impl BitCounter {
    pub fn new(start_bits: u32, current_bits: u32, max_bits: u32) -> Self {
        Self {
            start_bits,
            current_bits,
            max_bits,
        }
    }

    pub fn overflowed(&self) -> bool {
        self.current_bits > self.max_bits
    }

    pub fn bits_needed(&self) -> u32 {
        self.current_bits - self.start_bits
    }
}

impl BitWrite for BitCounter {
    fn write_bit(&mut self, _: bool) {
        self.current_bits += 1;
    }

    fn write_byte(&mut self, _: u8) {
        self.current_bits += 8;
    }

    fn write_bits(&mut self, nbits: u32, _: u32) {
        self.current_bits += nbits;
    }

    fn count_bits(&mut self, bits: u32) {
        self.current_bits += bits;
    }

    fn is_counter(&self) -> bool {
        true
    }
}
