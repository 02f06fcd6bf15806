use crate::error::SerdeErr;

/// Reads bits and bytes from a received buffer.
///
/// Bit fields and byte-aligned data may be mixed: after the bit-packed part of
/// a message, `align()` skips the padding up to the next byte boundary and the
/// remaining bytes are read as ordinary data.
pub struct BitReader<'b> {
    state: BitReaderState,
    buffer: &'b [u8],
}

#[derive(Copy, Clone)]
struct BitReaderState {
    scratch: u8,
    scratch_index: u8,
    buffer_index: usize,
}

impl<'b> BitReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self {
            state: BitReaderState {
                scratch: 0,
                scratch_index: 0,
                buffer_index: 0,
            },
            buffer,
        }
    }

    pub fn bytes_len(&self) -> usize {
        self.buffer.len()
    }

    /// Number of unread bits, including any left in the current byte
    pub fn bits_remaining(&self) -> usize {
        (self.buffer.len() - self.state.buffer_index) * 8 + self.state.scratch_index as usize
    }

    /// Number of unread whole bytes after the current partially-read byte
    pub fn bytes_remaining(&self) -> usize {
        self.buffer.len() - self.state.buffer_index
    }

    pub fn is_aligned(&self) -> bool {
        self.state.scratch_index == 0
    }

    /// Discards the unread bits of the current byte
    pub fn align(&mut self) {
        self.state.scratch = 0;
        self.state.scratch_index = 0;
    }

    pub fn read_bit(&mut self) -> Result<bool, SerdeErr> {
        if self.state.scratch_index == 0 {
            if self.state.buffer_index == self.buffer.len() {
                return Err(SerdeErr::truncated(1, 0));
            }

            self.state.scratch = self.buffer[self.state.buffer_index];
            self.state.buffer_index += 1;
            self.state.scratch_index = 8;
        }

        let value = self.state.scratch & 0x80;

        self.state.scratch <<= 1;
        self.state.scratch_index -= 1;

        Ok(value != 0)
    }

    /// Reads an unsigned field of `nbits` bits, most significant bit first
    pub fn read_bits(&mut self, nbits: u32) -> Result<u32, SerdeErr> {
        debug_assert!(nbits <= 32);
        if (nbits as usize) > self.bits_remaining() {
            return Err(SerdeErr::truncated(nbits as usize, self.bits_remaining()));
        }

        let mut output: u32 = 0;
        for _ in 0..nbits {
            output = (output << 1) | (self.read_bit()? as u32);
        }
        Ok(output)
    }

    /// Reads a two's-complement field of `nbits` bits, sign-extending it
    pub fn read_signed_bits(&mut self, nbits: u32) -> Result<i32, SerdeErr> {
        let raw = self.read_bits(nbits)?;
        if nbits == 0 || nbits >= 32 {
            return Ok(raw as i32);
        }
        let shift = 32 - nbits;
        Ok(((raw << shift) as i32) >> shift)
    }

    pub fn read_byte(&mut self) -> Result<u8, SerdeErr> {
        if self.state.scratch_index == 0 {
            let Some(byte) = self.buffer.get(self.state.buffer_index) else {
                return Err(SerdeErr::truncated(8, 0));
            };
            self.state.buffer_index += 1;
            return Ok(*byte);
        }
        Ok(self.read_bits(8)? as u8)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, SerdeErr> {
        if count * 8 > self.bits_remaining() {
            return Err(SerdeErr::truncated(count * 8, self.bits_remaining()));
        }

        let mut output = Vec::with_capacity(count);
        for _ in 0..count {
            output.push(self.read_byte()?);
        }
        Ok(output)
    }

    /// Whether anything but alignment padding is left to read
    pub fn has_remaining_bytes(&self) -> bool {
        self.bytes_remaining() > 0
    }
}
