use crate::{BitWrite, BitWriter};

/// A BitWrite implementation that grows as needed, used for whole outgoing
/// messages. Unlike BitWriter, which has a fixed buffer sized for a change
/// header, StreamWriter holds the header bytes followed by an arbitrarily
/// large value payload.
pub struct StreamWriter {
    scratch: u8,
    scratch_index: u8,
    buffer: Vec<u8>,
    bits_written: u32,
}

impl StreamWriter {
    pub fn new() -> Self {
        Self {
            scratch: 0,
            scratch_index: 0,
            buffer: Vec::with_capacity(64),
            bits_written: 0,
        }
    }

    /// Pads the current byte with zero bits so the next write is byte aligned
    pub fn align(&mut self) {
        if self.scratch_index > 0 {
            let byte = self.scratch << (8 - self.scratch_index);
            self.buffer.push(byte);
            self.bits_written += (8 - self.scratch_index) as u32;
            self.scratch = 0;
            self.scratch_index = 0;
        }
    }

    /// Appends a finished bit-packed header, padded to a byte boundary
    pub fn append_bits(&mut self, header: &BitWriter) {
        self.align();
        let bytes = header.as_bytes();
        self.bits_written += (bytes.len() * 8) as u32;
        self.buffer.extend_from_slice(&bytes);
    }

    pub fn bytes_written(&self) -> usize {
        ((self.bits_written + 7) / 8) as usize
    }

    pub fn bits_written(&self) -> u32 {
        self.bits_written
    }

    pub fn to_bytes(mut self) -> Vec<u8> {
        self.align();
        self.buffer
    }
}

impl Default for StreamWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWrite for StreamWriter {
    fn write_bit(&mut self, bit: bool) {
        self.scratch <<= 1;

        if bit {
            self.scratch |= 1;
        }

        self.scratch_index += 1;
        self.bits_written += 1;

        if self.scratch_index >= 8 {
            self.buffer.push(self.scratch);
            self.scratch_index = 0;
            self.scratch = 0;
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if self.scratch_index == 0 {
            self.buffer.push(byte);
            self.bits_written += 8;
            return;
        }
        self.write_bits(8, byte as u32);
    }

    fn is_counter(&self) -> bool {
        false
    }

    fn count_bits(&mut self, _bits: u32) {
        // StreamWriter doesn't need counting - it can grow indefinitely
    }
}
