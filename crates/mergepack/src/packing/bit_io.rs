//! # Bit Cursors
//!
//! MSB-first bit writer and reader over byte buffers.

use crate::packing::BitWidth;

/// Low `n` bits set, for `n <= 8`.
#[inline(always)]
fn low_mask(n: u32) -> u32 {
    (1u32 << n) - 1
}

/// Appends fixed-width values to a byte buffer, most-significant bit first.
///
/// Unwritten bits of the final byte are zero.
#[derive(Debug, Clone, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty writer with room for `bits` bits.
    pub fn with_capacity_bits(bits: usize) -> Self {
        Self {
            buf: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Append the low `width` bits of `value`.
    ///
    /// Bits of `value` above `width` are ignored; callers check range with
    /// [`BitWidth::check`] first.
    pub fn write_bits(
        &mut self,
        value: u32,
        width: BitWidth,
    ) {
        let mut remaining = width.bits();
        while remaining > 0 {
            let offset = (self.bit_len % 8) as u32;
            if offset == 0 {
                self.buf.push(0);
            }
            let free = 8 - offset;
            let take = remaining.min(free);

            let chunk = (value >> (remaining - take)) & low_mask(take);
            let last = self.buf.len() - 1;
            self.buf[last] |= (chunk << (free - take)) as u8;

            remaining -= take;
            self.bit_len += take as usize;
        }
    }

    /// Finish the stream, returning the zero-padded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Reads fixed-width values from a byte buffer, most-significant bit first.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    bytes: &'a [u8],
    cursor: usize,
}

impl<'a> BitReader<'a> {
    /// Create a reader positioned at the first bit of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, cursor: 0 }
    }

    /// Bit position of the next read.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Number of unread bits, including any padding.
    pub fn remaining_bits(&self) -> usize {
        self.bytes.len() * 8 - self.cursor
    }

    /// Read the next `width` bits.
    ///
    /// ## Returns
    /// `None` if fewer than `width` bits remain.
    pub fn read_bits(
        &mut self,
        width: BitWidth,
    ) -> Option<u32> {
        if self.remaining_bits() < width.bits() as usize {
            return None;
        }

        let mut value: u32 = 0;
        let mut remaining = width.bits();
        while remaining > 0 {
            let byte = u32::from(self.bytes[self.cursor / 8]);
            let avail = 8 - (self.cursor % 8) as u32;
            let take = remaining.min(avail);

            let chunk = (byte >> (avail - take)) & low_mask(take);
            value = (value << take) | chunk;

            remaining -= take;
            self.cursor += take as usize;
        }

        Some(value)
    }
}
