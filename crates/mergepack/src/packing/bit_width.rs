//! # Bit Width

use core::fmt;

use crate::errors::{PackError, PackResult};

/// The number of bits used to encode one vocabulary index.
///
/// Encoder and decoder must agree on this out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BitWidth(u32);

impl BitWidth {
    /// Largest supported width; indices are `u32`.
    pub const MAX_BITS: u32 = 32;

    /// The fixed default width: covers vocabularies of up to `2^17 = 131072` tokens.
    pub const DEFAULT: BitWidth = BitWidth(17);

    /// Construct a width of `bits`, which must be in `1..=32`.
    pub fn new(bits: u32) -> PackResult<Self> {
        if (1..=Self::MAX_BITS).contains(&bits) {
            Ok(Self(bits))
        } else {
            Err(PackError::InvalidBitWidth(bits))
        }
    }

    /// The smallest width that can address every index of a `vocab_size` vocabulary.
    ///
    /// This is `ceil(log2(vocab_size))`, but never less than 1.
    pub fn minimal_for(vocab_size: usize) -> PackResult<Self> {
        let max_index = vocab_size.saturating_sub(1) as u64;
        let bits = (u64::BITS - max_index.leading_zeros()).max(1);
        Self::new(bits)
    }

    /// The width, in bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Number of distinct indices representable: `2^W`.
    pub fn capacity(self) -> u64 {
        1u64 << self.0
    }

    /// Does `index` fit in this width?
    pub fn fits(
        self,
        index: u32,
    ) -> bool {
        u64::from(index) < self.capacity()
    }

    /// Check that `index` fits in this width.
    pub fn check(
        self,
        index: u32,
    ) -> PackResult<u32> {
        if self.fits(index) {
            Ok(index)
        } else {
            Err(PackError::IndexOverflow {
                index,
                width: self.0,
            })
        }
    }

    /// Number of data bits for `pair_count` pairs: `2 * N * W`.
    pub fn data_bits(
        self,
        pair_count: usize,
    ) -> usize {
        2 * pair_count * self.0 as usize
    }

    /// Number of zero bits appended to byte-align `pair_count` pairs.
    ///
    /// Always in `0..8`.
    pub fn padding_bits(
        self,
        pair_count: usize,
    ) -> usize {
        (8 - self.data_bits(pair_count) % 8) % 8
    }

    /// Packed length, in bytes, of `pair_count` pairs: `ceil(2 * N * W / 8)`.
    pub fn packed_len(
        self,
        pair_count: usize,
    ) -> usize {
        self.data_bits(pair_count).div_ceil(8)
    }
}

impl Default for BitWidth {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BitWidth {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for BitWidth {
    type Error = PackError;

    fn try_from(bits: u32) -> PackResult<Self> {
        Self::new(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        assert_eq!(BitWidth::new(1).unwrap().bits(), 1);
        assert_eq!(BitWidth::new(32).unwrap().bits(), 32);

        assert!(matches!(
            BitWidth::new(0),
            Err(PackError::InvalidBitWidth(0))
        ));
        assert!(matches!(
            BitWidth::new(33),
            Err(PackError::InvalidBitWidth(33))
        ));

        assert_eq!(BitWidth::default().bits(), 17);
    }

    #[test]
    fn test_minimal_for() {
        let cases = [
            (0, 1),
            (1, 1),
            (2, 1),
            (3, 2),
            (4, 2),
            (5, 3),
            (256, 8),
            (257, 9),
            (128_000, 17),
            (128_256, 17),
            (131_072, 17),
            (131_073, 18),
        ];
        for (size, bits) in cases {
            assert_eq!(BitWidth::minimal_for(size).unwrap().bits(), bits, "{size}");
        }
    }

    #[test]
    fn test_fits() {
        let width = BitWidth::new(2).unwrap();
        assert_eq!(width.capacity(), 4);
        assert!(width.fits(3));
        assert!(!width.fits(4));

        assert_eq!(width.check(3).unwrap(), 3);
        assert!(matches!(
            width.check(4),
            Err(PackError::IndexOverflow { index: 4, width: 2 })
        ));

        let width = BitWidth::new(32).unwrap();
        assert!(width.fits(u32::MAX));
    }

    #[test]
    fn test_lengths() {
        let width = BitWidth::DEFAULT;
        // 34 bits per pair.
        assert_eq!(width.data_bits(1), 34);
        assert_eq!(width.padding_bits(1), 6);
        assert_eq!(width.packed_len(1), 5);

        // 4 pairs = 136 bits = 17 bytes exactly.
        assert_eq!(width.padding_bits(4), 0);
        assert_eq!(width.packed_len(4), 17);

        assert_eq!(width.packed_len(0), 0);
        assert_eq!(width.padding_bits(0), 0);

        for bits in 1..=32 {
            let width = BitWidth::new(bits).unwrap();
            for n in 0..20 {
                let padding = width.padding_bits(n);
                assert!(padding < 8);
                assert_eq!((width.data_bits(n) + padding) % 8, 0);
                assert_eq!(width.packed_len(n) * 8, width.data_bits(n) + padding);
            }
        }
    }
}
