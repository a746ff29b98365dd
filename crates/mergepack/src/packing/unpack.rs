//! # Merge Unpacker

use ahash::AHashMap;

use crate::errors::{PackError, PackResult};
use crate::packing::{BitReader, BitWidth, IndexPair, MergeRule};
use crate::vocab::Vocabulary;

/// Decode `count` index pairs from a packed bitstream.
///
/// Bits past `2 * count * W` are padding and are ignored.
///
/// ## Errors
/// [`PackError::MalformedInput`] if `bytes` is too short for `count` pairs.
pub fn unpack_merges(
    bytes: &[u8],
    width: BitWidth,
    count: usize,
) -> PackResult<Vec<IndexPair>> {
    // Compare pair counts, not bit counts: `2 * count * W` may not fit in a `usize`.
    let capacity = bytes.len().saturating_mul(8) / width.data_bits(1);
    if count > capacity {
        return Err(PackError::MalformedInput(format!(
            "{} packed bytes cannot hold {count} merges of {width}-bit indices",
            bytes.len()
        )));
    }

    let mut reader = BitReader::new(bytes);
    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        match (reader.read_bits(width), reader.read_bits(width)) {
            (Some(left), Some(right)) => pairs.push(IndexPair::new(left, right)),
            // Unreachable after the length check above.
            _ => {
                return Err(PackError::MalformedInput(format!(
                    "merge stream ended at bit {}",
                    reader.position()
                )));
            }
        }
    }

    Ok(pairs)
}

/// Infer the pair count of a `byte_len` packed stream.
///
/// Padding is always shorter than 8 bits, so when `W >= 8` it can never be
/// mistaken for an index.
///
/// ## Errors
/// [`PackError::MalformedInput`] if `W < 8`, or if `byte_len` is not a length
/// the packer could have produced.
pub fn infer_pair_count(
    byte_len: usize,
    width: BitWidth,
) -> PackResult<usize> {
    if width.bits() < 8 {
        return Err(PackError::MalformedInput(format!(
            "merge count must be given explicitly for {width}-bit indices"
        )));
    }

    let pair_bits = width.data_bits(1);
    let count = byte_len * 8 / pair_bits;

    if width.packed_len(count) != byte_len {
        return Err(PackError::MalformedInput(format!(
            "{byte_len} bytes is not a whole number of {width}-bit merge pairs"
        )));
    }

    Ok(count)
}

/// Decode a packed stream whose pair count is not known out of band.
///
/// See [`infer_pair_count`].
pub fn unpack_merges_inferred(
    bytes: &[u8],
    width: BitWidth,
) -> PackResult<Vec<IndexPair>> {
    let count = infer_pair_count(bytes.len(), width)?;
    unpack_merges(bytes, width, count)
}

/// Decode `count` merges and map them back to token strings.
pub fn unpack_rules(
    bytes: &[u8],
    width: BitWidth,
    count: usize,
    vocab: &Vocabulary,
) -> PackResult<Vec<MergeRule>> {
    unpack_merges(bytes, width, count)?
        .iter()
        .map(|pair| pair.to_rule(vocab))
        .collect()
}

/// `(left, right) -> priority` table, as used by a BPE runtime.
///
/// Priorities are 1-based list positions; lower merges first.
#[derive(Debug, Clone, Default)]
pub struct MergeRanks {
    ranks: AHashMap<IndexPair, usize>,
}

impl MergeRanks {
    /// Build from pairs in priority order.
    ///
    /// A repeated pair keeps its first (highest) priority.
    pub fn from_pairs(pairs: &[IndexPair]) -> Self {
        let mut ranks = AHashMap::with_capacity(pairs.len());
        for (i, pair) in pairs.iter().enumerate() {
            ranks.entry(*pair).or_insert(i + 1);
        }
        Self { ranks }
    }

    /// Look up the priority of merging `left` and `right`.
    pub fn get(
        &self,
        left: u32,
        right: u32,
    ) -> Option<usize> {
        self.ranks.get(&IndexPair::new(left, right)).copied()
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Is this table empty?
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::pack_index_pairs;

    #[test]
    fn test_unpack_toy() {
        let width = BitWidth::new(2).unwrap();
        assert_eq!(
            unpack_merges(&[16], width, 1).unwrap(),
            vec![IndexPair::new(0, 1)]
        );

        // The four padding bits would decode as a second (0, 0) pair.
        assert_eq!(
            unpack_merges(&[16], width, 2).unwrap(),
            vec![IndexPair::new(0, 1), IndexPair::new(0, 0)]
        );

        assert!(matches!(
            unpack_merges(&[16], width, 3),
            Err(PackError::MalformedInput(_))
        ));

        assert!(unpack_merges(&[], width, 0).unwrap().is_empty());
    }

    #[test]
    fn test_unpack_huge_count() {
        for count in [usize::MAX / 4, usize::MAX / 2, usize::MAX] {
            assert!(matches!(
                unpack_merges(&[16], BitWidth::DEFAULT, count),
                Err(PackError::MalformedInput(_))
            ));
        }
    }

    #[test]
    fn test_unpack_rules() {
        let vocab = Vocabulary::from_tokens(["a", "b", "ab", "c"]).unwrap();
        let width = BitWidth::new(2).unwrap();

        let rules = unpack_rules(&[16], width, 1, &vocab).unwrap();
        assert_eq!(rules, vec![MergeRule::new("a", "b")]);

        // Index 3 is valid for the width but not for a two-token vocabulary.
        let small = Vocabulary::from_tokens(["a", "b"]).unwrap();
        let bytes = pack_index_pairs(&[IndexPair::new(0, 3)], width).unwrap();
        assert!(matches!(
            unpack_rules(&bytes, width, 1, &small),
            Err(PackError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_infer_pair_count() {
        let width = BitWidth::DEFAULT;
        for n in 0..50 {
            assert_eq!(infer_pair_count(width.packed_len(n), width).unwrap(), n);
        }

        // 5 bytes is one 17-bit pair; 6 bytes has a stray trailing byte.
        assert!(matches!(
            infer_pair_count(6, width),
            Err(PackError::MalformedInput(_))
        ));

        assert!(matches!(
            infer_pair_count(1, BitWidth::new(2).unwrap()),
            Err(PackError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_unpack_inferred() {
        let width = BitWidth::new(9).unwrap();
        let pairs = vec![
            IndexPair::new(511, 0),
            IndexPair::new(3, 300),
            IndexPair::new(7, 7),
        ];
        let bytes = pack_index_pairs(&pairs, width).unwrap();
        assert_eq!(unpack_merges_inferred(&bytes, width).unwrap(), pairs);
    }

    #[test]
    fn test_merge_ranks() {
        let pairs = vec![
            IndexPair::new(0, 1),
            IndexPair::new(2, 3),
            IndexPair::new(0, 1),
        ];
        let ranks = MergeRanks::from_pairs(&pairs);

        assert_eq!(ranks.len(), 2);
        assert_eq!(ranks.get(0, 1), Some(1));
        assert_eq!(ranks.get(2, 3), Some(2));
        assert_eq!(ranks.get(1, 0), None);
        assert!(MergeRanks::default().is_empty());
    }
}
