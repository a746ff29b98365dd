//! # Merge Packer

use crate::errors::PackResult;
use crate::packing::{BitWidth, BitWriter, IndexPair, MergeRule};
use crate::vocab::ReverseLookup;

/// Resolve `rules`, in priority order, into index pairs.
///
/// ## Errors
/// [`PackError::UnknownToken`](crate::PackError::UnknownToken) on the first
/// token absent from `lookup`.
pub fn resolve_rules(
    rules: &[MergeRule],
    lookup: &ReverseLookup,
) -> PackResult<Vec<IndexPair>> {
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| rule.resolve(lookup, i))
        .collect()
}

/// Pack index pairs into a zero-padded, fixed-width bitstream.
///
/// ## Returns
/// Exactly [`BitWidth::packed_len`] bytes.
///
/// ## Errors
/// [`PackError::IndexOverflow`](crate::PackError::IndexOverflow) if any index
/// does not fit in `width`; nothing is produced in that case.
pub fn pack_index_pairs(
    pairs: &[IndexPair],
    width: BitWidth,
) -> PackResult<Vec<u8>> {
    let mut writer = BitWriter::with_capacity_bits(width.data_bits(pairs.len()));

    for pair in pairs {
        writer.write_bits(width.check(pair.left)?, width);
        writer.write_bits(width.check(pair.right)?, width);
    }

    Ok(writer.finish())
}

/// Resolve and pack `rules` in one step.
///
/// ## Arguments
/// * `rules` - merge rules, in priority order.
/// * `lookup` - the vocabulary's reverse lookup.
/// * `width` - the agreed index width.
pub fn pack_merges(
    rules: &[MergeRule],
    lookup: &ReverseLookup,
    width: BitWidth,
) -> PackResult<Vec<u8>> {
    let pairs = resolve_rules(rules, lookup)?;
    pack_index_pairs(&pairs, width)
}
