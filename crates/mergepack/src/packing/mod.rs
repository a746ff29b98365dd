//! # Merge Bit-Packing
//!
//! Each merge rule becomes an [`IndexPair`]; each index is written as exactly
//! `W` bits, most-significant bit first, left index before right index,
//! rule by rule. The stream is zero-padded to a whole byte.
//!
//! ```text
//! rule 0          rule 1          ...      padding
//! [left W][right W][left W][right W] ... [0 .. 7 zero bits]
//! ```
//!
//! The padding is not recorded; the decoder must know the pair count,
//! or infer it with [`infer_pair_count`] when `W >= 8`.

mod bit_io;
mod bit_width;
mod merge_rule;
mod pack;
mod unpack;

#[doc(inline)]
pub use bit_io::*;
#[doc(inline)]
pub use bit_width::*;
#[doc(inline)]
pub use merge_rule::*;
#[doc(inline)]
pub use pack::*;
#[doc(inline)]
pub use unpack::*;
