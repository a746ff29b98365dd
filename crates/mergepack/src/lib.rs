//! # mergepack
//!
//! Converts a BPE tokenizer description (a `tokenizer.json` document holding
//! a vocabulary and an ordered merge list) into two compact artifacts:
//!
//! * a newline-delimited vocabulary blob;
//! * a dense, fixed-width bit-packed encoding of the merge rules.
//!
//! Both are wrapped in standard base64 so they can be shipped as text.
//!
//! ## Converting A Tokenizer
//!
//! ```rust,no_run
//! use mergepack::{ConvertOptions, convert_tokenizer_file};
//!
//! fn example() -> mergepack::PackResult<()> {
//!     let summary = convert_tokenizer_file("tokenizer.json", ".", &ConvertOptions::default())?;
//!     println!("packed {} merges", summary.merge_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Bit Packing
//!
//! ```rust
//! use mergepack::packing::{BitWidth, IndexPair, pack_index_pairs, unpack_merges};
//!
//! let width = BitWidth::new(2).unwrap();
//! let bytes = pack_index_pairs(&[IndexPair::new(0, 1)], width).unwrap();
//! assert_eq!(bytes, vec![0b0001_0000]);
//!
//! let pairs = unpack_merges(&bytes, width, 1).unwrap();
//! assert_eq!(pairs, vec![IndexPair::new(0, 1)]);
//! ```

pub mod artifacts;
pub mod convert;
pub mod document;
pub mod errors;
pub mod packing;
pub mod vocab;

#[doc(inline)]
pub use convert::{
    Conversion, ConvertOptions, ConvertSummary, WidthPolicy, convert_document,
    convert_tokenizer_file,
};
#[doc(inline)]
pub use errors::{PackError, PackResult};
#[doc(inline)]
pub use packing::{BitWidth, IndexPair, pack_merges, unpack_merges};
#[doc(inline)]
pub use vocab::{ReverseLookup, Vocabulary, extract_vocabulary};
