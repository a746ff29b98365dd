//! # Conversion
//!
//! Composes [`extract_vocabulary`] and [`pack_merges`](crate::packing::pack_merges)
//! into the one conversion pass.
//!
//! Both artifacts are fully encoded in memory before either is written,
//! so a packing failure leaves the output directory untouched.

use std::path::{Path, PathBuf};

use crate::artifacts::{ArtifactPaths, Artifacts, encode_merges, encode_vocab};
use crate::document::TokenizerDocument;
use crate::errors::{PackError, PackResult};
use crate::packing::{BitWidth, IndexPair, MergeRule, pack_index_pairs};
use crate::vocab::{Vocabulary, extract_vocabulary};

/// How the index width is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthPolicy {
    /// Always use this width.
    Fixed(BitWidth),

    /// Use the smallest width that covers the vocabulary.
    Minimal,
}

impl Default for WidthPolicy {
    fn default() -> Self {
        Self::Fixed(BitWidth::DEFAULT)
    }
}

impl WidthPolicy {
    /// Resolve the width for a `vocab_size` vocabulary.
    ///
    /// A fixed width too narrow for the vocabulary is accepted here;
    /// it fails at packing time only if a merge uses an index that does not fit.
    pub fn resolve(
        &self,
        vocab_size: usize,
    ) -> PackResult<BitWidth> {
        match self {
            Self::Fixed(width) => Ok(*width),
            Self::Minimal => BitWidth::minimal_for(vocab_size),
        }
    }
}

/// Options for a conversion pass.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Index width policy.
    pub width: WidthPolicy,

    /// Re-read and decode the written artifacts, and compare.
    pub verify: bool,
}

impl ConvertOptions {
    /// Set the width policy.
    pub fn with_width(
        mut self,
        width: WidthPolicy,
    ) -> Self {
        self.width = width;
        self
    }

    /// Enable or disable post-write verification.
    pub fn with_verify(
        mut self,
        verify: bool,
    ) -> Self {
        self.verify = verify;
        self
    }
}

/// What a conversion produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    /// Number of vocabulary tokens.
    pub vocab_size: usize,

    /// Number of packed merges.
    pub merge_count: usize,

    /// The index width used.
    pub width: BitWidth,

    /// Length of the packed merge stream, in bytes.
    pub packed_bytes: usize,

    /// Number of zero bits padding the stream.
    pub padding_bits: usize,

    /// Written artifact paths, if written.
    pub paths: Option<ArtifactPaths>,
}

/// The in-memory result of converting a document.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The extracted vocabulary.
    pub vocab: Vocabulary,

    /// Merge index pairs, in priority order.
    pub merges: Vec<IndexPair>,

    /// The encoded artifacts.
    pub artifacts: Artifacts,

    /// Summary of the pass.
    pub summary: ConvertSummary,
}

/// Convert a parsed document into encoded artifacts, in memory.
pub fn convert_document(
    document: &TokenizerDocument,
    options: &ConvertOptions,
) -> PackResult<Conversion> {
    let vocab = extract_vocabulary(document)?;
    let width = options.width.resolve(vocab.len())?;
    log::info!(
        "vocabulary: {} tokens; index width: {width} bits",
        vocab.len()
    );

    // Parse and resolve entry by entry; errors surface in rule order.
    let lookup = vocab.reverse_lookup();
    let merges = document
        .merges_section()?
        .iter()
        .enumerate()
        .map(|(i, entry)| MergeRule::from_json(entry)?.resolve(lookup, i))
        .collect::<PackResult<Vec<_>>>()?;
    let packed = pack_index_pairs(&merges, width)?;
    log::info!(
        "merges: {} rules packed into {} bytes",
        merges.len(),
        packed.len()
    );

    let artifacts = Artifacts {
        vocab: encode_vocab(&vocab)?,
        merges: encode_merges(&packed),
    };

    let summary = ConvertSummary {
        vocab_size: vocab.len(),
        merge_count: merges.len(),
        width,
        packed_bytes: packed.len(),
        padding_bits: width.padding_bits(merges.len()),
        paths: None,
    };

    Ok(Conversion {
        vocab,
        merges,
        artifacts,
        summary,
    })
}

/// Convert the document at `input` and write both artifacts into `output_dir`.
///
/// ## Arguments
/// * `input` - path to a `tokenizer.json` document.
/// * `output_dir` - directory for [`VOCAB_ARTIFACT`](crate::artifacts::VOCAB_ARTIFACT)
///   and [`MERGES_ARTIFACT`](crate::artifacts::MERGES_ARTIFACT); created if missing.
/// * `options` - width policy and verification.
pub fn convert_tokenizer_file<I: AsRef<Path>, O: AsRef<Path>>(
    input: I,
    output_dir: O,
    options: &ConvertOptions,
) -> PackResult<ConvertSummary> {
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    let document = TokenizerDocument::load_path(input)?;
    let conversion = convert_document(&document, options)?;

    let paths = conversion.artifacts.write_to_dir(output_dir)?;
    log::info!(
        "wrote {} and {}",
        paths.vocab.display(),
        paths.merges.display()
    );

    if options.verify {
        verify_written(output_dir, &conversion)?;
        log::info!("verified artifacts in {}", output_dir.display());
    }

    Ok(ConvertSummary {
        paths: Some(paths),
        ..conversion.summary
    })
}

/// Re-read the artifacts in `dir`, and check they decode to `conversion`.
pub fn verify_written(
    dir: &Path,
    conversion: &Conversion,
) -> PackResult<()> {
    let decoded = Artifacts::read_from_dir(dir)?.decode(
        conversion.summary.width,
        Some(conversion.summary.merge_count),
    )?;

    if decoded.vocab != conversion.vocab {
        return Err(verification_failed(dir, "vocabulary"));
    }
    if decoded.merges != conversion.merges {
        return Err(verification_failed(dir, "merges"));
    }

    Ok(())
}

fn verification_failed(
    dir: &Path,
    what: &str,
) -> PackError {
    PackError::VerificationFailed {
        dir: PathBuf::from(dir),
        what: what.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{MERGES_ARTIFACT, VOCAB_ARTIFACT, decode_merges, decode_vocab};
    use crate::packing::unpack_rules;
    use tempdir::TempDir;

    const TOY: &str = r#"{
        "model": {
            "type": "BPE",
            "vocab": {"a": 0, "b": 1, "ab": 2, "c": 3, "abc": 4},
            "merges": ["a b", "ab c"]
        }
    }"#;

    #[test]
    fn test_convert_document() {
        let document = TokenizerDocument::from_json_str(TOY).unwrap();
        let conversion = convert_document(&document, &ConvertOptions::default()).unwrap();

        assert_eq!(conversion.merges, vec![IndexPair::new(0, 1), IndexPair::new(2, 3)]);

        let summary = &conversion.summary;
        assert_eq!(summary.vocab_size, 5);
        assert_eq!(summary.merge_count, 2);
        assert_eq!(summary.width, BitWidth::DEFAULT);
        assert_eq!(summary.packed_bytes, 9);
        assert_eq!(summary.padding_bits, 4);
        assert_eq!(summary.paths, None);

        let vocab = decode_vocab(&conversion.artifacts.vocab).unwrap();
        assert_eq!(vocab.tokens(), &["a", "b", "ab", "c", "abc"]);

        let bytes = decode_merges(&conversion.artifacts.merges).unwrap();
        let rules = unpack_rules(&bytes, summary.width, summary.merge_count, &vocab).unwrap();
        assert_eq!(
            rules,
            vec![MergeRule::new("a", "b"), MergeRule::new("ab", "c")]
        );
    }

    #[test]
    fn test_minimal_width() {
        let document = TokenizerDocument::from_json_str(TOY).unwrap();
        let options = ConvertOptions::default().with_width(WidthPolicy::Minimal);
        let conversion = convert_document(&document, &options).unwrap();

        // 5 tokens need 3 bits; 2 merges = 12 bits.
        assert_eq!(conversion.summary.width.bits(), 3);
        assert_eq!(conversion.summary.packed_bytes, 2);
        assert_eq!(conversion.summary.padding_bits, 4);
    }

    #[test]
    fn test_fixed_width_overflow() {
        let document = TokenizerDocument::from_json_str(TOY).unwrap();
        let options = ConvertOptions::default()
            .with_width(WidthPolicy::Fixed(BitWidth::new(1).unwrap()));

        assert!(matches!(
            convert_document(&document, &options),
            Err(PackError::IndexOverflow { index: 2, width: 1 })
        ));
    }

    #[test]
    fn test_convert_file() {
        let dir = TempDir::new("mergepack_convert").unwrap();
        let input = dir.path().join("tokenizer.json");
        std::fs::write(&input, TOY).unwrap();

        let out = dir.path().join("out");
        let options = ConvertOptions::default().with_verify(true);
        let summary = convert_tokenizer_file(&input, &out, &options).unwrap();

        let paths = summary.paths.unwrap();
        assert_eq!(paths.vocab, out.join(VOCAB_ARTIFACT));
        assert_eq!(paths.merges, out.join(MERGES_ARTIFACT));

        let decoded = Artifacts::read_from_dir(&out)
            .unwrap()
            .decode(BitWidth::DEFAULT, None)
            .unwrap();
        assert_eq!(decoded.merges.len(), 2);
        assert_eq!(decoded.vocab.len(), 5);
    }

    #[test]
    fn test_unknown_token_writes_nothing() {
        let dir = TempDir::new("mergepack_unknown").unwrap();
        let input = dir.path().join("tokenizer.json");
        std::fs::write(
            &input,
            r#"{"model": {"vocab": ["a", "b"], "merges": ["a b", "b zz"]}}"#,
        )
        .unwrap();

        let out = dir.path().join("out");
        let err = convert_tokenizer_file(&input, &out, &ConvertOptions::default()).unwrap_err();
        assert!(matches!(err, PackError::UnknownToken { rule: 1, .. }));

        assert!(!out.join(VOCAB_ARTIFACT).exists());
        assert!(!out.join(MERGES_ARTIFACT).exists());
    }

    #[test]
    fn test_malformed_merge() {
        let document = TokenizerDocument::from_json_str(
            r#"{"model": {"vocab": ["a", "b"], "merges": ["ab"]}}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_document(&document, &ConvertOptions::default()),
            Err(PackError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_errors_in_rule_order() {
        // Rule 0 has an unknown token; rule 1 is malformed.
        let document = TokenizerDocument::from_json_str(
            r#"{"model": {"vocab": ["a", "b"], "merges": ["a zz", "ab"]}}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_document(&document, &ConvertOptions::default()),
            Err(PackError::UnknownToken { rule: 0, .. })
        ));

        // And the other way around.
        let document = TokenizerDocument::from_json_str(
            r#"{"model": {"vocab": ["a", "b"], "merges": ["ab", "a zz"]}}"#,
        )
        .unwrap();
        assert!(matches!(
            convert_document(&document, &ConvertOptions::default()),
            Err(PackError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_lone_empty_token_writes_nothing() {
        let dir = TempDir::new("mergepack_empty_token").unwrap();
        let input = dir.path().join("tokenizer.json");
        std::fs::write(&input, r#"{"model": {"vocab": [""], "merges": []}}"#).unwrap();

        let out = dir.path().join("out");
        let options = ConvertOptions::default().with_verify(true);
        assert!(matches!(
            convert_tokenizer_file(&input, &out, &options),
            Err(PackError::MalformedInput(_))
        ));

        assert!(!out.join(VOCAB_ARTIFACT).exists());
        assert!(!out.join(MERGES_ARTIFACT).exists());
    }

    #[test]
    fn test_verify_detects_tampering() {
        let dir = TempDir::new("mergepack_verify").unwrap();
        let document = TokenizerDocument::from_json_str(TOY).unwrap();
        let conversion = convert_document(&document, &ConvertOptions::default()).unwrap();

        conversion.artifacts.write_to_dir(dir.path()).unwrap();
        verify_written(dir.path(), &conversion).unwrap();

        let tampered = Artifacts {
            vocab: encode_vocab(&Vocabulary::from_tokens(["a", "b", "ab", "c", "x"]).unwrap())
                .unwrap(),
            merges: conversion.artifacts.merges.clone(),
        };
        tampered.write_to_dir(dir.path()).unwrap();

        assert!(matches!(
            verify_written(dir.path(), &conversion),
            Err(PackError::VerificationFailed { .. })
        ));
    }
}
