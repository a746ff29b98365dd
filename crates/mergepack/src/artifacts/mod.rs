//! # Artifacts
//!
//! The two converted artifacts, each a single line of standard (padded) base64:
//!
//! * [`VOCAB_ARTIFACT`] - the vocabulary joined with `'\n'`, as UTF-8.
//! * [`MERGES_ARTIFACT`] - the packed merge bitstream.
//!
//! File names are fixed; downstream consumers look for them by name.

use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::errors::{PackError, PackResult};
use crate::packing::{BitWidth, IndexPair, infer_pair_count, unpack_merges};
use crate::vocab::Vocabulary;

/// Default input document name.
pub const DEFAULT_INPUT: &str = "tokenizer.json";

/// Vocabulary artifact file name.
pub const VOCAB_ARTIFACT: &str = "vocab_base64.txt";

/// Merges artifact file name.
pub const MERGES_ARTIFACT: &str = "merges_binary.bin";

/// Separator between vocabulary entries.
pub const VOCAB_SEPARATOR: char = '\n';

/// Encode a vocabulary as base64 of its `'\n'`-joined tokens.
///
/// No trailing separator is written.
///
/// ## Errors
/// [`PackError::MalformedInput`] for vocabularies the format cannot represent:
/// a token containing [`VOCAB_SEPARATOR`], or a lone empty token, which would
/// encode the same as an empty vocabulary.
pub fn encode_vocab(vocab: &Vocabulary) -> PackResult<String> {
    if vocab.len() == 1 && vocab.tokens()[0].is_empty() {
        return Err(PackError::MalformedInput(
            "a vocabulary of only the empty token cannot be told apart from an empty one"
                .to_string(),
        ));
    }

    if let Some((index, token)) = vocab
        .iter()
        .enumerate()
        .find(|(_, token)| token.contains(VOCAB_SEPARATOR))
    {
        return Err(PackError::MalformedInput(format!(
            "vocabulary token #{index} ({token:?}) contains the line separator"
        )));
    }

    let joined = vocab.tokens().join("\n");
    Ok(STANDARD.encode(joined.as_bytes()))
}

/// Decode a vocabulary artifact.
///
/// Surrounding whitespace is ignored; an empty artifact is an empty vocabulary.
pub fn decode_vocab(text: &str) -> PackResult<Vocabulary> {
    let bytes = STANDARD.decode(text.trim())?;
    if bytes.is_empty() {
        return Ok(Vocabulary::default());
    }

    let joined = String::from_utf8(bytes)?;
    Vocabulary::from_tokens(joined.split(VOCAB_SEPARATOR))
}

/// Encode a packed merge bitstream.
pub fn encode_merges(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode a merges artifact back to the packed bitstream.
pub fn decode_merges(text: &str) -> PackResult<Vec<u8>> {
    Ok(STANDARD.decode(text.trim())?)
}

/// The encoded text of both artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    /// Encoded vocabulary.
    pub vocab: String,

    /// Encoded merges.
    pub merges: String,
}

/// Paths of written artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Vocabulary artifact path.
    pub vocab: PathBuf,

    /// Merges artifact path.
    pub merges: PathBuf,
}

impl ArtifactPaths {
    /// The fixed artifact paths under `dir`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            vocab: dir.join(VOCAB_ARTIFACT),
            merges: dir.join(MERGES_ARTIFACT),
        }
    }
}

impl Artifacts {
    /// Write both artifacts under `dir`, overwriting existing files.
    pub fn write_to_dir<P: AsRef<Path>>(
        &self,
        dir: P,
    ) -> PackResult<ArtifactPaths> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| PackError::io(dir, e))?;

        let paths = ArtifactPaths::in_dir(dir);
        for (path, text) in [(&paths.vocab, &self.vocab), (&paths.merges, &self.merges)] {
            fs::write(path, text).map_err(|e| PackError::io(path, e))?;
            log::debug!("wrote {} ({} bytes)", path.display(), text.len());
        }

        Ok(paths)
    }

    /// Read both artifacts from `dir`.
    pub fn read_from_dir<P: AsRef<Path>>(dir: P) -> PackResult<Self> {
        let paths = ArtifactPaths::in_dir(dir);
        let read = |path: &Path| fs::read_to_string(path).map_err(|e| PackError::io(path, e));

        Ok(Self {
            vocab: read(&paths.vocab)?,
            merges: read(&paths.merges)?,
        })
    }

    /// Decode both artifacts.
    ///
    /// ## Arguments
    /// * `width` - the agreed index width.
    /// * `count` - the merge count; inferred from the stream length when `None`
    ///   (requires `W >= 8`).
    pub fn decode(
        &self,
        width: BitWidth,
        count: Option<usize>,
    ) -> PackResult<DecodedArtifacts> {
        let vocab = decode_vocab(&self.vocab)?;
        let bytes = decode_merges(&self.merges)?;

        let count = match count {
            Some(count) => count,
            None => infer_pair_count(bytes.len(), width)?,
        };
        let merges = unpack_merges(&bytes, width, count)?;

        if let Some(pair) = merges
            .iter()
            .find(|pair| pair.left as usize >= vocab.len() || pair.right as usize >= vocab.len())
        {
            return Err(PackError::MalformedInput(format!(
                "merge ({}, {}) is outside of a {} token vocabulary",
                pair.left,
                pair.right,
                vocab.len()
            )));
        }

        Ok(DecodedArtifacts { vocab, merges })
    }
}

/// Decoded artifact contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedArtifacts {
    /// The vocabulary.
    pub vocab: Vocabulary,

    /// Merge index pairs, in priority order.
    pub merges: Vec<IndexPair>,
}
