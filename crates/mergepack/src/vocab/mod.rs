//! # Vocabulary
//!
//! [`Vocabulary`] is the ordered list of distinct token strings;
//! a token's position is its index in the packed merge stream.
//!
//! [`ReverseLookup`] is the derived `token -> index` map.

use ahash::AHashMap;
use serde_json::Value;

use crate::document::{TokenizerDocument, VOCAB_POINTER};
use crate::errors::{PackError, PackResult};

/// An ordered sequence of distinct token strings.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    tokens: Vec<String>,
    lookup: ReverseLookup,
}

impl PartialEq for Vocabulary {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.tokens == other.tokens
    }
}

impl Eq for Vocabulary {}

impl Vocabulary {
    /// Build a vocabulary, rejecting duplicate tokens.
    pub fn from_tokens<I, S>(tokens: I) -> PackResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        let lookup = ReverseLookup::build(&tokens)?;

        Ok(Self { tokens, lookup })
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is this vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Get the token at `index`.
    pub fn get(
        &self,
        index: u32,
    ) -> Option<&str> {
        self.tokens.get(index as usize).map(String::as_str)
    }

    /// The tokens, in index order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Iterate over the tokens, in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// The `token -> index` map.
    pub fn reverse_lookup(&self) -> &ReverseLookup {
        &self.lookup
    }
}

/// `token -> index` map derived from a [`Vocabulary`].
#[derive(Debug, Clone, Default)]
pub struct ReverseLookup {
    index: AHashMap<String, u32>,
}

impl ReverseLookup {
    fn build(tokens: &[String]) -> PackResult<Self> {
        let mut index = AHashMap::with_capacity(tokens.len());

        for (i, token) in tokens.iter().enumerate() {
            let id = u32::try_from(i).map_err(|_| {
                PackError::MalformedInput(format!(
                    "vocabulary has more than {} entries",
                    u32::MAX
                ))
            })?;

            if index.insert(token.clone(), id).is_some() {
                return Err(PackError::MalformedInput(format!(
                    "duplicate vocabulary token {token:?} at index {i}"
                )));
            }
        }

        Ok(Self { index })
    }

    /// Look up the index of `token`.
    pub fn get(
        &self,
        token: &str,
    ) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Is this lookup empty?
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Extract the ordered vocabulary from a tokenizer document.
///
/// The section at [`VOCAB_POINTER`] may be either:
/// * a list of token strings, or
/// * an object whose keys, in document order, are the tokens; the values are ignored.
///
/// ## Errors
/// [`PackError::MalformedInput`] if the section is missing, has another shape,
/// holds a non-string entry, or repeats a token.
pub fn extract_vocabulary(document: &TokenizerDocument) -> PackResult<Vocabulary> {
    let vocab = match document.vocab_section()? {
        Value::Array(entries) => {
            let tokens = entries
                .iter()
                .enumerate()
                .map(|(i, entry)| match entry {
                    Value::String(token) => Ok(token.as_str()),
                    other => Err(PackError::MalformedInput(format!(
                        "vocabulary entry #{i} is not a string: {other}"
                    ))),
                })
                .collect::<PackResult<Vec<_>>>()?;
            Vocabulary::from_tokens(tokens)?
        }
        Value::Object(entries) => Vocabulary::from_tokens(entries.keys().map(String::as_str))?,
        _ => {
            return Err(PackError::MalformedInput(format!(
                "vocabulary section at {VOCAB_POINTER} is not list-shaped"
            )));
        }
    };

    log::debug!("extracted {} vocabulary tokens", vocab.len());
    Ok(vocab)
}
