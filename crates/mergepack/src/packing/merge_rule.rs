//! # Merge Rules and Index Pairs

use core::fmt;

use serde_json::Value;

use crate::errors::{PackError, PackResult};
use crate::vocab::{ReverseLookup, Vocabulary};

/// The single separator between the two tokens of a textual merge rule.
pub const MERGE_DELIMITER: char = ' ';

/// An ordered `(left, right)` pair of tokens which may be merged.
///
/// Priority is the rule's position in the merge list; earlier wins.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MergeRule {
    /// Left token.
    pub left: String,

    /// Right token.
    pub right: String,
}

impl MergeRule {
    /// Construct a rule from its two tokens.
    pub fn new<L: Into<String>, R: Into<String>>(
        left: L,
        right: R,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// Parse a `"left right"` rule.
    ///
    /// ## Errors
    /// [`PackError::MalformedInput`] unless `rule` contains exactly one [`MERGE_DELIMITER`].
    pub fn parse(rule: &str) -> PackResult<Self> {
        let mut parts = rule.split(MERGE_DELIMITER);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(left), Some(right), None) => Ok(Self::new(left, right)),
            _ => Err(PackError::MalformedInput(format!(
                "merge rule {rule:?} must contain exactly one {MERGE_DELIMITER:?} delimiter"
            ))),
        }
    }

    /// Read a rule from a merges-section entry.
    ///
    /// Accepts either a `"left right"` string, or a `["left", "right"]` array.
    pub fn from_json(entry: &Value) -> PackResult<Self> {
        match entry {
            Value::String(rule) => Self::parse(rule),
            Value::Array(parts) => match parts.as_slice() {
                [Value::String(left), Value::String(right)] => Ok(Self::new(left, right)),
                _ => Err(PackError::MalformedInput(format!(
                    "merge rule {entry} must be a pair of strings"
                ))),
            },
            other => Err(PackError::MalformedInput(format!(
                "merge rule {other} is neither a string nor a pair"
            ))),
        }
    }

    /// Resolve both tokens to vocabulary indices.
    ///
    /// ## Arguments
    /// * `lookup` - the vocabulary's reverse lookup.
    /// * `rule_index` - the rule's priority position, for diagnostics.
    pub fn resolve(
        &self,
        lookup: &ReverseLookup,
        rule_index: usize,
    ) -> PackResult<IndexPair> {
        let find = |token: &str| {
            lookup.get(token).ok_or_else(|| PackError::UnknownToken {
                token: token.to_string(),
                rule: rule_index,
            })
        };

        Ok(IndexPair::new(find(&self.left)?, find(&self.right)?))
    }
}

impl fmt::Display for MergeRule {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}{}{}", self.left, MERGE_DELIMITER, self.right)
    }
}

/// The index-encoded form of a [`MergeRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPair {
    /// Index of the left token.
    pub left: u32,

    /// Index of the right token.
    pub right: u32,
}

impl IndexPair {
    /// Construct a pair.
    pub const fn new(
        left: u32,
        right: u32,
    ) -> Self {
        Self { left, right }
    }

    /// Map back to token strings through `vocab`.
    ///
    /// ## Errors
    /// [`PackError::MalformedInput`] if either index is outside of `vocab`.
    pub fn to_rule(
        &self,
        vocab: &Vocabulary,
    ) -> PackResult<MergeRule> {
        let token = |index: u32| {
            vocab.get(index).ok_or_else(|| {
                PackError::MalformedInput(format!(
                    "merge index {index} is outside of a {} token vocabulary",
                    vocab.len()
                ))
            })
        };

        Ok(MergeRule::new(token(self.left)?, token(self.right)?))
    }
}

impl From<(u32, u32)> for IndexPair {
    fn from((left, right): (u32, u32)) -> Self {
        Self::new(left, right)
    }
}
