//! # Tokenizer Document
//!
//! A thin wrapper over a parsed `tokenizer.json` document.
//!
//! Object key order is preserved (`serde_json/preserve_order`), so a
//! vocabulary given as a `{ token -> id }` object still reads in document order.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::Value;

use crate::errors::{PackError, PackResult};
use crate::packing::MergeRule;

/// JSON pointer to the vocabulary section.
pub const VOCAB_POINTER: &str = "/model/vocab";

/// JSON pointer to the merges section.
pub const MERGES_POINTER: &str = "/model/merges";

/// A parsed tokenizer description.
#[derive(Debug, Clone)]
pub struct TokenizerDocument {
    root: Value,
}

impl From<Value> for TokenizerDocument {
    fn from(root: Value) -> Self {
        Self { root }
    }
}

impl TokenizerDocument {
    /// Parse a document from a JSON string.
    pub fn from_json_str(text: &str) -> PackResult<Self> {
        Ok(serde_json::from_str::<Value>(text)?.into())
    }

    /// Parse a document from a reader.
    pub fn from_reader<R: Read>(reader: R) -> PackResult<Self> {
        Ok(serde_json::from_reader::<_, Value>(reader)?.into())
    }

    /// Load and parse a document from disk.
    ///
    /// The whole document is held in memory.
    pub fn load_path<P: AsRef<Path>>(path: P) -> PackResult<Self> {
        let path = path.as_ref();
        log::debug!("loading tokenizer document from {}", path.display());

        let file = File::open(path).map_err(|e| PackError::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// The underlying JSON value.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// The raw vocabulary section.
    ///
    /// ## Returns
    /// The value at [`VOCAB_POINTER`]; its shape is checked by
    /// [`extract_vocabulary`](crate::vocab::extract_vocabulary).
    pub fn vocab_section(&self) -> PackResult<&Value> {
        self.root.pointer(VOCAB_POINTER).ok_or_else(|| {
            PackError::MalformedInput(format!("missing vocabulary section at {VOCAB_POINTER}"))
        })
    }

    /// The raw merges section, which must be a JSON array.
    pub fn merges_section(&self) -> PackResult<&[Value]> {
        match self.root.pointer(MERGES_POINTER) {
            Some(Value::Array(entries)) => Ok(entries.as_slice()),
            Some(_) => Err(PackError::MalformedInput(format!(
                "merges section at {MERGES_POINTER} is not a list"
            ))),
            None => Err(PackError::MalformedInput(format!(
                "missing merges section at {MERGES_POINTER}"
            ))),
        }
    }

    /// Parse the merges section into rules, in priority order.
    pub fn merge_rules(&self) -> PackResult<Vec<MergeRule>> {
        self.merges_section()?
            .iter()
            .map(MergeRule::from_json)
            .collect()
    }
}
