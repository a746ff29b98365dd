//! # Error Types

use std::path::PathBuf;

/// Errors raised while converting or decoding tokenizer artifacts.
///
/// Every variant is fatal to the conversion pass.
#[derive(thiserror::Error, Debug)]
pub enum PackError {
    /// The input does not have the expected shape.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A merge rule references a token absent from the vocabulary.
    #[error("unknown token {token:?} in merge rule #{rule}")]
    UnknownToken {
        /// The unresolved token string.
        token: String,

        /// Zero-based priority position of the offending rule.
        rule: usize,
    },

    /// A vocabulary index does not fit in the configured bit width.
    #[error("index {index} does not fit in {width} bits")]
    IndexOverflow {
        /// The offending index.
        index: u32,

        /// The configured width, in bits.
        width: u32,
    },

    /// A bit width outside of `1..=32`.
    #[error("invalid bit width {0}; expected 1..=32")]
    InvalidBitWidth(u32),

    /// File system failure, with the path involved.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,

        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The input document is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An artifact is not valid base64.
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The vocabulary artifact is not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Written artifacts did not decode back to what was converted.
    #[error("artifacts in {dir} failed verification: {what} mismatch")]
    VerificationFailed {
        /// The artifact directory.
        dir: PathBuf,

        /// Which artifact disagreed.
        what: String,
    },
}

impl PackError {
    /// Build a [`PackError::Io`] for `path`.
    pub fn io<P: Into<PathBuf>>(
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for this crate.
pub type PackResult<T> = Result<T, PackError>;
