//! Error types for memory decoding in wsp-types.

use thiserror::Error;

/// Errors that can occur when decoding weather station memory.
///
/// This error type is transport-agnostic and does not include
/// I/O errors (those belong in wsp-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The buffer is shorter than the structure being decoded.
    #[error("Insufficient bytes: {what} requires {expected} bytes, got {actual}")]
    InsufficientBytes {
        /// Name of the structure being decoded.
        what: &'static str,
        /// Minimum number of bytes required.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// A field holds a value that cannot be interpreted.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

impl ParseError {
    pub(crate) fn insufficient(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::InsufficientBytes {
            what,
            expected,
            actual,
        }
    }
}

/// Result type alias using wsp-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
