//! Error types for wsp-core.
//!
//! # Recovery
//!
//! | Error Type | Strategy |
//! |------------|----------|
//! | [`Error::ReadFailed`] | Retry; a history walk records the slot as missing |
//! | [`Error::ShortRead`] | Retry; usually a truncated dump file |
//! | [`Error::WriteFailed`] | Retry |
//! | [`Error::Io`] | Retry |
//! | [`Error::MalformedSettings`] | Fatal, the station memory is not settled |
//! | [`Error::Parse`] | Fatal |
//! | [`Error::Unsupported`] | Fatal, use a writable transport |
//! | [`Error::InvalidAddress`] | Fatal |
//! | [`Error::InvalidConfig`] | Fatal, fix the arguments |
//!
//! [`crate::with_retry`] applies this classification.

use thiserror::Error;

use wsp_types::ParseError;

/// Errors that can occur when talking to a weather station.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The settings block never showed the `0x55 0xAA` magic number.
    #[error(
        "Malformed settings block: magic number {:02X} {:02X} after {attempts} attempts",
        .found[0],
        .found[1]
    )]
    MalformedSettings {
        /// Magic bytes seen on the last attempt.
        found: [u8; 2],
        /// Number of reads attempted.
        attempts: u32,
    },

    /// A block read failed.
    #[error("Read of block 0x{address:04X} failed: {reason}")]
    ReadFailed {
        /// Device address of the block.
        address: u16,
        /// What went wrong.
        reason: String,
    },

    /// The transport returned fewer bytes than requested.
    #[error("Short read at 0x{address:04X}: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Device address of the block.
        address: u16,
        /// Bytes requested.
        expected: usize,
        /// Bytes received.
        actual: usize,
    },

    /// A write was not acknowledged.
    #[error("Write to 0x{address:04X} failed: {reason}")]
    WriteFailed {
        /// Device address written to.
        address: u16,
        /// What went wrong.
        reason: String,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Decoding failed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// The transport does not support this operation.
    #[error("Operation not supported: {0}")]
    Unsupported(String),

    /// Address outside the station's memory or not block aligned.
    #[error("Invalid address: 0x{0:04X}")]
    InvalidAddress(u32),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create a read failure for a block.
    pub fn read_failed(address: u16, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            address,
            reason: reason.into(),
        }
    }

    /// Create a write failure for an address.
    pub fn write_failed(address: u16, reason: impl Into<String>) -> Self {
        Self::WriteFailed {
            address,
            reason: reason.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported(operation.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ReadFailed { .. } | Error::ShortRead { .. } | Error::WriteFailed { .. } | Error::Io(_)
        )
    }
}

/// Result type alias using wsp-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::read_failed(0x0120, "timeout");
        assert_eq!(err.to_string(), "Read of block 0x0120 failed: timeout");

        let err = Error::MalformedSettings {
            found: [0x00, 0xAA],
            attempts: 3,
        };
        assert!(err.to_string().contains("00 AA"));
        assert!(err.to_string().contains("3 attempts"));

        let err = Error::ShortRead {
            address: 0xFFF0,
            expected: 16,
            actual: 4,
        };
        assert!(err.to_string().contains("0xFFF0"));
        assert!(err.to_string().contains("got 4"));

        let err = Error::InvalidAddress(0x10000);
        assert_eq!(err.to_string(), "Invalid address: 0x10000");
    }

    #[test]
    fn test_parse_error_conversion() {
        let parse = ParseError::InvalidValue("bad".to_string());
        let err: Error = parse.into();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_is_transient() {
        assert!(Error::read_failed(0, "x").is_transient());
        assert!(Error::write_failed(0, "x").is_transient());
        assert!(!Error::unsupported("write").is_transient());
        assert!(!Error::invalid_config("x").is_transient());
        assert!(
            !Error::MalformedSettings {
                found: [0, 0],
                attempts: 3
            }
            .is_transient()
        );
    }
}
