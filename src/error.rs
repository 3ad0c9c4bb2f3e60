//! Error types and result handling for pgoutput-decoder.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! Decode failures are fatal for the single message being decoded and never
//! affect later messages. Advisory conditions (undecodable bytes inside a
//! C-string, unknown message kinds) are not errors; they are reported through
//! a [`DiagnosticSink`](crate::diagnostics::DiagnosticSink).
//!
//! # Example
//!
//! ```rust
//! use pgoutput_decoder::{decode_message, Error};
//!
//! // An Update whose role byte is neither 'K', 'O' nor 'N'
//! let buf = [b'U', 0, 0, 0, 7, b'X'];
//!
//! match decode_message(&buf) {
//!     Err(Error::StructuralViolation { message }) => eprintln!("rejected: {}", message),
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```

use thiserror::Error;

/// The main error type for pgoutput-decoder operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The leading tag byte does not match the decoder that was invoked.
    #[error("Tag mismatch: expected '{expected}', found {found:#04x}")]
    TagMismatch {
        /// Tag the decoder expects
        expected: char,
        /// Byte actually found at offset 0
        found: u8,
    },

    /// An expected sub-tag is absent or invalid, or a declared
    /// length or count cannot be honoured.
    #[error("Structural violation: {message}")]
    StructuralViolation {
        /// Description of what was malformed
        message: String,
    },

    /// A read would run past the end of the message buffer.
    #[error("Unexpected end of message: needed {needed} bytes at offset {position}, {available} available")]
    UnexpectedEof {
        /// Cursor position where the read started
        position: usize,
        /// Bytes the read required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// Text column value is not valid UTF-8.
    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Integer decoding was asked for a width other than 1, 2, 4 or 8 bytes.
    #[error("Unsupported integer width: {0} bytes")]
    InvalidIntegerWidth(usize),

    /// Timestamp cannot be represented as a calendar time.
    #[error("Timestamp out of range: {0} microseconds since 2000-01-01")]
    TimestampOutOfRange(i64),

    /// Malformed replication CopyData frame.
    #[error("Invalid frame: {message}")]
    InvalidFrame {
        /// Description of what was invalid
        message: String,
    },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration was loaded but holds an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization error when rendering events.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error, typically from reading input files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn structural(message: impl Into<String>) -> Self {
        Error::StructuralViolation {
            message: message.into(),
        }
    }

    /// Returns `true` if this error aborted the decoding of a message,
    /// as opposed to a failure of the surrounding configuration or I/O layer.
    pub fn is_fatal_decode(&self) -> bool {
        matches!(
            self,
            Error::TagMismatch { .. }
                | Error::StructuralViolation { .. }
                | Error::UnexpectedEof { .. }
                | Error::InvalidUtf8(_)
                | Error::InvalidIntegerWidth(_)
                | Error::TimestampOutOfRange(_)
                | Error::InvalidFrame { .. }
        )
    }
}

/// A convenient Result type alias for pgoutput-decoder operations.
///
/// This is equivalent to `std::result::Result<T, pgoutput_decoder::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
