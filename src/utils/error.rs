// src/utils/error.rs

//! Error type shared by every codec in the crate.

use std::io;
use thiserror::Error;

/// Main error type for the band codecs.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The stream header or payload is malformed.
    #[error("Format error: {0}")]
    Format(String),
    /// A decoder was handed a stream written by another codec.
    #[error("Format error: expected magic tag {expected:?}, found {found:?}")]
    MagicMismatch { expected: &'static str, found: String },
    /// The stream ended before the payload was complete.
    #[error("Format error: truncated stream")]
    Truncated,
    /// The caller supplied an empty image or an out-of-range parameter.
    #[error("Invalid input: {0}")]
    Input(String),
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl CodecError {
    /// True for every variant describing a bad stream rather than bad input or I/O.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CodecError::Format(_) | CodecError::MagicMismatch { .. } | CodecError::Truncated
        )
    }
}

impl From<io::Error> for CodecError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Truncated
        } else {
            CodecError::Io(err)
        }
    }
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
