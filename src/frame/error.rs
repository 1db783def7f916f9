//! Errors for the framing layer.

use std::io;

use thiserror::Error;

use crate::error::DecodeError;

/// Errors produced while reading a framed block stream.
///
/// Every variant is fatal to the stream: the reader does not resynchronise
/// past a corrupt record.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The stream ended inside a length prefix.
    #[error("incomplete length prefix: have {have} of 4 bytes")]
    TruncatedLengthPrefix {
        /// Prefix bytes read before end of input.
        have: usize,
    },

    /// A length prefix announced a header larger than allowed.
    #[error("blob header exceeds max length: {size} > {max}")]
    OversizedHeader {
        /// Announced header length.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A header declared a blob larger than allowed.
    #[error("blob exceeds max length: {size} > {max}")]
    OversizedBlob {
        /// Declared blob length.
        size: u64,
        /// Configured maximum.
        max: usize,
    },

    /// A required header field is absent.
    #[error("blob header is missing required field: {field}")]
    MissingHeaderField {
        /// Name of the missing field.
        field: &'static str,
    },

    /// A blob does not carry exactly one usable payload.
    #[error("invalid blob: {reason}")]
    InvalidBlob {
        /// What is wrong with the blob.
        reason: &'static str,
    },

    /// A blob uses a compression scheme this reader does not implement.
    #[error("unsupported blob compression: {codec}")]
    UnsupportedCompression {
        /// Name of the compression scheme.
        codec: &'static str,
    },

    /// A header, blob or payload message failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FrameError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// Decode failures report the category of the underlying
    /// [`DecodeError`].
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::TruncatedLengthPrefix { .. } => "truncated",
            Self::OversizedHeader { .. } | Self::OversizedBlob { .. } => "limit",
            Self::MissingHeaderField { .. } | Self::InvalidBlob { .. } => "malformed",
            Self::UnsupportedCompression { .. } => "compression",
            Self::Decode(err) => err.error_type(),
            Self::Io(_) => "io",
        }
    }

    /// Returns true if the stream ended part-way through a record.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::TruncatedLengthPrefix { .. } => true,
            Self::Decode(err) => err.is_truncation(),
            _ => false,
        }
    }
}

impl From<FrameError> for io::Error {
    fn from(err: FrameError) -> Self {
        match err {
            FrameError::Io(e) => e,
            FrameError::Decode(e) => e.into(),
            e if e.is_truncation() => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
