//! Error types for the wire-format decoding layer.
//!
//! [`DecodeError`] covers everything that can go wrong while turning bytes
//! into [`Message`](crate::Message) values: truncated input, illegal tags,
//! failed lookups, packed-field expansion and compressed payload handling.
//!
//! # Error Categories
//!
//! - Stream errors ([`DecodeError::TruncatedStream`], [`DecodeError::VarintOverflow`],
//!   [`DecodeError::InvalidWireType`], [`DecodeError::InvalidFieldNumber`]) abort the message
//!   being decoded. No partially built message is returned.
//! - Lookup errors ([`DecodeError::FieldTypeMismatch`]) are recoverable and leave the message
//!   untouched.
//! - Expansion errors ([`DecodeError::NotPackable`], [`DecodeError::TruncatedPackedRun`]) abort
//!   a single packed-field expansion.
//! - Payload errors ([`DecodeError::DecompressionError`], [`DecodeError::SizeMismatch`]) abort a
//!   single compressed blob.

use std::io;

use thiserror::Error;

use crate::wire::WireType;

/// Errors produced while decoding wire-format data.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The input ended before a promised number of bytes was available.
    #[error("truncated stream: needed {expected} bytes, got {actual}")]
    TruncatedStream {
        /// Bytes the decoder was promised.
        expected: usize,
        /// Bytes actually available before end of input.
        actual: usize,
    },

    /// A varint ran past the maximum encoded length of a 64-bit integer.
    #[error("varint exceeds {max} bytes")]
    VarintOverflow {
        /// Maximum number of bytes accepted for a single varint.
        max: usize,
    },

    /// A tag carried a reserved or unknown wire type.
    #[error("invalid wire type {0}")]
    InvalidWireType(u8),

    /// A tag carried a field number outside the legal range.
    #[error("invalid field number {0}")]
    InvalidFieldNumber(u64),

    /// A lookup matched a field number but found a different wire type.
    #[error("field {number} has wire type {actual}, expected {expected}")]
    FieldTypeMismatch {
        /// Field number that matched.
        number: u32,
        /// Wire type requested by the caller.
        expected: WireType,
        /// Wire type stored in the message.
        actual: WireType,
    },

    /// Packed expansion targeted a field that is not length-delimited, or
    /// asked for a length-delimited element type.
    #[error("field {number} with wire type {wire_type} cannot be expanded as packed")]
    NotPackable {
        /// Field number targeted by the expansion.
        number: u32,
        /// Offending wire type.
        wire_type: WireType,
    },

    /// A packed run ended part-way through an element.
    #[error("packed field {number} ends with {trailing} bytes of a partial {wire_type} element")]
    TruncatedPackedRun {
        /// Field number being expanded.
        number: u32,
        /// Element wire type.
        wire_type: WireType,
        /// Bytes left over after the last whole element.
        trailing: usize,
    },

    /// The bytes of a length-delimited field did not form a valid message.
    #[error("invalid embedded message: {0}")]
    InvalidEmbeddedMessage(#[source] Box<DecodeError>),

    /// The zlib stream could not be inflated.
    #[error("decompression failed: {0}")]
    DecompressionError(#[source] io::Error),

    /// The inflated size disagreed with the declared size.
    #[error("inflated {actual} bytes, blob declared {declared}")]
    SizeMismatch {
        /// Uncompressed size declared by the blob.
        declared: usize,
        /// Bytes produced by the inflater.
        actual: usize,
    },

    /// A buffer could not be allocated.
    #[error("failed to allocate {requested} bytes")]
    AllocationFailure {
        /// Size of the failed allocation.
        requested: usize,
    },

    /// A message or buffer exceeded the configured size limit.
    #[error("message of {size} bytes exceeds limit of {max}")]
    MessageTooLarge {
        /// Size that was requested.
        size: u64,
        /// Configured maximum.
        max: usize,
    },

    /// Nested decoding exceeded the configured depth.
    #[error("embedded message depth exceeds {max}")]
    DepthExceeded {
        /// Configured maximum depth.
        max: usize,
    },

    /// The underlying reader failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Wrap an inner failure as an embedded-message error.
    ///
    /// Depth violations pass through unchanged so callers can tell resource
    /// limits apart from malformed content.
    #[must_use]
    pub fn embedded(inner: DecodeError) -> Self {
        match inner {
            Self::DepthExceeded { .. } | Self::AllocationFailure { .. } => inner,
            other => Self::InvalidEmbeddedMessage(Box::new(other)),
        }
    }

    /// Returns true if this error is a recoverable lookup failure.
    #[must_use]
    pub fn is_lookup_error(&self) -> bool { matches!(self, Self::FieldTypeMismatch { .. }) }

    /// Returns true if the input ended early, including inside an embedded
    /// message.
    #[must_use]
    pub fn is_truncation(&self) -> bool {
        match self {
            Self::TruncatedStream { .. } | Self::TruncatedPackedRun { .. } => true,
            Self::InvalidEmbeddedMessage(inner) => inner.is_truncation(),
            _ => false,
        }
    }

    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of `"truncated"`, `"malformed"`, `"lookup"`, `"packed"`,
    /// `"compression"`, `"limit"`, or `"io"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::TruncatedStream { .. } => "truncated",
            Self::VarintOverflow { .. }
            | Self::InvalidWireType(_)
            | Self::InvalidFieldNumber(_)
            | Self::InvalidEmbeddedMessage(_) => "malformed",
            Self::FieldTypeMismatch { .. } => "lookup",
            Self::NotPackable { .. } | Self::TruncatedPackedRun { .. } => "packed",
            Self::DecompressionError(_) | Self::SizeMismatch { .. } => "compression",
            Self::AllocationFailure { .. }
            | Self::MessageTooLarge { .. }
            | Self::DepthExceeded { .. } => "limit",
            Self::Io(_) => "io",
        }
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(e) => e,
            e if e.is_truncation() => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            e @ DecodeError::AllocationFailure { .. } => io::Error::new(io::ErrorKind::OutOfMemory, e),
            e => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
