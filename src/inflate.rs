//! Zlib-compressed payloads.
//!
//! Inflation is bounded twice: by the size the blob declares and by
//! [`DecodeLimits::max_inflated_len`]. The inflater never produces more than
//! one byte past the declared size, which is enough to detect a mismatch
//! without trusting the compressed stream.

use std::io::Read;

use bytes::Bytes;
use flate2::read::ZlibDecoder;
use tracing::{debug, warn};

use crate::{
    config::DecodeLimits,
    decoder::Decoder,
    error::DecodeError,
    message::Message,
    metrics,
};

/// Inflate `compressed` into exactly `declared` bytes.
///
/// # Errors
///
/// Returns [`DecodeError::MessageTooLarge`] if `declared` exceeds
/// [`DecodeLimits::max_inflated_len`], [`DecodeError::AllocationFailure`] if
/// the output buffer cannot be reserved, [`DecodeError::DecompressionError`]
/// if the zlib stream is corrupt, and [`DecodeError::SizeMismatch`] if the
/// stream inflates to any other length.
pub fn inflate(compressed: &[u8], declared: usize, limits: &DecodeLimits) -> Result<Bytes, DecodeError> {
    if declared > limits.max_inflated_len {
        return Err(DecodeError::MessageTooLarge {
            size: declared as u64,
            max: limits.max_inflated_len,
        });
    }
    let mut buf = Vec::new();
    buf.try_reserve_exact(declared)
        .map_err(|_| DecodeError::AllocationFailure {
            requested: declared,
        })?;

    let mut inflater = ZlibDecoder::new(compressed).take(declared as u64 + 1);
    inflater
        .read_to_end(&mut buf)
        .map_err(DecodeError::DecompressionError)?;

    if buf.len() != declared {
        warn!(declared, actual = buf.len(), "inflated size mismatch");
        return Err(DecodeError::SizeMismatch {
            declared,
            actual: buf.len(),
        });
    }
    metrics::add_inflated_bytes(buf.len());
    debug!(compressed = compressed.len(), inflated = buf.len(), "inflated payload");
    Ok(Bytes::from(buf))
}

impl Decoder {
    /// Inflate `compressed` and decode the result as an embedded message.
    ///
    /// Nothing is decoded unless the inflated size equals `declared`.
    ///
    /// # Errors
    ///
    /// As [`inflate`] and [`Decoder::decode_nested`].
    pub fn decode_compressed(&self, compressed: &[u8], declared: usize) -> Result<Message, DecodeError> {
        let payload = inflate(compressed, declared, self.limits())?;
        self.decode_nested(&payload)
    }
}
