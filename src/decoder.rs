//! Message decoding from streams and buffers.
//!
//! A [`Decoder`] turns a byte budget into a [`Message`] one field at a time.
//! It also reinterprets length-delimited fields as embedded messages. Every
//! embedded decode runs on a child decoder one level deeper, and the depth is
//! checked against [`DecodeLimits::max_depth`] before any bytes are touched,
//! so adversarial nesting cannot exhaust the stack.

use std::io::Read;

use tracing::{debug, trace};

use crate::{
    config::DecodeLimits,
    error::DecodeError,
    field::Field,
    message::Message,
    wire::{WireType, read_tag, read_value},
};

/// Decodes messages under a set of [`DecodeLimits`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Decoder {
    limits: DecodeLimits,
    depth: usize,
}

impl Decoder {
    /// Create a top-level decoder.
    #[must_use]
    pub fn new(limits: DecodeLimits) -> Self { Self { limits, depth: 0 } }

    /// Limits applied by this decoder.
    #[must_use]
    pub fn limits(&self) -> &DecodeLimits { &self.limits }

    /// Nesting depth of this decoder; zero for the outermost message.
    #[must_use]
    pub fn depth(&self) -> usize { self.depth }

    /// Decoder for a message embedded one level below this one.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DepthExceeded`] if the child would be deeper
    /// than [`DecodeLimits::max_depth`].
    pub fn nested(&self) -> Result<Self, DecodeError> {
        let depth = self.depth + 1;
        if depth > self.limits.max_depth {
            return Err(DecodeError::DepthExceeded {
                max: self.limits.max_depth,
            });
        }
        Ok(Self {
            limits: self.limits,
            depth,
        })
    }

    /// Read one field.
    ///
    /// `max_len` bounds any length-delimited payload. Returns `Ok(None)` on a
    /// clean end of input before the tag.
    ///
    /// # Errors
    ///
    /// Propagates tag and value errors; see [`read_tag`] and [`read_value`].
    pub fn read_field<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        max_len: usize,
    ) -> Result<Option<(Field, usize)>, DecodeError> {
        let Some((tag, tag_len)) = read_tag(reader)? else {
            return Ok(None);
        };
        let (value, value_len) = read_value(reader, tag.wire_type, max_len)?;
        trace!(
            field_number = tag.number,
            wire_type = %tag.wire_type,
            len = tag_len + value_len,
            "read field"
        );
        Ok(Some((Field::new(tag.number, value), tag_len + value_len)))
    }

    /// Read a message of exactly `len` bytes from `reader`.
    ///
    /// Returns `Ok(None)` if the stream was already exhausted, before any
    /// byte of the message was read. A stream that ends after some bytes
    /// were read is a truncation error. Nothing is read past `len` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::MessageTooLarge`] if `len` exceeds
    /// [`DecodeLimits::max_message_len`], [`DecodeError::TruncatedStream`] if
    /// input ends early or a field runs past `len`, and any tag or value
    /// error. No partially decoded message is returned.
    pub fn read_message<R: Read + ?Sized>(
        &self,
        reader: &mut R,
        len: usize,
    ) -> Result<Option<Message>, DecodeError> {
        if len > self.limits.max_message_len {
            return Err(DecodeError::MessageTooLarge {
                size: len as u64,
                max: self.limits.max_message_len,
            });
        }
        let mut limited = reader.take(len as u64);
        let mut message = Message::new();
        let mut consumed = 0;
        while consumed < len {
            let remaining = len - consumed;
            let field = self
                .read_field(&mut limited, remaining)
                .map_err(|err| match err {
                    DecodeError::MessageTooLarge { size, .. } => DecodeError::TruncatedStream {
                        expected: usize::try_from(size).unwrap_or(usize::MAX),
                        actual: remaining,
                    },
                    other => other,
                })?;
            match field {
                Some((field, field_len)) => {
                    message.append(field);
                    consumed += field_len;
                }
                None if consumed == 0 => return Ok(None),
                None => {
                    return Err(DecodeError::TruncatedStream {
                        expected: len,
                        actual: consumed,
                    });
                }
            }
        }
        debug!(len, fields = message.len(), depth = self.depth, "decoded message");
        Ok(Some(message))
    }

    /// Decode `bytes` as one complete message.
    ///
    /// # Errors
    ///
    /// As [`Decoder::read_message`].
    pub fn decode_message(&self, bytes: &[u8]) -> Result<Message, DecodeError> {
        let mut reader = bytes;
        Ok(self
            .read_message(&mut reader, bytes.len())?
            .unwrap_or_default())
    }

    /// Decode the payload of a length-delimited field as an embedded
    /// message.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if `field` is not
    /// length-delimited, [`DecodeError::DepthExceeded`] if nesting is too
    /// deep, and [`DecodeError::InvalidEmbeddedMessage`] wrapping any decode
    /// failure of the payload.
    pub fn decode_embedded(&self, field: &Field) -> Result<Message, DecodeError> {
        let bytes = field
            .as_bytes()
            .ok_or_else(|| DecodeError::FieldTypeMismatch {
                number: field.number(),
                expected: WireType::LengthDelimited,
                actual: field.wire_type(),
            })?;
        self.decode_nested(bytes)
    }

    /// Decode `bytes` as a message embedded one level below this decoder.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DepthExceeded`] if nesting is too deep, and
    /// [`DecodeError::InvalidEmbeddedMessage`] wrapping any decode failure.
    pub fn decode_nested(&self, bytes: &[u8]) -> Result<Message, DecodeError> {
        let child = self.nested()?;
        child.decode_message(bytes).map_err(DecodeError::embedded)
    }

    /// Decode the last occurrence of field `number` in `message` as an
    /// embedded message.
    ///
    /// # Errors
    ///
    /// As [`Message::get`] and [`Decoder::decode_embedded`].
    pub fn embedded(&self, message: &Message, number: u32) -> Result<Option<Message>, DecodeError> {
        message
            .get(number, WireType::LengthDelimited)?
            .map(|field| self.decode_embedded(field))
            .transpose()
    }

    /// Follow a chain of embedded-message field numbers from `message`.
    ///
    /// Each step takes the last occurrence of the field number in the
    /// current message. Returns `Ok(None)` if any step is missing. The walk
    /// is a loop, so its stack use does not grow with `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::DepthExceeded`] once the walk goes deeper than
    /// [`DecodeLimits::max_depth`], and the errors of
    /// [`Decoder::decode_embedded`] for each step.
    pub fn resolve_path(&self, message: &Message, path: &[u32]) -> Result<Option<Message>, DecodeError> {
        let mut decoder = *self;
        let mut current: Option<Message> = None;
        for &number in path {
            let child = {
                let parent = current.as_ref().unwrap_or(message);
                match parent.get(number, WireType::LengthDelimited)? {
                    Some(field) => decoder.decode_embedded(field)?,
                    None => return Ok(None),
                }
            };
            decoder = decoder.nested()?;
            current = Some(child);
        }
        Ok(Some(current.unwrap_or_else(|| message.clone())))
    }
}
