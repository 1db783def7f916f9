//! Tags and primitive values of the wire format.
//!
//! A field starts with a varint tag whose low three bits name the wire type
//! and whose remaining bits hold the field number. The wire type alone
//! determines how many payload bytes follow.

use std::{fmt, io::Read};

use bytes::Bytes;
use tracing::trace;

use crate::{
    error::DecodeError,
    field::FieldValue,
    varint::{VarintRead, read_required_varint, read_varint},
};

/// Largest field number a tag may carry (`2^29 - 1`).
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Encoding of a field's payload.
///
/// The deprecated group types (codes 3 and 4) are recognised only to be
/// rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireType {
    /// Base-128 varint.
    Varint,
    /// Eight little-endian bytes.
    Fixed64,
    /// Varint byte count followed by that many bytes.
    LengthDelimited,
    /// Four little-endian bytes.
    Fixed32,
}

impl WireType {
    /// Numeric code used in tags.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Varint => 0,
            Self::Fixed64 => 1,
            Self::LengthDelimited => 2,
            Self::Fixed32 => 5,
        }
    }

    /// Parse a tag's wire-type code.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidWireType`] for the group codes 3 and 4
    /// and for the unassigned codes 6 and 7.
    pub fn from_code(code: u8) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(Self::Varint),
            1 => Ok(Self::Fixed64),
            2 => Ok(Self::LengthDelimited),
            5 => Ok(Self::Fixed32),
            other => Err(DecodeError::InvalidWireType(other)),
        }
    }

    /// Returns true for types that may appear inside a packed run.
    #[must_use]
    pub const fn is_primitive(self) -> bool { !matches!(self, Self::LengthDelimited) }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Varint => "VARINT",
            Self::Fixed64 => "FIXED64",
            Self::LengthDelimited => "LENGTH_DELIMITED",
            Self::Fixed32 => "FIXED32",
        })
    }
}

/// A decoded field tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    /// Field number.
    pub number: u32,
    /// Wire type of the payload that follows.
    pub wire_type: WireType,
}

impl Tag {
    /// Split a raw tag value into field number and wire type.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbfwire::wire::{Tag, WireType};
    ///
    /// let tag = Tag::from_raw(0x1a).unwrap();
    /// assert_eq!(tag.number, 3);
    /// assert_eq!(tag.wire_type, WireType::LengthDelimited);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::InvalidWireType`] or
    /// [`DecodeError::InvalidFieldNumber`].
    pub fn from_raw(raw: u64) -> Result<Self, DecodeError> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "masked to three bits"
        )]
        let wire_type = WireType::from_code((raw & 0x07) as u8)?;
        let number = raw >> 3;
        let number = u32::try_from(number)
            .ok()
            .filter(|n| *n <= MAX_FIELD_NUMBER)
            .ok_or(DecodeError::InvalidFieldNumber(number))?;
        Ok(Self { number, wire_type })
    }
}

/// Read a field tag.
///
/// Returns `Ok(None)` when the stream is already exhausted, which marks a
/// clean end of input; otherwise the tag and the number of bytes it used.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedStream`] if input ends mid-tag, and the
/// errors of [`Tag::from_raw`] for illegal tags.
pub fn read_tag<R: Read + ?Sized>(reader: &mut R) -> Result<Option<(Tag, usize)>, DecodeError> {
    match read_varint(reader)? {
        VarintRead::Eof => Ok(None),
        VarintRead::Value(raw, len) => Ok(Some((Tag::from_raw(raw)?, len))),
    }
}

/// Read exactly `buf.len()` bytes, reporting how far a short read got.
pub(crate) fn read_exact_counted<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), DecodeError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(DecodeError::TruncatedStream {
                    expected: buf.len(),
                    actual: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
    Ok(())
}

/// Allocate a zeroed buffer of `len` bytes without aborting on failure.
pub(crate) fn try_alloc(len: usize) -> Result<Vec<u8>, DecodeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| DecodeError::AllocationFailure { requested: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Read the payload of a field whose tag has already been consumed.
///
/// `max_len` bounds the byte count a length-delimited value may declare
/// before any buffer is allocated.
///
/// Returns the value and the number of bytes consumed, including the length
/// prefix of a length-delimited value.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedStream`] if fewer bytes than required are
/// available, [`DecodeError::MessageTooLarge`] if a declared length exceeds
/// `max_len`, and [`DecodeError::AllocationFailure`] if the value buffer
/// cannot be allocated.
pub fn read_value<R: Read + ?Sized>(
    reader: &mut R,
    wire_type: WireType,
    max_len: usize,
) -> Result<(FieldValue, usize), DecodeError> {
    match wire_type {
        WireType::Varint => {
            let (value, len) = read_required_varint(reader)?;
            Ok((FieldValue::Varint(value), len))
        }
        WireType::Fixed64 => {
            let mut buf = [0u8; 8];
            read_exact_counted(reader, &mut buf)?;
            Ok((FieldValue::Fixed64(u64::from_le_bytes(buf)), buf.len()))
        }
        WireType::Fixed32 => {
            let mut buf = [0u8; 4];
            read_exact_counted(reader, &mut buf)?;
            Ok((FieldValue::Fixed32(u32::from_le_bytes(buf)), buf.len()))
        }
        WireType::LengthDelimited => {
            let (declared, prefix_len) = read_required_varint(reader)?;
            let len = usize::try_from(declared)
                .ok()
                .filter(|len| *len <= max_len)
                .ok_or(DecodeError::MessageTooLarge {
                    size: declared,
                    max: max_len,
                })?;
            let mut buf = try_alloc(len)?;
            read_exact_counted(reader, &mut buf)?;
            trace!(len, "read length-delimited value");
            Ok((FieldValue::Bytes(Bytes::from(buf)), prefix_len + len))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::varint(0x08, 1, WireType::Varint)]
    #[case::fixed64(0x11, 2, WireType::Fixed64)]
    #[case::bytes(0x1a, 3, WireType::LengthDelimited)]
    #[case::fixed32(0x25, 4, WireType::Fixed32)]
    #[case::zero_number(0x00, 0, WireType::Varint)]
    fn splits_raw_tags(#[case] raw: u64, #[case] number: u32, #[case] wire_type: WireType) {
        assert_eq!(
            Tag::from_raw(raw).expect("tag should be legal"),
            Tag { number, wire_type }
        );
    }

    #[rstest]
    #[case::group_start(0x0b, 3)]
    #[case::group_end(0x0c, 4)]
    #[case::unassigned_six(0x0e, 6)]
    #[case::unassigned_seven(0x0f, 7)]
    fn rejects_illegal_wire_types(#[case] raw: u64, #[case] code: u8) {
        let err = Tag::from_raw(raw).expect_err("wire type must be rejected");
        assert!(matches!(err, DecodeError::InvalidWireType(c) if c == code));
    }

    #[test]
    fn rejects_oversized_field_numbers() {
        let raw = (u64::from(MAX_FIELD_NUMBER) + 1) << 3;
        let err = Tag::from_raw(raw).expect_err("field number must be rejected");
        assert!(matches!(err, DecodeError::InvalidFieldNumber(_)));
    }

    #[test]
    fn read_tag_reports_clean_eof() {
        let mut reader: &[u8] = &[];
        assert!(read_tag(&mut reader).expect("eof is not an error").is_none());
    }

    #[test]
    fn reads_fixed_width_values_little_endian() {
        let mut reader: &[u8] = &[1, 0, 0, 0, 0, 0, 0, 0x80, 0x78, 0x56, 0x34, 0x12];
        let (value, len) = read_value(&mut reader, WireType::Fixed64, 64).expect("fixed64");
        assert_eq!((value, len), (FieldValue::Fixed64(0x8000_0000_0000_0001), 8));
        let (value, len) = read_value(&mut reader, WireType::Fixed32, 64).expect("fixed32");
        assert_eq!((value, len), (FieldValue::Fixed32(0x1234_5678), 4));
    }

    #[test]
    fn length_delimited_counts_prefix() {
        let mut reader: &[u8] = &[3, b'a', b'b', b'c', 0xff];
        let (value, len) =
            read_value(&mut reader, WireType::LengthDelimited, 64).expect("bytes");
        assert_eq!(value, FieldValue::Bytes(Bytes::from_static(b"abc")));
        assert_eq!(len, 4);
        assert_eq!(reader, &[0xff]);
    }

    #[rstest]
    #[case::fixed64(WireType::Fixed64, &[1, 2, 3][..])]
    #[case::fixed32(WireType::Fixed32, &[1][..])]
    #[case::bytes(WireType::LengthDelimited, &[5, 1, 2][..])]
    #[case::varint(WireType::Varint, &[0x80][..])]
    fn short_payloads_are_truncation_errors(#[case] wire_type: WireType, #[case] bytes: &[u8]) {
        let mut reader = bytes;
        let err = read_value(&mut reader, wire_type, 64).expect_err("payload is short");
        assert!(matches!(err, DecodeError::TruncatedStream { .. }), "got {err:?}");
    }

    #[test]
    fn declared_length_is_bounded_before_allocation() {
        let mut reader: &[u8] = &[0xff, 0xff, 0xff, 0xff, 0x0f];
        let err = read_value(&mut reader, WireType::LengthDelimited, 1024)
            .expect_err("declared length exceeds limit");
        assert!(matches!(err, DecodeError::MessageTooLarge { max: 1024, .. }));
    }
}
