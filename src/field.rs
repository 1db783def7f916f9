//! Decoded fields and their typed views.

use std::fmt;

use bytes::Bytes;

use crate::{varint::zigzag_decode, wire::WireType};

/// Payload of a decoded field.
///
/// The variant is the wire type, so a field can never carry a value of the
/// wrong shape for its tag. Integer payloads are stored raw; callers
/// reinterpret them (signed, zig-zag, float) as their schema dictates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    /// A varint payload.
    Varint(u64),
    /// An eight-byte payload.
    Fixed64(u64),
    /// An owned byte run.
    Bytes(Bytes),
    /// A four-byte payload.
    Fixed32(u32),
}

impl FieldValue {
    /// Wire type implied by this payload.
    #[must_use]
    pub fn wire_type(&self) -> WireType {
        match self {
            Self::Varint(_) => WireType::Varint,
            Self::Fixed64(_) => WireType::Fixed64,
            Self::Bytes(_) => WireType::LengthDelimited,
            Self::Fixed32(_) => WireType::Fixed32,
        }
    }
}

/// One decoded wire-format element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    number: u32,
    value: FieldValue,
}

impl Field {
    /// Create a field from its number and payload.
    #[must_use]
    pub fn new(number: u32, value: FieldValue) -> Self { Self { number, value } }

    /// Field number from the tag.
    #[must_use]
    pub fn number(&self) -> u32 { self.number }

    /// Wire type from the tag.
    #[must_use]
    pub fn wire_type(&self) -> WireType { self.value.wire_type() }

    /// Raw payload.
    #[must_use]
    pub fn value(&self) -> &FieldValue { &self.value }

    /// Consume the field, returning its payload.
    #[must_use]
    pub fn into_value(self) -> FieldValue { self.value }

    /// Unsigned integer payload of a varint or fixed64 field.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self.value {
            FieldValue::Varint(v) | FieldValue::Fixed64(v) => Some(v),
            _ => None,
        }
    }

    /// Two's-complement view of a varint or fixed64 field (`int64`,
    /// `sfixed64`).
    #[must_use]
    #[expect(
        clippy::cast_possible_wrap,
        reason = "int64 fields are stored as two's complement"
    )]
    pub fn as_i64(&self) -> Option<i64> { self.as_u64().map(|v| v as i64) }

    /// Zig-zag view of a varint field (`sint32`, `sint64`).
    #[must_use]
    pub fn as_sint64(&self) -> Option<i64> {
        match self.value {
            FieldValue::Varint(v) => Some(zigzag_decode(v)),
            _ => None,
        }
    }

    /// Payload of a fixed32 field.
    #[must_use]
    pub fn as_u32(&self) -> Option<u32> {
        match self.value {
            FieldValue::Fixed32(v) => Some(v),
            _ => None,
        }
    }

    /// IEEE-754 view of a fixed64 field.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            FieldValue::Fixed64(v) => Some(f64::from_bits(v)),
            _ => None,
        }
    }

    /// IEEE-754 view of a fixed32 field.
    #[must_use]
    pub fn as_f32(&self) -> Option<f32> { self.as_u32().map(f32::from_bits) }

    /// Boolean view of a varint field.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            FieldValue::Varint(v) => Some(v != 0),
            _ => None,
        }
    }

    /// Bytes of a length-delimited field.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match &self.value {
            FieldValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// UTF-8 view of a length-delimited field; `None` for invalid UTF-8.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number, self.wire_type())?;
        match &self.value {
            FieldValue::Varint(v) | FieldValue::Fixed64(v) => write!(f, " {v}"),
            FieldValue::Fixed32(v) => write!(f, " {v}"),
            FieldValue::Bytes(b) => write!(f, " [{} bytes]", b.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::{Field, FieldValue};
    use crate::wire::WireType;

    #[test]
    fn wire_type_follows_value() {
        let field = Field::new(5, FieldValue::Fixed32(7));
        assert_eq!(field.wire_type(), WireType::Fixed32);
        assert_eq!(field.as_u32(), Some(7));
        assert_eq!(field.as_u64(), None);
    }

    #[test]
    fn signed_views_differ() {
        let field = Field::new(1, FieldValue::Varint(3));
        assert_eq!(field.as_sint64(), Some(-2));
        assert_eq!(field.as_i64(), Some(3));

        let negative = Field::new(1, FieldValue::Varint(u64::MAX));
        assert_eq!(negative.as_i64(), Some(-1));
    }

    #[test]
    fn floats_use_bit_patterns() {
        let double = Field::new(2, FieldValue::Fixed64(1.5f64.to_bits()));
        assert_eq!(double.as_f64(), Some(1.5));
        let single = Field::new(3, FieldValue::Fixed32(0.25f32.to_bits()));
        assert_eq!(single.as_f32(), Some(0.25));
    }

    #[test]
    fn string_view_rejects_invalid_utf8() {
        let ok = Field::new(1, FieldValue::Bytes(Bytes::from_static(b"OSMData")));
        assert_eq!(ok.as_str(), Some("OSMData"));
        let bad = Field::new(1, FieldValue::Bytes(Bytes::from_static(&[0xff, 0xfe])));
        assert_eq!(bad.as_str(), None);
        assert_eq!(bad.as_bytes().map(Bytes::len), Some(2));
    }

    #[test]
    fn display_summarises_payload() {
        let field = Field::new(9, FieldValue::Bytes(Bytes::from_static(b"abc")));
        assert_eq!(field.to_string(), "#9 LENGTH_DELIMITED [3 bytes]");
    }
}
