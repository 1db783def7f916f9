//! Write-direction helpers for varints, tags and whole messages.

/// Wire type code of a varint field.
pub const VARINT: u8 = 0;
/// Wire type code of a fixed64 field.
pub const FIXED64: u8 = 1;
/// Wire type code of a length-delimited field.
pub const LENGTH_DELIMITED: u8 = 2;
/// Wire type code of a fixed32 field.
pub const FIXED32: u8 = 5;

/// Append the varint encoding of `value` to `out`.
pub fn encode_varint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Varint encoding of `value`.
#[must_use]
pub fn varint(value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    encode_varint(value, &mut out);
    out
}

/// Tag bytes for `number` with the raw wire type `code`.
///
/// Any code may be written, including the rejected group codes.
#[must_use]
pub fn tag(number: u32, code: u8) -> Vec<u8> { varint((u64::from(number) << 3) | u64::from(code)) }

/// Zig-zag mapping of a signed value.
#[must_use]
pub fn zigzag(value: i64) -> u64 { ((value << 1) ^ (value >> 63)) as u64 }

/// Accumulates the fields of one message in order.
#[derive(Clone, Debug, Default)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Start an empty message.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn tagged(mut self, number: u32, code: u8, payload: &[u8]) -> Self {
        self.buf.extend(tag(number, code));
        self.buf.extend_from_slice(payload);
        self
    }

    /// Add a varint field.
    #[must_use]
    pub fn varint(self, number: u32, value: u64) -> Self { self.tagged(number, VARINT, &varint(value)) }

    /// Add a zig-zag encoded varint field.
    #[must_use]
    pub fn sint64(self, number: u32, value: i64) -> Self { self.varint(number, zigzag(value)) }

    /// Add a fixed64 field.
    #[must_use]
    pub fn fixed64(self, number: u32, value: u64) -> Self {
        self.tagged(number, FIXED64, &value.to_le_bytes())
    }

    /// Add a fixed32 field.
    #[must_use]
    pub fn fixed32(self, number: u32, value: u32) -> Self {
        self.tagged(number, FIXED32, &value.to_le_bytes())
    }

    /// Add a length-delimited field.
    #[must_use]
    pub fn bytes(self, number: u32, payload: &[u8]) -> Self {
        let mut body = varint(payload.len() as u64);
        body.extend_from_slice(payload);
        self.tagged(number, LENGTH_DELIMITED, &body)
    }

    /// Add a UTF-8 string field.
    #[must_use]
    pub fn string(self, number: u32, value: &str) -> Self { self.bytes(number, value.as_bytes()) }

    /// Add an embedded message field.
    #[must_use]
    pub fn message(self, number: u32, inner: &MessageBuilder) -> Self { self.bytes(number, &inner.buf) }

    /// Add a packed run of varints.
    #[must_use]
    pub fn packed_varints(self, number: u32, values: &[u64]) -> Self {
        let mut run = Vec::new();
        for value in values {
            encode_varint(*value, &mut run);
        }
        self.bytes(number, &run)
    }

    /// Add a packed run of zig-zag encoded varints.
    #[must_use]
    pub fn packed_sint64(self, number: u32, values: &[i64]) -> Self {
        let encoded: Vec<u64> = values.iter().copied().map(zigzag).collect();
        self.packed_varints(number, &encoded)
    }

    /// Add a packed run of fixed32 values.
    #[must_use]
    pub fn packed_fixed32(self, number: u32, values: &[u32]) -> Self {
        let run: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.bytes(number, &run)
    }

    /// Append raw bytes verbatim, for malformed input.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Encoded length so far.
    #[must_use]
    pub fn len(&self) -> usize { self.buf.len() }

    /// Returns true if no field has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.buf.is_empty() }

    /// Finish the message.
    #[must_use]
    pub fn build(self) -> Vec<u8> { self.buf }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, &[0x00])]
    #[case(150, &[0x96, 0x01])]
    #[case(u64::MAX, &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01])]
    fn varint_matches_reference_bytes(#[case] value: u64, #[case] expected: &[u8]) {
        assert_eq!(varint(value), expected);
    }

    #[test]
    fn builder_writes_tag_then_payload() {
        let bytes = MessageBuilder::new().varint(1, 150).string(2, "hi").build();
        assert_eq!(bytes, vec![0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i']);
    }
}
