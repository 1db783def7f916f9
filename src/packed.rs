//! Expansion of packed repeated fields.
//!
//! A packed field stores many primitive values of one field number in a
//! single length-delimited payload. Expansion rewrites each such payload into
//! individually tagged fields, placed exactly where the packed field was, so
//! encounter order is preserved.

use tracing::debug;

use crate::{
    error::DecodeError,
    field::Field,
    message::{Direction, FieldId, Message},
    wire::{WireType, read_value},
};

/// Split a packed payload into fields of `wire_type`.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedPackedRun`] if the payload ends inside an
/// element, and [`DecodeError::VarintOverflow`] for an overlong varint.
pub fn unpack(number: u32, payload: &[u8], wire_type: WireType) -> Result<Vec<Field>, DecodeError> {
    if !wire_type.is_primitive() {
        return Err(DecodeError::NotPackable { number, wire_type });
    }
    let mut reader = payload;
    let mut fields = Vec::new();
    while !reader.is_empty() {
        let trailing = reader.len();
        match read_value(&mut reader, wire_type, 0) {
            Ok((value, _)) => fields.push(Field::new(number, value)),
            Err(DecodeError::TruncatedStream { .. }) => {
                return Err(DecodeError::TruncatedPackedRun {
                    number,
                    wire_type,
                    trailing,
                });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(fields)
}

impl Message {
    /// Expand every packed occurrence of field `number` into individual
    /// fields of `wire_type`, each in the position of its packed original.
    ///
    /// Every occurrence must be length-delimited. The message is only
    /// modified once every occurrence has been decoded, so a failure leaves
    /// it untouched.
    ///
    /// Returns the number of fields produced.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::NotPackable`] if `wire_type` is
    /// length-delimited or an occurrence is not, and
    /// [`DecodeError::TruncatedPackedRun`] if a payload does not divide into
    /// whole elements.
    pub fn expand_packed(&mut self, number: u32, wire_type: WireType) -> Result<usize, DecodeError> {
        if !wire_type.is_primitive() {
            return Err(DecodeError::NotPackable { number, wire_type });
        }

        let mut expansions: Vec<(FieldId, Vec<Field>)> = Vec::new();
        let mut from = None;
        while let Some((id, field)) = self.next_field(from, Some(number), None, Direction::Forward)? {
            from = Some(id);
            let payload = field.as_bytes().ok_or(DecodeError::NotPackable {
                number,
                wire_type: field.wire_type(),
            })?;
            expansions.push((id, unpack(number, payload, wire_type)?));
        }

        let mut produced = 0;
        for (id, fields) in expansions {
            // Ids come from the scan above, so every replacement succeeds.
            if let Ok(ids) = self.replace(id, fields) {
                produced += ids.len();
            }
        }
        debug!(field_number = number, %wire_type, produced, "expanded packed field");
        Ok(produced)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use pbfwire_testing::MessageBuilder;
    use rstest::rstest;

    use super::*;
    use crate::{decoder::Decoder, field::FieldValue};

    fn decode(bytes: &[u8]) -> Message { Decoder::default().decode_message(bytes).expect("valid message") }

    #[test]
    fn expands_varints_in_order() {
        let mut message = decode(&MessageBuilder::new().packed_varints(4, &[1, 300, 65535]).build());
        assert_eq!(message.expand_packed(4, WireType::Varint).expect("expand"), 3);

        let values: Vec<u64> = message.iter().filter_map(Field::as_u64).collect();
        assert_eq!(values, vec![1, 300, 65535]);
        assert!(
            message
                .iter()
                .all(|f| f.number() == 4 && f.wire_type() == WireType::Varint)
        );
    }

    #[test]
    fn expansion_replaces_in_place() {
        let mut message = decode(
            &MessageBuilder::new()
                .varint(1, 0)
                .packed_fixed32(2, &[10, 20])
                .varint(3, 0)
                .build(),
        );
        message.expand_packed(2, WireType::Fixed32).expect("expand");

        let layout: Vec<(u32, WireType)> = message.iter().map(|f| (f.number(), f.wire_type())).collect();
        assert_eq!(
            layout,
            vec![
                (1, WireType::Varint),
                (2, WireType::Fixed32),
                (2, WireType::Fixed32),
                (3, WireType::Varint),
            ]
        );
    }

    #[test]
    fn every_packed_occurrence_is_expanded() {
        let mut message = decode(
            &MessageBuilder::new()
                .packed_sint64(5, &[-1, 2])
                .varint(6, 0)
                .packed_sint64(5, &[-3])
                .build(),
        );
        assert_eq!(message.expand_packed(5, WireType::Varint).expect("expand"), 3);
        let values: Vec<i64> = message
            .fields_numbered(5)
            .filter_map(Field::as_sint64)
            .collect();
        assert_eq!(values, vec![-1, 2, -3]);
        assert_eq!(message.iter().map(Field::number).collect::<Vec<_>>(), vec![5, 5, 6, 5]);
    }

    #[test]
    fn unpacked_occurrence_is_not_packable() {
        let mut message = decode(
            &MessageBuilder::new()
                .packed_varints(4, &[1, 2])
                .varint(4, 7)
                .build(),
        );
        let err = message
            .expand_packed(4, WireType::Varint)
            .expect_err("a varint occurrence is not a packed run");
        assert!(matches!(err, DecodeError::NotPackable { number: 4, wire_type: WireType::Varint }));
        assert_eq!(message.len(), 2, "failed expansion leaves the message untouched");
    }

    #[test]
    fn empty_payload_expands_to_nothing() {
        let mut message = decode(&MessageBuilder::new().bytes(1, &[]).varint(2, 1).build());
        assert_eq!(message.expand_packed(1, WireType::Fixed64).expect("expand"), 0);
        assert_eq!(message.len(), 1);
    }

    #[rstest]
    #[case::fixed32(WireType::Fixed32, &[1, 0, 0, 0, 2, 0][..], 2)]
    #[case::fixed64(WireType::Fixed64, &[1, 2, 3][..], 3)]
    #[case::varint(WireType::Varint, &[0x01, 0x80][..], 1)]
    fn partial_trailing_element_is_rejected(
        #[case] wire_type: WireType,
        #[case] payload: &[u8],
        #[case] trailing_bytes: usize,
    ) {
        let mut message: Message = [Field::new(9, FieldValue::Bytes(Bytes::copy_from_slice(payload)))]
            .into_iter()
            .collect();
        let err = message
            .expand_packed(9, wire_type)
            .expect_err("payload has a partial element");
        assert!(matches!(
            err,
            DecodeError::TruncatedPackedRun { number: 9, trailing, .. } if trailing == trailing_bytes
        ));
        assert_eq!(message.len(), 1, "failed expansion leaves the message untouched");
        assert_eq!(message.iter().next().map(Field::wire_type), Some(WireType::LengthDelimited));
    }

    #[test]
    fn length_delimited_elements_are_not_packable() {
        let mut message = decode(&MessageBuilder::new().bytes(1, &[1]).build());
        let err = message
            .expand_packed(1, WireType::LengthDelimited)
            .expect_err("elements must be primitive");
        assert!(matches!(err, DecodeError::NotPackable { number: 1, wire_type: WireType::LengthDelimited }));
    }

    #[test]
    fn mismatched_scalar_occurrence_is_not_packable() {
        let mut message = decode(&MessageBuilder::new().fixed64(1, 1).build());
        let err = message
            .expand_packed(1, WireType::Varint)
            .expect_err("fixed64 is neither packed nor a varint");
        assert!(matches!(err, DecodeError::NotPackable { number: 1, wire_type: WireType::Fixed64 }));
    }
}
