//! Unit tests for the ordered field store.

use bytes::Bytes;
use rstest::{fixture, rstest};

use super::*;
use crate::field::FieldValue;

fn varint(number: u32, value: u64) -> Field { Field::new(number, FieldValue::Varint(value)) }

fn text(number: u32, value: &'static str) -> Field {
    Field::new(number, FieldValue::Bytes(Bytes::from_static(value.as_bytes())))
}

fn numbers(message: &Message) -> Vec<u32> { message.iter().map(Field::number).collect() }

#[fixture]
fn repeated() -> Message { [varint(1, 10), text(2, "a"), varint(1, 20), text(2, "b")].into_iter().collect() }

#[test]
fn empty_message_has_no_fields() {
    let message = Message::new();
    assert!(message.is_empty());
    assert_eq!(message.iter().next(), None);
    assert_eq!(message.iter().next_back(), None);
    assert!(
        message
            .first_or_last(None, None, Direction::Forward)
            .expect("empty lookup is not an error")
            .is_none()
    );
}

#[rstest]
fn iterates_in_both_directions(repeated: Message) {
    assert_eq!(numbers(&repeated), vec![1, 2, 1, 2]);
    let backwards: Vec<u32> = repeated.iter().rev().map(Field::number).collect();
    assert_eq!(backwards, vec![2, 1, 2, 1]);
    assert_eq!(repeated.iter().len(), 4);
}

#[rstest]
fn get_returns_last_occurrence(repeated: Message) {
    assert_eq!(repeated.get_u64(1).expect("varint lookup"), Some(20));
    assert_eq!(repeated.get_str(2).expect("string lookup"), Some("b"));
}

#[rstest]
fn forward_scan_returns_first_occurrence(repeated: Message) {
    let field = repeated
        .first_or_last(Some(1), Some(WireType::Varint), Direction::Forward)
        .expect("lookup")
        .expect("field 1 present");
    assert_eq!(field.as_u64(), Some(10));
}

#[test]
fn mismatch_on_first_match_is_not_skipped() {
    let message: Message = [varint(3, 1), text(3, "later")].into_iter().collect();
    let err = message
        .get(3, WireType::Varint)
        .expect_err("last field 3 is length-delimited");
    assert!(matches!(
        err,
        DecodeError::FieldTypeMismatch {
            number: 3,
            expected: WireType::Varint,
            actual: WireType::LengthDelimited,
        }
    ));
}

#[rstest]
fn missing_field_is_none(repeated: Message) {
    assert!(repeated.get(9, WireType::Varint).expect("no error").is_none());
    assert!(repeated.get_any(9).is_none());
}

#[rstest]
fn wildcard_type_accepts_any(repeated: Message) {
    let field = repeated
        .first_or_last(Some(2), None, Direction::Backward)
        .expect("lookup")
        .expect("present");
    assert_eq!(field.as_str(), Some("b"));
}

#[rstest]
fn next_field_walks_repeated_occurrences(repeated: Message) {
    let mut seen = Vec::new();
    let mut from = None;
    while let Some((id, field)) = repeated
        .next_field(from, Some(1), Some(WireType::Varint), Direction::Forward)
        .expect("lookup")
    {
        seen.push(field.as_u64().expect("varint"));
        from = Some(id);
    }
    assert_eq!(seen, vec![10, 20]);
}

#[rstest]
fn fields_numbered_keeps_order(repeated: Message) {
    let values: Vec<&str> = repeated
        .fields_numbered(2)
        .filter_map(Field::as_str)
        .collect();
    assert_eq!(values, vec!["a", "b"]);
}

#[rstest]
#[case::front(Position::Front, vec![7, 8, 1, 2, 1, 2])]
#[case::back(Position::Back, vec![1, 2, 1, 2, 7, 8])]
fn splice_at_ends(repeated: Message, #[case] position: Position, #[case] expected: Vec<u32>) {
    let mut message = repeated;
    let ids = message
        .splice([varint(7, 0), varint(8, 0)], position)
        .expect("splice");
    assert_eq!(ids.len(), 2);
    assert_eq!(numbers(&message), expected);
    assert_eq!(message.len(), 6);
}

#[test]
fn splice_relative_to_field() {
    let mut message = Message::new();
    let first = message.append(varint(1, 0));
    let last = message.append(varint(4, 0));
    message
        .splice([varint(2, 0)], Position::After(first))
        .expect("splice after");
    message
        .splice([varint(3, 0)], Position::Before(last))
        .expect("splice before");
    assert_eq!(numbers(&message), vec![1, 2, 3, 4]);
    let backwards: Vec<u32> = message.iter().rev().map(Field::number).collect();
    assert_eq!(backwards, vec![4, 3, 2, 1]);
}

#[test]
fn replace_keeps_position_and_ids() {
    let mut message = Message::new();
    let head = message.append(varint(1, 0));
    let target = message.append(text(2, "packed"));
    let tail = message.append(varint(3, 0));

    message
        .replace(target, [varint(2, 5), varint(2, 6)])
        .expect("replace");

    assert_eq!(numbers(&message), vec![1, 2, 2, 3]);
    assert!(message.field(target).is_none());
    assert_eq!(message.field(head).map(Field::number), Some(1));
    assert_eq!(message.field(tail).map(Field::number), Some(3));
}

#[test]
fn stale_ids_are_rejected() {
    let mut message = Message::new();
    let id = message.append(varint(1, 0));
    assert_eq!(message.remove(id).map(|f| f.number()), Some(1));
    assert!(message.is_empty());
    assert!(message.remove(id).is_none());
    let err = message
        .splice([varint(2, 0)], Position::After(id))
        .expect_err("removed id");
    assert_eq!(err, UnknownFieldId(id));
    assert!(message.is_empty());
}

#[test]
fn removed_ids_stay_invalid_after_later_inserts() {
    let mut message: Message = [varint(1, 0), varint(2, 0)].into_iter().collect();
    let removed = message.first_id().expect("head");
    message.remove(removed);
    message.append(varint(3, 0));
    assert!(message.field(removed).is_none());
    assert_eq!(
        message.splice([varint(4, 0)], Position::Before(removed)),
        Err(UnknownFieldId(removed))
    );
    assert_eq!(numbers(&message), vec![2, 3]);
}

#[test]
fn ids_beyond_the_arena_are_rejected() {
    let other: Message = [varint(1, 0), varint(2, 0), varint(3, 0)].into_iter().collect();
    let outside = other.last_id().expect("tail");
    let mut message: Message = [varint(9, 0)].into_iter().collect();
    let err = message
        .splice([varint(4, 0)], Position::After(outside))
        .expect_err("index was never allocated here");
    assert_eq!(err, UnknownFieldId(outside));
    assert_eq!(message.len(), 1);
}

#[test]
fn removing_ends_updates_head_and_tail() {
    let mut message: Message = [varint(1, 0), varint(2, 0), varint(3, 0)].into_iter().collect();
    let first = message.first_id().expect("head");
    let last = message.last_id().expect("tail");
    message.remove(first);
    message.remove(last);
    assert_eq!(numbers(&message), vec![2]);
    assert_eq!(message.first_id(), message.last_id());
}

#[test]
fn display_lists_each_field() {
    let message: Message = [varint(1, 42), text(2, "xy")].into_iter().collect();
    assert_eq!(message.to_string(), "#1 VARINT 42\n#2 LENGTH_DELIMITED [2 bytes]\n");
}
