//! Ordered field storage for a decoded message.
//!
//! [`Message`] keeps its fields in a doubly linked list whose nodes live in an
//! arena and are addressed by [`FieldId`]. Traversal works from either end,
//! and fields can be spliced in or removed without moving any other node, so
//! ids handed out earlier stay valid until their own field is removed.
//!
//! Lookups follow the wire-format rule that the last occurrence of a
//! non-repeated field wins: [`Message::get`] scans backwards from the tail
//! and stops at the first field with the requested number.

use std::fmt;

use bytes::Bytes;
use thiserror::Error;

use crate::{error::DecodeError, field::Field, wire::WireType};

/// Stable handle to a field inside one [`Message`].
///
/// Ids are plain arena indices and carry no record of the message that
/// issued them. Passing an id to a different message is not detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FieldId(usize);

/// Traversal direction for lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// From head towards tail, in encounter order.
    Forward,
    /// From tail towards head.
    Backward,
}

/// Insertion point for [`Message::splice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// Before the first field.
    Front,
    /// After the last field.
    Back,
    /// Immediately before the given field.
    Before(FieldId),
    /// Immediately after the given field.
    After(FieldId),
}

/// A [`FieldId`] that does not refer to a live field of the message.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("field id {0:?} is not part of this message")]
pub struct UnknownFieldId(pub FieldId);

#[derive(Clone, Debug)]
struct Node {
    field: Field,
    prev: Option<usize>,
    next: Option<usize>,
}

/// An ordered, decoded wire-format message.
///
/// Removed fields leave an empty arena slot behind, and slots are never
/// reused, so a removed field's id stays invalid for the life of the
/// message. Storage therefore grows with every insertion, including the
/// fields produced by packed expansion, until the message is dropped.
#[derive(Clone, Debug, Default)]
pub struct Message {
    nodes: Vec<Option<Node>>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl Message {
    /// Create an empty message.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of live fields.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Returns true if the message has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    fn node(&self, idx: usize) -> Option<&Node> { self.nodes.get(idx).and_then(Option::as_ref) }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    fn live(&self, id: FieldId) -> Result<usize, UnknownFieldId> {
        self.node(id.0).map(|_| id.0).ok_or(UnknownFieldId(id))
    }

    /// Allocate a node and link it between `prev` and `next`.
    fn link(&mut self, field: Field, prev: Option<usize>, next: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Some(Node { field, prev, next }));
        match prev.and_then(|p| self.node_mut(p)) {
            Some(node) => node.next = Some(idx),
            None => self.head = Some(idx),
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(node) => node.prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.len += 1;
        idx
    }

    /// Append a field at the tail.
    pub fn append(&mut self, field: Field) -> FieldId { FieldId(self.link(field, self.tail, None)) }

    /// Borrow a field by id.
    #[must_use]
    pub fn field(&self, id: FieldId) -> Option<&Field> { self.node(id.0).map(|n| &n.field) }

    /// Id of the first field.
    #[must_use]
    pub fn first_id(&self) -> Option<FieldId> { self.head.map(FieldId) }

    /// Id of the last field.
    #[must_use]
    pub fn last_id(&self) -> Option<FieldId> { self.tail.map(FieldId) }

    /// Id of the neighbour of `id` in `direction`.
    #[must_use]
    pub fn neighbour(&self, id: FieldId, direction: Direction) -> Option<FieldId> {
        let node = self.node(id.0)?;
        match direction {
            Direction::Forward => node.next,
            Direction::Backward => node.prev,
        }
        .map(FieldId)
    }

    /// Iterate over fields in encounter order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            message: self,
            front: self.head,
            back: self.tail,
            remaining: self.len,
        }
    }

    /// Iterate over every field with `number`, in encounter order.
    pub fn fields_numbered(&self, number: u32) -> impl Iterator<Item = &Field> + '_ {
        self.iter().filter(move |f| f.number() == number)
    }

    /// Continue a scan from `from` (exclusive), or from the end implied by
    /// `direction` when `from` is `None`.
    ///
    /// `None` for `number` matches any field, and `None` for `wire_type`
    /// accepts any wire type. The scan stops at the first number match: if
    /// that field's wire type differs from `wire_type` the lookup fails even
    /// if a later field would have matched.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] when the first field with
    /// the requested number has a different wire type.
    pub fn next_field(
        &self,
        from: Option<FieldId>,
        number: Option<u32>,
        wire_type: Option<WireType>,
        direction: Direction,
    ) -> Result<Option<(FieldId, &Field)>, DecodeError> {
        let mut cursor = match from {
            Some(id) => self.neighbour(id, direction),
            None => match direction {
                Direction::Forward => self.first_id(),
                Direction::Backward => self.last_id(),
            },
        };
        while let Some(id) = cursor {
            let Some(field) = self.field(id) else { break };
            if number.is_none_or(|n| n == field.number()) {
                return match wire_type {
                    Some(expected) if expected != field.wire_type() => {
                        Err(DecodeError::FieldTypeMismatch {
                            number: field.number(),
                            expected,
                            actual: field.wire_type(),
                        })
                    }
                    _ => Ok(Some((id, field))),
                };
            }
            cursor = self.neighbour(id, direction);
        }
        Ok(None)
    }

    /// First matching field scanning from the head, or the last scanning
    /// from the tail.
    ///
    /// # Errors
    ///
    /// As [`Message::next_field`].
    pub fn first_or_last(
        &self,
        number: Option<u32>,
        wire_type: Option<WireType>,
        direction: Direction,
    ) -> Result<Option<&Field>, DecodeError> {
        Ok(self
            .next_field(None, number, wire_type, direction)?
            .map(|(_, f)| f))
    }

    /// Last occurrence of `number`, which must have `wire_type`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if the last field with
    /// `number` has another wire type.
    pub fn get(&self, number: u32, wire_type: WireType) -> Result<Option<&Field>, DecodeError> {
        self.first_or_last(Some(number), Some(wire_type), Direction::Backward)
    }

    /// Last occurrence of `number`, whatever its wire type.
    #[must_use]
    pub fn get_any(&self, number: u32) -> Option<&Field> {
        self.iter().rev().find(|f| f.number() == number)
    }

    /// Last varint value of `number`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if the field is not a
    /// varint.
    pub fn get_u64(&self, number: u32) -> Result<Option<u64>, DecodeError> {
        Ok(self.get(number, WireType::Varint)?.and_then(Field::as_u64))
    }

    /// Last zig-zag encoded varint of `number`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if the field is not a
    /// varint.
    pub fn get_sint64(&self, number: u32) -> Result<Option<i64>, DecodeError> {
        Ok(self.get(number, WireType::Varint)?.and_then(Field::as_sint64))
    }

    /// Last length-delimited payload of `number`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if the field is not
    /// length-delimited.
    pub fn get_bytes(&self, number: u32) -> Result<Option<&Bytes>, DecodeError> {
        Ok(self
            .get(number, WireType::LengthDelimited)?
            .and_then(Field::as_bytes))
    }

    /// Last length-delimited payload of `number` as UTF-8.
    ///
    /// Invalid UTF-8 is reported as no value.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if the field is not
    /// length-delimited.
    pub fn get_str(&self, number: u32) -> Result<Option<&str>, DecodeError> {
        Ok(self
            .get(number, WireType::LengthDelimited)?
            .and_then(Field::as_str))
    }

    /// Insert `fields` at `position`, preserving their order.
    ///
    /// Existing nodes are relinked, never moved. Returns the ids of the
    /// inserted fields.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFieldId`] if `position` refers to a removed field or
    /// an index this message never allocated; the message is left unchanged.
    pub fn splice<I>(&mut self, fields: I, position: Position) -> Result<Vec<FieldId>, UnknownFieldId>
    where
        I: IntoIterator<Item = Field>,
    {
        let (mut prev, next) = match position {
            Position::Front => (None, self.head),
            Position::Back => (self.tail, None),
            Position::Before(id) => {
                let idx = self.live(id)?;
                (self.node(idx).and_then(|n| n.prev), Some(idx))
            }
            Position::After(id) => {
                let idx = self.live(id)?;
                (Some(idx), self.node(idx).and_then(|n| n.next))
            }
        };
        let mut ids = Vec::new();
        for field in fields {
            let idx = self.link(field, prev, next);
            ids.push(FieldId(idx));
            prev = Some(idx);
        }
        Ok(ids)
    }

    /// Unlink and return the field `id`.
    pub fn remove(&mut self, id: FieldId) -> Option<Field> {
        let node = self.nodes.get_mut(id.0)?.take()?;
        match node.prev.and_then(|p| self.node_mut(p)) {
            Some(prev) => prev.next = node.next,
            None => self.head = node.next,
        }
        match node.next.and_then(|n| self.node_mut(n)) {
            Some(next) => next.prev = node.prev,
            None => self.tail = node.prev,
        }
        self.len -= 1;
        Some(node.field)
    }

    /// Replace the field `id` with `fields`, in its position.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownFieldId`] if `id` is not a live field.
    pub fn replace<I>(&mut self, id: FieldId, fields: I) -> Result<Vec<FieldId>, UnknownFieldId>
    where
        I: IntoIterator<Item = Field>,
    {
        let ids = self.splice(fields, Position::After(id))?;
        self.remove(id);
        Ok(ids)
    }
}

impl FromIterator<Field> for Message {
    fn from_iter<T: IntoIterator<Item = Field>>(iter: T) -> Self {
        let mut message = Self::new();
        for field in iter {
            message.append(field);
        }
        message
    }
}

impl<'a> IntoIterator for &'a Message {
    type Item = &'a Field;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in self {
            writeln!(f, "{field}")?;
        }
        Ok(())
    }
}

/// Double-ended iterator over the fields of a [`Message`].
#[derive(Clone, Debug)]
pub struct Iter<'a> {
    message: &'a Message,
    front: Option<usize>,
    back: Option<usize>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Field;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.message.node(self.front?)?;
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.message.node(self.back?)?;
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.field)
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests;
