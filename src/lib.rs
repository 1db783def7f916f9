#![doc(html_root_url = "https://docs.rs/pbfwire/latest")]
//! Public API for the `pbfwire` library.
//!
//! This crate decodes the protocol buffer wire format into ordered,
//! queryable [`Message`] values without a compiled schema, and reads the
//! framed block streams of OpenStreetMap PBF files on top of it.
//!
//! ```
//! use pbfwire::{Decoder, WireType};
//!
//! let message = Decoder::default().decode_message(&[0x08, 0x96, 0x01])?;
//! assert_eq!(message.get(1, WireType::Varint)?.and_then(|f| f.as_u64()), Some(150));
//! # Ok::<(), pbfwire::DecodeError>(())
//! ```

pub mod byte_order;
pub mod config;
pub mod decoder;
pub mod error;
pub mod field;
pub mod frame;
pub mod inflate;
pub mod message;
pub mod metrics;
pub mod osm;
mod packed;
pub mod varint;
pub mod wire;

pub use config::{DecodeLimits, FrameConfig};
pub use decoder::Decoder;
pub use error::DecodeError;
pub use field::{Field, FieldValue};
pub use frame::{Block, BlockKind, FrameError, FramedReader};
pub use inflate::inflate;
pub use message::{Direction, FieldId, Message, Position, UnknownFieldId};
pub use metrics::{BLOBS_DECODED, DECODE_ERRORS, INFLATED_BYTES};
pub use packed::unpack;
pub use varint::{zigzag_decode, zigzag_encode};
pub use wire::{MAX_FIELD_NUMBER, Tag, WireType};
