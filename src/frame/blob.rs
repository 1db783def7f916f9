//! `BlobHeader` and `Blob` messages and the blocks built from them.

use std::fmt;

use bytes::Bytes;

use super::error::FrameError;
use crate::{decoder::Decoder, error::DecodeError, message::Message};

const HEADER_TYPE: u32 = 1;
const HEADER_INDEX_DATA: u32 = 2;
const HEADER_DATA_SIZE: u32 = 3;

const BLOB_RAW: u32 = 1;
const BLOB_RAW_SIZE: u32 = 2;
const BLOB_ZLIB_DATA: u32 = 3;

/// Compressed payload fields this reader recognises but cannot inflate.
const UNSUPPORTED_CODECS: [(u32, &str); 3] = [(4, "lzma"), (6, "lz4"), (7, "zstd")];

/// Payload kind named by a blob header's type string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// File metadata, `"OSMHeader"`.
    Header,
    /// Map content, `"OSMData"`.
    Data,
    /// Any other type string.
    Unknown(String),
}

impl BlockKind {
    /// Classify a header type string.
    #[must_use]
    pub fn from_type(blob_type: &str) -> Self {
        match blob_type {
            "OSMHeader" => Self::Header,
            "OSMData" => Self::Data,
            other => Self::Unknown(other.to_owned()),
        }
    }

    /// The type string as it appears on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Header => "OSMHeader",
            Self::Data => "OSMData",
            Self::Unknown(other) => other,
        }
    }

    /// Returns true for type strings this reader does not recognise.
    #[must_use]
    pub fn is_unknown(&self) -> bool { matches!(self, Self::Unknown(_)) }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Decoded `BlobHeader` message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlobHeader {
    /// Payload kind.
    pub kind: BlockKind,
    /// Optional index data carried alongside the blob.
    pub index_data: Option<Bytes>,
    /// Length in bytes of the following `Blob` message.
    pub data_size: u64,
}

impl BlobHeader {
    /// Interpret a decoded `BlobHeader` message.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MissingHeaderField`] if `type` or `datasize` is
    /// absent, and a lookup error if either has the wrong wire type.
    pub fn from_message(message: &Message) -> Result<Self, FrameError> {
        let kind = message
            .get_str(HEADER_TYPE)?
            .map(BlockKind::from_type)
            .ok_or(FrameError::MissingHeaderField { field: "type" })?;
        let index_data = message.get_bytes(HEADER_INDEX_DATA)?.cloned();
        let data_size = message
            .get_u64(HEADER_DATA_SIZE)?
            .ok_or(FrameError::MissingHeaderField { field: "datasize" })?;
        Ok(Self {
            kind,
            index_data,
            data_size,
        })
    }
}

/// Payload carried by a blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BlobData {
    /// Uncompressed payload.
    Raw(Bytes),
    /// Zlib-compressed payload and its declared inflated size.
    Zlib {
        /// Compressed bytes.
        data: Bytes,
        /// Declared size after inflation.
        raw_size: usize,
    },
}

/// Decoded `Blob` message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    /// The single payload the blob carries.
    pub data: BlobData,
}

impl Blob {
    /// Interpret a decoded `Blob` message.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnsupportedCompression`] for lzma, lz4 or zstd
    /// payloads, and [`FrameError::InvalidBlob`] unless exactly one of `raw`
    /// and `zlib_data` is present, with `raw_size` accompanying the latter.
    pub fn from_message(message: &Message) -> Result<Self, FrameError> {
        if let Some(&(_, codec)) = UNSUPPORTED_CODECS
            .iter()
            .find(|(number, _)| message.get_any(*number).is_some())
        {
            return Err(FrameError::UnsupportedCompression { codec });
        }

        let raw = message.get_bytes(BLOB_RAW)?;
        let zlib = message.get_bytes(BLOB_ZLIB_DATA)?;
        let data = match (raw, zlib) {
            (Some(raw), None) => BlobData::Raw(raw.clone()),
            (None, Some(zlib)) => {
                let raw_size = message
                    .get_u64(BLOB_RAW_SIZE)?
                    .ok_or(FrameError::InvalidBlob {
                        reason: "zlib_data without raw_size",
                    })?;
                BlobData::Zlib {
                    data: zlib.clone(),
                    raw_size: usize::try_from(raw_size).unwrap_or(usize::MAX),
                }
            }
            (Some(_), Some(_)) => {
                return Err(FrameError::InvalidBlob {
                    reason: "more than one data field",
                });
            }
            (None, None) => {
                return Err(FrameError::InvalidBlob {
                    reason: "no data field",
                });
            }
        };
        Ok(Self { data })
    }

    /// Decode the payload as a message one level below `decoder`.
    ///
    /// # Errors
    ///
    /// As [`Decoder::decode_nested`] for raw payloads and
    /// [`Decoder::decode_compressed`] for zlib payloads.
    pub fn decode(&self, decoder: &Decoder) -> Result<Message, DecodeError> {
        match &self.data {
            BlobData::Raw(raw) => decoder.decode_nested(raw),
            BlobData::Zlib { data, raw_size } => decoder.decode_compressed(data, *raw_size),
        }
    }
}

/// Payload of a [`Block`].
#[derive(Clone, Debug)]
pub enum BlockData {
    /// The blob payload decoded as a message.
    Message(Message),
    /// An unrecognised blob, left undecoded.
    Undecoded(Blob),
}

/// One record of a framed stream.
#[derive(Clone, Debug)]
pub struct Block {
    /// The record's blob header.
    pub header: BlobHeader,
    /// The record's payload.
    pub data: BlockData,
}

impl Block {
    /// Payload kind of this block.
    #[must_use]
    pub fn kind(&self) -> &BlockKind { &self.header.kind }

    /// The decoded payload message, if the block was decoded.
    #[must_use]
    pub fn message(&self) -> Option<&Message> {
        match &self.data {
            BlockData::Message(message) => Some(message),
            BlockData::Undecoded(_) => None,
        }
    }
}
