//! Framed block streams: `[u32 BE length][BlobHeader][Blob]` records.

use std::io::Write;

use flate2::{Compression, write::ZlibEncoder};

use crate::encode::MessageBuilder;

/// Compress `data` into a zlib stream.
///
/// # Panics
///
/// Panics if the in-memory encoder fails, which only happens on allocation
/// failure.
#[must_use]
pub fn zlib_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory zlib write");
    encoder.finish().expect("in-memory zlib finish")
}

/// `HeaderBlock` carrying only a bounding box, in nanodegrees.
#[must_use]
pub fn bbox_header_block(min_lon: i64, max_lon: i64, min_lat: i64, max_lat: i64) -> Vec<u8> {
    let bbox = MessageBuilder::new()
        .sint64(1, min_lon)
        .sint64(2, max_lon)
        .sint64(3, max_lat)
        .sint64(4, min_lat);
    MessageBuilder::new()
        .message(1, &bbox)
        .string(4, "OsmSchema-V0.6")
        .build()
}

/// Accumulates framed records.
#[derive(Clone, Debug, Default)]
pub struct FrameBuilder {
    buf: Vec<u8>,
}

impl FrameBuilder {
    /// Start an empty stream.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a record whose blob message is given verbatim.
    #[must_use]
    pub fn blob(mut self, blob_type: &str, blob: &[u8]) -> Self {
        let header = MessageBuilder::new()
            .string(1, blob_type)
            .varint(3, blob.len() as u64)
            .build();
        let header_len = u32::try_from(header.len()).expect("header fits in u32");
        self.buf.extend_from_slice(&header_len.to_be_bytes());
        self.buf.extend_from_slice(&header);
        self.buf.extend_from_slice(blob);
        self
    }

    /// Append a record carrying `payload` uncompressed.
    #[must_use]
    pub fn raw_blob(self, blob_type: &str, payload: &[u8]) -> Self {
        let blob = MessageBuilder::new().bytes(1, payload).build();
        self.blob(blob_type, &blob)
    }

    /// Append a record carrying `payload` zlib-compressed.
    #[must_use]
    pub fn zlib_blob(self, blob_type: &str, payload: &[u8]) -> Self {
        self.zlib_blob_declaring(blob_type, payload, payload.len() as u64)
    }

    /// Append a zlib record that declares `raw_size` whatever the real size.
    #[must_use]
    pub fn zlib_blob_declaring(self, blob_type: &str, payload: &[u8], raw_size: u64) -> Self {
        let blob = MessageBuilder::new()
            .varint(2, raw_size)
            .bytes(3, &zlib_compress(payload))
            .build();
        self.blob(blob_type, &blob)
    }

    /// Append raw bytes verbatim, for malformed streams.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Finish the stream.
    #[must_use]
    pub fn build(self) -> Vec<u8> { self.buf }
}
