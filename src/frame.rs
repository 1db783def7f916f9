//! Framed block streams.
//!
//! A stream is a sequence of records, each a big-endian `u32` length, a
//! `BlobHeader` message of that length, and a `Blob` message whose length the
//! header declares. [`FramedReader`] walks the records and decodes each blob
//! payload into a [`Message`](crate::Message).

mod blob;
mod error;
mod reader;

pub use blob::{Blob, BlobData, BlobHeader, Block, BlockData, BlockKind};
pub use error::FrameError;
pub use reader::FramedReader;
