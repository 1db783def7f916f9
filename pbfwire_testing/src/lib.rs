//! Builders for synthetic wire-format input used by `pbfwire` tests.
//!
//! `pbfwire` only decodes. These helpers write the other direction so tests
//! can assemble messages, packed runs and framed block streams byte by byte.
//!
//! ```rust
//! use pbfwire_testing::{FrameBuilder, MessageBuilder};
//!
//! let block = MessageBuilder::new().string(16, "tests").build();
//! let stream = FrameBuilder::new().raw_blob("OSMHeader", &block).build();
//! assert!(stream.len() > block.len());
//! ```

pub mod encode;
pub mod frame;

pub use encode::{
    FIXED32,
    FIXED64,
    LENGTH_DELIMITED,
    MessageBuilder,
    VARINT,
    encode_varint,
    tag,
    varint,
    zigzag,
};
pub use frame::{FrameBuilder, bbox_header_block, zlib_compress};
