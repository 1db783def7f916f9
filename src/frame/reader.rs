//! Iterator over the records of a framed stream.

use std::{
    io::{self, Read},
    iter::FusedIterator,
};

use tracing::{debug, warn};

use super::{
    blob::{Blob, BlobHeader, Block, BlockData},
    error::FrameError,
};
use crate::{
    byte_order::{LENGTH_PREFIX_LEN, read_network_u32},
    config::FrameConfig,
    decoder::Decoder,
    error::DecodeError,
    message::Message,
    metrics,
    wire::read_exact_counted,
};

/// Reads [`Block`]s from a framed stream.
///
/// The iterator yields blocks in stream order and ends at a clean end of
/// input between records. After the first error it yields nothing more.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use pbfwire::FramedReader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// for block in FramedReader::new(File::open("map.osm.pbf")?) {
///     let block = block?;
///     println!("{}", block.kind());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FramedReader<R> {
    reader: R,
    config: FrameConfig,
    decoder: Decoder,
    finished: bool,
}

impl<R: Read> FramedReader<R> {
    /// Create a reader with the default [`FrameConfig`].
    #[must_use]
    pub fn new(reader: R) -> Self { Self::with_config(reader, FrameConfig::default()) }

    /// Create a reader with an explicit configuration.
    #[must_use]
    pub fn with_config(reader: R, config: FrameConfig) -> Self {
        Self {
            reader,
            config,
            decoder: Decoder::new(config.limits),
            finished: false,
        }
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FrameConfig { &self.config }

    /// Recover the underlying reader.
    #[must_use]
    pub fn into_inner(self) -> R { self.reader }

    /// Read the next record, skipping unknown blobs if configured to.
    ///
    /// Returns `Ok(None)` at a clean end of input between records.
    ///
    /// # Errors
    ///
    /// Returns a [`FrameError`] for any truncated, oversized or malformed
    /// record.
    pub fn read_block(&mut self) -> Result<Option<Block>, FrameError> {
        loop {
            let Some(header_len) = self.read_length_prefix()? else {
                return Ok(None);
            };
            if header_len > self.config.max_header_len {
                return Err(FrameError::OversizedHeader {
                    size: header_len,
                    max: self.config.max_header_len,
                });
            }
            let header = BlobHeader::from_message(&self.read_exact_message(header_len)?)?;

            let blob_len = usize::try_from(header.data_size)
                .ok()
                .filter(|len| *len <= self.config.max_blob_len)
                .ok_or(FrameError::OversizedBlob {
                    size: header.data_size,
                    max: self.config.max_blob_len,
                })?;

            if header.kind.is_unknown() && self.config.skip_unknown_blobs {
                self.skip(blob_len)?;
                debug!(blob_type = %header.kind, len = blob_len, "skipped unknown blob");
                continue;
            }

            let blob = Blob::from_message(&self.read_exact_message(blob_len)?)?;
            let data = if header.kind.is_unknown() {
                BlockData::Undecoded(blob)
            } else {
                BlockData::Message(blob.decode(&self.decoder)?)
            };
            metrics::inc_blobs(&header.kind);
            debug!(blob_type = %header.kind, header_len, blob_len, "read block");
            return Ok(Some(Block { header, data }));
        }
    }

    fn read_length_prefix(&mut self) -> Result<Option<usize>, FrameError> {
        let mut buf = [0u8; LENGTH_PREFIX_LEN];
        match read_exact_counted(&mut self.reader, &mut buf) {
            Ok(()) => Ok(Some(
                usize::try_from(read_network_u32(buf)).unwrap_or(usize::MAX),
            )),
            Err(DecodeError::TruncatedStream { actual: 0, .. }) => Ok(None),
            Err(DecodeError::TruncatedStream { actual, .. }) => {
                Err(FrameError::TruncatedLengthPrefix { have: actual })
            }
            Err(DecodeError::Io(e)) => Err(FrameError::Io(e)),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a message that the stream promises is exactly `len` bytes.
    fn read_exact_message(&mut self, len: usize) -> Result<Message, FrameError> {
        self.decoder
            .read_message(&mut self.reader, len)?
            .ok_or(FrameError::Decode(DecodeError::TruncatedStream {
                expected: len,
                actual: 0,
            }))
    }

    fn skip(&mut self, len: usize) -> Result<(), FrameError> {
        let skipped = io::copy(&mut (&mut self.reader).take(len as u64), &mut io::sink())?;
        if skipped < len as u64 {
            return Err(DecodeError::TruncatedStream {
                expected: len,
                actual: usize::try_from(skipped).unwrap_or(len),
            }
            .into());
        }
        Ok(())
    }
}

impl<R: Read> Iterator for FramedReader<R> {
    type Item = Result<Block, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                warn!(error = %err, error_type = err.error_type(), "frame stream aborted");
                metrics::inc_errors(err.error_type());
                Some(Err(err))
            }
        }
    }
}

impl<R: Read> FusedIterator for FramedReader<R> {}
