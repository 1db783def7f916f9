//! Base-128 varints and the zig-zag signed mapping.
//!
//! Each encoded byte contributes its low seven bits, least significant group
//! first; a set high bit means another byte follows. Decoding stops at the
//! first byte with the high bit clear and never reads past it.

use std::io::{self, Read};

use crate::error::DecodeError;

/// Maximum encoded length of a 64-bit varint (`ceil(64 / 7)`).
pub const MAX_VARINT_LEN: usize = 10;

const CONTINUATION: u8 = 0x80;
const PAYLOAD: u8 = 0x7f;

/// Outcome of reading a varint from a stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarintRead {
    /// The stream ended before the first byte of the varint.
    Eof,
    /// A complete varint and the number of bytes it occupied.
    Value(u64, usize),
}

/// Accumulates varint bytes one at a time.
#[derive(Debug, Default)]
struct Accumulator {
    value: u64,
    len: usize,
}

impl Accumulator {
    /// Feed one byte, returning `true` once the varint is complete.
    fn push(&mut self, byte: u8) -> Result<bool, DecodeError> {
        if self.len == MAX_VARINT_LEN {
            return Err(DecodeError::VarintOverflow {
                max: MAX_VARINT_LEN,
            });
        }
        let shift = 7 * self.len;
        // The tenth byte may only carry the single remaining bit.
        if self.len == MAX_VARINT_LEN - 1 && byte & PAYLOAD > 1 {
            return Err(DecodeError::VarintOverflow {
                max: MAX_VARINT_LEN,
            });
        }
        self.value |= u64::from(byte & PAYLOAD) << shift;
        self.len += 1;
        Ok(byte & CONTINUATION == 0)
    }
}

/// Read one byte, distinguishing end of input from I/O failure.
pub(crate) fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<Option<u8>, DecodeError> {
    let mut byte = [0u8; 1];
    loop {
        match reader.read(&mut byte) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(byte[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(DecodeError::Io(e)),
        }
    }
}

/// Read a varint from `reader`.
///
/// Returns [`VarintRead::Eof`] when the stream is exhausted before any byte
/// is consumed, so callers can tell a clean end of input from a truncated
/// value.
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedStream`] if input ends mid-varint,
/// [`DecodeError::VarintOverflow`] if the encoding is longer than
/// [`MAX_VARINT_LEN`] bytes or overflows 64 bits, and
/// [`DecodeError::Io`] if the reader fails.
pub fn read_varint<R: Read + ?Sized>(reader: &mut R) -> Result<VarintRead, DecodeError> {
    let mut acc = Accumulator::default();
    loop {
        let Some(byte) = read_byte(reader)? else {
            if acc.len == 0 {
                return Ok(VarintRead::Eof);
            }
            return Err(DecodeError::TruncatedStream {
                expected: acc.len + 1,
                actual: acc.len,
            });
        };
        if acc.push(byte)? {
            return Ok(VarintRead::Value(acc.value, acc.len));
        }
    }
}

/// Read a varint that must be present.
///
/// # Errors
///
/// As [`read_varint`], and [`DecodeError::TruncatedStream`] if the stream is
/// already exhausted.
pub fn read_required_varint<R: Read + ?Sized>(reader: &mut R) -> Result<(u64, usize), DecodeError> {
    match read_varint(reader)? {
        VarintRead::Value(value, len) => Ok((value, len)),
        VarintRead::Eof => Err(DecodeError::TruncatedStream {
            expected: 1,
            actual: 0,
        }),
    }
}

/// Decode a varint from the start of `bytes`, ignoring anything after it.
///
/// # Examples
///
/// ```
/// use pbfwire::varint::decode_varint;
///
/// assert_eq!(decode_varint(&[0xac, 0x02, 0xff]).unwrap(), (300, 2));
/// ```
///
/// # Errors
///
/// Returns [`DecodeError::TruncatedStream`] if `bytes` ends mid-varint and
/// [`DecodeError::VarintOverflow`] if the encoding is too long.
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut acc = Accumulator::default();
    for &byte in bytes {
        if acc.push(byte)? {
            return Ok((acc.value, acc.len));
        }
    }
    Err(DecodeError::TruncatedStream {
        expected: acc.len + 1,
        actual: acc.len,
    })
}

/// Map a zig-zag encoded value back to its signed form.
///
/// Even values map to `n / 2`, odd values to `-(n + 1) / 2`.
///
/// # Examples
///
/// ```
/// use pbfwire::varint::zigzag_decode;
///
/// assert_eq!(zigzag_decode(0), 0);
/// assert_eq!(zigzag_decode(1), -1);
/// assert_eq!(zigzag_decode(4), 2);
/// assert_eq!(zigzag_decode(u64::MAX), i64::MIN);
/// ```
#[must_use]
#[expect(
    clippy::cast_possible_wrap,
    reason = "zig-zag maps the full u64 range onto i64 bit patterns"
)]
pub fn zigzag_decode(n: u64) -> i64 { ((n >> 1) as i64) ^ -((n & 1) as i64) }

/// Map a signed value onto the unsigned zig-zag domain.
///
/// # Examples
///
/// ```
/// use pbfwire::varint::zigzag_encode;
///
/// assert_eq!(zigzag_encode(-1), 1);
/// assert_eq!(zigzag_encode(i64::MAX), u64::MAX - 1);
/// ```
#[must_use]
#[expect(
    clippy::cast_sign_loss,
    reason = "zig-zag maps the full i64 range onto u64 bit patterns"
)]
pub fn zigzag_encode(n: i64) -> u64 { ((n << 1) ^ (n >> 63)) as u64 }
