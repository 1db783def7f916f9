//! Network byte-order conversion for frame length prefixes.
//!
//! Keeps the Clippy expectation scoped to the one conversion point so the
//! reader stays explicit about wire endianness.

/// Size in bytes of a frame length prefix.
pub const LENGTH_PREFIX_LEN: usize = 4;

/// Parse a network-order `u32` length prefix.
///
/// # Examples
///
/// ```
/// use pbfwire::byte_order::read_network_u32;
///
/// assert_eq!(read_network_u32([0x00, 0x00, 0x01, 0x02]), 258);
/// ```
#[must_use]
pub fn read_network_u32(bytes: [u8; LENGTH_PREFIX_LEN]) -> u32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Length prefixes are big-endian on the wire."
    )]
    u32::from_be_bytes(bytes)
}
