//! Resource limits for decoding and framing.

/// Default bound on nested embedded-message depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default bound on a single message or length-delimited value (32 MiB).
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 32 * 1024 * 1024;

/// Default bound on a blob header (64 KiB).
pub const DEFAULT_MAX_HEADER_LEN: usize = 64 * 1024;

/// Default bound on a blob, compressed or raw (32 MiB).
pub const DEFAULT_MAX_BLOB_LEN: usize = 32 * 1024 * 1024;

/// Limits applied while decoding messages.
///
/// # Examples
///
/// ```
/// use pbfwire::config::DecodeLimits;
///
/// let limits = DecodeLimits::default().max_depth(4).max_message_len(1024);
///
/// assert_eq!(limits.max_depth, 4);
/// assert_eq!(limits.max_inflated_len, 32 * 1024 * 1024);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Maximum nesting of embedded messages below the outermost one.
    ///
    /// Default: 32.
    pub max_depth: usize,

    /// Maximum size of a message and of any length-delimited value in it.
    ///
    /// Default: 32 MiB.
    pub max_message_len: usize,

    /// Maximum size of an inflated payload.
    ///
    /// Default: 32 MiB.
    pub max_inflated_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            max_inflated_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}

impl DecodeLimits {
    /// Set the maximum embedded-message depth.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the maximum message length.
    #[must_use]
    pub fn max_message_len(mut self, len: usize) -> Self {
        self.max_message_len = len;
        self
    }

    /// Set the maximum inflated payload length.
    #[must_use]
    pub fn max_inflated_len(mut self, len: usize) -> Self {
        self.max_inflated_len = len;
        self
    }
}

/// Settings for reading a framed block stream.
///
/// # Examples
///
/// ```
/// use pbfwire::config::{DecodeLimits, FrameConfig};
///
/// let config = FrameConfig::default()
///     .max_blob_len(1 << 20)
///     .skip_unknown_blobs(false)
///     .limits(DecodeLimits::default().max_depth(8));
///
/// assert_eq!(config.max_header_len, 64 * 1024);
/// assert!(!config.skip_unknown_blobs);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    /// Maximum blob header length accepted from a length prefix.
    ///
    /// Default: 64 KiB.
    pub max_header_len: usize,

    /// Maximum blob length declared by a header.
    ///
    /// Default: 32 MiB.
    pub max_blob_len: usize,

    /// Whether blobs of unrecognised type are skipped rather than returned.
    ///
    /// Default: true.
    pub skip_unknown_blobs: bool,

    /// Limits for decoding headers, blobs and their payloads.
    pub limits: DecodeLimits,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_header_len: DEFAULT_MAX_HEADER_LEN,
            max_blob_len: DEFAULT_MAX_BLOB_LEN,
            skip_unknown_blobs: true,
            limits: DecodeLimits::default(),
        }
    }
}

impl FrameConfig {
    /// Set the maximum blob header length.
    #[must_use]
    pub fn max_header_len(mut self, len: usize) -> Self {
        self.max_header_len = len;
        self
    }

    /// Set the maximum blob length.
    #[must_use]
    pub fn max_blob_len(mut self, len: usize) -> Self {
        self.max_blob_len = len;
        self
    }

    /// Set whether unknown blob types are skipped.
    #[must_use]
    pub fn skip_unknown_blobs(mut self, skip: bool) -> Self {
        self.skip_unknown_blobs = skip;
        self
    }

    /// Replace the decode limits.
    #[must_use]
    pub fn limits(mut self, limits: DecodeLimits) -> Self {
        self.limits = limits;
        self
    }
}
