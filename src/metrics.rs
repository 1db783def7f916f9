//! Metric helpers for `pbfwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

use crate::frame::BlockKind;

/// Name of the counter tracking decoded blobs, labelled by `kind`.
pub const BLOBS_DECODED: &str = "pbfwire_blobs_decoded_total";
/// Name of the counter tracking decode failures, labelled by `error_type`.
pub const DECODE_ERRORS: &str = "pbfwire_decode_errors_total";
/// Name of the counter tracking bytes produced by decompression.
pub const INFLATED_BYTES: &str = "pbfwire_inflated_bytes_total";

#[cfg_attr(not(feature = "metrics"), allow(dead_code))]
fn kind_label(kind: &BlockKind) -> &'static str {
    match kind {
        BlockKind::Header => "header",
        BlockKind::Data => "data",
        BlockKind::Unknown(_) => "unknown",
    }
}

/// Record a blob that was read and decoded.
#[cfg_attr(not(feature = "metrics"), expect(unused_variables, reason = "metrics disabled"))]
pub fn inc_blobs(kind: &BlockKind) {
    #[cfg(feature = "metrics")]
    counter!(BLOBS_DECODED, "kind" => kind_label(kind)).increment(1);
}

/// Record a decode failure classified by `error_type`.
#[cfg_attr(not(feature = "metrics"), expect(unused_variables, reason = "metrics disabled"))]
pub fn inc_errors(error_type: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(DECODE_ERRORS, "error_type" => error_type).increment(1);
}

/// Record `bytes` of decompressed output.
#[cfg_attr(not(feature = "metrics"), expect(unused_variables, reason = "metrics disabled"))]
pub fn add_inflated_bytes(bytes: usize) {
    #[cfg(feature = "metrics")]
    counter!(INFLATED_BYTES).increment(bytes as u64);
}
