//! OpenStreetMap PBF blocks.
//!
//! A thin layer over the decoder that knows the field numbers of the
//! `HeaderBlock` and `PrimitiveBlock` messages. Only what a summary needs is
//! interpreted: the bounding box, feature lists, and element counts.

use std::io::Read;

use tracing::{debug, info};

use crate::{
    config::FrameConfig,
    decoder::Decoder,
    error::DecodeError,
    field::Field,
    frame::{BlockKind, FrameError, FramedReader},
    message::Message,
    wire::WireType,
};

/// Nanodegrees per degree.
const NANODEGREES: f64 = 1e9;

/// Geographic extent of a map, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    /// Western edge (field 1, left).
    pub min_lon: f64,
    /// Eastern edge (field 2, right).
    pub max_lon: f64,
    /// Southern edge (field 4, bottom).
    pub min_lat: f64,
    /// Northern edge (field 3, top).
    pub max_lat: f64,
}

impl BoundingBox {
    /// Interpret a `HeaderBBox` message.
    ///
    /// Edges are zig-zag encoded nanodegrees: 1 left, 2 right, 3 top,
    /// 4 bottom. An absent edge reads as zero.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::FieldTypeMismatch`] if an edge is not a varint.
    pub fn from_message(message: &Message) -> Result<Self, DecodeError> {
        let degrees = |number| -> Result<f64, DecodeError> {
            let nanos = message.get_sint64(number)?.unwrap_or_default();
            #[expect(
                clippy::cast_precision_loss,
                reason = "Nanodegree coordinates fit well within f64 precision."
            )]
            let nanos = nanos as f64;
            Ok(nanos / NANODEGREES)
        };
        Ok(Self {
            min_lon: degrees(1)?,
            max_lon: degrees(2)?,
            max_lat: degrees(3)?,
            min_lat: degrees(4)?,
        })
    }
}

/// Decoded `HeaderBlock`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderBlock {
    /// Map extent, if the header carries one.
    pub bbox: Option<BoundingBox>,
    /// Features a reader must support to interpret the file.
    pub required_features: Vec<String>,
    /// Features a reader may ignore.
    pub optional_features: Vec<String>,
    /// Program that wrote the file.
    pub writing_program: Option<String>,
    /// Origin of the data.
    pub source: Option<String>,
}

fn strings(message: &Message, number: u32) -> Vec<String> {
    message
        .fields_numbered(number)
        .filter_map(Field::as_str)
        .map(str::to_owned)
        .collect()
}

impl HeaderBlock {
    /// Interpret a `HeaderBlock` message decoded at `decoder`'s depth.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for fields of the wrong wire type and embedded
    /// decode errors for the bounding box.
    pub fn from_message(decoder: &Decoder, message: &Message) -> Result<Self, DecodeError> {
        let bbox = decoder
            .embedded(message, 1)?
            .map(|bbox| BoundingBox::from_message(&bbox))
            .transpose()?;
        Ok(Self {
            bbox,
            required_features: strings(message, 4),
            optional_features: strings(message, 5),
            writing_program: message.get_str(16)?.map(str::to_owned),
            source: message.get_str(17)?.map(str::to_owned),
        })
    }
}

/// Element counts of a `PrimitiveBlock`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PrimitiveBlock {
    /// Plain and dense nodes.
    pub nodes: u64,
    /// Ways.
    pub ways: u64,
    /// Relations.
    pub relations: u64,
}

impl PrimitiveBlock {
    /// Count the elements of every primitive group in a `PrimitiveBlock`
    /// message decoded at `decoder`'s depth.
    ///
    /// Dense nodes are counted by expanding their packed id run.
    ///
    /// # Errors
    ///
    /// Returns embedded decode errors for groups and dense nodes, and
    /// expansion errors for a malformed id run.
    pub fn from_message(decoder: &Decoder, message: &Message) -> Result<Self, DecodeError> {
        let group_decoder = decoder.nested()?;
        let mut counts = Self::default();
        for group_field in message.fields_numbered(2) {
            let group = decoder.decode_embedded(group_field)?;
            counts.nodes += group.fields_numbered(1).count() as u64;
            for dense_field in group.fields_numbered(2) {
                let mut dense = group_decoder.decode_embedded(dense_field)?;
                dense.expand_packed(1, WireType::Varint)?;
                counts.nodes += dense.fields_numbered(1).count() as u64;
            }
            counts.ways += group.fields_numbered(3).count() as u64;
            counts.relations += group.fields_numbered(4).count() as u64;
        }
        Ok(counts)
    }
}

/// Totals gathered from a whole stream.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MapSummary {
    /// Extent from the last header block seen.
    pub bbox: Option<BoundingBox>,
    /// Nodes across all data blocks.
    pub nodes: u64,
    /// Ways across all data blocks.
    pub ways: u64,
    /// Relations across all data blocks.
    pub relations: u64,
    /// Decoded header and data blocks.
    pub blocks: u64,
}

/// Fold a framed stream into a [`MapSummary`] using default limits.
///
/// # Errors
///
/// Returns the first [`FrameError`] the stream produces.
pub fn read_summary<R: Read>(reader: R) -> Result<MapSummary, FrameError> {
    read_summary_with(reader, FrameConfig::default())
}

/// Fold a framed stream into a [`MapSummary`].
///
/// # Errors
///
/// Returns the first [`FrameError`] the stream produces, or a decode error
/// from interpreting a header or data block.
pub fn read_summary_with<R: Read>(reader: R, config: FrameConfig) -> Result<MapSummary, FrameError> {
    // Block payloads sit one level below the blob that carried them.
    let decoder = Decoder::new(config.limits).nested()?;
    let mut summary = MapSummary::default();
    for block in FramedReader::with_config(reader, config) {
        let block = block?;
        let Some(message) = block.message() else {
            continue;
        };
        summary.blocks += 1;
        match block.kind() {
            BlockKind::Header => {
                let header = HeaderBlock::from_message(&decoder, message)?;
                info!(
                    writing_program = header.writing_program.as_deref().unwrap_or("unknown"),
                    features = header.required_features.len(),
                    "read map header"
                );
                summary.bbox = header.bbox;
            }
            BlockKind::Data => {
                let counts = PrimitiveBlock::from_message(&decoder, message)?;
                debug!(nodes = counts.nodes, ways = counts.ways, relations = counts.relations, "counted block");
                summary.nodes += counts.nodes;
                summary.ways += counts.ways;
                summary.relations += counts.relations;
            }
            BlockKind::Unknown(_) => {}
        }
    }
    Ok(summary)
}
