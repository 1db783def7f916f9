//! Command line interface for the `pbfwire` binary.
//!
//! Arguments are parsed into a [`RunConfig`] before any input is opened.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `pbfwire` binary.
#[derive(Debug, Parser)]
#[command(
    name = "pbfwire",
    version,
    about = "Summarise an OpenStreetMap PBF file"
)]
pub struct Cli {
    /// Read the map from FILE instead of standard input.
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the map bounding box.
    #[arg(short, long)]
    pub bbox: bool,

    /// Print node and way counts.
    #[arg(short, long)]
    pub summary: bool,

    /// Look up the node with ID. Accepted but not yet answered.
    #[arg(short = 'n', long = "node", value_name = "ID")]
    pub nodes: Vec<i64>,

    /// Look up the way with ID. Accepted but not yet answered.
    #[arg(short = 'w', long = "way", value_name = "ID")]
    pub ways: Vec<i64>,
}

/// Where the map is read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Standard input.
    Stdin,
    /// A file on disk.
    File(PathBuf),
}

/// Lookup of a single element by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Query {
    /// Node id.
    Node(i64),
    /// Way id.
    Way(i64),
}

/// Settings for a single invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    /// Source of the map.
    pub input: Input,
    /// Print the bounding box.
    pub print_bbox: bool,
    /// Print node and way counts.
    pub print_counts: bool,
    /// Element lookups, nodes first.
    pub queries: Vec<Query>,
}

impl From<Cli> for RunConfig {
    fn from(cli: Cli) -> Self {
        Self {
            input: cli.file.map_or(Input::Stdin, Input::File),
            print_bbox: cli.bbox,
            print_counts: cli.summary,
            queries: cli
                .nodes
                .into_iter()
                .map(Query::Node)
                .chain(cli.ways.into_iter().map(Query::Way))
                .collect(),
        }
    }
}
