//! `pbfwire` binary.
//!
//! Reads an OpenStreetMap PBF stream and prints the requested summary.

mod cli;

use std::{
    fmt::Write as _,
    fs::File,
    io::{self, BufReader, Read},
    process::ExitCode,
};

use clap::Parser;
use cli::{Cli, Input, Query, RunConfig};
use pbfwire::osm::{MapSummary, read_summary};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Library code only emits events; the binary decides where they go.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let config = RunConfig::from(Cli::parse());
    match run(&config) {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("pbfwire: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RunConfig) -> Result<String, Box<dyn std::error::Error>> {
    let input: Box<dyn Read> = match &config.input {
        Input::Stdin => Box::new(io::stdin().lock()),
        Input::File(path) => Box::new(File::open(path)?),
    };
    let summary = read_summary(BufReader::new(input))?;
    for query in &config.queries {
        match query {
            Query::Node(id) => warn!(node_id = id, "node lookup is not supported; ignoring"),
            Query::Way(id) => warn!(way_id = id, "way lookup is not supported; ignoring"),
        }
    }
    Ok(render(config, &summary))
}

fn render(config: &RunConfig, summary: &MapSummary) -> String {
    let mut out = String::new();
    if config.print_counts {
        let _ = writeln!(out, "nodes: {}, ways: {}", summary.nodes, summary.ways);
    }
    if config.print_bbox {
        let bbox = summary.bbox.unwrap_or_default();
        let _ = writeln!(
            out,
            "max lon: {}, min lon: {}, max lat: {}, min lat: {}",
            bbox.max_lon, bbox.min_lon, bbox.max_lat, bbox.min_lat
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use pbfwire::osm::BoundingBox;

    use super::*;

    fn config(print_bbox: bool, print_counts: bool) -> RunConfig {
        RunConfig {
            input: Input::Stdin,
            print_bbox,
            print_counts,
            queries: Vec::new(),
        }
    }

    #[test]
    fn renders_counts_then_bbox() {
        let summary = MapSummary {
            bbox: Some(BoundingBox {
                min_lon: -180.0,
                max_lon: 180.0,
                min_lat: -90.0,
                max_lat: 90.0,
            }),
            nodes: 12,
            ways: 3,
            ..MapSummary::default()
        };
        assert_eq!(
            render(&config(true, true), &summary),
            "nodes: 12, ways: 3\nmax lon: 180, min lon: -180, max lat: 90, min lat: -90\n"
        );
    }

    #[test]
    fn renders_nothing_without_flags() {
        assert_eq!(render(&config(false, false), &MapSummary::default()), "");
    }
}
