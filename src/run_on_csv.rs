use anyhow::{Context, Result};
use clap::Parser;
use csv::ReaderBuilder;
use std::io;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pathcast::output::write_csv;
use pathcast::{build_graph_with, shortest_path, Coordinate, DuplicatePolicy, SOURCE_ID};

#[derive(Parser, Debug)]
#[command(name = "csv")]
#[command(about = "Build a star graph from a CSV of destinations (id,latitude,longitude) and print the shortest path from a source position to one of them.", long_about = None)]
struct Cli {
    /// Path to the .csv file
    #[arg(short, long)]
    csv: String,

    /// Source latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Source longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Id of the destination to route to
    #[arg(short, long)]
    to: String,

    /// Fail on repeated destination ids instead of keeping the last one
    #[arg(long, default_value_t = false)]
    reject_duplicates: bool,

    /// Number of timed runs
    #[arg(short, long, default_value_t = 1)]
    num_runs: usize,
}

fn read_destinations(path: &str) -> Result<Vec<Coordinate>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("opening {}", path))?;

    let mut destinations = Vec::new();
    for (row, result) in rdr.deserialize().enumerate() {
        let coordinate: Coordinate = result.with_context(|| format!("row {} of {}", row + 1, path))?;
        destinations.push(coordinate);
    }
    Ok(destinations)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let policy = if cli.reject_duplicates {
        DuplicatePolicy::Reject
    } else {
        DuplicatePolicy::Overwrite
    };
    let destinations = read_destinations(&cli.csv)?;
    info!(count = destinations.len(), "loaded destinations");

    let source = Coordinate::new(SOURCE_ID, cli.lat, cli.lon);
    let graph = build_graph_with(&source, &destinations, policy)?;

    let mut duration_millis = Vec::with_capacity(cli.num_runs);
    let mut route = None;
    for _ in 0..cli.num_runs.max(1) {
        let now = Instant::now();
        route = Some(shortest_path(&graph, SOURCE_ID, &cli.to)?);
        duration_millis.push(now.elapsed().as_secs_f64() * 1000.0);
    }
    info!(?duration_millis, "search timings");

    if let Some(route) = route {
        write_csv(&route, io::stdout().lock()).context("writing CSV")?;
    }
    Ok(())
}
