use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use pathcast::output::{write_csv, write_json};
use pathcast::{GeocoderConfig, LatLng, NominatimGeocoder, PathFinder, Route};

#[derive(Parser, Debug)]
#[command(name = "find-path")]
#[command(about = "Geocode a destination and print the shortest path to it from a position.", long_about = None)]
struct Cli {
    /// Current latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,

    /// Current longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,

    /// Free-text destination, e.g. "Eiffel Tower"
    #[arg(short, long)]
    destination: String,

    /// Nominatim-compatible geocoder base URL
    #[arg(long, env = "PATHCAST_GEOCODER_URL", default_value = pathcast::geocode::DEFAULT_BASE_URL)]
    geocoder_url: String,

    #[arg(long, env = "PATHCAST_USER_AGENT")]
    user_agent: Option<String>,

    /// Geocoder timeout in seconds
    #[arg(long, env = "PATHCAST_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Output file. If omitted, writes to stdout.
    #[arg(short, long)]
    out: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
}

fn emit(route: &Route, format: Format, out: Option<&str>) -> Result<()> {
    let sink: Box<dyn Write> = match out {
        Some(path) => Box::new(File::create(path).with_context(|| format!("creating {}", path))?),
        None => Box::new(io::stdout().lock()),
    };
    match format {
        Format::Csv => write_csv(route, sink).context("writing CSV")?,
        Format::Json => {
            let mut sink = sink;
            write_json(route, &mut sink).context("writing JSON")?;
            writeln!(sink)?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let timeout = Duration::from_secs(cli.timeout_secs);
    let mut config = GeocoderConfig {
        base_url: cli.geocoder_url,
        timeout,
        ..GeocoderConfig::default()
    };
    if let Some(user_agent) = cli.user_agent {
        config.user_agent = user_agent;
    }

    let geocoder = NominatimGeocoder::new(&config).context("building geocoder client")?;
    let finder = PathFinder::new(geocoder).with_lookup_timeout(timeout);

    let route = finder
        .find_path(Some(LatLng::new(cli.lat, cli.lon)), &cli.destination)
        .await
        .with_context(|| format!("finding a path to {:?}", cli.destination))?;

    emit(&route, cli.format, cli.out.as_deref())?;
    if let Some(out_path) = &cli.out {
        println!(
            "Wrote {} waypoints ({:.2} m) to {}",
            route.waypoints.len(),
            route.total_m(),
            out_path
        );
    }
    Ok(())
}
