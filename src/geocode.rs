//! Text → coordinate lookup.
//!
//! [`Geocoder`] is the seam the path finder calls through; [`NominatimGeocoder`]
//! is the HTTP implementation against a Nominatim `search` endpoint.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::GeocodeError;
use crate::geo::LatLng;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolves free text to a position. `Ok(None)` means the service had no match.
pub trait Geocoder {
    fn lookup(&self, query: &str)
        -> impl Future<Output = Result<Option<LatLng>, GeocodeError>> + Send;
}

#[derive(Clone, Debug)]
pub struct GeocoderConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying user agent.
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    search_url: String,
}

// Nominatim returns coordinates as decimal strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            search_url: format!("{}/search", config.base_url.trim_end_matches('/')),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    async fn lookup(&self, query: &str) -> Result<Option<LatLng>, GeocodeError> {
        let response = self
            .client
            .get(&self.search_url)
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let places: Vec<Place> = response.json().await?;
        first_position(&places)
    }
}

fn first_position(places: &[Place]) -> Result<Option<LatLng>, GeocodeError> {
    let Some(place) = places.first() else {
        return Ok(None);
    };
    let latitude = parse_degrees(&place.lat)?;
    let longitude = parse_degrees(&place.lon)?;
    debug!(
        name = place.display_name.as_deref().unwrap_or(""),
        latitude, longitude, "geocoded"
    );
    Ok(Some(LatLng::new(latitude, longitude)))
}

fn parse_degrees(text: &str) -> Result<f64, GeocodeError> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::MalformedCoordinate(text.to_string()))
}
