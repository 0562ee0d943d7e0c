use serde::Deserialize;

use crate::error::{PathError, PathResult};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A bare position without a node handle, as reported by a geolocation feed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A located graph node. `id` is the node key and must be unique within one graph.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Coordinate {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            latitude,
            longitude,
        }
    }

    pub fn at(id: impl Into<String>, position: LatLng) -> Self {
        Self::new(id, position.latitude, position.longitude)
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Rejects non-finite values and latitudes/longitudes outside the WGS-84 ranges.
    pub fn validate(&self) -> PathResult<()> {
        validate_position(&self.id, self.position())
    }
}

pub(crate) fn validate_position(label: &str, p: LatLng) -> PathResult<()> {
    if !p.latitude.is_finite() || !p.longitude.is_finite() {
        return Err(PathError::InvalidInput(format!(
            "{label}: coordinates must be finite, got ({}, {})",
            p.latitude, p.longitude
        )));
    }
    if !(-90.0..=90.0).contains(&p.latitude) {
        return Err(PathError::InvalidInput(format!(
            "{label}: latitude {} outside [-90, 90]",
            p.latitude
        )));
    }
    if !(-180.0..=180.0).contains(&p.longitude) {
        return Err(PathError::InvalidInput(format!(
            "{label}: longitude {} outside [-180, 180]",
            p.longitude
        )));
    }
    Ok(())
}

/// Great-circle distance using the haversine formula.
/// Input lat/lon in degrees. Output in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Haversine distance between two coordinates in meters. Symmetric and never negative.
pub fn distance(a: &Coordinate, b: &Coordinate) -> f64 {
    haversine_meters(a.latitude, a.longitude, b.latitude, b.longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_DEGREE_AT_EQUATOR: f64 = 111_194.93;

    #[test]
    fn one_degree_of_longitude_at_equator() {
        let a = Coordinate::new("a", 0.0, 0.0);
        let b = Coordinate::new("b", 0.0, 1.0);
        assert!((distance(&a, &b) - ONE_DEGREE_AT_EQUATOR).abs() < 1.0);
    }

    #[test]
    fn symmetric_and_zero_on_self() {
        let pairs = [
            ((52.52, 13.405), (48.8566, 2.3522)),
            ((-33.87, 151.21), (40.71, -74.0)),
            ((89.9, 0.0), (-89.9, 179.9)),
            ((0.0, -180.0), (0.0, 180.0)),
        ];
        for ((la, lo), (lb, lob)) in pairs {
            let a = Coordinate::new("a", la, lo);
            let b = Coordinate::new("b", lb, lob);
            assert_eq!(distance(&a, &b), distance(&b, &a));
            assert!(distance(&a, &b) >= 0.0);
            assert!(distance(&a, &a).abs() < 1e-6);
        }
    }

    #[test]
    fn antimeridian_points_coincide() {
        let a = Coordinate::new("a", 10.0, -180.0);
        let b = Coordinate::new("b", 10.0, 180.0);
        assert!(distance(&a, &b) < 1e-3);
    }

    #[test]
    fn antipodal_is_half_circumference() {
        let a = Coordinate::new("a", 0.0, 0.0);
        let b = Coordinate::new("b", 0.0, 180.0);
        let half = std::f64::consts::PI * EARTH_RADIUS_M;
        assert!((distance(&a, &b) - half).abs() < 1.0);
    }

    #[test]
    fn out_of_range_input_does_not_panic() {
        let a = Coordinate::new("a", 400.0, -1000.0);
        let b = Coordinate::new("b", -95.0, 200.0);
        let d = distance(&a, &b);
        assert!(d.is_finite());
        assert!(d >= 0.0);
    }

    #[test]
    fn validate_ranges() {
        assert!(Coordinate::new("ok", 90.0, -180.0).validate().is_ok());
        assert!(matches!(
            Coordinate::new("lat", 90.5, 0.0).validate(),
            Err(PathError::InvalidInput(_))
        ));
        assert!(matches!(
            Coordinate::new("lon", 0.0, 180.01).validate(),
            Err(PathError::InvalidInput(_))
        ));
        assert!(matches!(
            Coordinate::new("nan", f64::NAN, 0.0).validate(),
            Err(PathError::InvalidInput(_))
        ));
    }
}
