//! GeoJSON points and great-circle distance.
//!
//! Locations are stored as GeoJSON `Point`s, which put longitude first:
//! `{"type": "Point", "coordinates": [lng, lat]}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Errors from constructing a point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("latitude out of range: {0}")]
    Latitude(f64),
    #[error("longitude out of range: {0}")]
    Longitude(f64),
}

/// A GeoJSON point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    kind: PointKind,
    /// `[longitude, latitude]` in degrees.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
enum PointKind {
    #[default]
    Point,
}

impl GeoPoint {
    /// Build a point from longitude and latitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns `GeoError` if either coordinate is outside its valid range.
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, GeoError> {
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::Longitude(longitude));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::Latitude(latitude));
        }
        Ok(Self {
            kind: PointKind::Point,
            coordinates: [longitude, latitude],
        })
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    /// Great-circle (haversine) distance to `other` in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let (lat1, lat2) = (self.latitude().to_radians(), other.latitude().to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude() - self.longitude()).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
    }

    /// Travel time to `other` in minutes at `speed_kmph`.
    ///
    /// A non-positive speed yields `f64::INFINITY`.
    #[must_use]
    pub fn eta_minutes(&self, other: &Self, speed_kmph: f64) -> f64 {
        if speed_kmph <= 0.0 {
            return f64::INFINITY;
        }
        self.distance_km(other) / speed_kmph * 60.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_shape() {
        let point = GeoPoint::new(-2.2426, 53.4808).unwrap();
        let json = serde_json::to_value(point).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Point", "coordinates": [-2.2426, 53.4808]})
        );
    }

    #[test]
    fn test_rejects_non_point() {
        let json = r#"{"type": "Polygon", "coordinates": [0.0, 0.0]}"#;
        assert!(serde_json::from_str::<GeoPoint>(json).is_err());
    }

    #[test]
    fn test_range_validation() {
        assert_eq!(GeoPoint::new(181.0, 0.0), Err(GeoError::Longitude(181.0)));
        assert_eq!(GeoPoint::new(0.0, -91.0), Err(GeoError::Latitude(-91.0)));
    }

    #[test]
    fn test_distance_zero_for_same_point() {
        let p = GeoPoint::new(2.617_389, -62.821_071).unwrap();
        assert!(p.distance_km(&p).abs() < 1e-9);
    }

    #[test]
    fn test_distance_manchester_london() {
        let manchester = GeoPoint::new(-2.2426, 53.4808).unwrap();
        let london = GeoPoint::new(-0.1276, 51.5072).unwrap();
        let km = manchester.distance_km(&london);
        assert!((km - 262.0).abs() < 3.0, "got {km}");
    }

    #[test]
    fn test_quarter_meridian() {
        let equator = GeoPoint::new(0.0, 0.0).unwrap();
        let pole = GeoPoint::new(0.0, 90.0).unwrap();
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((equator.distance_km(&pole) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_eta_minutes() {
        let a = GeoPoint::new(0.0, 0.0).unwrap();
        let b = GeoPoint::new(0.0, 90.0).unwrap();
        let eta = a.eta_minutes(&b, 50.0);
        assert!((eta - a.distance_km(&b) / 50.0 * 60.0).abs() < 1e-9);
        assert!(a.eta_minutes(&b, 0.0).is_infinite());
    }
}
