//! Spherical-earth geometry between two geographic points.
//!
//! - `haversine_km`: great-circle distance on a sphere of radius `EARTH_RADIUS_KM`
//! - `bearing_deg`: initial compass bearing in `[0, 360)`
//! - `angle_segment`: quantizes a bearing into a fixed-width angular sector
//!
//! Bearings are not symmetric: `bearing(a, b)` is only approximately
//! `bearing(b, a) + 180` on a sphere.

use serde::{Deserialize, Serialize};

/// Mean earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A (latitude, longitude) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[inline]
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }

    #[inline]
    pub fn bearing_deg(&self, other: &Coordinate) -> f64 {
        bearing_deg(self.lat, self.lon, other.lat, other.lon)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinate> for (f64, f64) {
    fn from(c: Coordinate) -> Self {
        (c.lat, c.lon)
    }
}

/// Great-circle distance in km between two points given in degrees (haversine formula).
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    // clamp guards against a drifting just above 1.0 for near-antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Initial compass bearing from point 1 to point 2, in degrees within `[0, 360)`.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let x = dlon.sin() * lat2_rad.cos();
    let y = lat1_rad.cos() * lat2_rad.sin() - lat1_rad.sin() * lat2_rad.cos() * dlon.cos();

    let bearing = x.atan2(y).to_degrees().rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if bearing >= 360.0 { 0.0 } else { bearing }
}

/// Sector index `floor(angle / segment_size_deg)`.
///
/// # Panics
/// If `segment_size_deg` is not strictly positive.
#[inline]
pub fn angle_segment(angle_deg: f64, segment_size_deg: f64) -> i32 {
    assert!(
        segment_size_deg > 0.0,
        "segment size should be strictly positive, got {}",
        segment_size_deg
    );
    (angle_deg / segment_size_deg).floor() as i32
}

/// Number of sectors a full turn is split into for a given segment size.
pub fn segment_count(segment_size_deg: f64) -> usize {
    assert!(
        segment_size_deg > 0.0,
        "segment size should be strictly positive, got {}",
        segment_size_deg
    );
    (360.0 / segment_size_deg).ceil() as usize
}
