//! Great-circle distance between two coordinates.
//!
//! Uses the haversine formula on a spherical Earth (R = 6371 km).
//! Inputs are not range-checked; out-of-range coordinates give a finite
//! but meaningless distance.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components fall inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Haversine distance in kilometers.
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude * DEG;
    let lat2 = b.latitude * DEG;
    let d_lat = (b.latitude - a.latitude) * DEG;
    let d_lon = (b.longitude - a.longitude) * DEG;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Format coordinates as "35.6762°N, 139.6503°E".
pub fn format_coords(p: GeoPoint) -> String {
    let ns = if p.latitude >= 0.0 { 'N' } else { 'S' };
    let ew = if p.longitude >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}°{}, {:.4}°{}", p.latitude.abs(), ns, p.longitude.abs(), ew)
}
