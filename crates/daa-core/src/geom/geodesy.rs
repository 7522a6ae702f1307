//! Great-circle geodesy and the local East-North-Up projection used to bring
//! latitude/longitude traffic into the ownship's Euclidean frame.

use serde::{Deserialize, Serialize};

use super::vect::{Vect3, Velocity};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two points in meters (haversine).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2 in radians, 0 = north, pi/2 = east.
pub fn bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();
    let x = delta_lambda.sin() * phi2.cos();
    let y = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();
    x.atan2(y)
}

/// Offset a position by distance and bearing along a great circle.
/// Returns (lat, lon) in degrees.
pub fn offset_by_bearing(lat: f64, lon: f64, distance_m: f64, bearing_rad: f64) -> (f64, f64) {
    if distance_m.abs() <= f64::EPSILON {
        return (lat, lon);
    }

    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let sin_lat1 = lat1.sin();
    let cos_lat1 = lat1.cos();
    let sin_ad = angular_distance.sin();
    let cos_ad = angular_distance.cos();

    let sin_lat2 = sin_lat1 * cos_ad + cos_lat1 * sin_ad * bearing_rad.cos();
    let lat2 = sin_lat2.clamp(-1.0, 1.0).asin();

    let y = bearing_rad.sin() * sin_ad * cos_lat1;
    let x = cos_ad - sin_lat1 * sin_lat2;
    let mut lon2 = lon1 + y.atan2(x);
    lon2 = (lon2 + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI) - std::f64::consts::PI;

    (lat2.to_degrees(), lon2.to_degrees())
}

/// Meters per degree of latitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lat(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_132.954 - 559.822 * (2.0 * lat_rad).cos() + 1.175 * (4.0 * lat_rad).cos()
        - 0.0023 * (6.0 * lat_rad).cos()
}

/// Meters per degree of longitude at a given latitude (WGS84 approximation).
pub fn meters_per_deg_lon(lat_deg: f64) -> f64 {
    let lat_rad = lat_deg.to_radians();
    111_412.84 * lat_rad.cos() - 93.5 * (3.0 * lat_rad).cos() + 0.118 * (5.0 * lat_rad).cos()
}

/// East-North-Up tangent-plane projection anchored at a reference latitude
/// and longitude (degrees) at zero altitude.
///
/// The anchor never changes within a single band computation: all traffic is
/// projected through the ownship's projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnuProjection {
    pub ref_lat: f64,
    pub ref_lon: f64,
}

impl EnuProjection {
    pub fn new(ref_lat: f64, ref_lon: f64) -> Self {
        EnuProjection { ref_lat, ref_lon }
    }

    /// Project (lat, lon, alt) to local (east, north, up) meters.
    pub fn project(&self, lat: f64, lon: f64, alt: f64) -> Vect3 {
        let x = (lon - self.ref_lon) * meters_per_deg_lon(self.ref_lat);
        let y = (lat - self.ref_lat) * meters_per_deg_lat(self.ref_lat);
        Vect3::new(x, y, alt)
    }

    /// Inverse of [`project`]: local meters back to (lat, lon, alt) degrees.
    pub fn unproject(&self, s: Vect3) -> (f64, f64, f64) {
        let lat = self.ref_lat + s.y / meters_per_deg_lat(self.ref_lat);
        let lon = self.ref_lon + s.x / meters_per_deg_lon(self.ref_lat);
        (lat, lon, s.z)
    }

    /// Velocities map unchanged through the tangent plane: track, ground
    /// speed, and vertical speed are preserved at the anchor.
    pub fn project_velocity(&self, v: Velocity) -> Velocity {
        v
    }
}
