//! Aircraft position, either geodetic or in a local Cartesian frame.
//!
//! The coordinate system travels with the value; mixing the two kinds in one
//! aircraft list is rejected at the facade boundary.

use serde::{Deserialize, Serialize};

use super::geodesy;
use super::vect::{Vect3, Velocity};

/// A position tagged with its coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Position {
    /// Latitude and longitude in degrees, altitude in meters.
    LatLon { lat: f64, lon: f64, alt: f64 },
    /// Local Cartesian (east, north, up) meters.
    Euclidean { x: f64, y: f64, z: f64 },
}

impl Position {
    pub const INVALID: Position = Position::Euclidean {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
    };

    pub fn lat_lon(lat: f64, lon: f64, alt: f64) -> Self {
        Position::LatLon { lat, lon, alt }
    }

    pub fn euclidean(x: f64, y: f64, z: f64) -> Self {
        Position::Euclidean { x, y, z }
    }

    pub fn is_lat_lon(&self) -> bool {
        matches!(self, Position::LatLon { .. })
    }

    pub fn is_valid(&self) -> bool {
        match self {
            Position::LatLon { lat, lon, alt } => {
                lat.is_finite() && lon.is_finite() && alt.is_finite()
            }
            Position::Euclidean { x, y, z } => x.is_finite() && y.is_finite() && z.is_finite(),
        }
    }

    /// Altitude in meters regardless of frame.
    pub fn alt(&self) -> f64 {
        match self {
            Position::LatLon { alt, .. } => *alt,
            Position::Euclidean { z, .. } => *z,
        }
    }

    /// Position after flying velocity `v` for `t` seconds. Geodetic
    /// positions move along the great circle of the velocity's track.
    pub fn linear(&self, v: Velocity, t: f64) -> Position {
        match *self {
            Position::LatLon { lat, lon, alt } => {
                let dist = v.gs() * t;
                let (nlat, nlon) = geodesy::offset_by_bearing(lat, lon, dist, v.trk());
                Position::LatLon {
                    lat: nlat,
                    lon: nlon,
                    alt: alt + v.vs() * t,
                }
            }
            Position::Euclidean { x, y, z } => Position::Euclidean {
                x: x + v.x * t,
                y: y + v.y * t,
                z: z + v.z * t,
            },
        }
    }

    /// The raw Euclidean point; only meaningful for Euclidean positions.
    pub fn point(&self) -> Vect3 {
        match *self {
            Position::Euclidean { x, y, z } => Vect3::new(x, y, z),
            Position::LatLon { .. } => Vect3::INVALID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_linear_projection() {
        let p = Position::euclidean(0.0, 0.0, 100.0);
        let v = Velocity::new(10.0, 0.0, 1.0);
        let q = p.linear(v, 5.0);
        assert_eq!(q, Position::euclidean(50.0, 0.0, 105.0));
    }

    #[test]
    fn latlon_linear_preserves_ground_distance() {
        let p = Position::lat_lon(33.95, -96.70, 2000.0);
        let v = Velocity::from_trk_gs_vs(0.0, 100.0, 0.0);
        let q = p.linear(v, 60.0);
        match (p, q) {
            (Position::LatLon { lat: la1, lon: lo1, .. }, Position::LatLon { lat: la2, lon: lo2, .. }) => {
                let d = geodesy::haversine_distance(la1, lo1, la2, lo2);
                assert!((d - 6000.0).abs() < 1.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn mixed_frame_point_is_invalid() {
        let p = Position::lat_lon(0.0, 0.0, 0.0);
        assert!(!p.point().is_finite());
    }
}
