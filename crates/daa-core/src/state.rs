//! Ownship and traffic aircraft state records.
//!
//! A `TrafficState` is an immutable (id, position, velocity) value. The
//! `OwnshipState` additionally carries the East-North-Up projection anchored
//! at the ownship's own latitude/longitude (zero altitude) and its projected
//! (s, v) pair. All detector math runs in that projected frame, and traffic
//! is always projected through the ownship's projection.

use serde::{Deserialize, Serialize};

use crate::geom::geodesy::EnuProjection;
use crate::geom::position::Position;
use crate::geom::vect::{Vect3, Velocity};

/// Identifier reserved for the invalid aircraft sentinel.
pub const INVALID_ID: &str = "_NoAc_";

/// Immutable aircraft state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficState {
    pub id: String,
    pub pos: Position,
    pub vel: Velocity,
}

impl TrafficState {
    pub fn new(id: impl Into<String>, pos: Position, vel: Velocity) -> Self {
        TrafficState {
            id: id.into(),
            pos,
            vel,
        }
    }

    pub fn invalid() -> Self {
        TrafficState {
            id: INVALID_ID.to_string(),
            pos: Position::INVALID,
            vel: Velocity::INVALID,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.pos.is_valid() && self.vel.is_finite()
    }

    pub fn is_lat_lon(&self) -> bool {
        self.pos.is_lat_lon()
    }

    /// State after flying the current velocity for `offset` seconds.
    pub fn linear_projection(&self, offset: f64) -> TrafficState {
        TrafficState {
            id: self.id.clone(),
            pos: self.pos.linear(self.vel, offset),
            vel: self.vel,
        }
    }

    /// Find an aircraft by id in a traffic list.
    pub fn find<'a>(traffic: &'a [TrafficState], id: &str) -> Option<&'a TrafficState> {
        if id == INVALID_ID {
            return None;
        }
        traffic.iter().find(|ac| ac.id == id)
    }
}

/// Ownship state with the cached projection into its own local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnshipState {
    pub ac: TrafficState,
    proj: EnuProjection,
    s: Vect3,
    v: Velocity,
}

impl OwnshipState {
    pub fn new(ac: TrafficState) -> Self {
        match ac.pos {
            Position::LatLon { lat, lon, .. } => {
                let proj = EnuProjection::new(lat, lon);
                let s = match ac.pos {
                    Position::LatLon { lat, lon, alt } => proj.project(lat, lon, alt),
                    Position::Euclidean { .. } => unreachable!(),
                };
                let v = proj.project_velocity(ac.vel);
                OwnshipState { ac, proj, s, v }
            }
            Position::Euclidean { .. } => {
                let s = ac.pos.point();
                let v = ac.vel;
                OwnshipState {
                    ac,
                    proj: EnuProjection::new(0.0, 0.0),
                    s,
                    v,
                }
            }
        }
    }

    pub fn invalid() -> Self {
        OwnshipState {
            ac: TrafficState::invalid(),
            proj: EnuProjection::new(0.0, 0.0),
            s: Vect3::INVALID,
            v: Velocity::INVALID,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.ac.is_valid()
    }

    pub fn id(&self) -> &str {
        &self.ac.id
    }

    pub fn position(&self) -> Position {
        self.ac.pos
    }

    pub fn velocity(&self) -> Velocity {
        self.ac.vel
    }

    pub fn is_lat_lon(&self) -> bool {
        self.ac.is_lat_lon()
    }

    /// Ownship position in the projected frame.
    pub fn s(&self) -> Vect3 {
        self.s
    }

    /// Ownship velocity in the projected frame.
    pub fn v(&self) -> Velocity {
        self.v
    }

    /// Project any position through the ownship's frame. Mixing geodetic
    /// traffic with a Euclidean ownship yields the invalid vector, which the
    /// detectors treat as "no conflict".
    pub fn pos_to_s(&self, p: Position) -> Vect3 {
        match p {
            Position::LatLon { lat, lon, alt } => {
                if !self.ac.is_lat_lon() {
                    tracing::warn!("projecting lat/lon position through Euclidean ownship");
                    return Vect3::INVALID;
                }
                self.proj.project(lat, lon, alt)
            }
            Position::Euclidean { .. } => p.point(),
        }
    }

    pub fn vel_to_v(&self, p: Position, v: Velocity) -> Velocity {
        match p {
            Position::LatLon { .. } => {
                if !self.ac.is_lat_lon() {
                    tracing::warn!("projecting lat/lon velocity through Euclidean ownship");
                    return Velocity::INVALID;
                }
                self.proj.project_velocity(v)
            }
            Position::Euclidean { .. } => v,
        }
    }

    pub fn traffic_s(&self, ac: &TrafficState) -> Vect3 {
        self.pos_to_s(ac.pos)
    }

    pub fn traffic_v(&self, ac: &TrafficState) -> Velocity {
        self.vel_to_v(ac.pos, ac.vel)
    }

    /// Ownship after flying its current velocity for `offset` seconds.
    /// The projection is re-anchored at the new position.
    pub fn linear_projection(&self, offset: f64) -> OwnshipState {
        OwnshipState::new(self.ac.linear_projection(offset))
    }
}
