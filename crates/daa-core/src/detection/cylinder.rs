//! Fixed-cylinder conflict detector.

use serde::{Deserialize, Serialize};

use super::horizontal;
use super::vertical;
use super::{ConflictData, LossData};
use crate::geom::vect::{Vect3, Velocity};
use crate::units;

/// Conflict detector for a cylinder of radius `d` and half-height `h`
/// centered on the intruder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdCylinder {
    pub d: f64,
    pub h: f64,
}

impl CdCylinder {
    pub fn new(d: f64, h: f64) -> Self {
        CdCylinder { d, h }
    }

    /// The NMAC cylinder: the collision-avoidance floor.
    pub fn nmac() -> Self {
        CdCylinder {
            d: units::from("ft", 500.0),
            h: units::from("ft", 100.0),
        }
    }

    pub fn violation(&self, so: Vect3, _vo: Velocity, si: Vect3, _vi: Velocity) -> bool {
        let s = so - si;
        s.vect2().norm() < self.d && s.z.abs() < self.h
    }

    /// Straight-line entry/exit into the cylinder, clipped to [b, t].
    pub fn detection(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity, b: f64, t: f64) -> LossData {
        let s = so - si;
        let v = vo.sub(vi).vect3();
        let s2 = s.vect2();
        let v2 = v.vect2();

        let (hin, hout) = if v2.sqv() < f64::EPSILON {
            // parallel tracks: constant horizontal range
            if s2.norm() < self.d {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return LossData::none();
            }
        } else {
            if horizontal::delta(s2, v2, self.d) < 0.0 {
                return LossData::none();
            }
            (
                horizontal::theta_d(s2, v2, -1, self.d),
                horizontal::theta_d(s2, v2, 1, self.d),
            )
        };

        let (vin, vout) = if v.z.abs() < f64::EPSILON {
            if s.z.abs() < self.h {
                (f64::NEG_INFINITY, f64::INFINITY)
            } else {
                return LossData::none();
            }
        } else {
            (
                vertical::theta_h(s.z, v.z, -1, self.h),
                vertical::theta_h(s.z, v.z, 1, self.h),
            )
        };

        let tin = b.max(hin).max(vin);
        let tout = t.min(hout).min(vout);
        if tin > tout {
            return LossData::none();
        }
        LossData::new(tin, tout)
    }

    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let ld = self.detection(so, vo, si, vi, b, t);
        if !ld.conflict() {
            return ConflictData::new(ld, f64::INFINITY, f64::INFINITY);
        }
        let s = so - si;
        let v = vo.sub(vi).vect3();
        let t_crit = horizontal::tcpa(s.vect2(), v.vect2()).clamp(ld.time_in, ld.time_out);
        let at_crit = s.linear(v, t_crit);
        ConflictData::new(ld, t_crit, at_crit.cyl_norm(self.d, self.h))
    }
}

impl Default for CdCylinder {
    fn default() -> Self {
        CdCylinder {
            d: units::from("nmi", 5.0),
            h: units::from("ft", 1000.0),
        }
    }
}
