//! Well-clear volume with modified-tau time modulation.
//!
//! A pair is in well-clear violation when the horizontal range is inside
//! DTHR, or the pair is converging with modified tau within TTHR and a
//! horizontal miss distance inside DTHR; vertically, inside ZTHR or closing
//! to co-altitude within TCOA.

use serde::{Deserialize, Serialize};

use super::horizontal;
use super::vertical;
use super::{ConflictData, LossData};
use crate::geom::vect::{almost_equals, Vect2, Vect3, Velocity};
use crate::units;

/// Well-clear thresholds (distance, altitude, time, co-altitude time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WcvTable {
    pub dthr: f64,
    pub zthr: f64,
    pub tthr: f64,
    pub tcoa: f64,
}

impl WcvTable {
    pub fn new(dthr: f64, zthr: f64, tthr: f64, tcoa: f64) -> Self {
        WcvTable { dthr, zthr, tthr, tcoa }
    }

    /// Buffered well-clear thresholds.
    pub fn buffered() -> Self {
        WcvTable {
            dthr: units::from("ft", 6000.0),
            zthr: units::from("ft", 475.0),
            tthr: 30.0,
            tcoa: 20.0,
        }
    }
}

impl Default for WcvTable {
    fn default() -> Self {
        WcvTable {
            dthr: units::from("ft", 4000.0),
            zthr: units::from("ft", 450.0),
            tthr: 35.0,
            tcoa: 0.0,
        }
    }
}

/// Well-clear detector with modified-tau horizontal entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WcvTaumod {
    pub table: WcvTable,
}

impl WcvTaumod {
    pub fn new(table: WcvTable) -> Self {
        WcvTaumod { table }
    }

    /// Horizontal time variable: modified tau against DTHR.
    fn horizontal_tvar(&self, s: Vect2, v: Vect2) -> f64 {
        horizontal::tau_mod(self.table.dthr, s, v)
    }

    /// Instantaneous horizontal well-clear violation.
    pub fn horizontal_wcv(&self, s: Vect2, v: Vect2) -> bool {
        if s.norm() <= self.table.dthr {
            return true;
        }
        if horizontal::dcpa(s, v) <= self.table.dthr {
            let tvar = self.horizontal_tvar(s, v);
            return 0.0 <= tvar && tvar <= self.table.tthr;
        }
        false
    }

    pub fn violation(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> bool {
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        self.horizontal_wcv(s2, v2)
            && vertical::vertical_wcv(self.table.zthr, self.table.tcoa, so.z - si.z, vo.z - vi.z)
    }

    /// Horizontal well-clear interval over [0, t] for relative state (s, v).
    ///
    /// Entry is the earlier root of the tau-modulated quadratic; exit is the
    /// geometric exit from the DTHR disk.
    fn horizontal_wcv_interval(&self, t: f64, s: Vect2, v: Vect2) -> LossData {
        let mut time_in = t;
        let mut time_out = 0.0;

        let sqs = s.sqv();
        let sdotv = s.dot(v);
        let sq_d = self.table.dthr * self.table.dthr;
        let a = v.sqv();
        let b = 2.0 * sdotv + self.table.tthr * a;
        let c = sqs + self.table.tthr * sdotv - sq_d;

        if almost_equals(a, 0.0) {
            // constant horizontal range
            if sqs <= sq_d {
                return LossData::new(0.0, t);
            }
            return LossData::new(time_in, time_out);
        }
        if sqs <= sq_d {
            return LossData::new(0.0, t.min(horizontal::theta_d(s, v, 1, self.table.dthr)));
        }
        let discr = b * b - 4.0 * a * c;
        if sdotv >= 0.0 || discr < 0.0 {
            return LossData::new(time_in, time_out);
        }
        let tau_in = (-b - discr.sqrt()) / (2.0 * a);
        if horizontal::delta(s, v, self.table.dthr) >= 0.0 && tau_in <= t {
            time_in = tau_in.max(0.0);
            time_out = t.min(horizontal::theta_d(s, v, 1, self.table.dthr));
        }
        LossData::new(time_in, time_out)
    }

    /// Smallest well-clear violation window inside [b, t].
    pub fn wcv_interval(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity, b: f64, t: f64) -> LossData {
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        let sz = so.z - si.z;
        let vz = vo.z - vi.z;

        let (vtin, vtout) = vertical::vertical_wcv_interval(self.table.zthr, self.table.tcoa, b, t, sz, vz);
        if vtin > vtout {
            return LossData::none();
        }
        let step = v2.scal_add(vtin, s2);
        if almost_equals(vtin, vtout) {
            if self.horizontal_wcv(step, v2) {
                return LossData::new(vtin, vtout);
            }
            return LossData::none();
        }
        let ld = self.horizontal_wcv_interval(vtout - vtin, step, v2);
        if ld.time_in > ld.time_out {
            return LossData::none();
        }
        LossData::new(ld.time_in + vtin, ld.time_out + vtin)
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
        let ld = self.wcv_interval(so, vo, si, vi, b, t);
        if !ld.conflict() {
            return ConflictData::new(ld, f64::INFINITY, f64::INFINITY);
        }
        let t_tca = (ld.time_in + ld.time_out) / 2.0;
        let s = so - si;
        let v = vo.sub(vi).vect3();
        let dist_tca = s.linear(v, t_tca).cyl_norm(self.table.dthr, self.table.zthr);
        ConflictData::new(ld, t_tca, dist_tca)
    }
}
