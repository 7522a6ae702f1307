//! TCAS II resolution-advisory detector.
//!
//! Thresholds are looked up from a sensitivity-level table keyed off the
//! ownship altitude; the detection itself is a tau-modulated cylinder with
//! a horizontal-miss-distance filter.

use serde::{Deserialize, Serialize};

use super::horizontal;
use super::vertical;
use super::{ConflictData, LossData};
use crate::geom::vect::{almost_equals, Vect2, Vect3, Velocity};
use crate::units;

/// Per-sensitivity-level RA thresholds. Levels 3 through 8 are the flying
/// levels; levels below 3 issue no resolution advisories.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TcasTable {
    /// TAU threshold per level 3..=8, seconds.
    pub tau: [f64; 6],
    /// DMOD per level 3..=8, meters.
    pub dmod: [f64; 6],
    /// ZTHR per level 3..=8, meters.
    pub zthr: [f64; 6],
    /// Horizontal miss distance per level 3..=8, meters.
    pub hmd: [f64; 6],
}

impl TcasTable {
    /// Sensitivity level for an ownship altitude, 2..=8.
    pub fn sensitivity_level(alt: f64) -> usize {
        let alt_ft = units::to("ft", alt);
        if alt_ft < 1000.0 {
            2
        } else if alt_ft < 2350.0 {
            3
        } else if alt_ft < 5000.0 {
            4
        } else if alt_ft < 10000.0 {
            5
        } else if alt_ft < 20000.0 {
            6
        } else if alt_ft < 42000.0 {
            7
        } else {
            8
        }
    }

    fn idx(sl: usize) -> usize {
        sl.clamp(3, 8) - 3
    }

    pub fn tau(&self, sl: usize) -> f64 {
        self.tau[Self::idx(sl)]
    }

    pub fn dmod(&self, sl: usize) -> f64 {
        self.dmod[Self::idx(sl)]
    }

    pub fn zthr(&self, sl: usize) -> f64 {
        self.zthr[Self::idx(sl)]
    }

    pub fn hmd(&self, sl: usize) -> f64 {
        self.hmd[Self::idx(sl)]
    }
}

impl Default for TcasTable {
    fn default() -> Self {
        let nmi = |v: f64| units::from("nmi", v);
        let ft = |v: f64| units::from("ft", v);
        TcasTable {
            tau: [15.0, 20.0, 25.0, 30.0, 35.0, 35.0],
            dmod: [nmi(0.2), nmi(0.35), nmi(0.55), nmi(0.8), nmi(1.1), nmi(1.1)],
            zthr: [ft(600.0), ft(600.0), ft(600.0), ft(600.0), ft(700.0), ft(800.0)],
            hmd: [nmi(0.2), nmi(0.35), nmi(0.55), nmi(0.8), nmi(1.1), nmi(1.1)],
        }
    }
}

/// TCAS II RA detector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tcas3d {
    pub table: TcasTable,
}

impl Tcas3d {
    pub fn new(table: TcasTable) -> Self {
        Tcas3d { table }
    }

    fn horizontal_ra(dmod: f64, tau: f64, s: Vect2, v: Vect2) -> bool {
        if s.dot(v) >= 0.0 {
            s.norm() <= dmod
        } else {
            s.norm() <= dmod || horizontal::tau_mod(dmod, s, v) <= tau
        }
    }

    fn vertical_ra(zthr: f64, tau: f64, sz: f64, vz: f64) -> bool {
        if sz.abs() <= zthr {
            return true;
        }
        if almost_equals(vz, 0.0) || sz * vz > 0.0 {
            return false;
        }
        let tcoa = vertical::time_coalt(sz, vz);
        0.0 <= tcoa && tcoa <= tau
    }

    /// True when the ownship would have an RA against the intruder now.
    pub fn violation(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> bool {
        let sl = TcasTable::sensitivity_level(so.z);
        if sl < 3 {
            return false;
        }
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        Self::horizontal_ra(self.table.dmod(sl), self.table.tau(sl), s2, v2)
            && horizontal::dcpa(s2, v2) <= self.table.hmd(sl)
            && Self::vertical_ra(self.table.zthr(sl), self.table.tau(sl), so.z - si.z, vo.z - vi.z)
    }

    /// Time window of the horizontal RA condition: inside DMOD, or closing
    /// with modified tau at or below the threshold. The tau region always
    /// lies on the closing side of the closest point of approach, and the
    /// two pieces overlap whenever both exist, so the result is a single
    /// interval.
    fn horizontal_ra_interval(dmod: f64, tau: f64, s: Vect2, v: Vect2) -> (f64, f64) {
        const EMPTY: (f64, f64) = (f64::INFINITY, f64::NEG_INFINITY);
        let a = v.sqv();
        if a < f64::EPSILON {
            if s.norm() <= dmod {
                return (f64::NEG_INFINITY, f64::INFINITY);
            }
            return EMPTY;
        }
        let (mut tin, mut tout) = if horizontal::delta(s, v, dmod) >= 0.0 {
            (
                horizontal::theta_d(s, v, -1, dmod),
                horizontal::theta_d(s, v, 1, dmod),
            )
        } else {
            EMPTY
        };
        // Crossing times of tau_mod = tau.
        let b = 2.0 * s.dot(v) + tau * a;
        let c = s.sqv() + tau * s.dot(v) - dmod * dmod;
        let discr = b * b - 4.0 * a * c;
        if discr >= 0.0 {
            let tau_in = (-b - discr.sqrt()) / (2.0 * a);
            let tau_out = (-b + discr.sqrt()) / (2.0 * a);
            tin = tin.min(tau_in);
            tout = tout.max(tau_out);
        }
        (tin, tout)
    }

    /// RA window inside [b, t]. The sensitivity level is frozen at the
    /// ownship altitude at the start of the window.
    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        let sl = TcasTable::sensitivity_level(so.z);
        if sl < 3 {
            return ConflictData::none();
        }
        let s2 = so.vect2() - si.vect2();
        let v2 = vo.vect2() - vi.vect2();
        // Horizontal miss distance filter.
        if s2.norm() > self.table.dmod(sl) && horizontal::dcpa(s2, v2) > self.table.hmd(sl) {
            return ConflictData::none();
        }
        let (vin, vout) = vertical::vertical_wcv_interval(
            self.table.zthr(sl),
            self.table.tau(sl),
            b,
            t,
            so.z - si.z,
            vo.z - vi.z,
        );
        if vin > vout {
            return ConflictData::none();
        }
        let (hin, hout) = Self::horizontal_ra_interval(self.table.dmod(sl), self.table.tau(sl), s2, v2);
        let tin = b.max(hin).max(vin);
        let tout = t.min(hout).min(vout);
        if tin > tout {
            return ConflictData::none();
        }
        let ld = LossData::new(tin, tout);
        if !ld.conflict() {
            return ConflictData::new(ld, f64::INFINITY, f64::INFINITY);
        }
        let t_crit = horizontal::tcpa(s2, v2).clamp(ld.time_in, ld.time_out);
        let s = so - si;
        let v = vo.sub(vi).vect3();
        let dist = s
            .linear(v, t_crit)
            .cyl_norm(self.table.dmod(sl), self.table.zthr(sl));
        ConflictData::new(ld, t_crit, dist)
    }
}
