//! Conflict detectors.
//!
//! A detector decides, for a straight-line ownship/intruder pair in the
//! projected frame, whether the pair is in violation right now and the time
//! window of loss of separation over a horizon [B, T]. Three variants:
//!
//! - [`CdCylinder`]: fixed cylinder of radius D and half-height H;
//! - [`WcvTaumod`]: the time-varying well-clear volume with modified-tau
//!   horizontal entry;
//! - [`Tcas3d`]: TCAS II resolution-advisory thresholds keyed off the
//!   ownship altitude through a sensitivity-level table.
//!
//! All variants clip the loss interval to [B, T], collapse zero-length
//! intervals, and answer "no conflict" for malformed input.

mod cylinder;
mod horizontal;
mod tcas;
mod vertical;
mod wcv;

pub use cylinder::CdCylinder;
pub use tcas::{Tcas3d, TcasTable};
pub use wcv::{WcvTable, WcvTaumod};

use serde::{Deserialize, Serialize};

use crate::geom::vect::{almost_equals, Vect3, Velocity};

/// Time interval of loss of separation. No conflict is represented by
/// `time_in > time_out` (the canonical sentinel being +inf/-inf).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossData {
    pub time_in: f64,
    pub time_out: f64,
}

impl LossData {
    /// Build a loss interval, snapping almost-equal bounds together to
    /// suppress spurious zero-length conflicts.
    pub fn new(time_in: f64, time_out: f64) -> Self {
        if almost_equals(time_in, time_out) {
            LossData {
                time_in: time_out,
                time_out,
            }
        } else {
            LossData { time_in, time_out }
        }
    }

    pub fn none() -> Self {
        LossData {
            time_in: f64::INFINITY,
            time_out: f64::NEG_INFINITY,
        }
    }

    pub fn conflict(&self) -> bool {
        self.time_in < self.time_out
    }

    /// Conflict lasting longer than a duration threshold.
    pub fn conflict_with(&self, thr: f64) -> bool {
        self.conflict() && self.time_out - self.time_in > thr
    }
}

/// Loss interval plus the critical point of the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConflictData {
    pub time_in: f64,
    pub time_out: f64,
    /// Relative time of the critical point.
    pub time_crit: f64,
    /// Scaled distance at the critical point; 0 is most severe.
    pub dist_crit: f64,
}

impl ConflictData {
    pub fn new(loss: LossData, time_crit: f64, dist_crit: f64) -> Self {
        ConflictData {
            time_in: loss.time_in,
            time_out: loss.time_out,
            time_crit,
            dist_crit,
        }
    }

    pub fn none() -> Self {
        ConflictData {
            time_in: f64::INFINITY,
            time_out: f64::NEG_INFINITY,
            time_crit: f64::INFINITY,
            dist_crit: f64::INFINITY,
        }
    }

    pub fn loss(&self) -> LossData {
        LossData {
            time_in: self.time_in,
            time_out: self.time_out,
        }
    }

    pub fn conflict(&self) -> bool {
        self.time_in < self.time_out
    }

    pub fn conflict_with(&self, thr: f64) -> bool {
        self.conflict() && self.time_out - self.time_in > thr
    }
}

impl std::fmt::Display for ConflictData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[time_in: {:.2}, time_out: {:.2}] [time_crit: {:.2}, dist_crit: {:.2}]",
            self.time_in, self.time_out, self.time_crit, self.dist_crit
        )
    }
}

/// The pluggable conflict detector. Copy semantics are plain `Clone`;
/// equality compares variant tags and threshold payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "detector", rename_all = "snake_case")]
pub enum Detector {
    Cylinder(CdCylinder),
    WcvTaumod(WcvTaumod),
    Tcas3d(Tcas3d),
}

impl Detector {
    /// Short identity string for logs and capability-mismatch warnings.
    pub fn name(&self) -> &'static str {
        match self {
            Detector::Cylinder(_) => "CDCylinder",
            Detector::WcvTaumod(_) => "WCV_TAUMOD",
            Detector::Tcas3d(_) => "TCAS3D",
        }
    }

    /// Instantaneous violation predicate.
    pub fn violation(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> bool {
        if !valid_inputs(so, vo, si, vi) {
            return false;
        }
        match self {
            Detector::Cylinder(d) => d.violation(so, vo, si, vi),
            Detector::WcvTaumod(d) => d.violation(so, vo, si, vi),
            Detector::Tcas3d(d) => d.violation(so, vo, si, vi),
        }
    }

    /// Loss-of-separation window within [b, t], with critical point.
    pub fn conflict_detection(
        &self,
        so: Vect3,
        vo: Velocity,
        si: Vect3,
        vi: Velocity,
        b: f64,
        t: f64,
    ) -> ConflictData {
        if !valid_inputs(so, vo, si, vi) || !b.is_finite() || !t.is_finite() || b > t {
            return ConflictData::none();
        }
        match self {
            Detector::Cylinder(d) => d.conflict_detection(so, vo, si, vi, b, t),
            Detector::WcvTaumod(d) => d.conflict_detection(so, vo, si, vi, b, t),
            Detector::Tcas3d(d) => d.conflict_detection(so, vo, si, vi, b, t),
        }
    }

    /// Whether a conflict exists within [b, t].
    pub fn conflict(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity, b: f64, t: f64) -> bool {
        self.conflict_detection(so, vo, si, vi, b, t).conflict()
    }
}

impl Default for Detector {
    fn default() -> Self {
        Detector::WcvTaumod(WcvTaumod::default())
    }
}

impl std::fmt::Display for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Detector::Cylinder(d) => write!(f, "CDCylinder: {{D = {:.4} [m], H = {:.4} [m]}}", d.d, d.h),
            Detector::WcvTaumod(d) => write!(
                f,
                "WCV_TAUMOD: {{DTHR = {:.4} [m], ZTHR = {:.4} [m], TTHR = {:.4} [s], TCOA = {:.4} [s]}}",
                d.table.dthr, d.table.zthr, d.table.tthr, d.table.tcoa
            ),
            Detector::Tcas3d(_) => write!(f, "TCAS3D: {{RA table}}"),
        }
    }
}

fn valid_inputs(so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> bool {
    so.is_finite() && vo.is_finite() && si.is_finite() && vi.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loss_data_snaps_equal_bounds() {
        let ld = LossData::new(10.0, 10.0 + 1e-12);
        assert_eq!(ld.time_in, ld.time_out);
        assert!(!ld.conflict());
    }

    #[test]
    fn invalid_input_is_no_conflict() {
        let det = Detector::default();
        let cd = det.conflict_detection(
            Vect3::INVALID,
            Velocity::ZERO,
            Vect3::ZERO,
            Velocity::ZERO,
            0.0,
            100.0,
        );
        assert!(!cd.conflict());
        assert!(cd.time_in > cd.time_out);
    }

    #[test]
    fn conflict_data_display_is_not_recursive() {
        let cd = ConflictData::new(LossData::new(1.0, 5.0), 3.0, 0.5);
        let s = format!("{}", cd);
        assert!(s.contains("time_in"));
        assert!(s.contains("dist_crit"));
    }
}
