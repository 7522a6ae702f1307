//! Alerting ladders.
//!
//! Two interchangeable strategies decide the alert level against one
//! intruder:
//!
//! - **Thresholds-based**: an ordered vector of [`AlertThresholds`], least
//!   severe first. Tiers are scanned most-severe first and the first tier
//!   whose detector fires within its alerting time and minimum duration
//!   wins.
//! - **Bands-based**: kinematic bands are computed for the single intruder;
//!   a conflict on the current trajectory yields Corrective or, when the
//!   last time to maneuver is inside the warning horizon, Warning. Without
//!   a conflict, preventive bands near the current controls yield
//!   Preventive, anything else Proximate.

use serde::{Deserialize, Serialize};

use crate::bands::{KinematicAxis, KinematicBands};
use crate::detection::{Detector, Tcas3d, TcasTable, WcvTable, WcvTaumod};
use crate::geom::vect::{Vect3, Velocity};
use crate::params::Parameters;
use crate::state::{OwnshipState, TrafficState};
use crate::units;

/// Alert levels of the bands-based ladder.
pub const ALERT_NONE: i32 = 0;
pub const ALERT_PROXIMATE: i32 = 1;
pub const ALERT_PREVENTIVE: i32 = 2;
pub const ALERT_CORRECTIVE: i32 = 3;
pub const ALERT_WARNING: i32 = 4;

/// One tier of the thresholds-based ladder: a detector plus its alerting
/// time and minimum conflict duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub detector: Detector,
    /// Alerting horizon in seconds. A zero value alerts only on current
    /// violation.
    pub alerting_time: f64,
    /// Minimum conflict duration for the tier to fire.
    pub duration_thr: f64,
}

impl AlertThresholds {
    pub fn new(detector: Detector, alerting_time: f64) -> Self {
        AlertThresholds {
            detector,
            alerting_time,
            duration_thr: 0.0,
        }
    }

    pub fn with_duration(detector: Detector, alerting_time: f64, duration_thr: f64) -> Self {
        AlertThresholds {
            detector,
            alerting_time,
            duration_thr,
        }
    }

    /// Whether this tier fires, and the conflict entry time.
    pub fn alerting(&self, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity) -> (bool, f64) {
        let det = self
            .detector
            .conflict_detection(so, vo, si, vi, 0.0, self.alerting_time);
        let mut alert = det.conflict_with(self.duration_thr);
        if self.alerting_time == 0.0 {
            alert &= det.time_in == 0.0;
        }
        (alert, det.time_in)
    }
}

/// Information about the alert that fired, written at most once per
/// alerting call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertInfo {
    pub alert_type: i32,
    /// Relative position of the intruder, projected frame.
    pub s: Vect3,
    pub vo: Velocity,
    pub vi: Velocity,
    pub time_in: f64,
}

impl AlertInfo {
    pub fn none() -> Self {
        AlertInfo {
            alert_type: 0,
            s: Vect3::ZERO,
            vo: Velocity::ZERO,
            vi: Velocity::ZERO,
            time_in: f64::INFINITY,
        }
    }

    pub fn new(alert_type: i32, so: Vect3, vo: Velocity, si: Vect3, vi: Velocity, time_in: f64) -> Self {
        AlertInfo {
            alert_type,
            s: so - si,
            vo,
            vi,
            time_in,
        }
    }
}

/// The thresholds-based ladder: tiers ordered least-severe first.
pub type Alertor = Vec<AlertThresholds>;

/// The four-tier well-clear ladder used for unbuffered DAA alerting:
/// Proximate, Preventive, Corrective, Warning.
pub fn mops() -> Alertor {
    let ft = |v: f64| units::from("ft", v);
    let nmi = |v: f64| units::from("nmi", v);
    vec![
        AlertThresholds::new(
            Detector::WcvTaumod(WcvTaumod::new(WcvTable::new(nmi(2.0), ft(1200.0), 35.0, 0.0))),
            60.0,
        ),
        AlertThresholds::new(
            Detector::WcvTaumod(WcvTaumod::new(WcvTable::new(nmi(0.66), ft(700.0), 35.0, 0.0))),
            55.0,
        ),
        AlertThresholds::new(
            Detector::WcvTaumod(WcvTaumod::new(WcvTable::new(nmi(0.66), ft(450.0), 35.0, 0.0))),
            40.0,
        ),
        AlertThresholds::new(
            Detector::WcvTaumod(WcvTaumod::new(WcvTable::new(nmi(0.66), ft(450.0), 35.0, 0.0))),
            20.0,
        ),
    ]
}

/// The four-tier TCAS-flavored ladder. Each tier protects a smaller
/// volume than the one below it: the horizontal miss distance shrinks
/// 1.5 to 1.0 to 0.75 nmi and the altitude threshold 1200 to 700 to
/// 450 ft, with a common 0.75 nmi DMOD and 35 s tau.
pub fn pt5() -> Alertor {
    let ft = |v: f64| units::from("ft", v);
    let nmi = |v: f64| units::from("nmi", v);
    let table = |hmd: f64, zthr: f64| TcasTable {
        tau: [35.0; 6],
        dmod: [nmi(0.75); 6],
        zthr: [zthr; 6],
        hmd: [hmd; 6],
    };
    vec![
        AlertThresholds::new(
            Detector::Tcas3d(Tcas3d::new(table(nmi(1.5), ft(1200.0)))),
            85.0,
        ),
        AlertThresholds::new(
            Detector::Tcas3d(Tcas3d::new(table(nmi(1.0), ft(700.0)))),
            75.0,
        ),
        AlertThresholds::new(
            Detector::Tcas3d(Tcas3d::new(table(nmi(0.75), ft(450.0)))),
            75.0,
        ),
        AlertThresholds::new(
            Detector::Tcas3d(Tcas3d::new(table(nmi(0.75), ft(450.0)))),
            25.0,
        ),
    ]
}

/// Run the thresholds ladder most-severe first. Returns the alert level
/// (0 = none) and the alert record.
pub fn thresholds_alerting(alertor: &Alertor, own: &OwnshipState, ac: &TrafficState) -> (i32, AlertInfo) {
    let so = own.s();
    let vo = own.v();
    let si = own.traffic_s(ac);
    let vi = own.traffic_v(ac);
    for i in (1..=alertor.len()).rev() {
        let (alert, time_in) = alertor[i - 1].alerting(so, vo, si, vi);
        if alert {
            return (i as i32, AlertInfo::new(i as i32, so, vo, si, vi, time_in));
        }
    }
    (ALERT_NONE, AlertInfo::none())
}

/// Last time at which every enabled axis is still entirely red when the
/// pair is projected `pivot` seconds ahead; binary searched over
/// [0, time-to-violation] with one-second resolution.
fn last_time_to_maneuver(
    detector: &Detector,
    parameters: &Parameters,
    repac: Option<&TrafficState>,
    own: &OwnshipState,
    ac: &TrafficState,
    t2v: f64,
) -> f64 {
    let mut bands = KinematicBands::new(detector.clone());
    bands.set_parameters(parameters);
    bands.set_criteria_aircraft(repac.map(|r| r.id.clone()));
    let alerting_time = parameters.alerting_time_eff();
    let mut pivot_green = 0.0;
    let mut pivot_red = t2v;
    let mut pivot = pivot_green + 1.0;
    while pivot_red - pivot_green > 1.0 {
        let op = own.linear_projection(pivot);
        let ap = ac.linear_projection(pivot);
        let aircraft = [ap];
        let all_red = (!parameters.trk_alerting
            || bands
                .trk_band
                .all_red(detector, None, None, 0.0, alerting_time, &op, &aircraft))
            && (!parameters.gs_alerting
                || bands
                    .gs_band
                    .all_red(detector, None, None, 0.0, alerting_time, &op, &aircraft))
            && (!parameters.vs_alerting
                || bands
                    .vs_band
                    .all_red(detector, None, None, 0.0, alerting_time, &op, &aircraft));
        if all_red {
            pivot_red = pivot;
        } else {
            pivot_green = pivot;
        }
        pivot = (pivot_red + pivot_green) / 2.0;
    }
    pivot_red
}

/// Run the bands-based ladder for a single intruder.
pub fn bands_alerting(
    detector: &Detector,
    parameters: &Parameters,
    own: &OwnshipState,
    ac: &TrafficState,
    repac: Option<&TrafficState>,
) -> i32 {
    let mut bands = KinematicBands::new(detector.clone());
    bands.set_parameters(parameters);
    bands.set_criteria_aircraft(repac.map(|r| r.id.clone()));
    bands.set_recovery_bands(false);
    bands.set_implicit_bands(true);
    bands.set_ownship(own.clone());
    bands.add_traffic(ac.clone());
    let no_bands = (!parameters.trk_alerting || bands.track_length() == 0)
        && (!parameters.gs_alerting || bands.ground_speed_length() == 0)
        && (!parameters.vs_alerting || bands.vertical_speed_length() == 0);
    if no_bands {
        return ALERT_NONE;
    }
    let so = own.s();
    let vo = own.v();
    let si = own.traffic_s(ac);
    let vi = own.traffic_v(ac);
    let det = detector.conflict_detection(so, vo, si, vi, 0.0, parameters.alerting_time_eff());
    if det.conflict() {
        let time2warning = if parameters.warning_when_recovery {
            last_time_to_maneuver(detector, parameters, repac, own, ac, det.time_in)
        } else {
            det.time_in
        };
        if time2warning <= parameters.time_to_warning {
            ALERT_WARNING
        } else {
            ALERT_CORRECTIVE
        }
    } else if parameters.preventive_alt < 0.0 || (so.z - si.z).abs() <= parameters.preventive_alt {
        // Preventive alerts only apply when the pair is vertically within
        // the preventive altitude threshold.
        let own_vel = own.velocity();
        let trk_near = parameters.trk_alerting
            && bands.track_length() > 0
            && (parameters.preventive_trk < 0.0
                || bands.near_track_conflict(own_vel.trk(), parameters.preventive_trk));
        let gs_near = parameters.gs_alerting
            && bands.ground_speed_length() > 0
            && (parameters.preventive_gs < 0.0
                || bands.near_ground_speed_conflict(own_vel.gs(), parameters.preventive_gs));
        let vs_near = parameters.vs_alerting
            && bands.vertical_speed_length() > 0
            && (parameters.preventive_vs < 0.0
                || bands.near_vertical_speed_conflict(own_vel.vs(), parameters.preventive_vs));
        if trk_near || gs_near || vs_near {
            ALERT_PREVENTIVE
        } else {
            ALERT_PROXIMATE
        }
    } else {
        ALERT_PROXIMATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::position::Position;

    fn own_at(gs: f64) -> OwnshipState {
        OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(0.0, 0.0, units::from("ft", 5000.0)),
            Velocity::from_trk_gs_vs(0.0, gs, 0.0),
        ))
    }

    /// Intruder placed head-on so that violation of the most severe WCV
    /// tier starts at roughly `eta` seconds.
    fn intruder_with_eta(eta: f64, own_gs: f64) -> TrafficState {
        let closure = own_gs + own_gs;
        let dthr = units::from("nmi", 0.66);
        // tau-modulated entry occurs before pure range entry; place the pair
        // so that range entry is at eta and rely on monotonicity checks only.
        let range = dthr + closure * eta;
        TrafficState::new(
            "intruder",
            Position::euclidean(0.0, range, units::from("ft", 5000.0)),
            Velocity::from_trk_gs_vs(units::from("deg", 180.0), own_gs, 0.0),
        )
    }

    #[test]
    fn ladder_scans_most_severe_first() {
        let alertor = mops();
        let own = own_at(100.0);
        // Immediate violation: every tier fires; level must be 4.
        let ac = TrafficState::new(
            "intruder",
            Position::euclidean(0.0, 300.0, units::from("ft", 5000.0)),
            Velocity::from_trk_gs_vs(units::from("deg", 180.0), 100.0, 0.0),
        );
        let (level, info) = thresholds_alerting(&alertor, &own, &ac);
        assert_eq!(level, 4);
        assert_eq!(info.alert_type, 4);
        assert_eq!(info.time_in, 0.0);
    }

    #[test]
    fn ladder_level_decreases_with_distance() {
        let alertor = mops();
        let own = own_at(100.0);
        let mut last_level = i32::MAX;
        for eta in [10.0, 45.0, 72.0, 120.0] {
            let ac = intruder_with_eta(eta, 100.0);
            let (level, _) = thresholds_alerting(&alertor, &own, &ac);
            assert!(level <= last_level, "eta {eta} level {level}");
            last_level = level;
        }
        // Far beyond every tier's alerting time: no alert.
        let ac = intruder_with_eta(2000.0, 100.0);
        let (level, info) = thresholds_alerting(&alertor, &own, &ac);
        assert_eq!(level, 0);
        assert_eq!(info.alert_type, 0);
    }

    #[test]
    fn pt5_tiers_escalate_with_vertical_separation() {
        // Head-on closure at 200 m/s with a horizontal entry near 40 s:
        // inside the first three tiers' horizons, beyond the warning
        // tier's. The vertical offset then selects the tier whose altitude
        // threshold still covers the pair.
        let alertor = pt5();
        let alt = units::from("ft", 8000.0);
        let own = OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(0.0, 0.0, alt),
            Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        ));
        let range = 15_265.0;
        for (dz_ft, expected) in [(800.0, 1), (500.0, 2), (300.0, 3)] {
            let ac = TrafficState::new(
                "intruder",
                Position::euclidean(0.0, range, alt + units::from("ft", dz_ft)),
                Velocity::from_trk_gs_vs(units::from("deg", 180.0), 100.0, 0.0),
            );
            let (level, _) = thresholds_alerting(&alertor, &own, &ac);
            assert_eq!(level, expected, "dz {dz_ft} ft");
        }
    }

    #[test]
    fn pt5_first_tier_alerts_on_wide_horizontal_misses() {
        // Co-altitude pass with a 1.2 nmi miss distance: inside the first
        // tier's 1.5 nmi HMD, outside every other tier's.
        let alertor = pt5();
        let alt = units::from("ft", 8000.0);
        let own = OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(0.0, 0.0, alt),
            Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        ));
        let ac = TrafficState::new(
            "intruder",
            Position::euclidean(units::from("nmi", 1.2), 14_000.0, alt),
            Velocity::from_trk_gs_vs(units::from("deg", 180.0), 100.0, 0.0),
        );
        let (level, _) = thresholds_alerting(&alertor, &own, &ac);
        assert_eq!(level, 1);
    }

    #[test]
    fn shrinking_a_tier_lowers_or_keeps_the_level() {
        let own = own_at(100.0);
        let ac = intruder_with_eta(30.0, 100.0);
        let full = mops();
        let (level_full, _) = thresholds_alerting(&full, &own, &ac);
        // Shrink the top tier's DTHR drastically.
        let mut shrunk = mops();
        if let Detector::WcvTaumod(ref mut w) = shrunk[3].detector {
            w.table.dthr = units::from("ft", 100.0);
            w.table.tthr = 0.0;
        }
        let (level_shrunk, _) = thresholds_alerting(&shrunk, &own, &ac);
        assert!(level_shrunk <= level_full);
    }

    #[test]
    fn bands_alerting_corrective_for_conflict() {
        let p = Parameters {
            alerting_time: 60.0,
            lookahead_time: 90.0,
            time_to_warning: 15.0,
            ..Parameters::default()
        };
        let own = own_at(100.0);
        // Range entry around 60 s puts the tau-modulated violation entry
        // near 30 s: inside the alerting time, outside the warning horizon.
        let ac = intruder_with_eta(60.0, 100.0);
        let det = Detector::default();
        let level = bands_alerting(&det, &p, &own, &ac, None);
        assert_eq!(level, ALERT_CORRECTIVE);
    }

    #[test]
    fn bands_alerting_warning_when_close() {
        let p = Parameters {
            alerting_time: 60.0,
            lookahead_time: 90.0,
            time_to_warning: 15.0,
            ..Parameters::default()
        };
        let own = own_at(100.0);
        let ac = intruder_with_eta(5.0, 100.0);
        let det = Detector::default();
        let level = bands_alerting(&det, &p, &own, &ac, None);
        assert_eq!(level, ALERT_WARNING);
    }

    #[test]
    fn bands_alerting_clear_traffic_is_none() {
        let p = Parameters::default();
        let own = own_at(100.0);
        // Far away, diverging.
        let ac = TrafficState::new(
            "intruder",
            Position::euclidean(units::from("nmi", 40.0), 0.0, units::from("ft", 5000.0)),
            Velocity::from_trk_gs_vs(units::from("deg", 90.0), 100.0, 0.0),
        );
        let det = Detector::default();
        let level = bands_alerting(&det, &p, &own, &ac, None);
        assert_eq!(level, ALERT_NONE);
    }
}
