//! Real-valued band layer shared by the track, ground-speed, and
//! vertical-speed axes (altitude has its own engine).
//!
//! Each axis lazily recomputes its cached intervals when marked outdated:
//! intruders are partitioned into preventive and corrective sets, the green
//! set is the intersection of the preventive bands over the alerting time
//! and the corrective bands over the lookahead time, and when that set is
//! empty the recovery search substitutes a cylinder detector and binary
//! searches the earliest time at which a green maneuver appears.

use serde::{Deserialize, Serialize};

use super::core::BandsCore;
use super::integer::Maneuver;
use super::region::BandsRegion;
use crate::detection::{CdCylinder, Detector};
use crate::geom::vect::{almost_less, to_2pi, to_pi};
use crate::interval::{Interval, IntervalSet};
use crate::state::{OwnshipState, TrafficState};

/// Axis configuration plus cached outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BandsData {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub do_recovery: bool,
    outdated: bool,
    intervals: Vec<Interval>,
    regions: Vec<BandsRegion>,
    /// -1 full red; 0 recovery not needed; otherwise seconds to recovery.
    recovery_time: f64,
}

impl BandsData {
    pub fn new(min: f64, max: f64, step: f64, recovery: bool) -> Self {
        BandsData {
            min,
            max,
            step,
            do_recovery: recovery,
            outdated: true,
            intervals: Vec::new(),
            regions: Vec::new(),
            recovery_time: 0.0,
        }
    }

    /// Drop cached outputs; the next query recomputes.
    pub fn reset(&mut self) {
        self.outdated = true;
        self.intervals.clear();
        self.regions.clear();
        self.recovery_time = 0.0;
    }

    pub fn set_min(&mut self, val: f64) {
        if val != self.min {
            self.min = val;
            self.reset();
        }
    }

    pub fn set_max(&mut self, val: f64) {
        if val != self.max {
            self.max = val;
            self.reset();
        }
    }

    pub fn set_step(&mut self, val: f64) {
        if val > 0.0 && val != self.step {
            self.step = val;
            self.reset();
        }
    }

    pub fn set_recovery(&mut self, flag: bool) {
        if flag != self.do_recovery {
            self.do_recovery = flag;
            self.reset();
        }
    }
}

/// One kinematic band axis. The provided methods implement the shared
/// recompute/recovery/query machinery; implementors wire the axis's
/// discretization into the integer engine.
pub trait KinematicAxis: Maneuver {
    fn data(&self) -> &BandsData;
    fn data_mut(&mut self) -> &mut BandsData;

    /// Green intervals for a detector pair over the window [b, t].
    fn none_bands(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> IntervalSet;

    fn any_red(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> bool;

    fn all_red(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> bool;

    /// Whether values wrap modulo 2 pi (track bands).
    fn wraps(&self) -> bool {
        false
    }

    /// True if this axis would produce any red against a single aircraft
    /// over [0, t].
    fn kinematic_conflict(&self, core: &BandsCore, t: f64, ownship: &OwnshipState, ac: &TrafficState) -> bool {
        let single = [ac.clone()];
        self.any_red(&core.detector, None, None, 0.0, t, ownship, &single)
    }

    /// Partition the traffic into (preventive, corrective) sets. An
    /// aircraft in conflict on the current trajectory within the alerting
    /// time is corrective; one that only yields red maneuver cells within
    /// the alerting time is preventive.
    fn alerting_aircraft(&self, core: &BandsCore) -> (Vec<TrafficState>, Vec<TrafficState>) {
        let mut preventive = Vec::new();
        let mut corrective = Vec::new();
        let a = core.alerting_time_eff();
        let ownship = match &core.ownship {
            Some(o) => o,
            None => return (preventive, corrective),
        };
        for ac in &core.traffic {
            let det = core.check_conflict(ac, 0.0, a);
            if det.conflict() {
                corrective.push(ac.clone());
            } else if self.kinematic_conflict(core, a, ownship, ac) {
                preventive.push(ac.clone());
            }
        }
        (preventive, corrective)
    }

    /// Identifier lists of (preventive, corrective) aircraft.
    fn alerting_aircraft_names(&self, core: &BandsCore) -> (Vec<String>, Vec<String>) {
        let (p, c) = self.alerting_aircraft(core);
        (
            p.into_iter().map(|ac| ac.id).collect(),
            c.into_iter().map(|ac| ac.id).collect(),
        )
    }

    /// Intersect preventive bands over the alerting time with corrective
    /// bands over the lookahead time.
    fn compute_none_bands(
        &self,
        core: &BandsCore,
        repac: Option<&TrafficState>,
        preventive: &[TrafficState],
        corrective: &[TrafficState],
    ) -> IntervalSet {
        let ownship = match &core.ownship {
            Some(o) => o,
            None => return IntervalSet::new(),
        };
        let mut noneset = self.none_bands(
            &core.detector,
            None,
            repac,
            0.0,
            core.alerting_time_eff(),
            ownship,
            preventive,
        );
        let noneset2 = self.none_bands(
            &core.detector,
            None,
            repac,
            0.0,
            core.lookahead,
            ownship,
            corrective,
        );
        noneset.almost_intersect(&noneset2);
        noneset
    }

    /// Recovery search: protect an NMAC floor, then binary search the
    /// earliest onset time with a green cell under a recovery cylinder that
    /// shrinks toward the floor when collision-avoidance bands are enabled.
    fn compute_recovery_bands(
        &mut self,
        noneset: &mut IntervalSet,
        core: &BandsCore,
        alerting_set: &[TrafficState],
    ) {
        let t = core.max_recovery_time_eff();
        let repac_owned = if core.recovery_crit {
            core.criteria_aircraft().cloned()
        } else {
            None
        };
        let repac = repac_owned.as_ref();
        let ownship = match &core.ownship {
            Some(o) => o.clone(),
            None => return,
        };
        let nmac = CdCylinder::nmac();
        let floor = Detector::Cylinder(nmac);
        *noneset = self.none_bands(&floor, None, repac, 0.0, t, &ownship, alerting_set);
        if noneset.is_empty() {
            // No way to kinematically escape without crossing the NMAC
            // cylinder.
            return;
        }
        let mut cd3d = CdCylinder::new(
            core.min_horizontal_recovery_eff(),
            core.min_vertical_recovery_eff(),
        );
        while cd3d.d > nmac.d || cd3d.h > nmac.h {
            let rec_det = Detector::Cylinder(cd3d);
            *noneset = self.none_bands(&rec_det, None, repac, 0.0, t, &ownship, alerting_set);
            let mut solidred = noneset.is_empty();
            if solidred && !core.ca_bands {
                return;
            }
            if !solidred {
                // Binary search the onset time of the first green cell.
                let mut pivot_red = 0.0;
                let mut pivot_green = t + 1.0;
                let mut pivot = pivot_green - 1.0;
                while pivot_green - pivot_red > 1.0 {
                    *noneset = self.none_bands(
                        &core.detector,
                        Some(&rec_det),
                        repac,
                        pivot,
                        t,
                        &ownship,
                        alerting_set,
                    );
                    if noneset.is_empty() {
                        pivot_red = pivot;
                    } else {
                        pivot_green = pivot;
                    }
                    pivot = (pivot_red + pivot_green) / 2.0;
                }
                let recovery_time = if pivot_green <= t {
                    t.min(pivot_green + core.recovery_stability_time)
                } else {
                    pivot_red
                };
                self.data_mut().recovery_time = recovery_time;
                *noneset = self.none_bands(
                    &core.detector,
                    Some(&rec_det),
                    repac,
                    recovery_time,
                    t,
                    &ownship,
                    alerting_set,
                );
                solidred = noneset.is_empty();
                if solidred {
                    self.data_mut().recovery_time = -1.0;
                }
                if !solidred || !core.ca_bands {
                    return;
                }
            }
            cd3d.d *= 0.8;
            cd3d.h *= 0.8;
        }
    }

    /// Fill the cached interval/region lists from a green set, completing
    /// the gaps so the bands cover [min, max] exactly.
    fn color_bands(&mut self, bands: &IntervalSet, greenbands: bool, nearonly: bool, recovery: bool) {
        let (min, max) = {
            let d = self.data();
            (d.min, d.max)
        };
        let data = self.data_mut();
        data.intervals.clear();
        data.regions.clear();
        let gap_region = if greenbands {
            BandsRegion::Near
        } else if recovery {
            BandsRegion::Recovery
        } else {
            BandsRegion::None
        };
        let band_region = if greenbands {
            if recovery {
                BandsRegion::Recovery
            } else {
                BandsRegion::None
            }
        } else {
            BandsRegion::Near
        };
        let add_gap = greenbands || !nearonly;
        let add_band = !greenbands || !nearonly;
        if bands.is_empty() {
            if add_gap {
                data.intervals.push(Interval::new(min, max));
                data.regions.push(gap_region);
            }
            return;
        }
        let mut l = min;
        for i in 0..bands.len() {
            let ii = bands.get(i);
            if almost_less(l, ii.low) && add_gap {
                data.intervals.push(Interval::new(l, ii.low));
                data.regions.push(gap_region);
            }
            let u = if almost_less(ii.up, max) { ii.up } else { max };
            if add_band {
                data.intervals.push(Interval::new(ii.low, u));
                data.regions.push(band_region);
            }
            l = u;
        }
        if almost_less(l, max) && add_gap {
            data.intervals.push(Interval::new(l, max));
            data.regions.push(gap_region);
        }
    }

    /// Full band computation for this axis. The altitude engine overrides
    /// this with its sweep.
    fn compute(&mut self, core: &BandsCore) {
        let (preventive, corrective) = self.alerting_aircraft(core);
        let mut alerting_set = Vec::with_capacity(preventive.len() + corrective.len());
        alerting_set.extend(preventive.iter().cloned());
        alerting_set.extend(corrective.iter().cloned());
        let mut noneset = IntervalSet::new();
        if alerting_set.is_empty() {
            let d = self.data();
            let (min, max) = (d.min, d.max);
            noneset.almost_add(min, max);
        } else {
            let repac_owned = if core.conflict_crit {
                core.criteria_aircraft().cloned()
            } else {
                None
            };
            noneset = self.compute_none_bands(core, repac_owned.as_ref(), &preventive, &corrective);
            if noneset.is_empty() {
                self.data_mut().recovery_time = -1.0;
                if self.data().do_recovery {
                    self.compute_recovery_bands(&mut noneset, core, &alerting_set);
                }
            }
        }
        let recovery = self.data().recovery_time > 0.0;
        self.color_bands(&noneset, true, core.implicit_bands, recovery);
    }

    fn recompute(&mut self, core: &BandsCore) {
        if core.has_ownship() && self.data().outdated {
            self.compute(core);
            self.data_mut().outdated = false;
        }
    }

    fn force_compute(&mut self, core: &BandsCore) {
        self.data_mut().reset();
        self.recompute(core);
    }

    fn recovery_time(&mut self, core: &BandsCore) -> f64 {
        self.recompute(core);
        self.data().recovery_time
    }

    /// Number of band intervals, or -1 when there is no ownship.
    fn bands_length(&mut self, core: &BandsCore) -> i32 {
        if !core.has_ownship() {
            return -1;
        }
        self.recompute(core);
        self.data().intervals.len() as i32
    }

    fn interval(&mut self, core: &BandsCore, i: i32) -> Interval {
        if !core.has_ownship() || i < 0 || i >= self.bands_length(core) {
            return Interval::EMPTY;
        }
        self.data().intervals[i as usize]
    }

    fn region(&mut self, core: &BandsCore, i: i32) -> BandsRegion {
        if !core.has_ownship() || i < 0 || i >= self.bands_length(core) {
            return BandsRegion::Unknown;
        }
        self.data().regions[i as usize]
    }

    /// Region containing a value, honoring implicit bands.
    fn region_of(&mut self, core: &BandsCore, val: f64) -> BandsRegion {
        let val = if self.wraps() { to_2pi(val) } else { val };
        if !core.has_ownship() || val < self.data().min || val > self.data().max {
            return BandsRegion::Unknown;
        }
        for i in 0..self.bands_length(core) {
            if self.data().intervals[i as usize].in_cc(val) {
                return self.data().regions[i as usize];
            }
        }
        if core.implicit_bands {
            if self.data().recovery_time > 0.0 {
                BandsRegion::Recovery
            } else {
                BandsRegion::None
            }
        } else {
            BandsRegion::Unknown
        }
    }

    /// True when `val` sits within `thr` of a NEAR band without being
    /// inside one.
    fn almost_near(&mut self, core: &BandsCore, val: f64, thr: f64) -> bool {
        let val = if self.wraps() { to_2pi(val) } else { val };
        if !core.has_ownship() || val < self.data().min || val > self.data().max {
            return false;
        }
        for i in 0..self.bands_length(core) {
            if self.data().regions[i as usize] == BandsRegion::Near {
                let ii = self.data().intervals[i as usize];
                let near = if self.wraps() {
                    !ii.in_oo(val)
                        && (to_pi(ii.low - val).abs() < thr || to_pi(ii.up - val).abs() < thr)
                } else {
                    (ii.low - thr < val && val <= ii.low) || (ii.up <= val && val < ii.up + thr)
                };
                if near {
                    return true;
                }
            }
        }
        false
    }
}
