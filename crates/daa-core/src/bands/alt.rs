//! Altitude bands.
//!
//! Unlike the rate axes, altitude cells are level-off targets: each cell's
//! cost is the time to reach and hold that flight level, and the maneuver
//! itself can cause a loss of separation on the way. The sweep marks a cell
//! red when the level is unreachable, when the post-level-off trajectory
//! conflicts within the shifted window, or when the climb/descent crosses an
//! intruder. A constant-rate climb that hits traffic blocks every level
//! above it (and symmetrically for descent), which lets the sweep
//! short-circuit.

use serde::{Deserialize, Serialize};

use super::core::BandsCore;
use super::integer::Maneuver;
use super::real::{BandsData, KinematicAxis};
use crate::detection::Detector;
use crate::geom::vect::{almost_equals, Vect3, Velocity};
use crate::interval::{Interval, IntervalSet};
use crate::kinematics;
use crate::state::{OwnshipState, TrafficState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltBands {
    data: BandsData,
    /// Climb/descend rate for the level-off; 0 means instantaneous.
    pub vertical_rate: f64,
    pub vertical_accel: f64,
}

impl AltBands {
    pub fn new(min: f64, max: f64, step: f64, vertical_rate: f64, vertical_accel: f64) -> Self {
        AltBands {
            data: BandsData::new(min, max, step, false),
            vertical_rate,
            vertical_accel,
        }
    }

    /// Level-off targets for the endpoint sweep: every level from min up
    /// to, but not including, max.
    fn levels(&self) -> Vec<f64> {
        let d = &self.data;
        let ratio = (d.max - d.min) / d.step;
        let n = if almost_equals(ratio, ratio.round()) {
            ratio.round()
        } else {
            ratio.ceil()
        } as i64;
        (0..n).map(|i| d.min + d.step * i as f64).collect()
    }

    /// Targets for the during-maneuver sweep, which also tests leveling
    /// off at the bounds themselves.
    fn levels_inclusive(&self) -> Vec<f64> {
        let d = &self.data;
        let ratio = (d.max - d.min) / d.step;
        let n = if almost_equals(ratio, ratio.round()) {
            ratio.round()
        } else {
            ratio.floor()
        } as i64;
        (0..=n).map(|i| d.min + d.step * i as f64).collect()
    }

    /// Red cells from the level-off endpoint test: unreachable levels and
    /// levels whose post-maneuver trajectory conflicts inside the shifted
    /// window.
    fn red_bands(
        &self,
        detector: &Detector,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> IntervalSet {
        let mut redset = IntervalSet::new();
        let step = self.data.step;
        for a in self.levels() {
            let mut cell = Interval::EMPTY;
            match kinematics::vs_level_out_final(
                ownship.s(),
                ownship.v(),
                self.vertical_rate,
                a,
                self.vertical_accel,
            ) {
                None => {
                    // Cannot make this level.
                    cell = Interval::new(a - step, a + step);
                }
                Some((so_end, vo_end, t_level)) => {
                    if t_level < t {
                        for ac in traffic {
                            let vi = ownship.traffic_v(ac);
                            let si = ownship
                                .traffic_s(ac)
                                .linear(vi.vect3(), t_level);
                            if detector
                                .conflict_detection(
                                    so_end,
                                    vo_end,
                                    si,
                                    vi,
                                    (b - t_level).max(0.0),
                                    (t - t_level).max(1.0),
                                )
                                .conflict()
                            {
                                cell = Interval::new(a - step, a + step);
                                break;
                            }
                        }
                    }
                }
            }
            redset.union(cell);
        }
        if self.vertical_rate != 0.0 {
            let los = self.los_set_during_level_off(detector, 1.0, ownship, traffic, b, t, &redset);
            for iv in los.iter() {
                redset.union(*iv);
            }
        }
        redset
    }

    /// Losses of separation during the climb/descent itself, stepping the
    /// level-off profile forward in `tstep` increments. Once a constant-rate
    /// segment hits traffic, every farther level in that direction is red.
    #[allow(clippy::too_many_arguments)]
    fn los_set_during_level_off(
        &self,
        detector: &Detector,
        tstep: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
        b: f64,
        t: f64,
        conflict_set: &IntervalSet,
    ) -> IntervalSet {
        let mut los_set = IntervalSet::new();
        let step = self.data.step;
        let own_alt = ownship.s().z;
        let levels = self.levels_inclusive();

        // Upward sweep.
        let mut go_up = true;
        let mut const_up = 0.0;
        for &fl in levels.iter().filter(|&&fl| fl >= own_alt) {
            let dt = kinematics::vs_level_out_time(
                ownship.s(),
                ownship.v(),
                self.vertical_rate,
                fl,
                self.vertical_accel,
            )
            .map_or(-1.0, |x| x.min(t));
            for ac in traffic {
                let vi = ownship.traffic_v(ac);
                if !go_up || fl > self.data.max || conflict_set.contains(fl) {
                    los_set.union(Interval::new(fl - step, fl + step));
                } else {
                    let mut tt = const_up;
                    while go_up && tt <= dt {
                        let mut const_vs = false;
                        let si = ownship.traffic_s(ac).linear(vi.vect3(), tt);
                        if let Some((so_t, vo_t)) = kinematics::vs_level_out(
                            ownship.s(),
                            ownship.v(),
                            tt,
                            self.vertical_rate,
                            fl,
                            self.vertical_accel,
                        ) {
                            if almost_equals(vo_t.z, self.vertical_rate) {
                                const_up = tt;
                                const_vs = true;
                            }
                            if tt >= b && detector.violation(so_t, vo_t, si, vi) {
                                los_set.union(Interval::new(fl - step, fl + step));
                                if const_vs {
                                    go_up = false;
                                }
                            }
                        }
                        tt += tstep;
                    }
                }
            }
        }

        // Downward sweep.
        let mut go_down = true;
        let mut const_down = 0.0;
        for &fl in levels.iter().rev().filter(|&&fl| fl < own_alt) {
            let dt = kinematics::vs_level_out_time(
                ownship.s(),
                ownship.v(),
                self.vertical_rate,
                fl,
                self.vertical_accel,
            )
            .map_or(-1.0, |x| x.min(t));
            for ac in traffic {
                let vi = ownship.traffic_v(ac);
                if !go_down || fl < self.data.min || conflict_set.contains(fl) {
                    los_set.union(Interval::new(fl - step, fl + step));
                } else {
                    let mut tt = const_down;
                    while go_down && tt <= dt {
                        let mut const_vs = false;
                        let si = ownship.traffic_s(ac).linear(vi.vect3(), tt);
                        if let Some((so_t, vo_t)) = kinematics::vs_level_out(
                            ownship.s(),
                            ownship.v(),
                            tt,
                            self.vertical_rate,
                            fl,
                            self.vertical_accel,
                        ) {
                            if almost_equals(vo_t.z, -self.vertical_rate) {
                                const_down = tt;
                                const_vs = true;
                            }
                            if tt >= b && detector.violation(so_t, vo_t, si, vi) {
                                los_set.union(Interval::new(fl - step, fl + step));
                                if const_vs {
                                    go_down = false;
                                }
                            }
                        }
                        tt += tstep;
                    }
                }
            }
        }

        los_set
    }
}

impl Maneuver for AltBands {
    /// Altitude cells are level-off targets, not a single parameterized
    /// trajectory; the generic rate-axis trajectory has no meaning here.
    fn trajectory(&self, _ownship: &OwnshipState, _t: f64, _dir: bool) -> (Vect3, Velocity) {
        (Vect3::INVALID, Velocity::INVALID)
    }
}

impl KinematicAxis for AltBands {
    fn data(&self) -> &BandsData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut BandsData {
        &mut self.data
    }

    fn none_bands(
        &self,
        conflict_det: &Detector,
        _recovery_det: Option<&Detector>,
        _repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> IntervalSet {
        self.red_bands(conflict_det, b, t, ownship, traffic)
            .complement(self.data.min, self.data.max)
    }

    fn any_red(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> bool {
        let _ = (recovery_det, repac);
        !self
            .red_bands(conflict_det, b, t, ownship, traffic)
            .is_empty()
    }

    fn all_red(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> bool {
        self.none_bands(conflict_det, recovery_det, repac, b, t, ownship, traffic)
            .is_empty()
    }

    /// Altitude bands are computed from the red sweep over the full traffic
    /// list within the alerting time; there is no preventive/corrective
    /// partition and no recovery search on this axis.
    fn compute(&mut self, core: &BandsCore) {
        let ownship = match &core.ownship {
            Some(o) => o.clone(),
            None => return,
        };
        let redset = if core.traffic.is_empty() {
            IntervalSet::new()
        } else {
            self.red_bands(
                &core.detector,
                0.0,
                core.alerting_time_eff(),
                &ownship,
                &core.traffic,
            )
        };
        self.color_bands(&redset, false, core.implicit_bands, false);
    }
}
