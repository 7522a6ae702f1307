//! Ground-speed bands: constant horizontal acceleration along the current
//! track, down to the configured minimum and up to the maximum speed.

use serde::{Deserialize, Serialize};

use super::core::BandsCore;
use super::integer::{self, Maneuver, Search};
use super::real::{BandsData, KinematicAxis};
use crate::detection::Detector;
use crate::geom::vect::{Vect3, Velocity};
use crate::interval::IntervalSet;
use crate::kinematics;
use crate::state::{OwnshipState, TrafficState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsBands {
    data: BandsData,
    pub horizontal_accel: f64,
}

impl GsBands {
    pub fn new(min: f64, max: f64, step: f64, recovery: bool, horizontal_accel: f64) -> Self {
        GsBands {
            data: BandsData::new(min, max, step, recovery),
            horizontal_accel,
        }
    }

    fn extents(&self, gs: f64) -> (i32, i32) {
        let maxdown = (((gs - self.data.min) / self.data.step).ceil().max(0.0)) as i32 + 1;
        let maxup = (((self.data.max - gs) / self.data.step).ceil().max(0.0)) as i32 + 1;
        (maxdown, maxup)
    }

    fn search<'a>(
        &'a self,
        conflict_det: &'a Detector,
        recovery_det: Option<&'a Detector>,
        repac: Option<&'a TrafficState>,
        b: f64,
        t: f64,
        ownship: &'a OwnshipState,
        traffic: &'a [TrafficState],
    ) -> (Search<'a, Self>, i32, i32) {
        let gs = ownship.velocity().gs();
        let (maxdown, maxup) = self.extents(gs);
        let tstep = self.data.step / self.horizontal_accel;
        let epsh = repac.map_or(0, |ac| BandsCore::epsilon_h(ownship, ac));
        (
            Search {
                maneuver: self,
                conflict_det,
                recovery_det,
                tstep,
                b,
                t,
                b2: 0.0,
                t2: b,
                ownship,
                traffic,
                repac,
                epsh,
                epsv: 0,
            },
            maxdown,
            maxup,
        )
    }
}

impl Maneuver for GsBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let a = if dir { self.horizontal_accel } else { -self.horizontal_accel };
        kinematics::gs_accel(ownship.s(), ownship.v(), t, a)
    }
}

impl KinematicAxis for GsBands {
    fn data(&self) -> &BandsData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut BandsData {
        &mut self.data
    }

    fn none_bands(
        &self,
        conflict_det: &Detector,
        recovery_det: Option<&Detector>,
        repac: Option<&TrafficState>,
        b: f64,
        t: f64,
        ownship: &OwnshipState,
        traffic: &[TrafficState],
    ) -> IntervalSet {
        let gs = ownship.velocity().gs();
        let (search, maxdown, maxup) =
            self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        let ints = search.combine(maxdown, maxup);
        integer::to_interval_set(&ints, self.data.step, gs, self.data.min, self.data.max)
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
        let (search, maxdown, maxup) =
            self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        search.any_int_red(maxdown, maxup, 0)
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
        let (search, maxdown, maxup) =
            self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        search.all_int_red(maxdown, maxup, 0)
    }
}
