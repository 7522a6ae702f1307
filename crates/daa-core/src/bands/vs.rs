//! Vertical-speed bands: constant vertical acceleration with track and
//! ground speed held.

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
pub struct VsBands {
    data: BandsData,
    pub vertical_accel: f64,
}

impl VsBands {
    pub fn new(min: f64, max: f64, step: f64, recovery: bool, vertical_accel: f64) -> Self {
        VsBands {
            data: BandsData::new(min, max, step, recovery),
            vertical_accel,
        }
    }

    fn extents(&self, vs: f64) -> (i32, i32) {
        let maxdown = (((vs - self.data.min) / self.data.step).ceil().max(0.0)) as i32 + 1;
        let maxup = (((self.data.max - vs) / self.data.step).ceil().max(0.0)) as i32 + 1;
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
        let vs = ownship.velocity().vs();
        let (maxdown, maxup) = self.extents(vs);
        let tstep = self.data.step / self.vertical_accel;
        let epsv = repac.map_or(0, |ac| BandsCore::epsilon_v(ownship, ac));
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
                epsh: 0,
                epsv,
            },
            maxdown,
            maxup,
        )
    }
}

impl Maneuver for VsBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let a = if dir { self.vertical_accel } else { -self.vertical_accel };
        kinematics::vs_accel(ownship.s(), ownship.v(), t, a)
    }
}

impl KinematicAxis for VsBands {
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
        let vs = ownship.velocity().vs();
        let (search, maxdown, maxup) =
            self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        let ints = search.combine(maxdown, maxup);
        integer::to_interval_set(&ints, self.data.step, vs, self.data.min, self.data.max)
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
