//! Track (heading) bands: constant-rate turns left and right of the
//! current track, sweeping half a circle each way.

use serde::{Deserialize, Serialize};

use super::core::BandsCore;
use super::integer::{self, Maneuver, Search};
use super::real::{BandsData, KinematicAxis};
use crate::detection::Detector;
use crate::geom::vect::{Vect3, Velocity};
use crate::interval::IntervalSet;
use crate::kinematics;
use crate::state::{OwnshipState, TrafficState};
use crate::units;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackBands {
    data: BandsData,
    /// Turn rate in rad/s; 0 means derive it from the bank angle.
    pub turn_rate: f64,
    pub bank_angle: f64,
}

impl TrackBands {
    pub fn new(step: f64, recovery: bool, turn_rate: f64, bank_angle: f64) -> Self {
        TrackBands {
            data: BandsData::new(0.0, 2.0 * std::f64::consts::PI, step, recovery),
            turn_rate,
            bank_angle,
        }
    }

    /// Effective turn rate for an ownship ground speed. The bank angle is
    /// the fallback when no rate is configured or the speed is negligible.
    fn omega(&self, gs: f64) -> f64 {
        if self.turn_rate == 0.0 || gs <= units::from("kn", 1.0) {
            kinematics::turn_rate(gs, self.bank_angle)
        } else {
            self.turn_rate
        }
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
    ) -> (Search<'a, Self>, i32) {
        let gs = ownship.velocity().gs();
        let omega = self.omega(gs);
        let maxn = (std::f64::consts::PI / self.data.step).round() as i32;
        let tstep = self.data.step / omega;
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
            maxn,
        )
    }
}

impl Maneuver for TrackBands {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity) {
        let omega = self.omega(ownship.velocity().gs());
        kinematics::turn(ownship.s(), ownship.v(), t, omega, dir)
    }
}

impl KinematicAxis for TrackBands {
    fn data(&self) -> &BandsData {
        &self.data
    }

    fn data_mut(&mut self) -> &mut BandsData {
        &mut self.data
    }

    fn wraps(&self) -> bool {
        true
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
        let trko = ownship.velocity().trk();
        let (search, maxn) = self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        let ints = search.combine(maxn, maxn);
        integer::to_interval_set_0_2pi(&ints, std::f64::consts::PI / f64::from(maxn), trko)
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
        let (search, maxn) = self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        search.any_int_red(maxn, maxn, 0)
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
        let (search, maxn) = self.search(conflict_det, recovery_det, repac, b, t, ownship, traffic);
        search.all_int_red(maxn, maxn, 0)
    }
}
