//! Shared state for the band engines: ownship, traffic, detector, and the
//! band-relevant slice of the parameter block.

use crate::criteria;
use crate::detection::{CdCylinder, ConflictData, Detector, TcasTable};
use crate::state::{OwnshipState, TrafficState};

/// Everything a band computation needs besides the per-axis configuration.
///
/// The core owns its detector; assigning one always clones, so no two band
/// instances ever share a live detector.
#[derive(Debug, Clone)]
pub struct BandsCore {
    pub ownship: Option<OwnshipState>,
    pub traffic: Vec<TrafficState>,
    pub detector: Detector,
    /// Only conflict bands are reported; everything else is implicit.
    pub implicit_bands: bool,
    /// Outer time horizon for conflict search, seconds.
    pub lookahead: f64,
    /// Inner horizon for alerting; 0 means use the lookahead.
    pub alerting_time: f64,
    /// Horizon for the recovery search; 0 means use the lookahead.
    pub max_recovery_time: f64,
    /// Recovery time is reported at first green plus this margin.
    pub recovery_stability_time: f64,
    /// Identifier of the most urgent aircraft driving the repulsive criteria.
    pub criteria_ac: Option<String>,
    pub conflict_crit: bool,
    pub recovery_crit: bool,
    /// Horizontal distance protected during recovery; 0 means use the TCAS
    /// RA horizontal miss distance for the ownship's sensitivity level.
    pub min_horizontal_recovery: f64,
    /// Vertical distance protected during recovery; 0 means TCAS RA ZTHR.
    pub min_vertical_recovery: f64,
    /// Keep shrinking the recovery volume toward the NMAC floor.
    pub ca_bands: bool,
}

impl BandsCore {
    pub fn new(detector: Detector) -> Self {
        BandsCore {
            ownship: None,
            traffic: Vec::new(),
            detector,
            implicit_bands: false,
            lookahead: 180.0,
            alerting_time: 0.0,
            max_recovery_time: 0.0,
            recovery_stability_time: 2.0,
            criteria_ac: None,
            conflict_crit: false,
            recovery_crit: false,
            min_horizontal_recovery: 0.0,
            min_vertical_recovery: 0.0,
            ca_bands: false,
        }
    }

    pub fn clear(&mut self) {
        self.ownship = None;
        self.traffic.clear();
    }

    pub fn has_ownship(&self) -> bool {
        self.ownship.as_ref().is_some_and(|o| o.is_valid())
    }

    pub fn has_traffic(&self) -> bool {
        !self.traffic.is_empty()
    }

    /// Effective alerting time: the configured value, or the lookahead when
    /// unset.
    pub fn alerting_time_eff(&self) -> f64 {
        if self.alerting_time > 0.0 {
            self.alerting_time
        } else {
            self.lookahead
        }
    }

    /// Effective maximum recovery time.
    pub fn max_recovery_time_eff(&self) -> f64 {
        if self.max_recovery_time > 0.0 {
            self.max_recovery_time
        } else {
            self.lookahead
        }
    }

    fn ra_sensitivity_level(&self) -> usize {
        match &self.ownship {
            Some(own) => TcasTable::sensitivity_level(own.position().alt()).max(3),
            None => 3,
        }
    }

    /// Effective minimum horizontal separation protected by recovery bands.
    pub fn min_horizontal_recovery_eff(&self) -> f64 {
        if self.min_horizontal_recovery > 0.0 {
            return self.min_horizontal_recovery;
        }
        TcasTable::default().hmd(self.ra_sensitivity_level())
    }

    /// Effective minimum vertical separation protected by recovery bands.
    pub fn min_vertical_recovery_eff(&self) -> f64 {
        if self.min_vertical_recovery > 0.0 {
            return self.min_vertical_recovery;
        }
        TcasTable::default().zthr(self.ra_sensitivity_level())
    }

    /// The criterion aircraft, when it exists in the traffic list. A
    /// designated aircraft that is not present degrades silently to
    /// no-criterion.
    pub fn criteria_aircraft(&self) -> Option<&TrafficState> {
        let id = self.criteria_ac.as_deref()?;
        TrafficState::find(&self.traffic, id)
    }

    /// True if the pair is in violation at the current time.
    pub fn check_violation(&self, ac: &TrafficState) -> bool {
        match &self.ownship {
            Some(own) => self.detector.violation(
                own.s(),
                own.v(),
                own.traffic_s(ac),
                own.traffic_v(ac),
            ),
            None => false,
        }
    }

    /// Loss-of-separation window against one aircraft over [b, t].
    pub fn check_conflict(&self, ac: &TrafficState, b: f64, t: f64) -> ConflictData {
        match &self.ownship {
            Some(own) => self.detector.conflict_detection(
                own.s(),
                own.v(),
                own.traffic_s(ac),
                own.traffic_v(ac),
                b,
                t,
            ),
            None => ConflictData::none(),
        }
    }

    /// Horizontal coordination sign for the pair (ownship, ac).
    pub fn epsilon_h(ownship: &OwnshipState, ac: &TrafficState) -> i32 {
        let s = (ownship.s() - ownship.traffic_s(ac)).vect2();
        let v = (ownship.v().sub(ownship.traffic_v(ac))).vect2();
        criteria::horizontal_coordination(s, v)
    }

    /// Vertical coordination sign for the pair (ownship, ac).
    pub fn epsilon_v(ownship: &OwnshipState, ac: &TrafficState) -> i32 {
        let s = ownship.s() - ownship.traffic_s(ac);
        criteria::vertical_coordination(s, ownship.id(), &ac.id)
    }

    /// The NMAC cylinder used as the recovery floor.
    pub fn nmac_cylinder() -> CdCylinder {
        CdCylinder::nmac()
    }
}
