//! Maneuver guidance bands.
//!
//! `KinematicBands` computes, for each of the four maneuver axes, the
//! ranges of control values that stay conflict free (NONE), the ranges that
//! lead into a conflict (NEAR), and, when everything is red, the recovery
//! ranges (RECOVERY). Traffic aircraft are assumed not to maneuver; the
//! ownship maneuver is a single kinematic projection per cell.
//!
//! Band outputs are cached per axis and lazily recomputed: any setter that
//! could affect them marks the axes outdated.

mod alt;
mod core;
mod gs;
mod integer;
mod real;
mod region;
mod track;
mod vs;

pub use self::core::BandsCore;
pub use alt::AltBands;
pub use gs::GsBands;
pub use integer::{Maneuver, Search};
pub use real::{BandsData, KinematicAxis};
pub use region::BandsRegion;
pub use track::TrackBands;
pub use vs::VsBands;

use crate::detection::Detector;
use crate::errlog::ErrorLog;
use crate::geom::position::Position;
use crate::geom::vect::{to_2pi, Velocity};
use crate::interval::Interval;
use crate::params::Parameters;
use crate::state::{OwnshipState, TrafficState};
use crate::units;
use crate::urgency::UrgencyStrategy;

/// Kinematic bands over all four maneuver axes.
#[derive(Debug, Clone)]
pub struct KinematicBands {
    pub core: BandsCore,
    pub trk_band: TrackBands,
    pub gs_band: GsBands,
    pub vs_band: VsBands,
    pub alt_band: AltBands,
    error: ErrorLog,
}

impl KinematicBands {
    /// Bands with the given detector and default parameters. Recovery is
    /// off until parameters enable it.
    pub fn new(detector: Detector) -> Self {
        let p = Parameters::default();
        let mut bands = KinematicBands {
            core: BandsCore::new(detector),
            trk_band: TrackBands::new(p.trk_step, false, p.turn_rate, p.bank_angle),
            gs_band: GsBands::new(p.min_gs, p.max_gs, p.gs_step, false, p.horizontal_accel),
            vs_band: VsBands::new(p.min_vs, p.max_vs, p.vs_step, false, p.vertical_accel),
            alt_band: AltBands::new(p.min_alt, p.max_alt, p.alt_step, p.vertical_rate, p.vertical_accel),
            error: ErrorLog::new("KinematicBands"),
        };
        bands.core.lookahead = p.lookahead_time;
        bands.core.alerting_time = p.alerting_time;
        bands
    }

    /// Apply a full parameter block. Invalidates all cached bands.
    pub fn set_parameters(&mut self, p: &Parameters) {
        self.core.alerting_time = p.alerting_time;
        self.core.lookahead = p.lookahead_time;
        self.core.implicit_bands = p.implicit_bands;
        self.gs_band.data_mut().min = p.min_gs;
        self.gs_band.data_mut().max = p.max_gs;
        self.vs_band.data_mut().min = p.min_vs;
        self.vs_band.data_mut().max = p.max_vs;
        self.alt_band.data_mut().min = p.min_alt;
        self.alt_band.data_mut().max = p.max_alt;
        self.trk_band.data_mut().step = p.trk_step;
        self.gs_band.data_mut().step = p.gs_step;
        self.vs_band.data_mut().step = p.vs_step;
        self.alt_band.data_mut().step = p.alt_step;
        self.gs_band.horizontal_accel = p.horizontal_accel;
        self.vs_band.vertical_accel = p.vertical_accel;
        self.alt_band.vertical_accel = p.vertical_accel;
        self.trk_band.turn_rate = p.turn_rate;
        self.trk_band.bank_angle = p.bank_angle;
        self.alt_band.vertical_rate = p.vertical_rate;
        self.core.recovery_stability_time = p.recovery_stability_time;
        self.core.max_recovery_time = p.max_recovery_time;
        self.core.min_horizontal_recovery = p.min_horizontal_recovery;
        self.core.min_vertical_recovery = p.min_vertical_recovery;
        self.core.ca_bands = p.ca_bands;
        self.core.conflict_crit = p.conflict_crit;
        self.core.recovery_crit = p.recovery_crit;
        self.trk_band.data_mut().do_recovery = p.recovery_trk;
        self.gs_band.data_mut().do_recovery = p.recovery_gs;
        self.vs_band.data_mut().do_recovery = p.recovery_vs;
        self.reset();
    }

    pub fn set_ownship(&mut self, own: OwnshipState) {
        self.core.ownship = Some(own);
        self.reset();
    }

    pub fn set_ownship_state(&mut self, id: &str, p: Position, v: Velocity) {
        self.set_ownship(OwnshipState::new(TrafficState::new(id, p, v)));
    }

    pub fn add_traffic(&mut self, ac: TrafficState) {
        let Some(own) = &self.core.ownship else {
            self.error.add_error("add_traffic: set_ownship must be called before add_traffic");
            return;
        };
        if ac.is_lat_lon() != own.is_lat_lon() {
            self.error.add_error("add_traffic: inconsistent use of lat/lon and Euclidean data");
            return;
        }
        self.core.traffic.push(ac);
        self.reset();
    }

    pub fn has_ownship(&self) -> bool {
        self.core.has_ownship()
    }

    pub fn has_traffic(&self) -> bool {
        self.core.has_traffic()
    }

    pub fn traffic_size(&self) -> usize {
        self.core.traffic.len()
    }

    pub fn is_lat_lon(&self) -> bool {
        self.core.ownship.as_ref().is_some_and(|o| o.is_lat_lon())
    }

    /// Clear ownship and traffic, keeping parameters.
    pub fn clear(&mut self) {
        self.core.clear();
        self.reset();
    }

    /// Invalidate all cached band outputs.
    pub fn reset(&mut self) {
        self.trk_band.data_mut().reset();
        self.gs_band.data_mut().reset();
        self.vs_band.data_mut().reset();
        self.alt_band.data_mut().reset();
    }

    /// Designate the criterion aircraft by identifier.
    pub fn set_criteria_aircraft(&mut self, id: Option<String>) {
        self.core.criteria_ac = id;
        self.reset();
    }

    /// Designate the criterion aircraft through an urgency strategy.
    pub fn set_criteria_aircraft_by_strategy(&mut self, strat: &UrgencyStrategy) {
        let id = self.most_urgent_aircraft(strat).map(|ac| ac.id.clone());
        self.set_criteria_aircraft(id);
    }

    /// Most urgent aircraft according to a strategy, when criteria are in
    /// use.
    pub fn most_urgent_aircraft(&self, strat: &UrgencyStrategy) -> Option<&TrafficState> {
        if !(self.core.conflict_crit || self.core.recovery_crit) {
            return None;
        }
        let own = self.core.ownship.as_ref()?;
        strat.most_urgent_aircraft(
            &self.core.detector,
            own,
            &self.core.traffic,
            self.core.alerting_time_eff(),
        )
    }

    /// Replace the conflict detector (deep copy).
    pub fn set_core_detection(&mut self, det: &Detector) {
        self.core.detector = det.clone();
        self.reset();
    }

    pub fn core_detection(&self) -> &Detector {
        &self.core.detector
    }

    /// Project ownship and all traffic forward by `offset` seconds.
    pub fn linear_projection(&mut self, offset: f64) {
        if offset != 0.0 {
            if let Some(own) = self.core.ownship.take() {
                self.core.ownship = Some(own.linear_projection(offset));
            }
            for ac in &mut self.core.traffic {
                *ac = ac.linear_projection(offset);
            }
            self.reset();
        }
    }

    // Track bands

    pub fn track_length(&mut self) -> i32 {
        self.trk_band.bands_length(&self.core)
    }

    /// Track interval `i` in the given unit.
    pub fn track(&mut self, i: i32, unit: &str) -> Interval {
        let ia = self.trk_band.interval(&self.core, i);
        if ia.is_empty() {
            return ia;
        }
        Interval::new(units::to(unit, ia.low), units::to(unit, ia.up))
    }

    pub fn track_region(&mut self, i: i32) -> BandsRegion {
        self.trk_band.region(&self.core, i)
    }

    pub fn track_region_of(&mut self, trk: f64, unit: &str) -> BandsRegion {
        self.trk_band.region_of(&self.core, to_2pi(units::from(unit, trk)))
    }

    pub fn near_track_conflict(&mut self, val: f64, thr: f64) -> bool {
        self.trk_band.almost_near(&self.core, val, thr)
    }

    pub fn track_recovery_time(&mut self) -> f64 {
        self.trk_band.recovery_time(&self.core)
    }

    /// (preventive, corrective) aircraft for track bands.
    pub fn track_bands_aircraft(&self) -> (Vec<String>, Vec<String>) {
        self.trk_band.alerting_aircraft_names(&self.core)
    }

    // Ground speed bands

    pub fn ground_speed_length(&mut self) -> i32 {
        self.gs_band.bands_length(&self.core)
    }

    pub fn ground_speed(&mut self, i: i32, unit: &str) -> Interval {
        let ia = self.gs_band.interval(&self.core, i);
        if ia.is_empty() {
            return ia;
        }
        Interval::new(units::to(unit, ia.low), units::to(unit, ia.up))
    }

    pub fn ground_speed_region(&mut self, i: i32) -> BandsRegion {
        self.gs_band.region(&self.core, i)
    }

    pub fn ground_speed_region_of(&mut self, gs: f64, unit: &str) -> BandsRegion {
        self.gs_band.region_of(&self.core, units::from(unit, gs))
    }

    pub fn near_ground_speed_conflict(&mut self, val: f64, thr: f64) -> bool {
        self.gs_band.almost_near(&self.core, val, thr)
    }

    pub fn ground_speed_recovery_time(&mut self) -> f64 {
        self.gs_band.recovery_time(&self.core)
    }

    pub fn ground_speed_bands_aircraft(&self) -> (Vec<String>, Vec<String>) {
        self.gs_band.alerting_aircraft_names(&self.core)
    }

    // Vertical speed bands

    pub fn vertical_speed_length(&mut self) -> i32 {
        self.vs_band.bands_length(&self.core)
    }

    pub fn vertical_speed(&mut self, i: i32, unit: &str) -> Interval {
        let ia = self.vs_band.interval(&self.core, i);
        if ia.is_empty() {
            return ia;
        }
        Interval::new(units::to(unit, ia.low), units::to(unit, ia.up))
    }

    pub fn vertical_speed_region(&mut self, i: i32) -> BandsRegion {
        self.vs_band.region(&self.core, i)
    }

    pub fn vertical_speed_region_of(&mut self, vs: f64, unit: &str) -> BandsRegion {
        self.vs_band.region_of(&self.core, units::from(unit, vs))
    }

    pub fn near_vertical_speed_conflict(&mut self, val: f64, thr: f64) -> bool {
        self.vs_band.almost_near(&self.core, val, thr)
    }

    pub fn vertical_speed_recovery_time(&mut self) -> f64 {
        self.vs_band.recovery_time(&self.core)
    }

    pub fn vertical_speed_bands_aircraft(&self) -> (Vec<String>, Vec<String>) {
        self.vs_band.alerting_aircraft_names(&self.core)
    }

    // Altitude bands

    pub fn altitude_length(&mut self) -> i32 {
        self.alt_band.bands_length(&self.core)
    }

    pub fn altitude(&mut self, i: i32, unit: &str) -> Interval {
        let ia = self.alt_band.interval(&self.core, i);
        if ia.is_empty() {
            return ia;
        }
        Interval::new(units::to(unit, ia.low), units::to(unit, ia.up))
    }

    pub fn altitude_region(&mut self, i: i32) -> BandsRegion {
        self.alt_band.region(&self.core, i)
    }

    pub fn altitude_region_of(&mut self, alt: f64, unit: &str) -> BandsRegion {
        self.alt_band.region_of(&self.core, units::from(unit, alt))
    }

    pub fn near_altitude_conflict(&mut self, val: f64, thr: f64) -> bool {
        self.alt_band.almost_near(&self.core, val, thr)
    }

    pub fn altitude_bands_aircraft(&self) -> (Vec<String>, Vec<String>) {
        self.alt_band.alerting_aircraft_names(&self.core)
    }

    // Setters with validation; rejected values leave state unchanged and
    // record a message.

    pub fn set_lookahead_time(&mut self, t: f64) {
        if self.error.is_positive("set_lookahead_time", t) && t != self.core.lookahead {
            self.core.lookahead = t;
            self.reset();
        }
    }

    pub fn set_alerting_time(&mut self, t: f64) {
        if self.error.is_non_negative("set_alerting_time", t) && t != self.core.alerting_time {
            self.core.alerting_time = t;
            self.reset();
        }
    }

    pub fn set_max_recovery_time(&mut self, t: f64) {
        if self.error.is_non_negative("set_max_recovery_time", t) && t != self.core.max_recovery_time {
            self.core.max_recovery_time = t;
            self.reset();
        }
    }

    pub fn set_recovery_stability_time(&mut self, t: f64) {
        if self.error.is_non_negative("set_recovery_stability_time", t)
            && t != self.core.recovery_stability_time
        {
            self.core.recovery_stability_time = t;
            self.reset();
        }
    }

    pub fn set_track_step(&mut self, val: f64) {
        if self.error.is_positive("set_track_step", val)
            && self.error.is_less_than("set_track_step", val, std::f64::consts::PI)
        {
            self.trk_band.data_mut().set_step(val);
        }
    }

    pub fn set_ground_speed_step(&mut self, val: f64) {
        if self.error.is_positive("set_ground_speed_step", val) {
            self.gs_band.data_mut().set_step(val);
        }
    }

    pub fn set_vertical_speed_step(&mut self, val: f64) {
        if self.error.is_positive("set_vertical_speed_step", val) {
            self.vs_band.data_mut().set_step(val);
        }
    }

    pub fn set_altitude_step(&mut self, val: f64) {
        if self.error.is_positive("set_altitude_step", val) {
            self.alt_band.data_mut().set_step(val);
        }
    }

    /// Set a min/max range for ground speed bands; rejected if it would
    /// leave min >= max.
    pub fn set_ground_speed_range(&mut self, min: f64, max: f64) {
        if min >= max {
            self.error
                .add_error(format!("set_ground_speed_range: min {min:.4} is not below max {max:.4}"));
            return;
        }
        if self.error.is_non_negative("set_ground_speed_range", min) {
            self.gs_band.data_mut().set_min(min);
            self.gs_band.data_mut().set_max(max);
        }
    }

    pub fn set_vertical_speed_range(&mut self, min: f64, max: f64) {
        if min >= max {
            self.error
                .add_error(format!("set_vertical_speed_range: min {min:.4} is not below max {max:.4}"));
            return;
        }
        self.vs_band.data_mut().set_min(min);
        self.vs_band.data_mut().set_max(max);
    }

    pub fn set_altitude_range(&mut self, min: f64, max: f64) {
        if min >= max {
            self.error
                .add_error(format!("set_altitude_range: min {min:.4} is not below max {max:.4}"));
            return;
        }
        if self.error.is_non_negative("set_altitude_range", min) {
            self.alt_band.data_mut().set_min(min);
            self.alt_band.data_mut().set_max(max);
        }
    }

    pub fn set_recovery_bands(&mut self, flag: bool) {
        self.trk_band.data_mut().set_recovery(flag);
        self.gs_band.data_mut().set_recovery(flag);
        self.vs_band.data_mut().set_recovery(flag);
    }

    pub fn set_implicit_bands(&mut self, flag: bool) {
        if flag != self.core.implicit_bands {
            self.core.implicit_bands = flag;
            self.reset();
        }
    }

    // Error reporting

    pub fn has_error(&self) -> bool {
        self.error.has_error()
    }

    pub fn has_message(&self) -> bool {
        self.error.has_message()
    }

    pub fn get_message(&mut self) -> String {
        self.error.get_message()
    }
}
