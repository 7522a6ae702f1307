//! Top-level detect-and-avoid interface.
//!
//! A `Daidalus` instance owns the aircraft list (ownship at index 0), the
//! wind vector, the parameter block, the state detector, and the alerting
//! ladder. Velocities supplied by callers are ground velocities; the wind
//! vector is subtracted on entry so that all internal state is
//! wind-relative, and setting the wind after aircraft are loaded re-derives
//! every aircraft's air velocity so ground tracks are preserved.

use crate::alerting::{self, AlertInfo, Alertor};
use crate::bands::KinematicBands;
use crate::detection::{CdCylinder, ConflictData, Detector, WcvTaumod, WcvTable};
use crate::errlog::ErrorLog;
use crate::geom::position::Position;
use crate::geom::vect::Velocity;
use crate::params::Parameters;
use crate::pvs;
use crate::state::{OwnshipState, TrafficState};
use crate::units;
use crate::urgency::UrgencyStrategy;

pub const VERSION: &str = "0.1.0";

pub struct Daidalus {
    acs: Vec<TrafficState>,
    times: Vec<f64>,
    wind_vector: Velocity,
    alertor: Alertor,
    info: AlertInfo,
    detector: Detector,
    urgency_strategy: UrgencyStrategy,
    pub parameters: Parameters,
    error: ErrorLog,
}

impl Default for Daidalus {
    fn default() -> Self {
        Daidalus::new()
    }
}

impl Daidalus {
    /// A new instance with the default well-clear detector, the MOPS
    /// alerting ladder, and no aircraft or wind.
    pub fn new() -> Self {
        Daidalus {
            acs: Vec::new(),
            times: Vec::new(),
            wind_vector: Velocity::ZERO,
            alertor: alerting::mops(),
            info: AlertInfo::none(),
            detector: Detector::WcvTaumod(WcvTaumod::default()),
            urgency_strategy: UrgencyStrategy::None,
            parameters: Parameters::default(),
            error: ErrorLog::new("Daidalus"),
        }
    }

    /// A new instance with a specific state detector; the parameter block
    /// picks up the detector's thresholds.
    pub fn with_detector(detector: Detector) -> Self {
        let mut daa = Daidalus::new();
        daa.detector = detector;
        daa.set_parameters_from_detector();
        daa
    }

    fn set_parameters_from_detector(&mut self) {
        match &self.detector {
            Detector::WcvTaumod(w) => {
                self.parameters.dthr = w.table.dthr;
                self.parameters.zthr = w.table.zthr;
                self.parameters.tthr = w.table.tthr;
                self.parameters.tcoa = w.table.tcoa;
            }
            Detector::Cylinder(c) => {
                self.parameters.d = c.d;
                self.parameters.h = c.h;
            }
            Detector::Tcas3d(_) => {}
        }
    }

    fn set_detector_from_parameters(&mut self) {
        match &mut self.detector {
            Detector::WcvTaumod(w) => {
                w.table.dthr = self.parameters.dthr;
                w.table.zthr = self.parameters.zthr;
                w.table.tthr = self.parameters.tthr;
                w.table.tcoa = self.parameters.tcoa;
            }
            Detector::Cylinder(c) => {
                c.d = self.parameters.d;
                c.h = self.parameters.h;
            }
            Detector::Tcas3d(_) => {}
        }
    }

    /// Nominal-A configuration: unbuffered well-clear volume with a
    /// 1.5 deg/s turn rate.
    pub fn set_nominal_a(&mut self) {
        self.detector = Detector::WcvTaumod(WcvTaumod::default());
        self.set_parameters_from_detector();
        self.parameters.turn_rate = units::from("deg/s", 1.5);
        self.alertor = alerting::mops();
    }

    /// Nominal-B configuration: buffered well-clear volume with a
    /// 3.0 deg/s turn rate.
    pub fn set_nominal_b(&mut self) {
        self.detector = Detector::WcvTaumod(WcvTaumod::new(WcvTable::buffered()));
        self.set_parameters_from_detector();
        self.parameters.turn_rate = units::from("deg/s", 3.0);
        self.alertor = alerting::mops();
    }

    // Aircraft list

    pub fn aircraft_list(&self) -> &[TrafficState] {
        &self.acs
    }

    pub fn number_of_aircraft(&self) -> usize {
        self.acs.len()
    }

    /// Index of the last traffic aircraft.
    pub fn last_traffic_index(&self) -> i32 {
        self.acs.len() as i32 - 1
    }

    pub fn aircraft_name(&mut self, i: usize) -> String {
        if i >= self.acs.len() {
            self.error.add_error(format!("aircraft_name: invalid index {i}"));
            return TrafficState::invalid().id;
        }
        self.acs[i].id.clone()
    }

    /// Index of the aircraft with the given name, or -1.
    pub fn aircraft_index(&self, name: &str) -> i32 {
        self.acs
            .iter()
            .position(|ac| ac.id == name)
            .map_or(-1, |i| i as i32)
    }

    /// Clear aircraft, current time, and wind.
    pub fn reset(&mut self) {
        self.acs.clear();
        self.times.clear();
        self.wind_vector = Velocity::ZERO;
    }

    /// Replace the aircraft list at a given time. The first element is the
    /// ownship.
    pub fn set_aircraft_list(&mut self, list: Vec<TrafficState>, time: f64) {
        self.reset();
        for ac in list {
            self.acs.push(ac);
            self.times.push(time);
        }
    }

    /// Current time: the timestamp of the ownship.
    pub fn current_time(&self) -> f64 {
        self.times.first().copied().unwrap_or(0.0)
    }

    /// Clear all aircraft and set the ownship state. The supplied velocity
    /// is a ground velocity.
    pub fn set_ownship_state(&mut self, id: &str, pos: Position, vel: Velocity, time: f64) {
        self.acs.clear();
        self.times.clear();
        self.acs.push(TrafficState::new(id, pos, vel.sub(self.wind_vector)));
        self.times.push(time);
    }

    /// Add a traffic state with a ground velocity at a given time. A state
    /// at a different time is linearly projected to the current time using
    /// its wind-relative velocity. The first aircraft added becomes the
    /// ownship. Returns the aircraft index.
    pub fn add_traffic_state(&mut self, id: &str, pos: Position, vel: Velocity, time: f64) -> usize {
        if self.acs.is_empty() {
            self.set_ownship_state(id, pos, vel, time);
            return 0;
        }
        let dt = self.current_time() - time;
        let vt = vel.sub(self.wind_vector);
        let pt = pos.linear(vt, dt);
        self.acs.push(TrafficState::new(id, pt, vt));
        self.times.push(time);
        self.acs.len() - 1
    }

    /// Add a traffic state at the current time.
    pub fn add_traffic(&mut self, id: &str, pos: Position, vel: Velocity) -> usize {
        self.add_traffic_state(id, pos, vel, self.current_time())
    }

    /// Exchange the ownship with the aircraft at index `i`, re-projecting
    /// every aircraft to the new ownship's time.
    pub fn reset_ownship(&mut self, i: usize) {
        if i == 0 || i >= self.acs.len() {
            return;
        }
        self.acs.swap(0, i);
        self.times.swap(0, i);
        let old_time0 = self.times[i];
        if self.times[0] != old_time0 {
            let dt = self.current_time() - old_time0;
            for ac in &mut self.acs {
                *ac = ac.linear_projection(dt);
            }
        }
    }

    // Wind

    pub fn wind_field(&self) -> Velocity {
        self.wind_vector
    }

    /// Set the wind vector common to all aircraft. Ground velocities of
    /// loaded aircraft are preserved: each aircraft's air velocity is
    /// re-derived and its position re-projected to the current time.
    pub fn set_wind_field(&mut self, wind: Velocity) {
        for i in 0..self.acs.len() {
            let dt = self.current_time() - self.times[i];
            let (id, pos, ground_vel) = {
                let ac = &self.acs[i];
                (ac.id.clone(), ac.pos.linear(ac.vel, -dt), ac.vel.add(self.wind_vector))
            };
            let vt = ground_vel.sub(wind);
            let pt = pos.linear(vt, dt);
            self.acs[i] = TrafficState::new(id, pt, vt);
        }
        self.wind_vector = wind;
    }

    // Detector and alertor

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Replace the state detector (deep copy) and pick up its thresholds.
    pub fn set_detector(&mut self, d: &Detector) {
        self.detector = d.clone();
        self.set_parameters_from_detector();
    }

    pub fn alertor(&self) -> &Alertor {
        &self.alertor
    }

    pub fn set_alertor(&mut self, alertor: Alertor) {
        self.alertor = alertor;
    }

    pub fn clear_alert_thresholds(&mut self) {
        self.alertor.clear();
    }

    /// Most severe alert type.
    pub fn most_severe_alert_thresholds(&self) -> usize {
        self.alertor.len()
    }

    /// Add a tier; returns its (1-based) alert type.
    pub fn add_alert_thresholds(&mut self, alert: alerting::AlertThresholds) -> usize {
        self.alertor.push(alert);
        self.alertor.len()
    }

    /// Replace tier `alert_type` (1-based). False for an invalid type.
    pub fn set_alert_thresholds(&mut self, alert_type: usize, alert: alerting::AlertThresholds) -> bool {
        if alert_type >= 1 && alert_type <= self.alertor.len() {
            self.alertor[alert_type - 1] = alert;
            true
        } else {
            false
        }
    }

    pub fn alert_thresholds(&mut self, alert_type: usize) -> Option<&alerting::AlertThresholds> {
        if alert_type >= 1 && alert_type <= self.alertor.len() {
            Some(&self.alertor[alert_type - 1])
        } else {
            self.error
                .add_error(format!("alert_thresholds: invalid alert type {alert_type}"));
            None
        }
    }

    pub fn last_alert_info(&self) -> AlertInfo {
        self.info
    }

    pub fn urgency_strategy(&self) -> &UrgencyStrategy {
        &self.urgency_strategy
    }

    pub fn set_urgency_strategy(&mut self, strat: UrgencyStrategy) {
        self.urgency_strategy = strat;
    }

    /// The most urgent aircraft at time `t` according to the strategy, when
    /// repulsive criteria are enabled.
    pub fn most_urgent_aircraft_at(&self, t: f64) -> Option<TrafficState> {
        if !(self.parameters.conflict_crit || self.parameters.recovery_crit) {
            return None;
        }
        let own = self.ownship_state_at(t)?;
        let traffic: Vec<TrafficState> = (1..self.acs.len())
            .filter_map(|i| self.traffic_state_at(i, t))
            .collect();
        self.urgency_strategy
            .most_urgent_aircraft(&self.detector, &own, &traffic, self.parameters.alerting_time_eff())
            .cloned()
    }

    // State queries

    pub fn ownship_state_at(&self, time: f64) -> Option<OwnshipState> {
        let own = self.acs.first()?;
        let dt = time - self.current_time();
        Some(OwnshipState::new(if dt == 0.0 {
            own.clone()
        } else {
            own.linear_projection(dt)
        }))
    }

    pub fn ownship_state(&self) -> Option<OwnshipState> {
        self.ownship_state_at(self.current_time())
    }

    pub fn traffic_state_at(&self, ac: usize, time: f64) -> Option<TrafficState> {
        let state = self.acs.get(ac)?;
        let dt = time - self.current_time();
        Some(if dt == 0.0 {
            state.clone()
        } else {
            state.linear_projection(dt)
        })
    }

    fn in_time_horizon(&self, time: f64) -> bool {
        time >= self.current_time() && time <= self.current_time() + self.parameters.lookahead_time
    }

    // Alerting

    /// Alert level against aircraft `ac` with states projected to `time`.
    /// 0 means no alert; negative means invalid input.
    pub fn alerting_at(&mut self, ac: usize, time: f64) -> i32 {
        if ac == 0 || ac >= self.acs.len() {
            self.error.add_error(format!("alerting_at: aircraft index {ac} out of bounds"));
            return -1;
        }
        if !self.in_time_horizon(time) {
            self.error
                .add_error(format!("alerting_at: time {time:.4} not in time horizon for aircraft {ac}"));
            return -1;
        }
        let dt = time - self.current_time();
        let own = OwnshipState::new(self.acs[0].linear_projection(dt));
        let aci = self.acs[ac].linear_projection(dt);
        if self.parameters.bands_alerting {
            let repac = self.most_urgent_aircraft_at(time);
            alerting::bands_alerting(&self.detector, &self.parameters, &own, &aci, repac.as_ref())
        } else {
            let (level, info) = alerting::thresholds_alerting(&self.alertor, &own, &aci);
            self.info = info;
            level
        }
    }

    /// Alert level against aircraft `ac` at the current time.
    pub fn alerting(&mut self, ac: usize) -> i32 {
        if self.acs.is_empty() {
            self.error.add_error("alerting: traffic list is empty");
            return -1;
        }
        self.alerting_at(ac, self.current_time())
    }

    // Violation queries

    /// Violation window against aircraft `ac`, relative to `time`, over the
    /// lookahead horizon.
    pub fn time_interval_of_violation_at(&mut self, ac: usize, time: f64) -> ConflictData {
        if self.acs.is_empty() {
            self.error
                .add_error("time_interval_of_violation_at: no aircraft information has been loaded");
            return ConflictData::none();
        }
        if !self.in_time_horizon(time) {
            self.error
                .add_error("time_interval_of_violation_at: time not within ownship plan limits");
            return ConflictData::none();
        }
        if ac == 0 || ac >= self.acs.len() {
            return ConflictData::none();
        }
        let dt = time - self.current_time();
        let own = OwnshipState::new(self.acs[0].linear_projection(dt));
        let aci = self.acs[ac].linear_projection(dt);
        self.detector.conflict_detection(
            own.s(),
            own.v(),
            own.traffic_s(&aci),
            own.traffic_v(&aci),
            0.0,
            self.parameters.lookahead_time,
        )
    }

    pub fn time_interval_of_violation(&mut self, ac: usize) -> ConflictData {
        self.time_interval_of_violation_at(ac, self.current_time())
    }

    /// Time to violation against aircraft `ac` relative to `time`; negative
    /// when there is no conflict within the lookahead.
    pub fn time_to_violation_at(&mut self, ac: usize, time: f64) -> f64 {
        let det = self.time_interval_of_violation_at(ac, time);
        if det.conflict() {
            det.time_in
        } else {
            -1.0
        }
    }

    pub fn time_to_violation(&mut self, ac: usize) -> f64 {
        self.time_to_violation_at(ac, self.current_time())
    }

    // Bands

    /// Kinematic bands with states projected to `time`. The bands instance
    /// gets copies of everything; computation happens lazily on query.
    pub fn kinematic_bands_at(&mut self, time: f64) -> Option<KinematicBands> {
        if self.acs.is_empty() {
            self.error.add_error("kinematic_bands_at: no aircraft information has been loaded");
            return None;
        }
        if !self.in_time_horizon(time) {
            self.error
                .add_error(format!("kinematic_bands_at: time {time:.4} not within ownship plan limits"));
            return None;
        }
        let dt = time - self.current_time();
        let own = OwnshipState::new(self.acs[0].linear_projection(dt));
        let mut bands = KinematicBands::new(self.detector.clone());
        bands.set_parameters(&self.parameters);
        bands.set_ownship(own);
        for ac in 1..self.acs.len() {
            let aci = self.acs[ac].linear_projection(dt);
            bands.add_traffic(aci);
        }
        if let Some(repac) = self.most_urgent_aircraft_at(time) {
            bands.set_criteria_aircraft(Some(repac.id));
        }
        Some(bands)
    }

    pub fn kinematic_bands(&mut self) -> Option<KinematicBands> {
        self.kinematic_bands_at(self.current_time())
    }

    // Parameters and configuration

    /// Load parameters from a configuration file; the detector picks up the
    /// new thresholds.
    pub fn load_parameters_from_file(&mut self, path: &std::path::Path) -> std::io::Result<()> {
        let text = std::fs::read_to_string(path)?;
        self.parameters.update_from_config(&text, &mut self.error);
        self.set_detector_from_parameters();
        Ok(())
    }

    pub fn save_parameters_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        std::fs::write(path, self.parameters.to_config())
    }

    pub fn set_parameters(&mut self, p: Parameters) {
        self.parameters = p;
        self.set_detector_from_parameters();
    }

    // Capability-checked threshold accessors. The stored parameter value is
    // returned either way; a mismatched detector records a warning.

    pub fn dthr(&mut self) -> f64 {
        if !matches!(self.detector, Detector::WcvTaumod(_)) {
            self.error
                .add_warning(format!("[dthr] Detector {} is not a WCV detector", self.detector.name()));
        }
        self.parameters.dthr
    }

    pub fn set_dthr(&mut self, val: f64) {
        if self.error.is_positive("set_dthr", val) {
            if let Detector::WcvTaumod(w) = &mut self.detector {
                w.table.dthr = val;
            } else {
                self.error
                    .add_warning(format!("[set_dthr] Detector {} is not a WCV detector", self.detector.name()));
            }
            self.parameters.dthr = val;
        }
    }

    pub fn zthr(&mut self) -> f64 {
        if !matches!(self.detector, Detector::WcvTaumod(_)) {
            self.error
                .add_warning(format!("[zthr] Detector {} is not a WCV detector", self.detector.name()));
        }
        self.parameters.zthr
    }

    pub fn set_zthr(&mut self, val: f64) {
        if self.error.is_positive("set_zthr", val) {
            if let Detector::WcvTaumod(w) = &mut self.detector {
                w.table.zthr = val;
            } else {
                self.error
                    .add_warning(format!("[set_zthr] Detector {} is not a WCV detector", self.detector.name()));
            }
            self.parameters.zthr = val;
        }
    }

    pub fn tthr(&mut self) -> f64 {
        if !matches!(self.detector, Detector::WcvTaumod(_)) {
            self.error
                .add_warning(format!("[tthr] Detector {} is not a WCV detector", self.detector.name()));
        }
        self.parameters.tthr
    }

    pub fn set_tthr(&mut self, val: f64) {
        if self.error.is_non_negative("set_tthr", val) {
            if let Detector::WcvTaumod(w) = &mut self.detector {
                w.table.tthr = val;
            } else {
                self.error
                    .add_warning(format!("[set_tthr] Detector {} is not a WCV detector", self.detector.name()));
            }
            self.parameters.tthr = val;
        }
    }

    pub fn tcoa(&mut self) -> f64 {
        if !matches!(self.detector, Detector::WcvTaumod(_)) {
            self.error
                .add_warning(format!("[tcoa] Detector {} is not a WCV detector", self.detector.name()));
        }
        self.parameters.tcoa
    }

    pub fn set_tcoa(&mut self, val: f64) {
        if self.error.is_non_negative("set_tcoa", val) {
            if let Detector::WcvTaumod(w) = &mut self.detector {
                w.table.tcoa = val;
            } else {
                self.error
                    .add_warning(format!("[set_tcoa] Detector {} is not a WCV detector", self.detector.name()));
            }
            self.parameters.tcoa = val;
        }
    }

    pub fn d(&mut self) -> f64 {
        if !matches!(self.detector, Detector::Cylinder(_)) {
            self.error
                .add_warning(format!("[d] Detector {} is not a cylinder detector", self.detector.name()));
        }
        self.parameters.d
    }

    pub fn set_d(&mut self, val: f64) {
        if self.error.is_positive("set_d", val) {
            if let Detector::Cylinder(c) = &mut self.detector {
                c.d = val;
            } else {
                self.error
                    .add_warning(format!("[set_d] Detector {} is not a cylinder detector", self.detector.name()));
            }
            self.parameters.d = val;
        }
    }

    pub fn h(&mut self) -> f64 {
        if !matches!(self.detector, Detector::Cylinder(_)) {
            self.error
                .add_warning(format!("[h] Detector {} is not a cylinder detector", self.detector.name()));
        }
        self.parameters.h
    }

    pub fn set_h(&mut self, val: f64) {
        if self.error.is_positive("set_h", val) {
            if let Detector::Cylinder(c) = &mut self.detector {
                c.h = val;
            } else {
                self.error
                    .add_warning(format!("[set_h] Detector {} is not a cylinder detector", self.detector.name()));
            }
            self.parameters.h = val;
        }
    }

    /// Use the cylinder detector with the parameter block's D and H.
    pub fn use_cylinder_detector(&mut self) {
        self.detector = Detector::Cylinder(CdCylinder::new(self.parameters.d, self.parameters.h));
    }

    // PVS export

    pub fn ownship_at_to_pvs(&self, time: f64, prec: usize) -> String {
        match self.ownship_state_at(time) {
            Some(own) => pvs::ownship_to_pvs(&own, prec),
            None => String::new(),
        }
    }

    pub fn traffic_at_to_pvs(&self, ac: usize, time: f64, prec: usize) -> String {
        match (self.ownship_state_at(time), self.traffic_state_at(ac, time)) {
            (Some(own), Some(tr)) => pvs::traffic_to_pvs(&own, &tr, prec),
            _ => String::new(),
        }
    }

    /// The whole aircraft list at a given time as a PVS list, ownship first.
    pub fn aircraft_list_at_to_pvs(&mut self, time: f64, prec: usize) -> String {
        if self.acs.is_empty() {
            self.error
                .add_error("aircraft_list_at_to_pvs: no aircraft information has been loaded");
            return String::new();
        }
        let mut s = format!("(: {}", self.ownship_at_to_pvs(time, prec));
        for ac in 1..self.acs.len() {
            s.push_str(", ");
            s.push_str(&self.traffic_at_to_pvs(ac, time, prec));
        }
        s.push_str(" :)");
        s
    }

    pub fn aircraft_list_to_pvs(&mut self, prec: usize) -> String {
        self.aircraft_list_at_to_pvs(self.current_time(), prec)
    }

    pub fn parameters_to_pvs(&self, prec: usize) -> String {
        pvs::parameters_to_pvs(&self.parameters, prec)
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
