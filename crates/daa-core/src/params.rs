//! The parameter block: every tunable threshold of the detectors, band
//! engines, recovery search, and alerting logic, with the key = value
//! configuration format.
//!
//! Values are stored in internal SI units. The file format is one
//! `key = value [unit]` pair per line, `#` comments, `true`/`false`
//! booleans. Untagged values are read as internal units. Unknown keys are
//! ignored with a warning; missing keys keep their defaults. Writing emits
//! every parameter in its canonical display unit; write, parse, write again
//! is byte-identical.

use serde::{Deserialize, Serialize};

use crate::errlog::ErrorLog;
use crate::units;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    // Well-clear thresholds
    pub dthr: f64,
    pub zthr: f64,
    pub tthr: f64,
    pub tcoa: f64,
    // Cylinder thresholds
    pub d: f64,
    pub h: f64,
    // Bands
    /// Alerting time; 0 means use the lookahead time.
    pub alerting_time: f64,
    pub lookahead_time: f64,
    pub min_gs: f64,
    pub max_gs: f64,
    pub min_vs: f64,
    pub max_vs: f64,
    pub min_alt: f64,
    pub max_alt: f64,
    pub implicit_bands: bool,
    // Kinematic bands
    pub trk_step: f64,
    pub gs_step: f64,
    pub vs_step: f64,
    pub alt_step: f64,
    pub horizontal_accel: f64,
    pub vertical_accel: f64,
    pub turn_rate: f64,
    /// Only used when turn_rate is 0.
    pub bank_angle: f64,
    pub vertical_rate: f64,
    // Recovery bands
    pub recovery_stability_time: f64,
    /// 0 means use the lookahead time.
    pub max_recovery_time: f64,
    /// 0 means use the TCAS RA HMD for the ownship's sensitivity level.
    pub min_horizontal_recovery: f64,
    /// 0 means use the TCAS RA ZTHR.
    pub min_vertical_recovery: f64,
    pub conflict_crit: bool,
    pub recovery_crit: bool,
    pub recovery_trk: bool,
    pub recovery_gs: bool,
    pub recovery_vs: bool,
    // Alerting
    /// true: bands-based ladder; false: thresholds-based ladder.
    pub bands_alerting: bool,
    pub trk_alerting: bool,
    pub gs_alerting: bool,
    pub vs_alerting: bool,
    /// Preventive thresholds; a negative value disables the check.
    pub preventive_alt: f64,
    pub preventive_trk: f64,
    pub preventive_gs: f64,
    pub preventive_vs: f64,
    pub time_to_warning: f64,
    pub warning_when_recovery: bool,
    // Other
    pub ca_bands: bool,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            dthr: units::from("ft", 4000.0),
            zthr: units::from("ft", 450.0),
            tthr: 35.0,
            tcoa: 0.0,
            d: units::from("nmi", 5.0),
            h: units::from("ft", 1000.0),
            alerting_time: 0.0,
            lookahead_time: 180.0,
            min_gs: 0.0,
            max_gs: units::from("knot", 700.0),
            min_vs: units::from("fpm", -5000.0),
            max_vs: units::from("fpm", 5000.0),
            min_alt: units::from("ft", 500.0),
            max_alt: units::from("ft", 50000.0),
            implicit_bands: false,
            trk_step: units::from("deg", 1.0),
            gs_step: units::from("knot", 1.0),
            vs_step: units::from("fpm", 10.0),
            alt_step: units::from("ft", 500.0),
            horizontal_accel: 2.0,
            vertical_accel: 2.0,
            turn_rate: units::from("deg/s", 3.0),
            bank_angle: units::from("deg", 30.0),
            vertical_rate: 0.0,
            recovery_stability_time: 2.0,
            max_recovery_time: 0.0,
            min_horizontal_recovery: 0.0,
            min_vertical_recovery: 0.0,
            conflict_crit: false,
            recovery_crit: false,
            recovery_trk: true,
            recovery_gs: true,
            recovery_vs: true,
            bands_alerting: true,
            trk_alerting: true,
            gs_alerting: false,
            vs_alerting: true,
            preventive_alt: units::from("ft", 700.0),
            preventive_trk: units::from("deg", 10.0),
            preventive_gs: units::from("knot", 100.0),
            preventive_vs: units::from("fpm", 500.0),
            time_to_warning: 15.0,
            warning_when_recovery: false,
            ca_bands: false,
        }
    }
}

fn val_unit(val: f64, unit: &str) -> String {
    format!("{:.6} [{}]", units::to(unit, val), unit)
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

impl Parameters {
    /// Effective alerting time (see field docs).
    pub fn alerting_time_eff(&self) -> f64 {
        if self.alerting_time > 0.0 {
            self.alerting_time
        } else {
            self.lookahead_time
        }
    }

    /// Render the block in the configuration file format. Every parameter
    /// is written with its canonical display unit.
    pub fn to_config(&self) -> String {
        let mut s = String::new();
        s.push_str("# Well-Clear Thresholds\n");
        s.push_str(&format!("DTHR = {}\n", val_unit(self.dthr, "ft")));
        s.push_str(&format!("ZTHR = {}\n", val_unit(self.zthr, "ft")));
        s.push_str(&format!("TTHR = {}\n", val_unit(self.tthr, "s")));
        s.push_str(&format!("TCOA = {}\n", val_unit(self.tcoa, "s")));
        s.push_str("# Cylinder Thresholds\n");
        s.push_str(&format!("D = {}\n", val_unit(self.d, "nmi")));
        s.push_str(&format!("H = {}\n", val_unit(self.h, "ft")));
        s.push_str("# Conflict Bands Parameters\n");
        s.push_str(&format!(
            "alerting_time = {}. If set to 0, lookahead_time is used instead\n",
            val_unit(self.alerting_time, "s")
        ));
        s.push_str(&format!("lookahead_time = {}\n", val_unit(self.lookahead_time, "s")));
        s.push_str(&format!("min_gs = {}\n", val_unit(self.min_gs, "knot")));
        s.push_str(&format!("max_gs = {}\n", val_unit(self.max_gs, "knot")));
        s.push_str(&format!("min_vs = {}\n", val_unit(self.min_vs, "fpm")));
        s.push_str(&format!("max_vs = {}\n", val_unit(self.max_vs, "fpm")));
        s.push_str(&format!("min_alt = {}\n", val_unit(self.min_alt, "ft")));
        s.push_str(&format!("max_alt = {}\n", val_unit(self.max_alt, "ft")));
        s.push_str(&format!("implicit_bands = {}\n", bool_str(self.implicit_bands)));
        s.push_str("# Kinematic Bands Parameters\n");
        s.push_str(&format!("trk_step = {}\n", val_unit(self.trk_step, "deg")));
        s.push_str(&format!("gs_step = {}\n", val_unit(self.gs_step, "knot")));
        s.push_str(&format!("vs_step = {}\n", val_unit(self.vs_step, "fpm")));
        s.push_str(&format!("alt_step = {}\n", val_unit(self.alt_step, "ft")));
        s.push_str(&format!(
            "horizontal_accel = {}\n",
            val_unit(self.horizontal_accel, "m/s^2")
        ));
        s.push_str(&format!("vertical_accel = {}\n", val_unit(self.vertical_accel, "m/s^2")));
        s.push_str(&format!("turn_rate = {}\n", val_unit(self.turn_rate, "deg/s")));
        s.push_str(&format!(
            "bank_angle = {}. Only used when turn_rate is set to 0\n",
            val_unit(self.bank_angle, "deg")
        ));
        s.push_str(&format!("vertical_rate = {}\n", val_unit(self.vertical_rate, "fpm")));
        s.push_str("# Recovery Bands Parameters\n");
        s.push_str(&format!(
            "recovery_stability_time = {}\n",
            val_unit(self.recovery_stability_time, "s")
        ));
        s.push_str(&format!(
            "max_recovery_time = {}. If set to 0, lookahead time is used instead\n",
            val_unit(self.max_recovery_time, "s")
        ));
        s.push_str(&format!(
            "min_horizontal_recovery = {}. If set to 0, TCAS RA HMD is used instead\n",
            val_unit(self.min_horizontal_recovery, "nmi")
        ));
        s.push_str(&format!(
            "min_vertical_recovery = {}. If set to 0, TCAS RA ZTHR is used instead\n",
            val_unit(self.min_vertical_recovery, "ft")
        ));
        s.push_str(&format!("conflict_crit = {}\n", bool_str(self.conflict_crit)));
        s.push_str(&format!("recovery_crit = {}\n", bool_str(self.recovery_crit)));
        s.push_str(&format!("recovery_trk = {}\n", bool_str(self.recovery_trk)));
        s.push_str(&format!("recovery_gs = {}\n", bool_str(self.recovery_gs)));
        s.push_str(&format!("recovery_vs = {}\n", bool_str(self.recovery_vs)));
        s.push_str("# Alerting\n");
        s.push_str(&format!("bands_alerting = {}\n", bool_str(self.bands_alerting)));
        s.push_str(&format!("trk_alerting = {}\n", bool_str(self.trk_alerting)));
        s.push_str(&format!("gs_alerting = {}\n", bool_str(self.gs_alerting)));
        s.push_str(&format!("vs_alerting = {}\n", bool_str(self.vs_alerting)));
        s.push_str(&format!("preventive_alt = {}\n", val_unit(self.preventive_alt, "ft")));
        s.push_str(&format!("preventive_trk = {}\n", val_unit(self.preventive_trk, "deg")));
        s.push_str(&format!("preventive_gs = {}\n", val_unit(self.preventive_gs, "knot")));
        s.push_str(&format!("preventive_vs = {}\n", val_unit(self.preventive_vs, "fpm")));
        s.push_str(&format!("time_to_warning = {}\n", val_unit(self.time_to_warning, "s")));
        s.push_str(&format!(
            "warning_when_recovery = {}\n",
            bool_str(self.warning_when_recovery)
        ));
        s.push_str("# Other Parameters\n");
        s.push_str(&format!("ca_bands = {}\n", bool_str(self.ca_bands)));
        s
    }

    /// Parse key = value lines into this block, leaving unmentioned fields
    /// untouched. Problems are recorded in `log`.
    pub fn update_from_config(&mut self, text: &str, log: &mut ErrorLog) {
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, rhs)) = line.split_once('=') else {
                log.add_warning(format!("ignoring malformed line: {raw}"));
                continue;
            };
            let key = key.trim();
            let rhs = rhs.trim();
            if let Some(b) = parse_bool(rhs) {
                if !self.set_bool(key, b) {
                    log.add_warning(format!("unknown boolean parameter: {key}"));
                }
                continue;
            }
            match parse_value(rhs) {
                Some(v) => {
                    if !self.set_value(key, v) {
                        log.add_warning(format!("unknown parameter: {key}"));
                    }
                }
                None => log.add_warning(format!("cannot parse value for {key}: {rhs}")),
            }
        }
    }

    fn set_bool(&mut self, key: &str, b: bool) -> bool {
        match key {
            "implicit_bands" => self.implicit_bands = b,
            "conflict_crit" => self.conflict_crit = b,
            "recovery_crit" => self.recovery_crit = b,
            "recovery_trk" => self.recovery_trk = b,
            "recovery_gs" => self.recovery_gs = b,
            "recovery_vs" => self.recovery_vs = b,
            "bands_alerting" => self.bands_alerting = b,
            "trk_alerting" => self.trk_alerting = b,
            "gs_alerting" => self.gs_alerting = b,
            "vs_alerting" => self.vs_alerting = b,
            "warning_when_recovery" => self.warning_when_recovery = b,
            "ca_bands" => self.ca_bands = b,
            _ => return false,
        }
        true
    }

    fn set_value(&mut self, key: &str, v: f64) -> bool {
        match key {
            "DTHR" | "dthr" => self.dthr = v,
            "ZTHR" | "zthr" => self.zthr = v,
            "TTHR" | "tthr" => self.tthr = v,
            "TCOA" | "tcoa" => self.tcoa = v,
            "D" | "d" => self.d = v,
            "H" | "h" => self.h = v,
            "alerting_time" => self.alerting_time = v,
            "lookahead_time" => self.lookahead_time = v,
            "min_gs" => self.min_gs = v,
            "max_gs" => self.max_gs = v,
            "min_vs" => self.min_vs = v,
            "max_vs" => self.max_vs = v,
            "min_alt" => self.min_alt = v,
            "max_alt" => self.max_alt = v,
            "trk_step" => self.trk_step = v,
            "gs_step" => self.gs_step = v,
            "vs_step" => self.vs_step = v,
            "alt_step" => self.alt_step = v,
            "horizontal_accel" => self.horizontal_accel = v,
            "vertical_accel" => self.vertical_accel = v,
            "turn_rate" => self.turn_rate = v,
            "bank_angle" => self.bank_angle = v,
            "vertical_rate" => self.vertical_rate = v,
            "recovery_stability_time" => self.recovery_stability_time = v,
            "max_recovery_time" => self.max_recovery_time = v,
            "min_horizontal_recovery" => self.min_horizontal_recovery = v,
            "min_vertical_recovery" => self.min_vertical_recovery = v,
            "preventive_alt" => self.preventive_alt = v,
            "preventive_trk" => self.preventive_trk = v,
            "preventive_gs" => self.preventive_gs = v,
            "preventive_vs" => self.preventive_vs = v,
            "time_to_warning" => self.time_to_warning = v,
            _ => return false,
        }
        true
    }
}

fn parse_bool(rhs: &str) -> Option<bool> {
    match rhs {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Parse `value [unit]` with optional trailing commentary. An untagged
/// value is interpreted in internal units.
fn parse_value(rhs: &str) -> Option<f64> {
    let mut tokens = rhs.split_whitespace();
    let num_tok = tokens.next()?;
    // strip trailing punctuation such as the period of an annotation
    let num_tok = num_tok.trim_end_matches(|c: char| !c.is_ascii_digit());
    let value: f64 = num_tok.parse().ok()?;
    if let Some(next) = tokens.next() {
        if let Some(sym) = next.strip_prefix('[') {
            let sym = sym.trim_end_matches(|c: char| c == ']' || c == '.');
            return Some(units::from(sym, value));
        }
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trip_is_byte_identical() {
        let p = Parameters::default();
        let text1 = p.to_config();
        let mut q = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        q.update_from_config(&text1, &mut log);
        let text2 = q.to_config();
        assert_eq!(text1, text2);
        assert!(!log.has_error());
    }

    #[test]
    fn unit_tagged_values_convert() {
        let mut p = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        p.update_from_config("DTHR = 6000 [ft]\nlookahead_time = 90 [s]\n", &mut log);
        assert!((p.dthr - units::from("ft", 6000.0)).abs() < 1e-9);
        assert_eq!(p.lookahead_time, 90.0);
    }

    #[test]
    fn untagged_value_is_internal_units() {
        let mut p = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        p.update_from_config("ZTHR = 200\n", &mut log);
        assert_eq!(p.zthr, 200.0);
    }

    #[test]
    fn lowercase_aliases_accepted() {
        let mut p = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        p.update_from_config("dthr = 1000 [ft]\nd = 3 [nmi]\n", &mut log);
        assert!((p.dthr - units::from("ft", 1000.0)).abs() < 1e-9);
        assert!((p.d - units::from("nmi", 3.0)).abs() < 1e-9);
    }

    #[test]
    fn unknown_key_warns_but_does_not_fail() {
        let mut p = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        p.update_from_config("frobnicate = 7\n", &mut log);
        assert!(log.has_message());
        assert!(!log.has_error());
        assert_eq!(p, Parameters::default());
    }

    #[test]
    fn booleans_parse() {
        let mut p = Parameters::default();
        let mut log = ErrorLog::new("Parameters");
        p.update_from_config("ca_bands = true\nrecovery_trk = false\n", &mut log);
        assert!(p.ca_bands);
        assert!(!p.recovery_trk);
    }
}
