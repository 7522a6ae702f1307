//! Deterministic S-expression rendering of aircraft states and parameters
//! for external formal verification. Precision-parameterized.

use crate::geom::vect::{Vect3, Velocity};
use crate::params::Parameters;
use crate::state::{OwnshipState, TrafficState};

fn fm(val: f64, prec: usize) -> String {
    format!("{val:.prec$}")
}

pub fn vect3_to_pvs(v: Vect3, prec: usize) -> String {
    format!(
        "(# x := {}, y := {}, z := {} #)",
        fm(v.x, prec),
        fm(v.y, prec),
        fm(v.z, prec)
    )
}

pub fn velocity_to_pvs(v: Velocity, prec: usize) -> String {
    vect3_to_pvs(v.vect3(), prec)
}

/// One aircraft record: identifier plus projected position and velocity.
pub fn aircraft_to_pvs(id: &str, s: Vect3, v: Velocity, prec: usize) -> String {
    format!(
        "(# id := \"{}\", s := {}, v := {} #)",
        id,
        vect3_to_pvs(s, prec),
        velocity_to_pvs(v, prec)
    )
}

pub fn ownship_to_pvs(own: &OwnshipState, prec: usize) -> String {
    aircraft_to_pvs(own.id(), own.s(), own.v(), prec)
}

/// A traffic aircraft through the ownship's projection.
pub fn traffic_to_pvs(own: &OwnshipState, ac: &TrafficState, prec: usize) -> String {
    aircraft_to_pvs(&ac.id, own.traffic_s(ac), own.traffic_v(ac), prec)
}

/// The core band parameters as a PVS record, in internal units.
pub fn parameters_to_pvs(p: &Parameters, prec: usize) -> String {
    let b = |v: bool| if v { "TRUE" } else { "FALSE" };
    format!(
        "(# DTHR := {}, ZTHR := {}, TTHR := {}, TCOA := {}, D := {}, H := {}, \
         alerting_time := {}, lookahead_time := {}, min_gs := {}, max_gs := {}, \
         min_vs := {}, max_vs := {}, min_alt := {}, max_alt := {}, trk_step := {}, \
         gs_step := {}, vs_step := {}, alt_step := {}, horizontal_accel := {}, \
         vertical_accel := {}, turn_rate := {}, bank_angle := {}, vertical_rate := {}, \
         recovery_stability_time := {}, max_recovery_time := {}, \
         min_horizontal_recovery := {}, min_vertical_recovery := {}, ca_bands := {}, \
         conflict_crit := {}, recovery_crit := {}, recovery_trk := {}, recovery_gs := {}, \
         recovery_vs := {} #)",
        fm(p.dthr, prec),
        fm(p.zthr, prec),
        fm(p.tthr, prec),
        fm(p.tcoa, prec),
        fm(p.d, prec),
        fm(p.h, prec),
        fm(p.alerting_time, prec),
        fm(p.lookahead_time, prec),
        fm(p.min_gs, prec),
        fm(p.max_gs, prec),
        fm(p.min_vs, prec),
        fm(p.max_vs, prec),
        fm(p.min_alt, prec),
        fm(p.max_alt, prec),
        fm(p.trk_step, prec),
        fm(p.gs_step, prec),
        fm(p.vs_step, prec),
        fm(p.alt_step, prec),
        fm(p.horizontal_accel, prec),
        fm(p.vertical_accel, prec),
        fm(p.turn_rate, prec),
        fm(p.bank_angle, prec),
        fm(p.vertical_rate, prec),
        fm(p.recovery_stability_time, prec),
        fm(p.max_recovery_time, prec),
        fm(p.min_horizontal_recovery, prec),
        fm(p.min_vertical_recovery, prec),
        b(p.ca_bands),
        b(p.conflict_crit),
        b(p.recovery_crit),
        b(p.recovery_trk),
        b(p.recovery_gs),
        b(p.recovery_vs),
    )
}

/// Band output as `((: intervals :), (: regions :), recovery_time)`.
pub fn bands_to_pvs(
    intervals: &[crate::interval::Interval],
    regions: &[crate::bands::BandsRegion],
    recovery_time: f64,
    prec: usize,
) -> String {
    let mut s = String::from("((:");
    for (i, iv) in intervals.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        } else {
            s.push(' ');
        }
        s.push_str(&format!("[{}, {}]", fm(iv.low, prec), fm(iv.up, prec)));
    }
    s.push_str(" :), (:");
    for (i, r) in regions.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        } else {
            s.push(' ');
        }
        s.push_str(r.pvs_name());
    }
    s.push_str(&format!(" :), {})", fm(recovery_time, prec)));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::position::Position;

    #[test]
    fn aircraft_record_shape() {
        let own = OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(1.0, 2.0, 3.0),
            Velocity::new(4.0, 5.0, 6.0),
        ));
        let s = ownship_to_pvs(&own, 4);
        assert_eq!(
            s,
            "(# id := \"own\", s := (# x := 1.0000, y := 2.0000, z := 3.0000 #), \
             v := (# x := 4.0000, y := 5.0000, z := 6.0000 #) #)"
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let p = Parameters::default();
        assert_eq!(parameters_to_pvs(&p, 6), parameters_to_pvs(&p, 6));
    }
}
