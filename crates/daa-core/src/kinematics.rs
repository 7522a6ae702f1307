//! Closed-form maneuver kinematics in the projected frame.
//!
//! Each function rolls a (position, velocity) state forward under the
//! nominal dynamics of one maneuver axis: constant-rate turn, constant
//! horizontal acceleration, constant vertical acceleration, or a
//! three-phase level-off to a target altitude.

use crate::geom::vect::{Vect3, Velocity};
use crate::units;

/// Turn rate implied by a bank angle at a ground speed.
pub fn turn_rate(gs: f64, bank_angle: f64) -> f64 {
    if gs <= 0.0 {
        return 0.0;
    }
    units::G * bank_angle.tan() / gs
}

/// Bank angle implied by a turn rate at a ground speed.
pub fn bank_angle(gs: f64, omega: f64) -> f64 {
    (omega * gs / units::G).atan()
}

/// State after `t` seconds of a constant-rate turn. `dir` is true for a
/// right (clockwise) turn. Vertical speed is held.
pub fn turn(s: Vect3, v: Velocity, t: f64, omega: f64, dir: bool) -> (Vect3, Velocity) {
    let gs = v.gs();
    if omega <= 0.0 || gs <= 0.0 {
        return (s.linear(v.vect3(), t), v);
    }
    let sgn = if dir { 1.0 } else { -1.0 };
    let trk0 = v.trk();
    let trk_t = trk0 + sgn * omega * t;
    // Integral of gs * (sin psi, cos psi) over the arc.
    let r = gs / omega;
    let x = s.x + sgn * r * ((trk_t).cos() - trk0.cos()) * -1.0;
    let y = s.y + sgn * r * ((trk_t).sin() - trk0.sin());
    let z = s.z + v.z * t;
    let nv = Velocity::from_trk_gs_vs(trk_t, gs, v.z);
    (Vect3::new(x, y, z), nv)
}

/// State after `t` seconds of constant horizontal acceleration `a` (signed)
/// along the current track. Ground speed floors at zero.
pub fn gs_accel(s: Vect3, v: Velocity, t: f64, a: f64) -> (Vect3, Velocity) {
    let gs0 = v.gs();
    let trk = v.trk();
    // Time at which the ground speed would reach zero.
    let t_stop = if a < 0.0 { -gs0 / a } else { f64::INFINITY };
    let tm = t.min(t_stop);
    let dist = gs0 * tm + 0.5 * a * tm * tm;
    let gs_t = (gs0 + a * tm).max(0.0);
    let x = s.x + dist * trk.sin();
    let y = s.y + dist * trk.cos();
    let z = s.z + v.z * t;
    (Vect3::new(x, y, z), Velocity::from_trk_gs_vs(trk, gs_t, v.z))
}

/// State after `t` seconds of constant vertical acceleration `a` (signed).
/// Track and ground speed are held.
pub fn vs_accel(s: Vect3, v: Velocity, t: f64, a: f64) -> (Vect3, Velocity) {
    let x = s.x + v.x * t;
    let y = s.y + v.y * t;
    let z = s.z + v.z * t + 0.5 * a * t * t;
    (Vect3::new(x, y, z), Velocity::new(v.x, v.y, v.z + a * t))
}

/// Three-phase level-off profile to a target altitude: accelerate the
/// vertical speed toward the cruise rate, hold it, then decelerate to zero
/// arriving exactly at the target.
#[derive(Debug, Clone, Copy)]
pub struct LevelOut {
    dir: f64,     // +1 climb, -1 descend
    accel: f64,   // vertical acceleration magnitude
    vz0: f64,     // initial vertical speed
    cruise: f64,  // signed cruise vertical speed (dir * rate)
    t1: f64,      // end of acceleration phase
    t2: f64,      // end of cruise phase
    t3: f64,      // end of deceleration phase (total time)
    z0: f64,
    z1: f64,      // altitude at t1
    z2: f64,      // altitude at t2
    target: f64,
}

impl LevelOut {
    /// Solve the profile from altitude `z0` with vertical speed `vz0` to
    /// `target`, cruise rate `vrate` (> 0) and acceleration `accel` (> 0).
    /// Returns `None` when the target cannot be reached with this profile
    /// (the caller treats that as a red cell).
    pub fn solve(z0: f64, vz0: f64, target: f64, vrate: f64, accel: f64) -> Option<LevelOut> {
        let dz = target - z0;
        if dz == 0.0 && vz0 == 0.0 {
            return Some(LevelOut {
                dir: 1.0,
                accel,
                vz0,
                cruise: 0.0,
                t1: 0.0,
                t2: 0.0,
                t3: 0.0,
                z0,
                z1: z0,
                z2: z0,
                target,
            });
        }
        if accel <= 0.0 || vrate <= 0.0 {
            return None;
        }
        let dir = if dz >= 0.0 { 1.0 } else { -1.0 };
        let cruise = dir * vrate;

        // Trapezoid: accelerate to cruise, hold, decelerate to zero.
        let a1 = if cruise >= vz0 { accel } else { -accel };
        let t1 = (cruise - vz0) / a1;
        let climb1 = vz0 * t1 + 0.5 * a1 * t1 * t1;
        let climb3 = dir * vrate * vrate / (2.0 * accel);
        let t2_len = (dz - climb1 - climb3) / cruise;
        if t2_len >= 0.0 {
            let t3_len = vrate / accel;
            return Some(LevelOut {
                dir,
                accel,
                vz0,
                cruise,
                t1,
                t2: t1 + t2_len,
                t3: t1 + t2_len + t3_len,
                z0,
                z1: z0 + climb1,
                z2: z0 + dz - climb3,
                target,
            });
        }

        // Triangular: the target is too close to reach the cruise rate.
        // Peak vertical speed vp satisfies dir*(2 vp^2 - vz0^2)/(2a) = dz.
        let vp_sq = accel * dz.abs() + 0.5 * vz0 * vz0;
        if vp_sq < 0.0 {
            return None;
        }
        let vp = vp_sq.sqrt();
        if vp < dir * vz0 {
            // Already moving toward the target faster than any feasible
            // peak: the profile overshoots.
            return None;
        }
        let t1 = (vp - dir * vz0) / accel;
        let t3_len = vp / accel;
        let climb1 = dir * (vp * vp - vz0 * vz0) / (2.0 * accel);
        Some(LevelOut {
            dir,
            accel,
            vz0,
            cruise: dir * vp,
            t1,
            t2: t1,
            t3: t1 + t3_len,
            z0,
            z1: z0 + climb1,
            z2: z0 + climb1,
            target,
        })
    }

    /// Total time to reach the target level.
    pub fn total_time(&self) -> f64 {
        self.t3
    }

    /// Vertical state (altitude, vertical speed) at time `t` into the
    /// profile. Past the end, the aircraft is level at the target.
    pub fn at(&self, t: f64) -> (f64, f64) {
        if t >= self.t3 {
            return (self.target, 0.0);
        }
        if t <= self.t1 {
            let a1 = if self.cruise >= self.vz0 { self.accel } else { -self.accel };
            return (self.z0 + self.vz0 * t + 0.5 * a1 * t * t, self.vz0 + a1 * t);
        }
        if t <= self.t2 {
            let dt = t - self.t1;
            return (self.z1 + self.cruise * dt, self.cruise);
        }
        let dt = t - self.t2;
        let a3 = -self.dir * self.accel;
        (self.z2 + self.cruise * dt + 0.5 * a3 * dt * dt, self.cruise + a3 * dt)
    }
}

/// Time to level off at `target` from a state, or `None` if unreachable.
/// `vrate = 0` means an instantaneous level-off.
pub fn vs_level_out_time(s: Vect3, v: Velocity, vrate: f64, target: f64, accel: f64) -> Option<f64> {
    if vrate == 0.0 {
        return Some(0.0);
    }
    LevelOut::solve(s.z, v.z, target, vrate, accel).map(|p| p.total_time())
}

/// Final state of the level-off: position, velocity, and total time.
/// Horizontal motion continues on the current track and ground speed.
pub fn vs_level_out_final(
    s: Vect3,
    v: Velocity,
    vrate: f64,
    target: f64,
    accel: f64,
) -> Option<(Vect3, Velocity, f64)> {
    if vrate == 0.0 {
        return Some((
            Vect3::new(s.x, s.y, target),
            Velocity::new(v.x, v.y, 0.0),
            0.0,
        ));
    }
    let prof = LevelOut::solve(s.z, v.z, target, vrate, accel)?;
    let t = prof.total_time();
    Some((
        Vect3::new(s.x + v.x * t, s.y + v.y * t, target),
        Velocity::new(v.x, v.y, 0.0),
        t,
    ))
}

/// State at time `t` during the level-off maneuver.
pub fn vs_level_out(
    s: Vect3,
    v: Velocity,
    t: f64,
    vrate: f64,
    target: f64,
    accel: f64,
) -> Option<(Vect3, Velocity)> {
    if vrate == 0.0 {
        return Some((
            Vect3::new(s.x + v.x * t, s.y + v.y * t, target),
            Velocity::new(v.x, v.y, 0.0),
        ));
    }
    let prof = LevelOut::solve(s.z, v.z, target, vrate, accel)?;
    let (z, vz) = prof.at(t);
    Some((
        Vect3::new(s.x + v.x * t, s.y + v.y * t, z),
        Velocity::new(v.x, v.y, vz),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_changes_track_at_rate() {
        let s = Vect3::ZERO;
        let v = Velocity::from_trk_gs_vs(0.0, 100.0, 0.0);
        let omega = units::from("deg/s", 3.0);
        let (_, nv) = turn(s, v, 10.0, omega, true);
        assert!((nv.trk() - units::from("deg", 30.0)).abs() < 1e-9);
        assert!((nv.gs() - 100.0).abs() < 1e-9);
        let (_, nv) = turn(s, v, 10.0, omega, false);
        assert!((nv.trk() - units::from("deg", 330.0)).abs() < 1e-9);
    }

    #[test]
    fn quarter_turn_geometry() {
        // Right turn through 90 degrees from north: end heading east, having
        // moved R north and R east of the start.
        let v = Velocity::from_trk_gs_vs(0.0, 100.0, 0.0);
        let omega = 0.1;
        let r = 100.0 / omega;
        let t_quarter = std::f64::consts::FRAC_PI_2 / omega;
        let (p, nv) = turn(Vect3::ZERO, v, t_quarter, omega, true);
        assert!((nv.trk() - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
        assert!((p.x - r).abs() < 1e-6);
        assert!((p.y - r).abs() < 1e-6);
    }

    #[test]
    fn zero_rate_turn_is_linear() {
        let s = Vect3::ZERO;
        let v = Velocity::from_trk_gs_vs(1.0, 50.0, 2.0);
        let (p, nv) = turn(s, v, 10.0, 0.0, true);
        assert_eq!(p, s.linear(v.vect3(), 10.0));
        assert_eq!(nv, v);
    }

    #[test]
    fn gs_accel_speeds_up_along_track() {
        let v = Velocity::from_trk_gs_vs(std::f64::consts::FRAC_PI_2, 50.0, 0.0);
        let (p, nv) = gs_accel(Vect3::ZERO, v, 10.0, 2.0);
        assert!((nv.gs() - 70.0).abs() < 1e-9);
        assert!((p.x - 600.0).abs() < 1e-6); // 50*10 + 0.5*2*100
        assert!(p.y.abs() < 1e-6);
    }

    #[test]
    fn gs_accel_floors_at_zero() {
        let v = Velocity::from_trk_gs_vs(0.0, 10.0, 0.0);
        let (p, nv) = gs_accel(Vect3::ZERO, v, 100.0, -2.0);
        assert_eq!(nv.gs(), 0.0);
        assert!((p.y - 25.0).abs() < 1e-9); // stops after 5 s, 25 m
    }

    #[test]
    fn vs_accel_integrates_altitude() {
        let v = Velocity::new(0.0, 100.0, 0.0);
        let (p, nv) = vs_accel(Vect3::ZERO, v, 10.0, 1.0);
        assert!((p.z - 50.0).abs() < 1e-9);
        assert!((nv.z - 10.0).abs() < 1e-9);
    }

    #[test]
    fn level_out_trapezoid() {
        // Climb 300 m at 10 m/s cruise, 2 m/s^2: t1 = 5 (climb 25),
        // decel climb 25, cruise 250 m -> 25 s. Total 35 s.
        let prof = LevelOut::solve(0.0, 0.0, 300.0, 10.0, 2.0).unwrap();
        assert!((prof.total_time() - 35.0).abs() < 1e-9);
        let (z, vz) = prof.at(5.0);
        assert!((z - 25.0).abs() < 1e-9);
        assert!((vz - 10.0).abs() < 1e-9);
        let (z, vz) = prof.at(100.0);
        assert_eq!((z, vz), (300.0, 0.0));
    }

    #[test]
    fn level_out_triangular_when_close() {
        // 16 m at 10 m/s cruise, 2 m/s^2: trapezoid would need 50 m.
        // Triangular peak: vp = sqrt(2*16) ~ 5.66 m/s.
        let prof = LevelOut::solve(0.0, 0.0, 16.0, 10.0, 2.0).unwrap();
        let vp = (2.0_f64 * 16.0).sqrt();
        assert!((prof.total_time() - 2.0 * vp / 2.0).abs() < 1e-9);
        let (z, vz) = prof.at(prof.total_time());
        assert_eq!((z, vz), (16.0, 0.0));
    }

    #[test]
    fn level_out_descent() {
        let prof = LevelOut::solve(1000.0, 0.0, 700.0, 10.0, 2.0).unwrap();
        let (z, vz) = prof.at(prof.total_time() / 2.0);
        assert!(z < 1000.0 && z > 700.0);
        assert!(vz < 0.0);
        let (z, _) = prof.at(prof.total_time());
        assert!((z - 700.0).abs() < 1e-9);
    }

    #[test]
    fn level_out_overshoot_is_unreachable() {
        // Descending fast through a target just below: cannot stop in time.
        assert!(LevelOut::solve(1000.0, -30.0, 995.0, 10.0, 1.0).is_none());
    }

    #[test]
    fn instantaneous_when_rate_zero() {
        let (s, v, t) =
            vs_level_out_final(Vect3::new(0.0, 0.0, 100.0), Velocity::new(50.0, 0.0, 0.0), 0.0, 500.0, 2.0)
                .unwrap();
        assert_eq!(t, 0.0);
        assert_eq!(s.z, 500.0);
        assert_eq!(v.z, 0.0);
    }
}
