//! Coordination signs and repulsive maneuver criteria.
//!
//! When a criterion aircraft is designated, both aircraft of the pair derive
//! a horizontal sign eps_h and a vertical sign eps_v from the current
//! relative state. A candidate maneuver is only allowed to produce a green
//! cell if every intermediate step keeps the relative velocity on the
//! committed side: two aircraft running the logic independently then pick
//! compatible maneuvers instead of mirror images.

use crate::geom::vect::{sign, Vect2, Vect3};

/// Horizontal coordination sign from the relative position and velocity of
/// the pair (ownship minus intruder).
pub fn horizontal_coordination(s: Vect2, v: Vect2) -> i32 {
    if s.is_zero() || v.is_zero() {
        return 0;
    }
    sign(v.det(s))
}

/// Vertical coordination sign in loss of separation: escape away from the
/// intruder, with a deterministic identifier tie-break at co-altitude so
/// that the two aircraft of a pair choose opposite directions.
pub fn vertical_coordination(s: Vect3, ownship_id: &str, traffic_id: &str) -> i32 {
    if s.z > 0.0 {
        1
    } else if s.z < 0.0 {
        -1
    } else if ownship_id < traffic_id {
        1
    } else {
        -1
    }
}

/// Horizontal repulsive criterion: with relative position `s`, current
/// velocities `vo`/`vi`, and candidate ownship velocity `nvo`, the candidate
/// keeps the relative velocity on the side of `s` selected by `eps` and is
/// never less repulsive than the velocity it replaces.
pub fn horizontal_repulsive(s: Vect2, vo: Vect2, vi: Vect2, nvo: Vect2, eps: i32) -> bool {
    if eps == 0 {
        return true;
    }
    if s.is_zero() {
        return false;
    }
    let v = vo - vi;
    let nv = nvo - vi;
    let e = f64::from(eps);
    e * s.det(nv) <= 0.0 && e * s.det(nv) <= e * s.det(v)
}

/// Vertical repulsive criterion: the candidate's relative vertical speed
/// pushes in the `eps` direction at least as hard as the one it replaces.
/// The sign was derived from the relative position once, so only the
/// vertical rates matter here.
pub fn vertical_repulsive(_s: Vect3, vo: Vect3, vi: Vect3, nvo: Vect3, eps: i32) -> bool {
    if eps == 0 {
        return true;
    }
    let e = f64::from(eps);
    e * (nvo.z - vi.z) >= e * (vo.z - vi.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordination_signs_agree_across_the_pair() {
        let s = Vect2::new(1000.0, 200.0);
        let v = Vect2::new(-50.0, 5.0);
        let own = horizontal_coordination(s, v);
        // Swapped roles negate both position and velocity, preserving the
        // sign: the two aircraft commit to the same orientation.
        let other = horizontal_coordination(s * -1.0, v * -1.0);
        assert_eq!(own, other);
        assert_ne!(own, 0);
    }

    #[test]
    fn current_velocity_is_repulsive_wrt_its_own_sign() {
        let s = Vect2::new(1000.0, 200.0);
        let vo = Vect2::new(-50.0, 5.0);
        let vi = Vect2::new(0.0, 0.0);
        let eps = horizontal_coordination(s, vo - vi);
        assert!(horizontal_repulsive(s, vo, vi, vo, eps));
    }

    #[test]
    fn turning_into_the_intruder_is_not_repulsive() {
        // Intruder dead ahead, eps commits to one side; a candidate that
        // rotates the relative velocity to the other side is rejected.
        let s = Vect2::new(0.0, 1000.0);
        let vi = Vect2::ZERO;
        let vo = Vect2::new(1.0, 50.0); // slightly right of head-on
        let eps = horizontal_coordination(s, vo);
        assert_ne!(eps, 0);
        let away = Vect2::new(10.0, 49.0); // rotate further right
        let toward = Vect2::new(-10.0, 49.0); // rotate across to the left
        assert!(horizontal_repulsive(s, vo, vi, away, eps));
        assert!(!horizontal_repulsive(s, vo, vi, toward, eps));
    }

    #[test]
    fn vertical_tie_break_is_antisymmetric() {
        let s = Vect3::new(100.0, 0.0, 0.0);
        let a = vertical_coordination(s, "AC1", "AC2");
        let b = vertical_coordination(-s, "AC2", "AC1");
        assert_eq!(a, -b);
    }

    #[test]
    fn vertical_repulsive_monotone() {
        let s = Vect3::new(0.0, 1000.0, -100.0);
        let vo = Vect3::new(0.0, 50.0, 0.0);
        let vi = Vect3::ZERO;
        let eps = -1; // committed to descend (intruder above)
        let descend = Vect3::new(0.0, 50.0, -5.0);
        let climb = Vect3::new(0.0, 50.0, 5.0);
        assert!(vertical_repulsive(s, vo, vi, descend, eps));
        assert!(!vertical_repulsive(s, vo, vi, climb, eps));
    }
}
