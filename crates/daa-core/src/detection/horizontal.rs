//! Horizontal encounter geometry shared by the detector variants.

use crate::geom::vect::Vect2;

/// Discriminant of the circle-crossing quadratic: nonnegative iff the
/// relative track crosses the disk of radius `d`.
pub fn delta(s: Vect2, v: Vect2, d: f64) -> f64 {
    d * d * v.sqv() - s.det(v).powi(2)
}

/// Time at which |s + t v| = d. `eps = -1` gives the entry root, `eps = 1`
/// the exit root. Requires `v` nonzero and `delta(s, v, d) >= 0`.
pub fn theta_d(s: Vect2, v: Vect2, eps: i32, d: f64) -> f64 {
    let a = v.sqv();
    let b = s.dot(v);
    let c = s.sqv() - d * d;
    let discr = b * b - a * c;
    (-b + f64::from(eps) * discr.max(0.0).sqrt()) / a
}

/// Time of horizontal closest point of approach; 0 for a static pair.
pub fn tcpa(s: Vect2, v: Vect2) -> f64 {
    let a = v.sqv();
    if a < f64::EPSILON {
        0.0
    } else {
        -s.dot(v) / a
    }
}

/// Distance at horizontal closest point of approach.
pub fn dcpa(s: Vect2, v: Vect2) -> f64 {
    v.scal_add(tcpa(s, v), s).norm()
}

/// Modified tau with distance threshold `d`: the time-to-threshold measure
/// that stays well-behaved at low closure rates. Negative when the pair is
/// not converging.
pub fn tau_mod(d: f64, s: Vect2, v: Vect2) -> f64 {
    let sdotv = s.dot(v);
    if sdotv < 0.0 {
        (d * d - s.sqv()) / sdotv
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theta_roots_bracket_cpa() {
        // Head-on along the x axis, crossing a 5 m disk.
        let s = Vect2::new(-100.0, 0.0);
        let v = Vect2::new(10.0, 0.0);
        assert!(delta(s, v, 5.0) > 0.0);
        let tin = theta_d(s, v, -1, 5.0);
        let tout = theta_d(s, v, 1, 5.0);
        let tca = tcpa(s, v);
        assert!(tin < tca && tca < tout);
        assert!((tin - 9.5).abs() < 1e-9);
        assert!((tout - 10.5).abs() < 1e-9);
    }

    #[test]
    fn miss_has_negative_delta() {
        let s = Vect2::new(-100.0, 50.0);
        let v = Vect2::new(10.0, 0.0);
        assert!(delta(s, v, 5.0) < 0.0);
    }

    #[test]
    fn tau_mod_diverging_is_negative() {
        let s = Vect2::new(100.0, 0.0);
        let v = Vect2::new(10.0, 0.0); // moving away
        assert!(tau_mod(50.0, s, v) < 0.0);
    }

    #[test]
    fn tau_mod_converging() {
        let s = Vect2::new(1000.0, 0.0);
        let v = Vect2::new(-100.0, 0.0);
        // (d^2 - |s|^2) / (s.v) = (10000 - 1000000) / -100000 = 9.9
        assert!((tau_mod(100.0, s, v) - 9.9).abs() < 1e-9);
    }
}
