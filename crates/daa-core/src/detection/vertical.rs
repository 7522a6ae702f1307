//! Vertical encounter geometry shared by the detector variants.

use crate::geom::vect::{almost_equals, sign};

/// Time at which sz + t vz = eps * sign(vz) * h. `eps = -1` is the entry
/// into the slab |z| <= h, `eps = 1` the exit. Requires `vz` nonzero.
pub fn theta_h(sz: f64, vz: f64, eps: i32, h: f64) -> f64 {
    (f64::from(eps * sign(vz)) * h - sz) / vz
}

/// Time to co-altitude; negative when the aircraft are vertically diverging.
pub fn time_coalt(sz: f64, vz: f64) -> f64 {
    if almost_equals(vz, 0.0) {
        -1.0
    } else {
        -sz / vz
    }
}

/// Instantaneous vertical well-clear violation: inside the altitude slab, or
/// converging with time to co-altitude within `tcoa`.
pub fn vertical_wcv(zthr: f64, tcoa: f64, sz: f64, vz: f64) -> bool {
    sz.abs() <= zthr
        || (!almost_equals(vz, 0.0) && sz * vz <= 0.0 && {
            let t = time_coalt(sz, vz);
            0.0 <= t && t <= tcoa
        })
}

/// Vertical well-clear interval within [b, t]. Entry is through the larger
/// of the altitude slab and the co-altitude horizon; exit is through the
/// altitude slab.
pub fn vertical_wcv_interval(zthr: f64, tcoa: f64, b: f64, t: f64, sz: f64, vz: f64) -> (f64, f64) {
    if almost_equals(vz, 0.0) {
        if sz.abs() <= zthr {
            return (b, t);
        }
        return (t, b); // empty
    }
    let act_h = zthr.max(vz.abs() * tcoa);
    let tentry = theta_h(sz, vz, -1, act_h);
    let texit = theta_h(sz, vz, 1, zthr);
    if t < tentry || texit < b {
        return (t, b); // empty
    }
    (tentry.max(b), texit.min(t))
}
