//! Integer band engine.
//!
//! Discretizes one maneuver axis into cells of `tstep` seconds of maneuver
//! and walks outward from the current control value in each direction,
//! combining three mechanics: a per-cell conflict test against every
//! intruder, a repulsive-criterion gate against the designated criterion
//! aircraft, and a first-loss-of-separation bound that stops the search
//! once the current trajectory is already in violation.
//!
//! Cells are produced in strictly increasing index order per direction; the
//! combined output is an ordered list of conflict-free integer intervals
//! within [-maxl, maxr].

use crate::criteria;
use crate::detection::Detector;
use crate::geom::vect::{Vect3, Velocity};
use crate::interval::{Integerval, IntervalSet};
use crate::state::{OwnshipState, TrafficState};

/// A maneuver axis: the ownship state after `t` seconds of maneuvering in
/// the given direction (false = left/down, true = right/up), in the
/// projected frame. Pure function of its inputs.
pub trait Maneuver {
    fn trajectory(&self, ownship: &OwnshipState, t: f64, dir: bool) -> (Vect3, Velocity);
}

/// Inputs of one integer band search, shared across the walk.
pub struct Search<'a, M: Maneuver + ?Sized> {
    pub maneuver: &'a M,
    pub conflict_det: &'a Detector,
    /// Detector protecting the maneuver segment itself, active over [b2, t2]
    /// (typically [0, b] during a recovery computation).
    pub recovery_det: Option<&'a Detector>,
    pub tstep: f64,
    pub b: f64,
    pub t: f64,
    pub b2: f64,
    pub t2: f64,
    pub ownship: &'a OwnshipState,
    pub traffic: &'a [TrafficState],
    pub repac: Option<&'a TrafficState>,
    pub epsh: i32,
    pub epsv: i32,
}

impl<M: Maneuver + ?Sized> Search<'_, M> {
    fn use_hcrit(&self) -> bool {
        self.repac.is_some() && self.epsh != 0
    }

    fn use_vcrit(&self) -> bool {
        self.repac.is_some() && self.epsv != 0
    }

    /// Linear velocity between consecutive trajectory samples, used by the
    /// repulsive checks to approximate the maneuver's instantaneous effect.
    fn linvel(&self, trajdir: bool, k: i32) -> Vect3 {
        let (s1, _) = self.maneuver.trajectory(self.ownship, f64::from(k + 1) * self.tstep, trajdir);
        let (s0, _) = self.maneuver.trajectory(self.ownship, f64::from(k) * self.tstep, trajdir);
        (s1 - s0) * (1.0 / self.tstep)
    }

    /// Any intruder already in loss of separation at maneuver time `tsk`.
    fn any_los_aircraft(&self, det: &Detector, trajdir: bool, tsk: f64) -> bool {
        self.traffic.iter().any(|ac| {
            let (sot, vot) = self.maneuver.trajectory(self.ownship, tsk, trajdir);
            let si = self.ownship.traffic_s(ac);
            let vi = self.ownship.traffic_v(ac);
            let sit = vi.vect3().scal_add(tsk, si);
            det.violation(sot, vot, sit, vi)
        })
    }

    /// Conflict against `ac` for the trajectory that finishes its maneuver
    /// at time `t` and then flies straight, searched over [b, t_horizon].
    fn cd_future_traj(&self, det: &Detector, b: f64, t_horizon: f64, trajdir: bool, t: f64, ac: &TrafficState) -> bool {
        if t > t_horizon || b > t_horizon {
            return false;
        }
        let (sot, vot) = self.maneuver.trajectory(self.ownship, t, trajdir);
        let si = self.ownship.traffic_s(ac);
        let vi = self.ownship.traffic_v(ac);
        let sit = vi.vect3().scal_add(t, si);
        if b > t {
            det.conflict(sot, vot, sit, vi, b - t, t_horizon - t)
        } else {
            det.conflict(sot, vot, sit, vi, 0.0, t_horizon - t)
        }
    }

    fn any_conflict_aircraft(&self, det: &Detector, b: f64, t_horizon: f64, trajdir: bool, tsk: f64) -> bool {
        self.traffic
            .iter()
            .any(|ac| self.cd_future_traj(det, b, t_horizon, trajdir, tsk, ac))
    }

    /// Conflict against the nominal detector or, if present, the recovery
    /// detector in its own window.
    fn any_conflict(&self, trajdir: bool, tsk: f64) -> bool {
        self.any_conflict_aircraft(self.conflict_det, self.b, self.t, trajdir, tsk)
            || self.recovery_det.is_some_and(|det| {
                self.any_conflict_aircraft(det, self.b2, self.t2, trajdir, tsk)
            })
    }

    fn any_conflict_step(&self, det: &Detector, b: f64, t_horizon: f64, trajdir: bool, max: i32) -> bool {
        (0..=max).any(|k| self.any_conflict_aircraft(det, b, t_horizon, trajdir, self.tstep * f64::from(k)))
    }

    /// Smallest k in [min, max] whose maneuver point is already in loss of
    /// separation, or None.
    fn first_los_step(&self, det: &Detector, trajdir: bool, min: i32, max: i32) -> Option<i32> {
        (min..=max).find(|&k| self.any_los_aircraft(det, trajdir, f64::from(k) * self.tstep))
    }

    fn first_los_search_index(&self, trajdir: bool, max: i32) -> i32 {
        let k = (self.b / self.tstep).ceil() as i32;
        let n = ((self.t / self.tstep).floor() as i32).min(max);
        let k2 = (self.b2 / self.tstep).ceil() as i32;
        let n2 = ((self.t2 / self.tstep).floor() as i32).min(max);
        let first_init = self
            .recovery_det
            .and_then(|det| self.first_los_step(det, trajdir, k2, n2))
            .unwrap_or(max + 1);
        let first = self
            .first_los_step(self.conflict_det, trajdir, k, n)
            .unwrap_or(max + 1);
        first_init.min(first)
    }

    /// The repulsive check at step k: the chain of linear velocities along
    /// the maneuver must never rotate the relative velocity off the
    /// committed side.
    fn repulsive_at(&self, trajdir: bool, k: i32) -> bool {
        let repac = match self.repac {
            Some(ac) => ac,
            None => return true,
        };
        if k == 0 {
            return true;
        }
        let (so3, vo3) = self.maneuver.trajectory(self.ownship, 0.0, trajdir);
        let so = so3.vect2();
        let vo = vo3.vect2();
        let si = self.ownship.traffic_s(repac).vect2();
        let vi = self.ownship.traffic_v(repac).vect2();
        let mut rep = true;
        if k == 1 {
            rep = criteria::horizontal_repulsive(
                so - si,
                vo,
                vi,
                self.linvel(trajdir, 0).vect2(),
                self.epsh,
            );
        }
        if rep {
            let (sot3, vot3) = self.maneuver.trajectory(self.ownship, f64::from(k) * self.tstep, trajdir);
            let sot = sot3.vect2();
            let vot = vot3.vect2();
            let sit = vi.scal_add(f64::from(k) * self.tstep, si);
            let st = sot - sit;
            let vop = self.linvel(trajdir, k - 1).vect2();
            let vok = self.linvel(trajdir, k).vect2();
            return criteria::horizontal_repulsive(st, vop, vi, vot, self.epsh)
                && criteria::horizontal_repulsive(st, vot, vi, vok, self.epsh)
                && criteria::horizontal_repulsive(st, vop, vi, vok, self.epsh);
        }
        false
    }

    fn first_nonrepulsive_step(&self, trajdir: bool, max: i32) -> Option<i32> {
        (0..=max).find(|&k| !self.repulsive_at(trajdir, k))
    }

    fn vert_repul_at(&self, trajdir: bool, k: i32) -> bool {
        let repac = match self.repac {
            Some(ac) => ac,
            None => return true,
        };
        if k == 0 {
            return true;
        }
        let (so, vo) = self.maneuver.trajectory(self.ownship, 0.0, trajdir);
        let si = self.ownship.traffic_s(repac);
        let vi = self.ownship.traffic_v(repac).vect3();
        let mut rep = true;
        if k == 1 {
            rep = criteria::vertical_repulsive(so - si, vo.vect3(), vi, self.linvel(trajdir, 0), self.epsv);
        }
        if rep {
            let (sot, vot) = self.maneuver.trajectory(self.ownship, f64::from(k) * self.tstep, trajdir);
            let sit = vi.scal_add(f64::from(k) * self.tstep, si);
            let st = sot - sit;
            let vop = self.linvel(trajdir, k - 1);
            let vok = self.linvel(trajdir, k);
            return criteria::vertical_repulsive(st, vop, vi, vot.vect3(), self.epsv)
                && criteria::vertical_repulsive(st, vot.vect3(), vi, vok, self.epsv)
                && criteria::vertical_repulsive(st, vop, vi, vok, self.epsv);
        }
        false
    }

    fn first_nonvert_repul_step(&self, trajdir: bool, max: i32) -> Option<i32> {
        (0..=max).find(|&k| !self.vert_repul_at(trajdir, k))
    }

    /// Upper bound of the useful search range in one direction: the first
    /// loss of separation or criterion failure, whichever comes first.
    fn bands_search_index(&self, trajdir: bool, max: i32) -> i32 {
        let first_los = self.first_los_search_index(trajdir, max);
        let first_nonhrep = if !self.use_hcrit() || first_los == 0 {
            first_los
        } else {
            self.first_nonrepulsive_step(trajdir, first_los - 1).unwrap_or(max + 1)
        };
        let first_probh = first_los.min(first_nonhrep);
        let first_nonvrep = if !self.use_vcrit() || first_probh == 0 {
            first_probh
        } else {
            self.first_nonvert_repul_step(trajdir, first_probh - 1).unwrap_or(max + 1)
        };
        first_probh.min(first_nonvrep)
    }

    /// Conflict-free integer intervals in [0, max] for one direction.
    fn traj_conflict_only_bands(&self, trajdir: bool, max: i32) -> Vec<Integerval> {
        let mut out = Vec::new();
        let mut first: Option<i32> = None;
        for k in 0..=max {
            let tsk = self.tstep * f64::from(k);
            let red = self.any_conflict(trajdir, tsk);
            match (first, red) {
                (Some(_), false) => {}
                (Some(f), true) => {
                    out.push(Integerval::new(f, k - 1));
                    first = None;
                }
                (None, false) => first = Some(k),
                (None, true) => {}
            }
        }
        if let Some(f) = first {
            out.push(Integerval::new(f, max));
        }
        out
    }

    fn kinematic_bands(&self, trajdir: bool, max: i32) -> Vec<Integerval> {
        let bsi = self.bands_search_index(trajdir, max);
        if bsi == 0 {
            Vec::new()
        } else {
            self.traj_conflict_only_bands(trajdir, bsi - 1)
        }
    }

    /// Green integer intervals over [-maxl, maxr], both directions combined.
    pub fn combine(&self, maxl: i32, maxr: i32) -> Vec<Integerval> {
        let mut left = self.kinematic_bands(false, maxl);
        let right = self.kinematic_bands(true, maxr);
        neg(&mut left);
        append_intband(&mut left, right);
        left
    }

    /// Smallest k in [0, max] that is conflict free and passes every gate,
    /// or None. Used by the recovery binary search.
    fn first_green(&self, trajdir: bool, max: i32) -> Option<i32> {
        for k in 0..=max {
            let tsk = self.tstep * f64::from(k);
            let blocked = (tsk >= self.b
                && tsk <= self.t
                && self.any_los_aircraft(self.conflict_det, trajdir, tsk))
                || self.recovery_det.is_some_and(|det| {
                    tsk >= self.b2 && tsk <= self.t2 && self.any_los_aircraft(det, trajdir, tsk)
                })
                || (self.use_hcrit() && !self.repulsive_at(trajdir, k))
                || (self.use_vcrit() && !self.vert_repul_at(trajdir, k));
            if blocked {
                return None;
            }
            if !self.any_conflict_aircraft(self.conflict_det, self.b, self.t, trajdir, tsk)
                && !self.recovery_det.is_some_and(|det| {
                    self.any_conflict_aircraft(det, self.b2, self.t2, trajdir, tsk)
                })
            {
                return Some(k);
            }
        }
        None
    }

    /// Any red cell in the selected direction(s): a criterion failure, a
    /// conflict, or a during-recovery violation.
    fn red_band_exist(&self, trajdir: bool, max: i32) -> bool {
        (self.use_hcrit() && self.first_nonrepulsive_step(trajdir, max).is_some())
            || (self.use_vcrit() && self.first_nonvert_repul_step(trajdir, max).is_some())
            || self.any_conflict_step(self.conflict_det, self.b, self.t, trajdir, max)
            || self.recovery_det.is_some_and(|det| {
                self.any_conflict_step(det, self.b2, self.t2, trajdir, max)
            })
    }

    /// dir < 0 restricts to the left direction, dir > 0 to the right.
    pub fn any_int_red(&self, maxl: i32, maxr: i32, dir: i32) -> bool {
        (dir <= 0 && self.red_band_exist(false, maxl)) || (dir >= 0 && self.red_band_exist(true, maxr))
    }

    pub fn all_int_red(&self, maxl: i32, maxr: i32, dir: i32) -> bool {
        let left = dir > 0 || self.first_green(false, maxl).is_none();
        let right = dir < 0 || self.first_green(true, maxr).is_none();
        left && right
    }
}

/// Negate and reverse a list of integer intervals in place, mapping the
/// left-direction search onto negative indices.
pub fn neg(l: &mut Vec<Integerval>) {
    let mut out: Vec<Integerval> = l.iter().rev().map(|iv| Integerval::new(-iv.ub, -iv.lb)).collect();
    std::mem::swap(l, &mut out);
}

/// Append `r` to `l`, merging the boundary intervals when they meet at or
/// across zero (the current-control cell is shared by both directions).
pub fn append_intband(l: &mut Vec<Integerval>, mut r: Vec<Integerval>) {
    if let (Some(last), Some(first)) = (l.last_mut(), r.first()) {
        if first.lb - last.ub <= 1 {
            last.ub = first.ub;
            r.remove(0);
        }
    }
    l.append(&mut r);
}

/// Scale integer intervals to physical values and clip them to [min, max].
pub fn to_interval_set(l: &[Integerval], scal: f64, add: f64, min: f64, max: f64) -> IntervalSet {
    let mut set = IntervalSet::new();
    for iv in l {
        let lb = scal * f64::from(iv.lb) + add;
        let ub = scal * f64::from(iv.ub) + add;
        if min <= ub && lb <= max {
            set.almost_add(lb.max(min), ub.min(max));
        }
    }
    set
}

/// Scale integer intervals to track angles, wrapping modulo 2 pi.
pub fn to_interval_set_0_2pi(l: &[Integerval], scal: f64, add: f64) -> IntervalSet {
    use crate::geom::vect::to_2pi;
    let two_pi = 2.0 * std::f64::consts::PI;
    let mut set = IntervalSet::new();
    for iv in l {
        let mut lb = scal * f64::from(iv.lb) + add;
        let mut ub = scal * f64::from(iv.ub) + add;
        if 0.0 <= lb && ub <= two_pi {
            set.almost_add(lb, ub);
        } else if ub < 0.0 || lb > two_pi {
            set.almost_add(to_2pi(lb), to_2pi(ub));
        } else {
            if lb < 0.0 {
                set.almost_add(to_2pi(lb), two_pi);
                lb = 0.0;
            }
            if ub > two_pi {
                set.almost_add(0.0, to_2pi(ub));
                ub = two_pi;
            }
            set.almost_add(lb, ub);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neg_reverses_and_negates() {
        let mut l = vec![Integerval::new(0, 3), Integerval::new(5, 8)];
        neg(&mut l);
        assert_eq!(l, vec![Integerval::new(-8, -5), Integerval::new(-3, 0)]);
    }

    #[test]
    fn append_merges_across_zero() {
        let mut l = vec![Integerval::new(-4, 0)];
        append_intband(&mut l, vec![Integerval::new(0, 5), Integerval::new(9, 12)]);
        assert_eq!(l, vec![Integerval::new(-4, 5), Integerval::new(9, 12)]);
    }

    #[test]
    fn append_keeps_gap() {
        let mut l = vec![Integerval::new(-4, -2)];
        append_intband(&mut l, vec![Integerval::new(1, 5)]);
        assert_eq!(l, vec![Integerval::new(-4, -2), Integerval::new(1, 5)]);
    }

    #[test]
    fn interval_set_scaling_clips() {
        let l = vec![Integerval::new(-2, 3)];
        let set = to_interval_set(&l, 10.0, 100.0, 90.0, 120.0);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0).low, 90.0);
        assert_eq!(set.get(0).up, 120.0);
    }

    #[test]
    fn track_wrap_splits_interval() {
        use std::f64::consts::PI;
        // An interval straddling 0 wraps into two pieces.
        let l = vec![Integerval::new(-2, 2)];
        let set = to_interval_set_0_2pi(&l, PI / 18.0, 0.0);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).low, 0.0);
        assert!((set.get(1).up - 2.0 * PI).abs() < 1e-12);
    }
}
