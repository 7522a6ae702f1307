//! Closed real intervals, sorted disjoint interval sets, and the integer
//! intervals produced by the discrete band search.

use serde::{Deserialize, Serialize};

use crate::geom::vect::{almost_equals, almost_less};

/// Closed interval [low, up]. Empty when `low > up`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub low: f64,
    pub up: f64,
}

impl Interval {
    pub const EMPTY: Interval = Interval {
        low: f64::INFINITY,
        up: f64::NEG_INFINITY,
    };

    pub fn new(low: f64, up: f64) -> Self {
        Interval { low, up }
    }

    pub fn is_empty(&self) -> bool {
        self.low > self.up
    }

    /// Closed-closed membership.
    pub fn in_cc(&self, x: f64) -> bool {
        self.low <= x && x <= self.up
    }

    /// Open-open membership.
    pub fn in_oo(&self, x: f64) -> bool {
        self.low < x && x < self.up
    }
}

/// Sorted, pairwise-disjoint union of closed intervals.
///
/// The `almost_*` operations merge or split at a fixed ulp-style tolerance so
/// that adjacent cells produced by the discrete search coalesce.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntervalSet {
    intervals: Vec<Interval>,
}

impl IntervalSet {
    pub fn new() -> Self {
        IntervalSet { intervals: Vec::new() }
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn get(&self, i: usize) -> Interval {
        self.intervals[i]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }

    pub fn contains(&self, x: f64) -> bool {
        self.intervals.iter().any(|i| i.in_cc(x))
    }

    /// Add an interval, merging any overlap.
    pub fn union(&mut self, iv: Interval) {
        if iv.is_empty() {
            return;
        }
        self.add_merged(iv.low, iv.up, false);
    }

    /// Add an interval, merging intervals that touch within tolerance.
    pub fn almost_add(&mut self, low: f64, up: f64) {
        if low > up {
            return;
        }
        self.add_merged(low, up, true);
    }

    fn add_merged(&mut self, mut low: f64, mut up: f64, almost: bool) {
        let touches = |a: f64, b: f64| {
            if almost {
                a <= b || almost_equals(a, b)
            } else {
                a <= b
            }
        };
        let mut out: Vec<Interval> = Vec::with_capacity(self.intervals.len() + 1);
        let mut inserted = false;
        for iv in self.intervals.drain(..) {
            if touches(iv.low, up) && touches(low, iv.up) {
                // overlap: absorb
                low = low.min(iv.low);
                up = up.max(iv.up);
            } else if iv.up < low {
                out.push(iv);
            } else {
                if !inserted {
                    out.push(Interval::new(low, up));
                    inserted = true;
                }
                out.push(iv);
            }
        }
        if !inserted {
            out.push(Interval::new(low, up));
        }
        out.sort_by(|a, b| a.low.partial_cmp(&b.low).unwrap_or(std::cmp::Ordering::Equal));
        self.intervals = out;
    }

    /// Intersect in place with another set, treating bounds equal within
    /// tolerance as equal.
    pub fn almost_intersect(&mut self, other: &IntervalSet) {
        let mut out = Vec::new();
        for a in &self.intervals {
            for b in &other.intervals {
                let low = a.low.max(b.low);
                let up = a.up.min(b.up);
                if low < up || almost_equals(low, up) {
                    out.push(Interval::new(low, up.max(low)));
                }
            }
        }
        out.sort_by(|a, b| a.low.partial_cmp(&b.low).unwrap_or(std::cmp::Ordering::Equal));
        self.intervals = out;
    }

    /// The complement of this set within [min, max].
    pub fn complement(&self, min: f64, max: f64) -> IntervalSet {
        let mut out = IntervalSet::new();
        let mut l = min;
        for iv in &self.intervals {
            if almost_less(l, iv.low) {
                out.union(Interval::new(l, iv.low.min(max)));
            }
            l = l.max(iv.up);
        }
        if almost_less(l, max) {
            out.union(Interval::new(l, max));
        }
        out
    }
}

/// Integer interval [lb, ub], the output of the discrete red-band search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integerval {
    pub lb: i32,
    pub ub: i32,
}

impl Integerval {
    pub fn new(lb: i32, ub: i32) -> Self {
        Integerval { lb, ub }
    }
}

impl std::fmt::Display for Integerval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]", self.lb, self.ub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_merges_overlaps() {
        let mut s = IntervalSet::new();
        s.union(Interval::new(0.0, 2.0));
        s.union(Interval::new(5.0, 7.0));
        s.union(Interval::new(1.0, 6.0));
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(0), Interval::new(0.0, 7.0));
    }

    #[test]
    fn almost_add_coalesces_adjacent_cells() {
        let mut s = IntervalSet::new();
        s.almost_add(0.0, 1.0);
        s.almost_add(1.0 + 1e-12, 2.0);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn disjoint_stays_sorted() {
        let mut s = IntervalSet::new();
        s.union(Interval::new(5.0, 6.0));
        s.union(Interval::new(0.0, 1.0));
        s.union(Interval::new(2.0, 3.0));
        let lows: Vec<f64> = s.iter().map(|i| i.low).collect();
        assert_eq!(lows, vec![0.0, 2.0, 5.0]);
    }

    #[test]
    fn intersect() {
        let mut a = IntervalSet::new();
        a.union(Interval::new(0.0, 4.0));
        a.union(Interval::new(6.0, 9.0));
        let mut b = IntervalSet::new();
        b.union(Interval::new(3.0, 7.0));
        a.almost_intersect(&b);
        let got: Vec<Interval> = a.iter().cloned().collect();
        assert_eq!(got, vec![Interval::new(3.0, 4.0), Interval::new(6.0, 7.0)]);
    }

    #[test]
    fn complement_covers_gaps() {
        let mut s = IntervalSet::new();
        s.union(Interval::new(2.0, 3.0));
        let c = s.complement(0.0, 5.0);
        let got: Vec<Interval> = c.iter().cloned().collect();
        assert_eq!(got, vec![Interval::new(0.0, 2.0), Interval::new(3.0, 5.0)]);
    }
}
