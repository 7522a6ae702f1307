//! State-sequence file reader.
//!
//! Parses a whitespace-separated table of aircraft states. The first
//! non-comment line names the columns; an optional second line carries
//! bracketed units per column. The first column is the aircraft id,
//! position is (lat, lon, alt) or (sx, sy, sz), velocity is (trk, gs, vs)
//! or (vx, vy, vz), and a `time` column partitions rows into timesteps.
//! Within a timestep the first aircraft is the ownship.

use std::fs;
use std::io;
use std::path::Path;

use crate::daidalus::Daidalus;
use crate::geom::position::Position;
use crate::geom::vect::Velocity;
use crate::state::TrafficState;
use crate::units;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PositionColumns {
    LatLonAlt { lat: usize, lon: usize, alt: usize },
    Xyz { sx: usize, sy: usize, sz: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VelocityColumns {
    TrkGsVs { trk: usize, gs: usize, vs: usize },
    Vxyz { vx: usize, vy: usize, vz: usize },
}

/// One timestep: every aircraft sharing a time value, ownship first.
#[derive(Debug, Clone)]
pub struct TimeStep {
    pub time: f64,
    pub aircraft: Vec<TrafficState>,
}

/// A fully parsed sequence file.
#[derive(Debug, Clone)]
pub struct StateSequence {
    steps: Vec<TimeStep>,
}

impl StateSequence {
    pub fn from_file(path: &Path) -> io::Result<StateSequence> {
        let text = fs::read_to_string(path)?;
        StateSequence::parse(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn parse(text: &str) -> Result<StateSequence, String> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header: Vec<String> = lines
            .next()
            .ok_or("empty sequence file")?
            .split([' ', '\t', ','])
            .filter(|t| !t.is_empty())
            .map(|t| t.to_lowercase())
            .collect();

        let find = |names: &[&str]| -> Option<usize> {
            header.iter().position(|h| names.contains(&h.as_str()))
        };

        let pos_cols = match (find(&["lat"]), find(&["lon", "long"]), find(&["alt"])) {
            (Some(lat), Some(lon), Some(alt)) => PositionColumns::LatLonAlt { lat, lon, alt },
            _ => match (find(&["sx", "x"]), find(&["sy", "y"]), find(&["sz", "z"])) {
                (Some(sx), Some(sy), Some(sz)) => PositionColumns::Xyz { sx, sy, sz },
                _ => return Err("no position columns (lat/lon/alt or sx/sy/sz)".to_string()),
            },
        };
        let vel_cols = match (find(&["trk", "track"]), find(&["gs", "groundspeed"]), find(&["vs", "verticalspeed"])) {
            (Some(trk), Some(gs), Some(vs)) => VelocityColumns::TrkGsVs { trk, gs, vs },
            _ => match (find(&["vx"]), find(&["vy"]), find(&["vz"])) {
                (Some(vx), Some(vy), Some(vz)) => VelocityColumns::Vxyz { vx, vy, vz },
                _ => return Err("no velocity columns (trk/gs/vs or vx/vy/vz)".to_string()),
            },
        };
        let time_col = find(&["time", "tm", "st"]);

        let mut rows: Vec<&str> = lines.collect();
        // Optional units line: bracketed symbols per column.
        let mut col_units: Vec<String> = vec![String::new(); header.len()];
        if let Some(first) = rows.first() {
            if first.contains('[') {
                for (i, tok) in first
                    .split([' ', '\t', ','])
                    .filter(|t| !t.is_empty())
                    .enumerate()
                {
                    if i < col_units.len() {
                        col_units[i] = tok.trim_matches(['[', ']']).to_string();
                    }
                }
                rows.remove(0);
            }
        }

        let getf = |fields: &[&str], i: usize| -> Result<f64, String> {
            let raw = fields
                .get(i)
                .ok_or_else(|| format!("missing column {i}"))?;
            let v: f64 = raw
                .parse()
                .map_err(|_| format!("cannot parse number: {raw}"))?;
            let u = col_units.get(i).map(String::as_str).unwrap_or("");
            Ok(if u.is_empty() { v } else { units::from(u, v) })
        };

        let mut steps: Vec<TimeStep> = Vec::new();
        for row in rows {
            let fields: Vec<&str> = row.split([' ', '\t', ',']).filter(|t| !t.is_empty()).collect();
            if fields.len() < 4 {
                continue;
            }
            let id = fields[0].to_string();
            let pos = match pos_cols {
                PositionColumns::LatLonAlt { lat, lon, alt } => {
                    // Latitude and longitude are kept in degrees.
                    let latv: f64 = fields[lat].parse().map_err(|_| "bad lat")?;
                    let lonv: f64 = fields[lon].parse().map_err(|_| "bad lon")?;
                    Position::lat_lon(latv, lonv, getf(&fields, alt)?)
                }
                PositionColumns::Xyz { sx, sy, sz } => {
                    Position::euclidean(getf(&fields, sx)?, getf(&fields, sy)?, getf(&fields, sz)?)
                }
            };
            let vel = match vel_cols {
                VelocityColumns::TrkGsVs { trk, gs, vs } => {
                    Velocity::from_trk_gs_vs(getf(&fields, trk)?, getf(&fields, gs)?, getf(&fields, vs)?)
                }
                VelocityColumns::Vxyz { vx, vy, vz } => {
                    Velocity::new(getf(&fields, vx)?, getf(&fields, vy)?, getf(&fields, vz)?)
                }
            };
            let time = match time_col {
                Some(i) => getf(&fields, i)?,
                None => 0.0,
            };
            let ac = TrafficState::new(id, pos, vel);
            match steps.last_mut() {
                Some(step) if step.time == time => step.aircraft.push(ac),
                _ => steps.push(TimeStep {
                    time,
                    aircraft: vec![ac],
                }),
            }
        }
        Ok(StateSequence { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, i: usize) -> Option<&TimeStep> {
        self.steps.get(i)
    }
}

/// Single-pass walker over a sequence, loading one timestep at a time into
/// a `Daidalus` instance.
pub struct SequenceWalker {
    seq: StateSequence,
    index: usize,
}

impl SequenceWalker {
    pub fn from_file(path: &Path) -> io::Result<SequenceWalker> {
        Ok(SequenceWalker {
            seq: StateSequence::from_file(path)?,
            index: 0,
        })
    }

    pub fn new(seq: StateSequence) -> SequenceWalker {
        SequenceWalker { seq, index: 0 }
    }

    pub fn at_end(&self) -> bool {
        self.index >= self.seq.len()
    }

    pub fn time(&self) -> Option<f64> {
        self.seq.step(self.index).map(|s| s.time)
    }

    /// Load the current timestep into `daa` (first aircraft becomes the
    /// ownship) and advance.
    pub fn read_state(&mut self, daa: &mut Daidalus) {
        let Some(step) = self.seq.step(self.index) else {
            return;
        };
        daa.reset();
        for (i, ac) in step.aircraft.iter().enumerate() {
            if i == 0 {
                daa.set_ownship_state(&ac.id, ac.pos, ac.vel, step.time);
            } else {
                daa.add_traffic(&ac.id, ac.pos, ac.vel);
            }
        }
        self.index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
NAME lat lon alt trk gs vs time
[none] [deg] [deg] [ft] [deg] [knot] [fpm] [s]
own 33.9500 -96.7000 8700.0 206.0 151.0 0.0 0.0
intr 33.8620 -96.7330 9000.0 0.0 210.0 0.0 0.0
own 33.9490 -96.7010 8700.0 206.0 151.0 0.0 1.0
intr 33.8630 -96.7330 9000.0 0.0 210.0 0.0 1.0
";

    #[test]
    fn parses_timesteps_with_units() {
        let seq = StateSequence::parse(SAMPLE).unwrap();
        assert_eq!(seq.len(), 2);
        let step = seq.step(0).unwrap();
        assert_eq!(step.time, 0.0);
        assert_eq!(step.aircraft.len(), 2);
        let own = &step.aircraft[0];
        assert_eq!(own.id, "own");
        assert!(own.is_lat_lon());
        assert!((own.pos.alt() - units::from("ft", 8700.0)).abs() < 1e-9);
        assert!((own.vel.gs() - units::from("knot", 151.0)).abs() < 1e-9);
        assert!((own.vel.trk() - units::from("deg", 206.0)).abs() < 1e-9);
    }

    #[test]
    fn walker_loads_ownship_first() {
        let seq = StateSequence::parse(SAMPLE).unwrap();
        let mut walker = SequenceWalker::new(seq);
        let mut daa = Daidalus::new();
        walker.read_state(&mut daa);
        assert_eq!(daa.number_of_aircraft(), 2);
        assert_eq!(daa.aircraft_index("own"), 0);
        assert_eq!(daa.aircraft_index("intr"), 1);
        assert_eq!(daa.current_time(), 0.0);
        walker.read_state(&mut daa);
        assert_eq!(daa.current_time(), 1.0);
        assert!(walker.at_end());
    }

    #[test]
    fn euclidean_columns() {
        let text = "\
NAME sx sy sz vx vy vz
[none] [m] [m] [m] [m/s] [m/s] [m/s]
a 0.0 0.0 1000.0 0.0 100.0 0.0
b 5000.0 0.0 1000.0 0.0 -100.0 0.0
";
        let seq = StateSequence::parse(text).unwrap();
        assert_eq!(seq.len(), 1);
        let step = seq.step(0).unwrap();
        assert!(!step.aircraft[0].is_lat_lon());
        assert_eq!(step.aircraft[1].pos.point().x, 5000.0);
    }
}
