//! daa-core - Detect-and-avoid logic for unmanned aircraft
//!
//! Given the state of an ownship and a set of traffic aircraft, this crate
//! answers two coupled questions: is there (or will there soon be) a loss
//! of safe separation, and at what severity; and which ranges of heading,
//! ground speed, vertical speed, and altitude keep the ownship clear. When
//! every maneuver is in conflict it computes recovery bands: the maneuvers
//! that restore separation as soon as possible.
//!
//! This crate contains the domain models and the band/alerting algorithms
//! with NO networking dependencies.

pub mod alerting;
pub mod bands;
pub mod criteria;
pub mod daidalus;
pub mod detection;
pub mod errlog;
pub mod geom;
pub mod interval;
pub mod kinematics;
pub mod params;
pub mod pvs;
pub mod sequence;
pub mod state;
pub mod units;
pub mod urgency;

pub use alerting::{AlertInfo, AlertThresholds, Alertor};
pub use bands::{BandsRegion, KinematicBands};
pub use daidalus::Daidalus;
pub use detection::{CdCylinder, ConflictData, Detector, LossData, Tcas3d, WcvTable, WcvTaumod};
pub use errlog::ErrorLog;
pub use geom::{Position, Vect2, Vect3, Velocity};
pub use interval::{Integerval, Interval, IntervalSet};
pub use params::Parameters;
pub use sequence::{SequenceWalker, StateSequence};
pub use state::{OwnshipState, TrafficState};
pub use urgency::UrgencyStrategy;
