//! Geometry kernel: vectors, geodesy, positions, and the ownship-anchored
//! East-North-Up projection.

pub mod geodesy;
pub mod position;
pub mod vect;

pub use geodesy::EnuProjection;
pub use position::Position;
pub use vect::{Vect2, Vect3, Velocity};
