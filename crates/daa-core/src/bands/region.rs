//! Region labels for guidance bands.

use serde::{Deserialize, Serialize};

/// Classification of a range of maneuver values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BandsRegion {
    /// Conflict free.
    None,
    Far,
    Mid,
    /// Conflict band.
    Near,
    /// Red, but the locally least-bad escape.
    Recovery,
    Unknown,
}

impl std::fmt::Display for BandsRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BandsRegion::None => "<NONE>",
            BandsRegion::Far => "<FAR>",
            BandsRegion::Mid => "<MID>",
            BandsRegion::Near => "<NEAR>",
            BandsRegion::Recovery => "<RECOVERY>",
            BandsRegion::Unknown => "<UNKNOWN>",
        };
        f.write_str(s)
    }
}

impl BandsRegion {
    /// Bare name used in PVS output.
    pub fn pvs_name(&self) -> &'static str {
        match self {
            BandsRegion::None => "NONE",
            BandsRegion::Near => "NEAR",
            BandsRegion::Recovery => "RECOVERY",
            BandsRegion::Far => "FAR",
            BandsRegion::Mid => "MID",
            BandsRegion::Unknown => "UNKNOWN",
        }
    }
}
