//! Urgency strategies: how the single most-urgent intruder is chosen for
//! the coordination criteria.

use serde::{Deserialize, Serialize};

use crate::detection::Detector;
use crate::state::{OwnshipState, TrafficState};

/// Strategy for selecting the criterion aircraft.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum UrgencyStrategy {
    /// Never select an aircraft.
    #[default]
    None,
    /// Always select the aircraft with this identifier, when present.
    FixedAircraft { id: String },
}

impl UrgencyStrategy {
    /// The most urgent aircraft, or None when the strategy yields nothing.
    pub fn most_urgent_aircraft<'a>(
        &self,
        _detector: &Detector,
        _ownship: &OwnshipState,
        traffic: &'a [TrafficState],
        _t: f64,
    ) -> Option<&'a TrafficState> {
        match self {
            UrgencyStrategy::None => None,
            UrgencyStrategy::FixedAircraft { id } => TrafficState::find(traffic, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::position::Position;
    use crate::geom::vect::Velocity;

    fn traffic() -> Vec<TrafficState> {
        vec![
            TrafficState::new("A", Position::euclidean(0.0, 0.0, 0.0), Velocity::ZERO),
            TrafficState::new("B", Position::euclidean(1.0, 0.0, 0.0), Velocity::ZERO),
        ]
    }

    #[test]
    fn none_strategy_selects_nothing() {
        let own = OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(0.0, 0.0, 0.0),
            Velocity::ZERO,
        ));
        let strat = UrgencyStrategy::None;
        assert!(strat
            .most_urgent_aircraft(&Detector::default(), &own, &traffic(), 60.0)
            .is_none());
    }

    #[test]
    fn fixed_strategy_finds_by_id() {
        let own = OwnshipState::new(TrafficState::new(
            "own",
            Position::euclidean(0.0, 0.0, 0.0),
            Velocity::ZERO,
        ));
        let strat = UrgencyStrategy::FixedAircraft { id: "B".to_string() };
        let traffic_list = traffic();
        let ac = strat.most_urgent_aircraft(&Detector::default(), &own, &traffic_list, 60.0);
        assert_eq!(ac.map(|a| a.id.as_str()), Some("B"));
        // Missing aircraft degrades to no selection.
        let strat = UrgencyStrategy::FixedAircraft { id: "Z".to_string() };
        assert!(strat
            .most_urgent_aircraft(&Detector::default(), &own, &traffic(), 60.0)
            .is_none());
    }
}
