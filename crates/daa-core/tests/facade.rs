//! Facade bookkeeping: aircraft list handling, ownship swapping, traffic
//! projection, and PVS export.

use daa_core::{units, Daidalus, Position, TrafficState, Velocity};

fn euclidean_ac(id: &str, x: f64, y: f64, alt_ft: f64, gs: f64) -> TrafficState {
    TrafficState::new(
        id,
        Position::euclidean(x, y, units::from("ft", alt_ft)),
        Velocity::from_trk_gs_vs(0.0, gs, 0.0),
    )
}

#[test]
fn set_aircraft_list_makes_the_first_element_the_ownship() {
    let mut daa = Daidalus::new();
    daa.set_aircraft_list(
        vec![
            euclidean_ac("alpha", 0.0, 0.0, 8000.0, 100.0),
            euclidean_ac("bravo", 0.0, 9000.0, 8000.0, 100.0),
        ],
        5.0,
    );
    assert_eq!(daa.number_of_aircraft(), 2);
    assert_eq!(daa.aircraft_index("alpha"), 0);
    assert_eq!(daa.current_time(), 5.0);
    // The ownship anchors the projection: bands and alerting work.
    assert!(daa.kinematic_bands().is_some());
}

#[test]
fn reset_ownship_swaps_and_keeps_times_consistent() {
    let mut daa = Daidalus::new();
    daa.set_aircraft_list(
        vec![
            euclidean_ac("alpha", 0.0, 0.0, 8000.0, 100.0),
            euclidean_ac("bravo", 0.0, 9000.0, 8000.0, 100.0),
        ],
        0.0,
    );
    daa.reset_ownship(1);
    assert_eq!(daa.aircraft_index("bravo"), 0);
    assert_eq!(daa.aircraft_index("alpha"), 1);
}

#[test]
fn late_traffic_is_projected_to_the_current_time() {
    let mut daa = Daidalus::new();
    daa.set_ownship_state(
        "own",
        Position::euclidean(0.0, 0.0, 1000.0),
        Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        10.0,
    );
    // State observed 5 seconds ago, flying north at 100 m/s: it appears
    // 500 m farther north at the current time.
    daa.add_traffic_state(
        "late",
        Position::euclidean(0.0, 5000.0, 1000.0),
        Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        5.0,
    );
    let ac = daa.traffic_state_at(1, daa.current_time()).unwrap();
    match ac.pos {
        Position::Euclidean { y, .. } => assert!((y - 5500.0).abs() < 1e-9),
        _ => unreachable!(),
    }
}

#[test]
fn aircraft_list_exports_to_pvs() {
    let mut daa = Daidalus::new();
    daa.set_aircraft_list(
        vec![
            euclidean_ac("own", 0.0, 0.0, 8000.0, 100.0),
            euclidean_ac("intr", 100.0, 9000.0, 8000.0, 100.0),
        ],
        0.0,
    );
    let s = daa.aircraft_list_to_pvs(2);
    assert!(s.starts_with("(: (# id := \"own\""));
    assert!(s.contains("(# id := \"intr\""));
    assert!(s.ends_with(" :)"));
    // Deterministic output.
    assert_eq!(s, daa.aircraft_list_to_pvs(2));
}

#[test]
fn capability_mismatch_warns_but_returns_the_stored_value() {
    let mut daa = Daidalus::new(); // well-clear detector
    let d = daa.d(); // cylinder threshold on a WCV detector
    assert!(d > 0.0);
    assert!(daa.has_message());
    let _ = daa.get_message();
    // Setter on the wrong detector still records the parameter.
    daa.set_d(units::from("nmi", 3.0));
    assert!((daa.parameters.d - units::from("nmi", 3.0)).abs() < 1e-9);
    assert!(daa.has_message());
}

#[test]
fn invalid_setter_values_are_rejected() {
    let mut daa = Daidalus::new();
    let before = daa.parameters.dthr;
    daa.set_dthr(-10.0);
    assert_eq!(daa.parameters.dthr, before);
    assert!(daa.has_error());
}
