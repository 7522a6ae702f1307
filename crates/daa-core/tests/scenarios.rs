//! End-to-end encounter scenarios against the full facade.

use daa_core::{units, BandsRegion, Daidalus, Position, Velocity};

fn deg(v: f64) -> f64 {
    units::from("deg", v)
}

fn kn(v: f64) -> f64 {
    units::from("knot", v)
}

fn ft(v: f64) -> f64 {
    units::from("ft", v)
}

fn fpm(v: f64) -> f64 {
    units::from("fpm", v)
}

/// Head-on geodetic encounter at nearly the same altitude.
fn head_on_daa() -> Daidalus {
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 90.0;
    daa.parameters.alerting_time = 60.0;
    daa.set_ownship_state(
        "ownship",
        Position::lat_lon(33.95, -96.70, ft(8700.0)),
        Velocity::from_trk_gs_vs(deg(206.0), kn(151.0), 0.0),
        0.0,
    );
    daa.add_traffic(
        "intruder",
        Position::lat_lon(33.862, -96.733, ft(9000.0)),
        Velocity::from_trk_gs_vs(deg(0.0), kn(210.0), 0.0),
    );
    daa
}

#[test]
fn head_on_time_to_violation_is_finite_and_positive() {
    let mut daa = head_on_daa();
    let t2v = daa.time_to_violation(1);
    assert!(t2v > 0.0, "time to violation {t2v}");
    assert!(t2v < 90.0);
    let det = daa.time_interval_of_violation(1);
    assert!(det.conflict());
    assert!(det.time_in <= det.time_out);
}

#[test]
fn head_on_track_bands_cover_the_intercept_heading() {
    let mut daa = head_on_daa();
    let mut bands = daa.kinematic_bands().expect("bands");
    assert!(bands.track_length() > 0);
    // The current heading flies into the conflict.
    assert_eq!(bands.track_region_of(206.0, "deg"), BandsRegion::Near);
    // A NEAR interval straddles the direct-intercept heading (~197 deg).
    assert_eq!(bands.track_region_of(197.0, "deg"), BandsRegion::Near);
}

#[test]
fn head_on_ground_speed_bands_bracket_current_speed() {
    let mut daa = head_on_daa();
    let mut bands = daa.kinematic_bands().expect("bands");
    assert!(bands.ground_speed_length() > 0);
    assert_eq!(bands.ground_speed_region_of(151.0, "knot"), BandsRegion::Near);
}

#[test]
fn band_intervals_are_sorted_disjoint_and_cover_the_axis() {
    let mut daa = head_on_daa();
    let mut bands = daa.kinematic_bands().expect("bands");
    let n = bands.track_length();
    assert!(n > 0);
    let mut prev_up = 0.0;
    for i in 0..n {
        let iv = bands.track(i, "rad");
        assert!(iv.low <= iv.up, "interval {i} inverted");
        assert!(iv.low >= prev_up - 1e-9, "interval {i} out of order");
        assert!(iv.low >= 0.0 && iv.up <= 2.0 * std::f64::consts::PI + 1e-9);
        // Bands tile the axis: each interval starts where the previous one
        // ended.
        assert!((iv.low - prev_up).abs() < 1e-6, "gap before interval {i}");
        prev_up = iv.up;
    }
    assert!((prev_up - 2.0 * std::f64::consts::PI).abs() < 1e-6);

    let n = bands.ground_speed_length();
    let mut prev_up = f64::NEG_INFINITY;
    for i in 0..n {
        let iv = bands.ground_speed(i, "m/s");
        assert!(iv.low <= iv.up);
        assert!(iv.low >= prev_up - 1e-9);
        prev_up = iv.up;
    }
}

#[test]
fn head_on_attributes_the_intruder() {
    let mut daa = head_on_daa();
    let mut bands = daa.kinematic_bands().expect("bands");
    bands.track_length();
    let (_preventive, corrective) = bands.track_bands_aircraft();
    assert_eq!(corrective, vec!["intruder".to_string()]);
}

#[test]
fn trailing_traffic_is_all_green() {
    // Collinear trailing: intruder 2 NM ahead at the same speed and
    // heading. Nothing the ownship can do within the alerting time closes
    // the gap, so no axis has any band.
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 90.0;
    daa.parameters.alerting_time = 60.0;
    let vel = Velocity::from_trk_gs_vs(0.0, kn(151.0), 0.0);
    daa.set_ownship_state(
        "ownship",
        Position::euclidean(0.0, 0.0, ft(8000.0)),
        vel,
        0.0,
    );
    daa.add_traffic(
        "leader",
        Position::euclidean(0.0, units::from("nmi", 2.0), ft(8000.0)),
        vel,
    );
    assert!(daa.time_to_violation(1) < 0.0);
    let mut bands = daa.kinematic_bands().expect("bands");
    assert_eq!(bands.track_length(), 1);
    assert_eq!(bands.track_region(0), BandsRegion::None);
    assert_eq!(bands.ground_speed_length(), 1);
    assert_eq!(bands.ground_speed_region(0), BandsRegion::None);
    assert_eq!(bands.vertical_speed_length(), 1);
    assert_eq!(bands.vertical_speed_region(0), BandsRegion::None);
}

#[test]
fn vertical_only_conflict_shows_in_vertical_speed_bands() {
    // Same horizontal track, ownship climbing 2000 fpm toward an intruder
    // 1500 ft above.
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 90.0;
    daa.parameters.alerting_time = 60.0;
    daa.set_ownship_state(
        "ownship",
        Position::euclidean(0.0, 0.0, ft(8000.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), fpm(2000.0)),
        0.0,
    );
    daa.add_traffic(
        "above",
        Position::euclidean(0.0, 0.0, ft(9500.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), 0.0),
    );
    let t2v = daa.time_to_violation(1);
    assert!(t2v > 0.0);
    let mut bands = daa.kinematic_bands().expect("bands");
    // Continuing the climb is red; descending away is green.
    assert_eq!(bands.vertical_speed_region_of(2000.0, "fpm"), BandsRegion::Near);
    assert_eq!(bands.vertical_speed_region_of(-2000.0, "fpm"), BandsRegion::None);
    // The red range covers every climb rate above the current one.
    assert_eq!(bands.vertical_speed_region_of(4000.0, "fpm"), BandsRegion::Near);
}

#[test]
fn altitude_bands_mark_the_intruder_level() {
    // Instantaneous level-off (vertical_rate = 0): only the flight levels
    // within the vertical threshold of the intruder are red.
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 90.0;
    daa.parameters.alerting_time = 60.0;
    daa.set_ownship_state(
        "ownship",
        Position::euclidean(0.0, 0.0, ft(8000.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), 0.0),
        0.0,
    );
    daa.add_traffic(
        "above",
        Position::euclidean(0.0, 0.0, ft(9500.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), 0.0),
    );
    let mut bands = daa.kinematic_bands().expect("bands");
    assert!(bands.altitude_length() > 0);
    assert_eq!(bands.altitude_region_of(9500.0, "ft"), BandsRegion::Near);
    assert_eq!(bands.altitude_region_of(8000.0, "ft"), BandsRegion::None);
    assert_eq!(bands.altitude_region_of(20000.0, "ft"), BandsRegion::None);
}

#[test]
fn climbing_level_off_blocks_levels_beyond_the_intruder() {
    // With a nonzero vertical rate the climb itself crosses the intruder:
    // every target level past it is red even though the level-off endpoint
    // would be clear.
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 90.0;
    daa.parameters.alerting_time = 60.0;
    daa.parameters.vertical_rate = fpm(2000.0);
    daa.set_ownship_state(
        "ownship",
        Position::euclidean(0.0, 0.0, ft(8000.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), 0.0),
        0.0,
    );
    daa.add_traffic(
        "above",
        Position::euclidean(0.0, 0.0, ft(9500.0)),
        Velocity::from_trk_gs_vs(0.0, kn(150.0), 0.0),
    );
    let mut bands = daa.kinematic_bands().expect("bands");
    assert_eq!(bands.altitude_region_of(10000.0, "ft"), BandsRegion::Near);
    assert_eq!(bands.altitude_region_of(12000.0, "ft"), BandsRegion::Near);
    // Descending away stays clear.
    assert_eq!(bands.altitude_region_of(6000.0, "ft"), BandsRegion::None);
}

#[test]
fn thresholds_ladder_orders_alert_levels_by_distance() {
    // Head-on Euclidean closure at 200 m/s. The range producing a given
    // entry time into the 0.66 nmi well-clear tiers is
    // range = s_tau + closure * eta, with s_tau the tau-modulated boundary.
    let closure: f64 = 200.0;
    let tthr: f64 = 35.0;
    let dthr: f64 = units::from("nmi", 0.66);
    let s_tau = (tthr * closure + ((tthr * closure).powi(2) + 4.0 * dthr * dthr).sqrt()) / 2.0;
    let alt = ft(8000.0);

    let mut levels = Vec::new();
    for eta in [15.0, 38.0, 50.0, 62.0, 200.0] {
        let mut daa = Daidalus::new();
        daa.parameters.bands_alerting = false;
        daa.set_ownship_state(
            "ownship",
            Position::euclidean(0.0, 0.0, alt),
            Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
            0.0,
        );
        daa.add_traffic(
            "intruder",
            Position::euclidean(0.0, s_tau + closure * eta, alt),
            Velocity::from_trk_gs_vs(deg(180.0), 100.0, 0.0),
        );
        levels.push(daa.alerting(1));
    }
    assert_eq!(levels, vec![4, 3, 2, 1, 0]);
}

#[test]
fn alerting_rejects_bad_inputs() {
    let mut daa = Daidalus::new();
    assert_eq!(daa.alerting(1), -1);
    assert!(daa.has_error());
    let _ = daa.get_message();

    let mut daa = head_on_daa();
    // Ownship index and out-of-horizon times are invalid.
    assert_eq!(daa.alerting(0), -1);
    assert_eq!(daa.alerting_at(1, 1000.0), -1);
    assert!(daa.has_error());
}
