//! Cross-cutting invariants of the detectors and band machinery, checked
//! over grids of encounter geometries.

use daa_core::{
    units, CdCylinder, Daidalus, Detector, Position, Tcas3d, Vect3, Velocity, WcvTaumod,
};

fn detectors() -> Vec<Detector> {
    vec![
        Detector::Cylinder(CdCylinder::default()),
        Detector::WcvTaumod(WcvTaumod::default()),
        Detector::Tcas3d(Tcas3d::default()),
    ]
}

fn geometries() -> Vec<(Vect3, Velocity, Vect3, Velocity)> {
    let mut out = Vec::new();
    let alt = units::from("ft", 8000.0);
    for range in [500.0, 2000.0, 8000.0, 30_000.0] {
        for bearing in [0.0, 0.7, 1.9, 3.1] {
            for closure in [-150.0, -50.0, 0.0, 80.0] {
                for dz in [-300.0, 0.0, 250.0] {
                    for vz in [-7.0, 0.0, 7.0] {
                        let si = Vect3::new(
                            range * f64::sin(bearing),
                            range * f64::cos(bearing),
                            alt + dz,
                        );
                        // intruder flies toward (closure < 0) or away from
                        // the ownship along the bearing line
                        let vi = Velocity::new(
                            closure * f64::sin(bearing),
                            closure * f64::cos(bearing),
                            vz,
                        );
                        out.push((
                            Vect3::new(0.0, 0.0, alt),
                            Velocity::new(0.0, 90.0, 0.0),
                            si,
                            vi,
                        ));
                    }
                }
            }
        }
    }
    out
}

#[test]
fn conflict_windows_are_clipped_and_ordered() {
    for det in detectors() {
        for (so, vo, si, vi) in geometries() {
            for (b, t) in [(0.0, 180.0), (20.0, 60.0), (0.0, 1.0)] {
                let cd = det.conflict_detection(so, vo, si, vi, b, t);
                if cd.conflict() {
                    assert!(
                        b <= cd.time_in && cd.time_in <= cd.time_out && cd.time_out <= t,
                        "window violation for {} at b={b} t={t}: {:?}",
                        det.name(),
                        cd
                    );
                } else {
                    assert!(cd.time_in >= cd.time_out);
                }
                assert!(!cd.time_in.is_nan() && !cd.time_out.is_nan());
            }
        }
    }
}

#[test]
fn violation_matches_instant_conflict() {
    // violation(s, v) holds exactly when a conflict window over a small
    // horizon starts now.
    for det in detectors() {
        for (so, vo, si, vi) in geometries() {
            let viol = det.violation(so, vo, si, vi);
            let cd = det.conflict_detection(so, vo, si, vi, 0.0, 1e-3);
            let starts_now = cd.conflict() && cd.time_in == 0.0;
            assert_eq!(
                viol,
                starts_now,
                "{} at so={so:?} si={si:?} vi={vi:?}: violation={viol} window={cd:?}",
                det.name()
            );
        }
    }
}

#[test]
fn wind_does_not_change_detector_results() {
    // Loading the same ground velocities with and without a declared wind
    // leaves the relative geometry, and therefore every detector query and
    // thresholds alert, unchanged.
    let alt = units::from("ft", 8000.0);
    let own_vel = Velocity::from_trk_gs_vs(0.3, 90.0, 0.0);
    let int_vel = Velocity::from_trk_gs_vs(3.3, 110.0, 0.0);
    let wind = Velocity::new(12.0, -8.0, 0.0);

    let build = |wind: Option<Velocity>| {
        let mut daa = Daidalus::new();
        daa.parameters.bands_alerting = false;
        if let Some(w) = wind {
            daa.set_wind_field(w);
        }
        daa.set_ownship_state(
            "own",
            Position::euclidean(0.0, 0.0, alt),
            own_vel,
            0.0,
        );
        daa.add_traffic(
            "intr",
            Position::euclidean(0.0, 15_000.0, alt),
            int_vel,
        );
        daa
    };

    let mut with_wind = build(Some(wind));
    let mut no_wind = build(None);

    let a = with_wind.time_interval_of_violation(1);
    let b = no_wind.time_interval_of_violation(1);
    assert!((a.time_in - b.time_in).abs() < 1e-9);
    assert!((a.time_out - b.time_out).abs() < 1e-9);
    assert_eq!(with_wind.alerting(1), no_wind.alerting(1));
}

#[test]
fn setting_wind_after_load_preserves_ground_tracks() {
    let alt = units::from("ft", 8000.0);
    let ground_vel = Velocity::from_trk_gs_vs(0.5, 100.0, 0.0);
    let mut daa = Daidalus::new();
    daa.set_ownship_state("own", Position::euclidean(0.0, 0.0, alt), ground_vel, 0.0);
    daa.add_traffic("intr", Position::euclidean(5000.0, 0.0, alt), ground_vel);

    let wind = Velocity::new(-15.0, 4.0, 0.0);
    daa.set_wind_field(wind);

    // Stored (air) velocity plus wind reproduces the ground velocity.
    for ac in daa.aircraft_list() {
        let ground = ac.vel.add(wind);
        assert!((ground.x - ground_vel.x).abs() < 1e-9);
        assert!((ground.y - ground_vel.y).abs() < 1e-9);
    }
}

#[test]
fn projected_bands_match_projected_state() {
    // Bands computed at a future time equal bands of the linearly
    // projected configuration.
    let alt = units::from("ft", 8000.0);
    let mut daa = Daidalus::new();
    daa.parameters.lookahead_time = 120.0;
    daa.set_ownship_state(
        "own",
        Position::euclidean(0.0, 0.0, alt),
        Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        0.0,
    );
    daa.add_traffic(
        "intr",
        Position::euclidean(0.0, 20_000.0, alt),
        Velocity::from_trk_gs_vs(units::from("deg", 180.0), 100.0, 0.0),
    );
    let dt = 30.0;
    let mut at_future = daa.kinematic_bands_at(dt).expect("bands at future time");

    let own = daa.traffic_state_at(0, dt).unwrap();
    let intr = daa.traffic_state_at(1, dt).unwrap();
    let mut shifted = Daidalus::new();
    shifted.parameters.lookahead_time = 120.0;
    shifted.set_ownship_state("own", own.pos, own.vel, dt);
    shifted.add_traffic("intr", intr.pos, intr.vel);
    let mut direct = shifted.kinematic_bands().expect("bands");

    assert_eq!(at_future.track_length(), direct.track_length());
    for i in 0..at_future.track_length() {
        let a = at_future.track(i, "deg");
        let b = direct.track(i, "deg");
        assert!((a.low - b.low).abs() < 1e-6 && (a.up - b.up).abs() < 1e-6);
        assert_eq!(at_future.track_region(i), direct.track_region(i));
    }
}

#[test]
fn bands_outside_time_horizon_are_rejected() {
    let mut daa = Daidalus::new();
    daa.set_ownship_state(
        "own",
        Position::euclidean(0.0, 0.0, 1000.0),
        Velocity::from_trk_gs_vs(0.0, 100.0, 0.0),
        0.0,
    );
    assert!(daa.kinematic_bands_at(-1.0).is_none());
    assert!(daa.kinematic_bands_at(10_000.0).is_none());
    assert!(daa.has_error());
}

#[test]
fn repulsive_criterion_only_removes_green_cells() {
    // Enabling the repulsive criterion can reclassify green maneuvers as
    // red, never the other way around.
    let alt = units::from("ft", 8000.0);
    let build = |crit: bool| {
        let mut daa = Daidalus::new();
        daa.parameters.lookahead_time = 90.0;
        daa.parameters.alerting_time = 60.0;
        daa.parameters.conflict_crit = crit;
        daa.set_urgency_strategy(daa_core::UrgencyStrategy::FixedAircraft {
            id: "intr".to_string(),
        });
        daa.set_ownship_state(
            "own",
            Position::euclidean(0.0, 0.0, alt),
            Velocity::from_trk_gs_vs(0.1, 100.0, 0.0),
            0.0,
        );
        daa.add_traffic(
            "intr",
            Position::euclidean(1500.0, 14_000.0, alt),
            Velocity::from_trk_gs_vs(units::from("deg", 185.0), 100.0, 0.0),
        );
        daa.kinematic_bands().expect("bands")
    };
    let mut without = build(false);
    let mut with = build(true);
    // Sample the axis; anywhere the no-criterion bands are red, the
    // criterion bands are red too.
    for k in 0..360 {
        let trk = f64::from(k);
        let without_region = without.track_region_of(trk, "deg");
        let with_region = with.track_region_of(trk, "deg");
        if without_region == daa_core::BandsRegion::Near {
            assert_eq!(
                with_region,
                daa_core::BandsRegion::Near,
                "criterion turned {trk} deg green"
            );
        }
    }
}
