//! Full pipeline: TLE text -> pass events for a ground observer

use chrono::{DateTime, Utc};
use orbital_mechanics::{parse_tle, DetectorSettings, Observer, PassDetector, PassEvent};

const ISS_TLE: &str = "\
ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

/// Greenwich mean sidereal time (IAU 1982) in radians
fn gmst(jd: f64) -> f64 {
    let d = jd - 2_451_545.0;
    let t = d / 36_525.0;
    let degrees =
        280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * t * t - t * t * t / 38_710_000.0;
    degrees.rem_euclid(360.0).to_radians()
}

/// Elevation in degrees of an inertial position (km) seen from a spherical
/// Earth site.
fn elevation_deg(position_km: [f64; 3], observer: &Observer, sidereal: f64) -> f64 {
    let lat = observer.latitude_deg.to_radians();
    let lon = sidereal + observer.longitude_deg.to_radians();
    let up = [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()];
    let site_km = 6_378.137 + observer.altitude_m / 1000.0;

    let rho: Vec<f64> = (0..3).map(|k| position_km[k] - site_km * up[k]).collect();
    let range = rho.iter().map(|v| v * v).sum::<f64>().sqrt();
    let zenith: f64 = (0..3).map(|k| rho[k] * up[k]).sum();
    (zenith / range).asin().to_degrees()
}

/// Maximum elevation of each pass found by SGP4 sampled every second
fn sgp4_pass_maxima(
    line1: &str,
    line2: &str,
    observer: &Observer,
    settings: &DetectorSettings,
) -> Vec<f64> {
    let elements = sgp4::Elements::from_tle(None, line1.as_bytes(), line2.as_bytes()).unwrap();
    let constants = sgp4::Constants::from_elements(&elements).unwrap();
    let epoch = DateTime::<Utc>::from_naive_utc_and_offset(elements.datetime, Utc);
    let epoch_jd = 2_440_587.5 + epoch.timestamp_micros() as f64 / 86_400e6;

    let seconds = (settings.duration_days * 86_400.0) as usize;
    let elevations: Vec<f64> = (0..seconds)
        .map(|s| {
            let prediction = constants.propagate(s as f64 / 60.0).unwrap();
            let jd = epoch_jd + s as f64 / 86_400.0;
            elevation_deg(prediction.position, observer, gmst(jd))
        })
        .collect();

    elevations
        .split(|el| *el <= settings.min_elevation_deg)
        .filter(|run| !run.is_empty())
        .map(|run| run.iter().copied().fold(f64::MIN, f64::max))
        .collect()
}

#[test]
fn test_one_day_passes_match_reference() {
    let record = parse_tle(ISS_TLE, Some("ISS (ZARYA)")).unwrap();
    let elements = record.elements;
    let observer = Observer::new(40.0, -75.0, 100.0);
    let settings = DetectorSettings {
        duration_days: 1.0,
        step_seconds: 30.0,
        min_elevation_deg: 5.0,
    };
    let start_jd = elements.epoch_jd();

    let mut events = Vec::new();
    let summary = PassDetector::new(&elements, Some(observer), settings)
        .run(start_jd, &mut events)
        .unwrap();

    let starts = events
        .iter()
        .filter(|e| matches!(e, PassEvent::PassStart { .. }))
        .count();
    let maxima: Vec<f64> = events
        .iter()
        .filter_map(|e| match e {
            PassEvent::PassEnd {
                max_elevation_deg, ..
            } => *max_elevation_deg,
            _ => None,
        })
        .collect();

    let mut lines = ISS_TLE.lines().skip(1);
    let (line1, line2) = (lines.next().unwrap(), lines.next().unwrap());
    let expected = sgp4_pass_maxima(line1, line2, &observer, &settings);

    assert!(!expected.is_empty(), "observer should see the ISS within a day");
    assert_eq!(starts, expected.len());
    assert_eq!(maxima.len(), expected.len());
    assert_eq!(summary.passes, expected.len());
    assert_eq!(summary.steps, 2880);
    assert!(summary.decayed_at.is_none());

    for (got, want) in maxima.iter().zip(&expected) {
        assert!((got - want).abs() < 0.5, "max elevation {} vs {}", got, want);
        assert!(*got > settings.min_elevation_deg && *got <= 90.0);
    }
}

#[test]
fn test_samples_only_inside_passes() {
    let elements = parse_tle(ISS_TLE, None).unwrap().elements;
    let observer = Observer::new(-33.9, 151.2, 50.0);
    let settings = DetectorSettings {
        duration_days: 1.0,
        step_seconds: 60.0,
        min_elevation_deg: 10.0,
    };

    let mut events = Vec::new();
    PassDetector::new(&elements, Some(observer), settings)
        .run(elements.epoch_jd(), &mut events)
        .unwrap();

    let mut open = false;
    for event in &events {
        match event {
            PassEvent::PassStart { .. } => {
                assert!(!open, "nested pass start");
                open = true;
            }
            PassEvent::Sample { topocentric, .. } => {
                assert!(open, "sample outside a pass");
                let topo = topocentric.expect("observer configured");
                assert!(topo.elevation_deg > 10.0);
                assert!(topo.range_m > 300e3 && topo.range_m < 3_000e3);
            }
            PassEvent::PassEnd { .. } => {
                assert!(open, "pass end without start");
                open = false;
            }
            PassEvent::Decay { .. } => panic!("ISS should not decay in a day"),
        }
    }
    assert!(!open);
}

#[test]
fn test_ground_track_altitude_stays_in_leo() {
    let elements = parse_tle(ISS_TLE, None).unwrap().elements;
    let settings = DetectorSettings {
        duration_days: 1.0,
        step_seconds: 120.0,
        min_elevation_deg: 5.0,
    };

    let mut events = Vec::new();
    PassDetector::new(&elements, None, settings)
        .run(elements.epoch_jd(), &mut events)
        .unwrap();

    let mut max_lat: f64 = 0.0;
    for event in &events {
        if let PassEvent::Sample { geodetic, .. } = event {
            assert!(
                geodetic.altitude_m > 320e3 && geodetic.altitude_m < 380e3,
                "{}",
                geodetic.altitude_m
            );
            assert!((-180.0..=180.0).contains(&geodetic.longitude_deg));
            max_lat = max_lat.max(geodetic.latitude_deg.abs());
        }
    }
    // Latitude never exceeds the inclination (plus the geodetic/geocentric offset)
    assert!(max_lat < 52.0 && max_lat > 45.0, "{}", max_lat);
}
