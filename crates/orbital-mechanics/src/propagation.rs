//! Keplerian propagation with secular J2 drift
//!
//! Two-body motion on the mean elements, with mean motion evolved by the TLE
//! derivatives and the ascending node / argument of perigee drifting linearly
//! under Earth oblateness. No periodic terms and no drag model.

use nalgebra::{Rotation3, Vector3};
use std::f64::consts::TAU;

use crate::constants::{DAY, EARTH_J2, EARTH_RADIUS_M};
use crate::elements::{semi_major_axis, OrbitalElements};
use crate::transforms::EciPosition;
use crate::{OrbitalError, Result};

/// Convergence threshold on successive eccentric anomaly iterates (rad)
pub const KEPLER_TOLERANCE: f64 = 1e-12;

/// Iteration cap for the fixed-point Kepler solver. The slowest case for
/// e <= 0.9 (near perigee) needs about 270 iterations.
pub const KEPLER_MAX_ITERATIONS: usize = 500;

/// Solve Kepler's equation `E = M + e·sin(E)` by fixed-point iteration.
///
/// `M` is reduced into `[0, 2π)` first, so the returned `E` satisfies the
/// equation for the reduced mean anomaly.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> Result<f64> {
    solve_kepler_with_limit(mean_anomaly, eccentricity, KEPLER_MAX_ITERATIONS)
}

/// [`solve_kepler`] with an explicit iteration cap
pub fn solve_kepler_with_limit(
    mean_anomaly: f64,
    eccentricity: f64,
    max_iterations: usize,
) -> Result<f64> {
    let m = mean_anomaly.rem_euclid(TAU);
    let mut eccentric_anomaly = m;

    for _ in 0..max_iterations {
        let next = m + eccentricity * eccentric_anomaly.sin();
        if (next - eccentric_anomaly).abs() < KEPLER_TOLERANCE {
            return Ok(next);
        }
        eccentric_anomaly = next;
    }

    Err(OrbitalError::KeplerDivergence {
        mean_anomaly: m,
        eccentricity,
        iterations: max_iterations,
    })
}

/// True anomaly from the eccentric anomaly
pub fn true_anomaly(eccentric_anomaly: f64, eccentricity: f64) -> f64 {
    let half = eccentric_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin())
        .atan2((1.0 - eccentricity).sqrt() * half.cos())
}

/// Secular J2 rates `(dΩ/dt, dω/dt)` in rad/s.
///
/// `mean_motion` in rad/s, `semi_major_axis` in meters.
pub fn j2_secular_rates(
    mean_motion: f64,
    semi_major_axis: f64,
    eccentricity: f64,
    inclination: f64,
) -> (f64, f64) {
    let common = mean_motion * EARTH_J2 * (EARTH_RADIUS_M / semi_major_axis).powi(2)
        / (1.0 - eccentricity * eccentricity).powi(2);

    let node_rate = -1.5 * common * inclination.cos();
    let perigee_rate = 0.75 * common * (4.0 - 5.0 * inclination.sin().powi(2));
    (node_rate, perigee_rate)
}

/// Inertial position `seconds_since_epoch` after the element set epoch.
///
/// Eccentricity must be below 1. Decay is not detected here; callers compare
/// the resulting altitude against [`crate::constants::MIN_ORBIT_ALTITUDE_M`].
pub fn propagate(elements: &OrbitalElements, seconds_since_epoch: f64) -> Result<EciPosition> {
    let t = seconds_since_epoch;
    let days = t / DAY;
    let e = elements.eccentricity;
    let inclination = elements.inclination;

    let mean_motion_derivative =
        elements.mean_motion_derivative + elements.mean_motion_second_derivative * days;
    let mean_motion = elements.mean_motion + mean_motion_derivative * days;
    if !(mean_motion > 0.0) {
        return Err(OrbitalError::InvalidElements(format!(
            "mean motion evolved to {} rev/day at {:.1} days from epoch",
            mean_motion, days
        )));
    }
    let n = mean_motion * TAU / DAY;

    let mean_anomaly = elements.mean_anomaly + n * t;
    let a = semi_major_axis(n);

    let eccentric_anomaly = solve_kepler(mean_anomaly, e)?;
    let nu = true_anomaly(eccentric_anomaly, e);

    let (node_rate, perigee_rate) = j2_secular_rates(n, a, e, inclination);
    let ascending_node = elements.ascending_node + node_rate * t;
    let argument_of_perigee = elements.argument_of_perigee + perigee_rate * t;

    let radius = a * (1.0 - e * eccentric_anomaly.cos());

    // Perifocal -> inertial: Rz(Ω) · Rx(i) · Rz(ω + ν)
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), ascending_node)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), inclination)
        * Rotation3::from_axis_angle(&Vector3::z_axis(), argument_of_perigee + nu);

    Ok(EciPosition::from(rotation * Vector3::new(radius, 0.0, 0.0)))
}

/// Inertial position at an absolute Julian date
pub fn propagate_to_jd(elements: &OrbitalElements, jd: f64) -> Result<EciPosition> {
    propagate(elements, (jd - elements.epoch_jd()) * DAY)
}
