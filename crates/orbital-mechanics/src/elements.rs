//! Mean Keplerian elements decoded from a two-line element set

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::constants::{DAY, EARTH_MU};
use crate::time::epoch_to_jd;

/// Orbital elements at the TLE epoch.
///
/// Angles are in radians, mean motion in revolutions per day and its
/// derivatives in rev/day² and rev/day³ (the TLE's ×2 and ×6 scaling already
/// undone).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub catalog_number: u32,
    /// Two-digit epoch year as written in the TLE
    pub epoch_year: u32,
    /// Fractional day of year, 1.0 = January 1st 00:00 UTC
    pub epoch_day: f64,
    pub mean_motion_derivative: f64,
    pub mean_motion_second_derivative: f64,
    pub bstar: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    pub eccentricity: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    pub mean_motion: f64,
    pub epoch_revolution: u32,
}

impl OrbitalElements {
    /// Julian date of the element set epoch
    pub fn epoch_jd(&self) -> f64 {
        epoch_to_jd(self.epoch_year, self.epoch_day)
    }

    /// Mean motion at epoch in rad/s
    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion * TAU / DAY
    }

    /// Orbital period at epoch in seconds
    pub fn period_seconds(&self) -> f64 {
        DAY / self.mean_motion
    }

    /// Semi-major axis at epoch in meters
    pub fn semi_major_axis_m(&self) -> f64 {
        semi_major_axis(self.mean_motion_rad_s())
    }
}

/// Semi-major axis in meters for a mean motion in rad/s (Kepler's third law)
pub fn semi_major_axis(mean_motion_rad_s: f64) -> f64 {
    EARTH_MU.cbrt() / mean_motion_rad_s.powf(2.0 / 3.0)
}
