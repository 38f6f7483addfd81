//! Coordinate transforms
//!
//! Inertial (ECI) → Earth-fixed (ECEF) → geodetic, and ECI → topocentric
//! azimuth/elevation/range for a ground observer. Distances are in meters,
//! angles in degrees unless stated otherwise.

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::constants::{EARTH_ECCENTRICITY, EARTH_RADIUS_M};
use crate::time::JD_J2000;

/// Earth-centered inertial position (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EciPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Earth-centered Earth-fixed position (m)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcefPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    /// Geocentric distance minus the equatorial radius, not ellipsoidal height
    pub altitude_m: f64,
}

/// Look angles from an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Topocentric {
    /// Clockwise from south, in (-180, 180]
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_m: f64,
}

/// Ground site, fixed for a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }
}

impl EciPosition {
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Distance from the Earth's center
    pub fn radius(&self) -> f64 {
        self.as_vector().norm()
    }

    pub fn distance_to(&self, other: &EciPosition) -> f64 {
        (self.as_vector() - other.as_vector()).norm()
    }
}

impl From<Vector3<f64>> for EciPosition {
    fn from(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl EcefPosition {
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for EcefPosition {
    fn from(v: Vector3<f64>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// Earth rotation angle θ (rad, in [0, 2π)) from a linear GMST model
pub fn earth_rotation_angle(jd: f64) -> f64 {
    let turns = 0.779_057_273_264_0 + 1.002_737_811_911_354_48 * (jd - JD_J2000);
    (TAU * turns).rem_euclid(TAU)
}

/// Rotate an inertial position into the Earth-fixed frame (about Z by -θ)
pub fn eci_to_ecef(eci: &EciPosition, theta: f64) -> EcefPosition {
    let rotation = Rotation3::from_axis_angle(&Vector3::z_axis(), -theta);
    EcefPosition::from(rotation * eci.as_vector())
}

/// Closed-form (Bowring) latitude/longitude on the WGS-84 ellipsoid.
///
/// Altitude is the geocentric distance minus the equatorial radius, not the
/// ellipsoidal height: exact on the equator, up to ~21 km low at the poles.
pub fn ecef_to_geodetic(ecef: &EcefPosition) -> GeodeticPosition {
    let EcefPosition { x, y, z } = *ecef;
    let a = EARTH_RADIUS_M;
    let esq = EARTH_ECCENTRICITY * EARTH_ECCENTRICITY;
    let b = (a * a * (1.0 - esq)).sqrt();
    let epsq = (a * a - b * b) / (b * b);

    let p = x.hypot(y);
    let th = (a * z).atan2(b * p);
    let longitude = y.atan2(x);
    let latitude = (z + epsq * b * th.sin().powi(3)).atan2(p - esq * a * th.cos().powi(3));

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_m: ecef.as_vector().norm() - a,
    }
}

/// Azimuth, elevation and range of an inertial position seen from `observer`.
///
/// The site is placed on a sphere of radius `R + altitude` (not the
/// ellipsoid), rotated to local sidereal angle `θ + longitude`, and the range
/// vector is projected on the South/East/Zenith basis.
pub fn eci_to_topocentric(eci: &EciPosition, observer: &Observer, theta: f64) -> Topocentric {
    let lat = observer.latitude_deg.to_radians();
    let lst = theta + observer.longitude_deg.to_radians();
    let site_radius = EARTH_RADIUS_M + observer.altitude_m;

    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lst, cos_lst) = lst.sin_cos();

    let site = Vector3::new(
        site_radius * cos_lat * cos_lst,
        site_radius * cos_lat * sin_lst,
        site_radius * sin_lat,
    );
    let rho = eci.as_vector() - site;

    let south = sin_lat * cos_lst * rho.x + sin_lat * sin_lst * rho.y - cos_lat * rho.z;
    let east = -sin_lst * rho.x + cos_lst * rho.y;
    let zenith = cos_lat * cos_lst * rho.x + cos_lat * sin_lst * rho.y + sin_lat * rho.z;

    let range = rho.norm();

    Topocentric {
        azimuth_deg: (-east).atan2(south).to_degrees(),
        elevation_deg: (zenith / range).asin().to_degrees(),
        range_m: range,
    }
}
