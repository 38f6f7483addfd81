//! Earth model and time constants (WGS-84)

/// Seconds per day
pub const DAY: f64 = 86_400.0;

/// WGS-84 equatorial radius in meters
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// WGS-84 first eccentricity
pub const EARTH_ECCENTRICITY: f64 = 0.081_819_190_842_621_5;
/// Gravitational parameter μ in m³/s²
pub const EARTH_MU: f64 = 3.986_004_418e14;
/// Second zonal harmonic
pub const EARTH_J2: f64 = 1.082_63e-3;

/// Lowest altitude at which an orbit is still considered alive (start of the
/// dense atmosphere). Below this the object is reported as decayed.
pub const MIN_ORBIT_ALTITUDE_M: f64 = 100e3;
