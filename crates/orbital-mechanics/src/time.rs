//! Julian date utilities
//!
//! All Julian dates are UTC-based and referenced to J2000.0
//! (2000-01-01 12:00:00 UTC = JD 2451545.0).

use chrono::{DateTime, Utc};

use crate::constants::DAY;
use crate::{OrbitalError, Result};

/// Julian date of the J2000.0 epoch
pub const JD_J2000: f64 = 2_451_545.0;

/// Unix timestamp of the J2000.0 epoch
const J2000_UNIX_SECONDS: i64 = 946_728_000;

/// Current Julian date from the wall clock
pub fn jd_now() -> f64 {
    datetime_to_jd(Utc::now())
}

/// Convert a UTC timestamp to a Julian date
pub fn datetime_to_jd(time: DateTime<Utc>) -> f64 {
    let seconds = (time.timestamp() - J2000_UNIX_SECONDS) as f64
        + f64::from(time.timestamp_subsec_nanos()) * 1e-9;
    JD_J2000 + seconds / DAY
}

/// Convert a Julian date back to a UTC timestamp (microsecond resolution)
pub fn jd_to_datetime(jd: f64) -> Result<DateTime<Utc>> {
    let micros = ((jd - JD_J2000) * DAY * 1e6).round();
    if !micros.is_finite() || micros.abs() > i64::MAX as f64 / 2.0 {
        return Err(OrbitalError::DateOutOfRange(jd));
    }
    let micros = micros as i64;
    let seconds = J2000_UNIX_SECONDS + micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;

    DateTime::from_timestamp(seconds, nanos).ok_or(OrbitalError::DateOutOfRange(jd))
}

/// Convert a TLE epoch (two-digit year, fractional day of year) to a Julian date.
///
/// Years above 57 belong to the 1900s, the rest to the 2000s. Leap days are
/// counted as `(year - 1) / 4` (floor), which ignores the century rule and is
/// only valid for 1958-2057, the range the two-digit year can express.
pub fn epoch_to_jd(epoch_year: u32, epoch_day: f64) -> f64 {
    let mut year = i64::from(epoch_year);
    if year > 57 {
        year -= 100;
    }
    let leap_days = (year - 1).div_euclid(4);

    2_451_544.5 + (year * 365 + leap_days) as f64 + epoch_day
}
