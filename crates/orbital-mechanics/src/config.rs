//! Prediction run configuration

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::passes::DetectorSettings;
use crate::time::{datetime_to_jd, jd_now};
use crate::transforms::Observer;
use crate::{OrbitalError, Result};

/// Validated inputs for a prediction run. Every field has a default, so a
/// partial JSON document deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub observer: Option<Observer>,
    pub duration_days: f64,
    pub step_seconds: f64,
    pub min_elevation_deg: f64,
    /// Name of the record to use; the first record when unset
    pub satellite: Option<String>,
    /// Start of the window; the current time when unset
    pub start: Option<DateTime<Utc>>,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        let settings = DetectorSettings::default();
        Self {
            observer: None,
            duration_days: settings.duration_days,
            step_seconds: settings.step_seconds,
            min_elevation_deg: settings.min_elevation_deg,
            satellite: None,
            start: None,
        }
    }
}

impl PredictionConfig {
    pub fn validate(&self) -> Result<()> {
        self.detector_settings().validate()?;

        if let Some(observer) = &self.observer {
            if !(-90.0..=90.0).contains(&observer.latitude_deg) {
                return Err(OrbitalError::InvalidConfig(format!(
                    "observer latitude {} outside [-90, 90]",
                    observer.latitude_deg
                )));
            }
            if !(-180.0..=180.0).contains(&observer.longitude_deg) {
                return Err(OrbitalError::InvalidConfig(format!(
                    "observer longitude {} outside [-180, 180]",
                    observer.longitude_deg
                )));
            }
            if !observer.altitude_m.is_finite() {
                return Err(OrbitalError::InvalidConfig(
                    "observer altitude must be finite".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn detector_settings(&self) -> DetectorSettings {
        DetectorSettings {
            duration_days: self.duration_days,
            step_seconds: self.step_seconds,
            min_elevation_deg: self.min_elevation_deg,
        }
    }

    /// Julian date the run starts at
    pub fn start_jd(&self) -> f64 {
        self.start.map_or_else(jd_now, datetime_to_jd)
    }
}
