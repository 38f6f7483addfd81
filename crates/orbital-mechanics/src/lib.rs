//! Orbital Mechanics Library
//!
//! TLE parsing, Keplerian propagation with secular J2 drift, coordinate
//! transforms and ground-station pass detection.
//!
//! ```text
//! TLE text ─► tle::parse_tle ─► OrbitalElements
//!                                   │
//!                     propagation::propagate (per step)
//!                                   │
//!                ECI ─► ECEF ─► geodetic / topocentric
//!                                   │
//!                     passes::PassDetector ─► ReportSink
//! ```

use thiserror::Error;

pub mod config;
pub mod constants;
pub mod elements;
pub mod passes;
pub mod propagation;
pub mod time;
pub mod tle;
pub mod transforms;

pub use config::PredictionConfig;
pub use elements::OrbitalElements;
pub use passes::{DetectorSettings, PassDetector, PassEvent, PassState, ReportSink, RunSummary};
pub use tle::{parse_tle, TleRecord};
pub use transforms::{EcefPosition, EciPosition, GeodeticPosition, Observer, Topocentric};

#[derive(Error, Debug)]
pub enum OrbitalError {
    #[error("Invalid line {line} checksum: expected {expected}, found {found}")]
    ChecksumMismatch { line: u8, expected: u32, found: char },
    #[error("Malformed TLE line {line}: {reason}")]
    MalformedLine { line: u8, reason: String },
    #[error("Malformed TLE field `{field}` on line {line}: {value:?}")]
    MalformedField {
        line: u8,
        field: &'static str,
        value: String,
    },
    #[error("Invalid orbital elements: {0}")]
    InvalidElements(String),
    #[error("Satellite not found: {0}")]
    SatelliteNotFound(String),
    #[error("Kepler's equation did not converge after {iterations} iterations (M = {mean_anomaly}, e = {eccentricity})")]
    KeplerDivergence {
        mean_anomaly: f64,
        eccentricity: f64,
        iterations: usize,
    },
    #[error("Julian date {0} is outside the representable calendar range")]
    DateOutOfRange(f64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OrbitalError {
    /// True for the errors raised while validating element-set text.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            OrbitalError::ChecksumMismatch { .. }
                | OrbitalError::MalformedLine { .. }
                | OrbitalError::MalformedField { .. }
                | OrbitalError::InvalidElements(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, OrbitalError>;
