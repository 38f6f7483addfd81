//! Satellite Pass Predictor
//!
//! Command-line front end for `orbital-mechanics`: loads a TLE file and an
//! optional JSON configuration, runs the pass detector and renders the event
//! stream as a table or as JSON lines.

use orbital_mechanics::{Observer, OrbitalError};
use thiserror::Error;

pub mod loader;
pub mod options;
pub mod report;

pub use options::RunOptions;
pub use report::{JsonLinesReport, TableReport};

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid coordinates {0:?}: expected \"lat,lon[,alt]\"")]
    InvalidCoordinates(String),
    #[error(transparent)]
    Orbital(#[from] OrbitalError),
}

pub type Result<T> = std::result::Result<T, PredictorError>;

/// Parse an observer from `"lat,lon,alt"` (degrees, degrees, meters).
/// Altitude may be omitted and defaults to sea level.
pub fn parse_observer(coords: &str) -> Result<Observer> {
    let values = coords
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| PredictorError::InvalidCoordinates(coords.to_string()))?;

    match values.as_slice() {
        [lat, lon] => Ok(Observer::new(*lat, *lon, 0.0)),
        [lat, lon, alt] => Ok(Observer::new(*lat, *lon, *alt)),
        _ => Err(PredictorError::InvalidCoordinates(coords.to_string())),
    }
}
