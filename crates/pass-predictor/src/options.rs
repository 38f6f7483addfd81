//! Run options: command-line flags layered over an optional JSON config

use chrono::{DateTime, Utc};
use clap::Args;
use orbital_mechanics::PredictionConfig;
use std::path::PathBuf;

use crate::{loader, parse_observer, Result};

#[derive(Args, Debug, Clone, Default)]
pub struct RunOptions {
    /// Observer coordinates: lat,lon[,alt] in degrees and meters
    #[arg(short, long, allow_hyphen_values = true)]
    pub coords: Option<String>,

    /// Prediction window in days [default: 14]
    #[arg(short, long)]
    pub duration: Option<f64>,

    /// Time step in seconds [default: 30]
    #[arg(short, long)]
    pub step: Option<f64>,

    /// Minimum elevation in degrees [default: 5.0]
    #[arg(short, long)]
    pub elevation: Option<f64>,

    /// Satellite name to select; the first record when omitted
    #[arg(short = 'n', long)]
    pub satellite: Option<String>,

    /// Window start (RFC 3339); now when omitted
    #[arg(long)]
    pub start: Option<DateTime<Utc>>,

    /// JSON run configuration; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl RunOptions {
    /// Load the config file (or defaults), apply every flag that was given
    /// and validate the result.
    pub fn resolve(&self) -> Result<PredictionConfig> {
        let mut config = match &self.config {
            Some(path) => loader::load_config(path)?,
            None => PredictionConfig::default(),
        };

        if let Some(coords) = &self.coords {
            config.observer = Some(parse_observer(coords)?);
        }
        if let Some(duration) = self.duration {
            config.duration_days = duration;
        }
        if let Some(step) = self.step {
            config.step_seconds = step;
        }
        if let Some(elevation) = self.elevation {
            config.min_elevation_deg = elevation;
        }
        if let Some(satellite) = &self.satellite {
            config.satellite = Some(satellite.clone());
        }
        if let Some(start) = self.start {
            config.start = Some(start);
        }

        config.validate()?;
        Ok(config)
    }
}
