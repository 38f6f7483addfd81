//! Input loading: TLE text and JSON run configuration

use orbital_mechanics::PredictionConfig;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::info;

use crate::Result;

/// Read a TLE file as text
pub fn read_tle_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    info!("Loading element sets from {:?}", path);

    let text = fs::read_to_string(path)?;
    info!("Read {} lines", text.lines().count());
    Ok(text)
}

/// Load a run configuration from JSON. Missing fields take their defaults;
/// the result is not validated yet since CLI flags may still override it.
pub fn load_config(path: impl AsRef<Path>) -> Result<PredictionConfig> {
    let path = path.as_ref();
    info!("Loading configuration from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let config: PredictionConfig = serde_json::from_reader(reader)?;
    Ok(config)
}
