//! Satellite Pass Prediction CLI
//!
//! Usage:
//!   sattrack stations.txt -c 40.0,-75.0,100 -n "ISS (ZARYA)" --duration 3
//!   sattrack stations.txt --config run.json --json

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use orbital_mechanics::{parse_tle, PassDetector};
use pass_predictor::{loader, JsonLinesReport, RunOptions, TableReport};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "sattrack",
    about = "Predict satellite passes over a ground station from a TLE file"
)]
struct Args {
    /// File with one or more two-line element sets
    tle: PathBuf,

    #[command(flatten)]
    options: RunOptions,

    /// Write events as JSON lines instead of a table
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = args
        .options
        .resolve()
        .context("invalid prediction settings")?;

    let text = loader::read_tle_file(&args.tle)
        .with_context(|| format!("failed to read {:?}", args.tle))?;
    let record = parse_tle(&text, config.satellite.as_deref())
        .context("failed to select an element set")?;
    let name = record
        .name
        .clone()
        .unwrap_or_else(|| record.elements.catalog_number.to_string());
    info!("Selected {} (catalog {})", name, record.elements.catalog_number);

    let detector = PassDetector::new(
        &record.elements,
        config.observer,
        config.detector_settings(),
    );
    let start_jd = config.start_jd();
    let stdout = BufWriter::new(io::stdout().lock());

    let summary = if args.json {
        let mut report = JsonLinesReport::new(stdout);
        let summary = detector.run(start_jd, &mut report)?;
        report.finish().context("failed to write events")?;
        summary
    } else {
        let mut out = stdout;
        writeln!(out, "Predictions for satellite {}", name)?;
        if let Some(observer) = &config.observer {
            writeln!(
                out,
                "Station location: {:8.6} {:9.6}",
                observer.latitude_deg, observer.longitude_deg
            )?;
        }
        writeln!(out)?;

        let mut report = TableReport::new(out, Local, config.observer.is_some());
        let summary = detector.run(start_jd, &mut report)?;
        report.finish().context("failed to write report")?;
        summary
    };

    info!(
        "Finished {} steps, {} passes ({:.0} s visible){}",
        summary.steps,
        summary.passes,
        summary.pass_seconds,
        if summary.decayed_at.is_some() {
            ", satellite decayed"
        } else {
            ""
        }
    );

    Ok(())
}
