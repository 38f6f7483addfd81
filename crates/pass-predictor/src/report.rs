//! Report sinks: fixed-width table and JSON lines

use chrono::{DateTime, TimeZone, Utc};
use orbital_mechanics::{PassEvent, ReportSink};
use std::fmt::Display;
use std::io::{self, Write};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable table, timestamps shown in `tz`.
///
/// `ReportSink::emit` cannot fail, so the first write error is kept and
/// returned by [`TableReport::finish`].
pub struct TableReport<W: Write, Tz: TimeZone> {
    writer: W,
    tz: Tz,
    with_observer: bool,
    error: Option<io::Error>,
}

impl<W: Write, Tz: TimeZone> TableReport<W, Tz>
where
    Tz::Offset: Display,
{
    pub fn new(writer: W, tz: Tz, with_observer: bool) -> Self {
        Self {
            writer,
            tz,
            with_observer,
            error: None,
        }
    }

    fn timestamp(&self, time: &DateTime<Utc>) -> String {
        time.with_timezone(&self.tz)
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    fn write_event(&mut self, event: &PassEvent) -> io::Result<()> {
        match event {
            PassEvent::PassStart { timestamp } => {
                writeln!(self.writer, "Pass at {}", self.timestamp(timestamp))?;
                if self.with_observer {
                    writeln!(
                        self.writer,
                        "Timestamp           Lat      Lon        Alt     Az     El   Rng"
                    )
                } else {
                    writeln!(self.writer, "Timestamp           Lat      Lon        Alt")
                }
            }
            PassEvent::Sample {
                timestamp,
                geodetic,
                topocentric,
            } => {
                let ts = self.timestamp(timestamp);
                match topocentric {
                    Some(topo) => writeln!(
                        self.writer,
                        "{} {:8.4} {:9.4} {:8.0} {:6.1} {:4.1} {:7.0}",
                        ts,
                        geodetic.latitude_deg,
                        geodetic.longitude_deg,
                        geodetic.altitude_m,
                        topo.azimuth_deg,
                        topo.elevation_deg,
                        topo.range_m
                    ),
                    None => writeln!(
                        self.writer,
                        "{} {:8.4} {:9.4} {:8.0}",
                        ts, geodetic.latitude_deg, geodetic.longitude_deg, geodetic.altitude_m
                    ),
                }
            }
            PassEvent::PassEnd {
                max_elevation_deg, ..
            } => match max_elevation_deg {
                Some(max) => writeln!(self.writer, "Maximum elevation: {:.1}\n\n", max),
                None => writeln!(self.writer),
            },
            PassEvent::Decay { timestamp } => {
                writeln!(
                    self.writer,
                    "The satellite decayed at {}",
                    self.timestamp(timestamp)
                )
            }
        }
    }

    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write, Tz: TimeZone> ReportSink for TableReport<W, Tz>
where
    Tz::Offset: Display,
{
    fn emit(&mut self, event: PassEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(err) = self.write_event(&event) {
            self.error = Some(err);
        }
    }
}

/// One JSON object per event, newline separated
pub struct JsonLinesReport<W: Write> {
    writer: W,
    error: Option<serde_json::Error>,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    pub fn finish(mut self) -> Result<W, serde_json::Error> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.writer.flush().map_err(serde_json::Error::io)?;
        Ok(self.writer)
    }
}

impl<W: Write> ReportSink for JsonLinesReport<W> {
    fn emit(&mut self, event: PassEvent) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.writer, &event)
            .and_then(|_| writeln!(self.writer).map_err(serde_json::Error::io));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}
