//! Two-line element set parsing
//!
//! Scans a block of text for `name / line 1 / line 2` records, validates the
//! checksums and decodes the fixed-column fields into [`OrbitalElements`].

use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::debug;

use crate::elements::OrbitalElements;
use crate::{OrbitalError, Result};

/// Minimum length of a data line: 68 characters of content plus the checksum
const LINE_LENGTH: usize = 69;

/// A matched record: the name line that preceded it and the decoded elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TleRecord {
    pub name: Option<String>,
    pub elements: OrbitalElements,
}

/// Name tracking while scanning forward through the text
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScanState<'a> {
    NoNameSeen,
    NamePending(&'a str),
}

impl<'a> ScanState<'a> {
    fn name(self) -> Option<&'a str> {
        match self {
            ScanState::NoNameSeen => None,
            ScanState::NamePending(name) => Some(name),
        }
    }
}

/// Find the first record whose name matches `name_filter` (or the first
/// record at all when no filter is given) and decode it.
pub fn parse_tle(text: &str, name_filter: Option<&str>) -> Result<TleRecord> {
    let filter = name_filter.map(str::trim).filter(|f| !f.is_empty());

    let mut lines = text
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.trim().is_empty())
        .peekable();
    let mut state = ScanState::NoNameSeen;

    while let Some(line) = lines.next() {
        let next_is_line2 = lines.peek().is_some_and(|next| next.starts_with('2'));

        if line.starts_with('1') && next_is_line2 {
            let line2 = lines.next().unwrap_or_default();
            let name = state.name();
            state = ScanState::NoNameSeen;

            if filter.is_none() || name == filter {
                let elements = OrbitalElements::from_tle(line, line2)?;
                debug!(
                    name = name.unwrap_or("<unnamed>"),
                    catalog = elements.catalog_number,
                    "Parsed element set"
                );
                return Ok(TleRecord {
                    name: name.map(str::to_string),
                    elements,
                });
            }
        } else if let Some(name) = line.strip_prefix("0 ") {
            state = ScanState::NamePending(name.trim());
        } else if line.starts_with('1') || line.starts_with('2') {
            debug!(line, "Skipping data line outside a line 1/line 2 pair");
            state = ScanState::NoNameSeen;
        } else {
            state = ScanState::NamePending(line.trim());
        }
    }

    Err(OrbitalError::SatelliteNotFound(
        filter.unwrap_or("<any>").to_string(),
    ))
}

impl OrbitalElements {
    /// Decode a pair of data lines. Both checksums are verified (line 1
    /// first) before any field is read.
    pub fn from_tle(line1: &str, line2: &str) -> Result<Self> {
        let line1 = line1.trim_end();
        let line2 = line2.trim_end();
        check_line(line1, 1)?;
        check_line(line2, 2)?;

        let elements = OrbitalElements {
            catalog_number: parse_number(line1, 1, "catalog number", 2..7)?,
            epoch_year: parse_number(line1, 1, "epoch year", 18..20)?,
            epoch_day: parse_float(line1, 1, "epoch day", 20..32)?,
            mean_motion_derivative: parse_float(line1, 1, "mean motion derivative", 33..43)? * 2.0,
            mean_motion_second_derivative: implied_decimal(
                line1,
                1,
                "mean motion second derivative",
                44..52,
            )? * 6.0,
            bstar: implied_decimal(line1, 1, "bstar", 53..61)?,
            inclination: parse_float(line2, 2, "inclination", 8..16)?.to_radians(),
            ascending_node: parse_float(line2, 2, "ascending node", 17..25)?.to_radians(),
            eccentricity: parse_eccentricity(line2)?,
            argument_of_perigee: parse_float(line2, 2, "argument of perigee", 34..42)?
                .to_radians(),
            mean_anomaly: parse_float(line2, 2, "mean anomaly", 43..51)?.to_radians(),
            mean_motion: parse_float(line2, 2, "mean motion", 52..63)?,
            epoch_revolution: parse_revolution(line2)?,
        };

        if !(elements.mean_motion > 0.0) {
            return Err(OrbitalError::InvalidElements(format!(
                "mean motion must be positive, got {}",
                elements.mean_motion
            )));
        }

        Ok(elements)
    }
}

/// TLE checksum of the first 68 characters: digits count their value,
/// '-' counts 1, everything else 0.
pub fn checksum(line: &str) -> u32 {
    let sum: u32 = line
        .chars()
        .take(LINE_LENGTH - 1)
        .map(|c| c.to_digit(10).unwrap_or(u32::from(c == '-')))
        .sum();
    sum % 10
}

fn check_line(line: &str, line_no: u8) -> Result<()> {
    let expected_prefix = char::from(b'0' + line_no);
    if !line.starts_with(expected_prefix) {
        return Err(OrbitalError::MalformedLine {
            line: line_no,
            reason: format!("expected line to start with '{}'", expected_prefix),
        });
    }
    if !line.is_ascii() {
        return Err(OrbitalError::MalformedLine {
            line: line_no,
            reason: "non-ASCII characters".to_string(),
        });
    }
    if line.len() < LINE_LENGTH {
        return Err(OrbitalError::MalformedLine {
            line: line_no,
            reason: format!(
                "expected at least {} characters, found {}",
                LINE_LENGTH,
                line.len()
            ),
        });
    }

    let found = line[LINE_LENGTH - 1..].chars().next().unwrap_or(' ');
    let digit = found.to_digit(10).ok_or_else(|| OrbitalError::MalformedField {
        line: line_no,
        field: "checksum",
        value: found.to_string(),
    })?;
    let expected = checksum(line);
    if digit != expected {
        return Err(OrbitalError::ChecksumMismatch {
            line: line_no,
            expected,
            found,
        });
    }
    Ok(())
}

fn column<'a>(line: &'a str, range: Range<usize>) -> &'a str {
    // Lines are checked to be ASCII and at least LINE_LENGTH long
    line.get(range).unwrap_or("")
}

fn malformed(line_no: u8, field: &'static str, value: &str) -> OrbitalError {
    OrbitalError::MalformedField {
        line: line_no,
        field,
        value: value.to_string(),
    }
}

fn parse_float(line: &str, line_no: u8, field: &'static str, range: Range<usize>) -> Result<f64> {
    let raw = column(line, range);
    raw.trim()
        .parse::<f64>()
        .map_err(|_| malformed(line_no, field, raw))
}

fn parse_number(line: &str, line_no: u8, field: &'static str, range: Range<usize>) -> Result<u32> {
    let raw = column(line, range);
    raw.trim()
        .parse::<u32>()
        .map_err(|_| malformed(line_no, field, raw))
}

/// Decode the "SMMMMMSE" notation: sign, five mantissa digits with an
/// implied leading decimal point, signed single-digit exponent.
/// `" 12345-4"` is `0.12345e-4`.
fn implied_decimal(line: &str, line_no: u8, field: &'static str, range: Range<usize>) -> Result<f64> {
    let raw = column(line, range);
    if raw.len() != 8 {
        return Err(malformed(line_no, field, raw));
    }

    let sign = match &raw[..1] {
        "-" => -1.0,
        "+" | " " => 1.0,
        _ => return Err(malformed(line_no, field, raw)),
    };

    let mantissa: String = raw[1..6].chars().map(|c| if c == ' ' { '0' } else { c }).collect();
    let mantissa = mantissa
        .parse::<u32>()
        .map_err(|_| malformed(line_no, field, raw))?;

    let exponent = raw[6..].replace(' ', "");
    let exponent = if exponent.is_empty() {
        0
    } else {
        exponent
            .parse::<i32>()
            .map_err(|_| malformed(line_no, field, raw))?
    };

    Ok(sign * f64::from(mantissa) * 1e-5 * 10f64.powi(exponent))
}

fn parse_eccentricity(line: &str) -> Result<f64> {
    let raw = column(line, 26..33);
    let digits = raw.trim();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(malformed(2, "eccentricity", raw));
    }
    format!("0.{}", digits)
        .parse::<f64>()
        .map_err(|_| malformed(2, "eccentricity", raw))
}

fn parse_revolution(line: &str) -> Result<u32> {
    let raw = column(line, 63..68);
    if raw.trim().is_empty() {
        return Ok(0);
    }
    parse_number(line, 2, "revolution number", 63..68)
}
