//! CSV run log parser
//!
//! Expected header: `Date,Distance,Time_s,Calories`. Extra columns are ignored
//! and numeric cells may use thousands separators (`1,234`).

use crate::types::{Result, RunRecord, RunlogError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::LogParser;

/// One CSV row before cleanup; cells stay as text until numbers are de-separated
#[derive(Deserialize)]
struct CsvRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Distance", alias = "distance")]
    distance: String,
    #[serde(rename = "Time_s", alias = "time_s", default)]
    time_s: String,
    #[serde(rename = "Calories", alias = "calories", default)]
    calories: String,
}

/// Date layouts seen in exported logs, tried in order
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

/// Parser for comma-separated run logs
pub struct CsvLogParser;

impl CsvLogParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse CSV content from any reader
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Vec<RunRecord>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers = reader.headers()?.clone();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(0);

            // Skip blank trailing lines some spreadsheet exports leave behind
            if row.iter().all(str::is_empty) {
                continue;
            }

            let raw: CsvRow = row.deserialize(Some(&headers))?;
            records.push(Self::to_record(&raw, line)?);
        }

        Ok(records)
    }

    fn to_record(raw: &CsvRow, line: u64) -> Result<RunRecord> {
        let record = RunRecord::new(
            parse_date(&raw.date).map_err(|e| at_line(e, line))?,
            parse_number(&raw.distance).map_err(|e| at_line(e, line))?,
            parse_number(&raw.time_s).map_err(|e| at_line(e, line))?,
            parse_number(&raw.calories).map_err(|e| at_line(e, line))?,
        );
        validate(&record, line)?;
        Ok(record)
    }
}

/// Prefix a cell parse error with its CSV line
fn at_line(err: RunlogError, line: u64) -> RunlogError {
    match err {
        RunlogError::Parse(msg) => RunlogError::Parse(format!("line {}: {}", line, msg)),
        other => other,
    }
}

impl Default for CsvLogParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LogParser for CsvLogParser {
    fn name(&self) -> &str {
        "csv"
    }

    fn file_pattern(&self) -> &str {
        "*.csv"
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<RunRecord>> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }
}

/// Reject values that would corrupt the sums
fn validate(record: &RunRecord, line: u64) -> Result<()> {
    for (field, value) in [
        ("distance", record.distance),
        ("duration", record.duration),
        ("calories", record.calories),
    ] {
        if !value.is_finite() {
            return Err(RunlogError::InvalidRecord {
                line,
                reason: format!("non-finite {}", field),
            });
        }
        if value < 0.0 {
            return Err(RunlogError::InvalidRecord {
                line,
                reason: format!("negative {} {}", field, value),
            });
        }
    }
    Ok(())
}

/// Parse a numeric cell, dropping thousands separators. Empty means 0.
pub fn parse_number(cell: &str) -> Result<f64> {
    let cleaned: String = cell.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse::<f64>()
        .map_err(|_| RunlogError::Parse(format!("invalid number '{}'", cell)))
}

/// Parse a date cell. A trailing time part (`2024-01-31 06:30:00`,
/// `2024-01-31T06:30`) is ignored.
pub fn parse_date(cell: &str) -> Result<NaiveDate> {
    let day_part = cell
        .trim()
        .split([' ', 'T'])
        .next()
        .unwrap_or_default();

    // `2024/01/31` goes through DATE_FORMATS, every other slashed date is US order
    let leads_with_year = day_part.split('/').next().map(str::len) == Some(4);
    if day_part.contains('/') && !leads_with_year {
        return parse_us_date(day_part)
            .ok_or_else(|| RunlogError::Parse(format!("invalid date '{}'", cell)));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
        .ok_or_else(|| RunlogError::Parse(format!("invalid date '{}'", cell)))
}

/// `M/D/YYYY` or `M/D/YY`
fn parse_us_date(day_part: &str) -> Option<NaiveDate> {
    let year_len = day_part.rsplit('/').next()?.len();
    let fmt = if year_len == 2 { "%m/%d/%y" } else { "%m/%d/%Y" };
    NaiveDate::parse_from_str(day_part, fmt).ok()
}
