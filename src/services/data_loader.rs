//! Data loading service: files on disk to an immutable `RunLog`

use std::path::Path;

use crate::parsers::{CsvLogParser, LogParser};
use crate::types::{Result, RunLog, RunlogError};

/// Loads run logs from a file, a directory of exports, or a glob pattern
pub struct DataLoaderService {
    parser: Box<dyn LogParser>,
}

impl DataLoaderService {
    /// Create a loader for CSV logs
    pub fn new() -> Self {
        Self::with_parser(Box::new(CsvLogParser::new()))
    }

    pub fn with_parser(parser: Box<dyn LogParser>) -> Self {
        Self { parser }
    }

    /// Parse every file behind `source` and merge rows by date
    pub fn load(&self, source: &Path) -> Result<RunLog> {
        let files = self.parser.collect_files(source);
        if files.is_empty() {
            return Err(RunlogError::NoData(format!(
                "no {} files at {}",
                self.parser.name(),
                source.display()
            )));
        }
        tracing::debug!(count = files.len(), source = %source.display(), "collected log files");

        let records = self.parser.parse_all(&files)?;
        if records.is_empty() {
            return Err(RunlogError::NoData(format!(
                "{} contains no rows",
                source.display()
            )));
        }

        let row_count = records.len();
        let log = RunLog::from_records(records);
        tracing::info!(rows = row_count, days = log.len(), "loaded run log");
        Ok(log)
    }
}

impl Default for DataLoaderService {
    fn default() -> Self {
        Self::new()
    }
}
