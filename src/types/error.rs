use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// runlog error types
#[derive(Error, Debug)]
pub enum RunlogError {
    /// Failed to parse a CSV cell (date or number)
    #[error("parse error: {0}")]
    Parse(String),

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV structure
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Range with start after end
    #[error("invalid range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Record rejected at load time (negative or non-finite value)
    #[error("invalid record at line {line}: {reason}")]
    InvalidRecord { line: u64, reason: String },

    /// Rolling window of zero days
    #[error("invalid rolling window: {0} days")]
    InvalidWindow(usize),

    /// Histogram bin width that is not a positive finite number
    #[error("invalid histogram bin width: {0}")]
    InvalidBinWidth(f64),

    /// Bin width too small for the distances in range
    #[error("histogram bin width {bin_width} is too small for a {max_distance} distance")]
    TooManyBins { bin_width: f64, max_distance: f64 },

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// Nothing to load
    #[error("no run data found: {0}")]
    NoData(String),

    /// Any of the above, raised while reading a specific file
    #[error("{}: {source}", .path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<RunlogError>,
    },
}

impl RunlogError {
    /// Attach the file being read to an error
    pub fn in_file(self, path: &Path) -> Self {
        RunlogError::InFile {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for runlog
pub type Result<T> = std::result::Result<T, RunlogError>;
