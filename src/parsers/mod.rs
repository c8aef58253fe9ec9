//! Parser traits and implementations for run log files

mod csv_log;

pub use csv_log::{parse_date, parse_number, CsvLogParser};

use crate::types::{Result, RunRecord};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Trait for parsing run records out of exported log files
pub trait LogParser: Send + Sync {
    /// Parser name (e.g., "csv")
    fn name(&self) -> &str;

    /// Glob pattern used when the source is a directory (e.g., "*.csv")
    fn file_pattern(&self) -> &str;

    /// Parse a single file and return its rows, one record per row
    fn parse_file(&self, path: &Path) -> Result<Vec<RunRecord>>;

    /// Parse all files in parallel using rayon.
    /// The first failing file aborts the load; its path is attached to the error.
    fn parse_all(&self, files: &[PathBuf]) -> Result<Vec<RunRecord>> {
        let per_file: Vec<Vec<RunRecord>> = files
            .par_iter()
            .map(|f| {
                self.parse_file(f).map_err(|e| {
                    tracing::warn!(parser = self.name(), path = %f.display(), "parse failed: {}", e);
                    e.in_file(f)
                })
            })
            .collect::<Result<_>>()?;

        Ok(per_file.into_iter().flatten().collect())
    }

    /// Resolve a source to files: a file is used as-is, a directory is
    /// scanned with `file_pattern`, anything else is treated as a glob.
    fn collect_files(&self, source: &Path) -> Vec<PathBuf> {
        if source.is_file() {
            return vec![source.to_path_buf()];
        }

        let pattern = if source.is_dir() {
            source.join(self.file_pattern())
        } else {
            source.to_path_buf()
        };

        let mut files: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())
            .map(|paths| {
                paths
                    .filter_map(|e| e.ok())
                    .filter(|p| p.is_file())
                    .collect()
            })
            .unwrap_or_default();
        files.sort();
        files
    }
}
