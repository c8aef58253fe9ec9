//! User configuration (`~/.runlog/config.json`)

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::services::aggregator::RecomputeOptions;
use crate::types::{Result, RunCountPolicy, RunlogError};

/// Settings read from the config file. Every field is optional in the file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// CSV file, directory of CSV files, or glob pattern
    pub data_path: PathBuf,
    pub run_count: RunCountPolicy,
    pub weekly_window: usize,
    pub monthly_window: usize,
    pub histogram_bin_width: f64,
}

impl Default for Config {
    fn default() -> Self {
        let options = RecomputeOptions::default();
        Self {
            data_path: PathBuf::from("data").join("numeric_data.csv"),
            run_count: options.run_count,
            weekly_window: options.weekly_window,
            monthly_window: options.monthly_window,
            histogram_bin_width: 1.0,
        }
    }
}

impl Config {
    pub fn recompute_options(&self) -> RecomputeOptions {
        RecomputeOptions {
            run_count: self.run_count,
            weekly_window: self.weekly_window,
            monthly_window: self.monthly_window,
        }
    }
}

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    /// Config at `~/.runlog/config.json`
    pub fn new() -> Result<Self> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| RunlogError::Config("Cannot determine home directory".into()))?;
        Ok(Self {
            path: base_dirs.home_dir().join(".runlog").join("config.json"),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config file; a missing file yields defaults
    pub fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| {
            RunlogError::Config(format!("{}: {}", self.path.display(), e))
        })?;
        tracing::debug!(path = %self.path.display(), "loaded config");
        Ok(config)
    }
}
