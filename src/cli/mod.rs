mod report;

use std::fs::File;
use std::io;
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::parsers::parse_date;
use crate::services::{Aggregator, Config, ConfigService, DataLoaderService};
use crate::types::{DateRange, RunCountPolicy, RunLog, RunlogError};

/// Running log statistics for any date range
#[derive(Parser)]
#[command(name = "runlog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run log CSV, directory of CSVs, or glob pattern (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Config file (default: ~/.runlog/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show total miles, runs, hours and calories
    Stats {
        #[command(flatten)]
        range: RangeArgs,

        /// Count zero-distance rows as runs
        #[arg(long)]
        count_rest_days: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show daily distance, cumulative distance and rolling 7/30-day sums
    Series {
        #[command(flatten)]
        range: RangeArgs,

        /// Output as JSON
        #[arg(long, conflicts_with = "csv")]
        json: bool,

        /// Write the series to a CSV file instead of stdout
        #[arg(long, value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Statistics and series in one pass
    Report {
        #[command(flatten)]
        range: RangeArgs,

        /// Count zero-distance rows as runs
        #[arg(long)]
        count_rest_days: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the distribution of run distances
    Histogram {
        #[command(flatten)]
        range: RangeArgs,

        /// Bin width in distance units (overrides config)
        #[arg(long)]
        bin_width: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the first and last logged day
    Bounds {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Date range selection; omitted ends fall back to the log bounds
#[derive(Args, Debug, Clone, Copy)]
struct RangeArgs {
    /// First day (inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Last day (inclusive)
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,
}

impl RangeArgs {
    fn resolve(&self, log: &RunLog) -> crate::types::Result<DateRange> {
        let bounds = log
            .bounds()
            .ok_or_else(|| RunlogError::NoData("run log is empty".into()))?;
        DateRange::new(
            self.from.unwrap_or(bounds.start()),
            self.to.unwrap_or(bounds.end()),
        )
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        init_tracing(self.verbose);

        let config = self.load_config()?;
        let data_path = self.data.clone().unwrap_or_else(|| config.data_path.clone());
        let log = DataLoaderService::new()
            .load(&data_path)
            .with_context(|| format!("failed to load run log from {}", data_path.display()))?;

        let mut options = config.recompute_options();

        match self.command {
            Commands::Stats {
                range,
                count_rest_days,
                json,
            } => {
                if count_rest_days {
                    options.run_count = RunCountPolicy::AllEntries;
                }
                let range = range.resolve(&log)?;
                let stats = Aggregator::summary_statistics(&log, range, options.run_count);
                if json {
                    print_json(&stats)?;
                } else {
                    print!("{}", report::format_stats(range, &stats));
                }
            }
            Commands::Series { range, json, csv } => {
                let range = range.resolve(&log)?;
                let series = Aggregator::derived_series(&log, range, &options)?;
                if let Some(path) = csv {
                    let file = File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    report::write_series_csv(&series, file)?;
                    tracing::info!(path = %path.display(), days = series.len(), "wrote series CSV");
                } else if json {
                    print_json(&series)?;
                } else {
                    print!("{}", report::format_series(&series));
                }
            }
            Commands::Report {
                range,
                count_rest_days,
                json,
            } => {
                if count_rest_days {
                    options.run_count = RunCountPolicy::AllEntries;
                }
                let range = range.resolve(&log)?;
                let dashboard = Aggregator::recompute(&log, range, &options)?;
                if json {
                    print_json(&dashboard)?;
                } else {
                    print!("{}", report::format_stats(range, &dashboard.stats));
                    println!();
                    print!("{}", report::format_series(&dashboard.series));
                }
            }
            Commands::Histogram {
                range,
                bin_width,
                json,
            } => {
                let range = range.resolve(&log)?;
                let width = bin_width.unwrap_or(config.histogram_bin_width);
                let bins = Aggregator::distance_histogram(&log, range, width)?;
                if json {
                    print_json(&bins)?;
                } else {
                    print!("{}", report::format_histogram(&bins));
                }
            }
            Commands::Bounds { json } => {
                let bounds = log
                    .bounds()
                    .ok_or_else(|| RunlogError::NoData("run log is empty".into()))?;
                if json {
                    print_json(&bounds)?;
                } else {
                    println!("{} to {} ({} days logged)", bounds.start(), bounds.end(), log.len());
                }
            }
        }

        Ok(())
    }

    fn load_config(&self) -> anyhow::Result<Config> {
        let service = match &self.config {
            Some(path) => ConfigService::with_path(path.clone()),
            None => match ConfigService::new() {
                Ok(service) => service,
                Err(e) => {
                    tracing::warn!("{}, using default config", e);
                    return Ok(Config::default());
                }
            },
        };
        Ok(service.load()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RunRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_log() -> RunLog {
        RunLog::from_records(vec![
            RunRecord::new(date(2024, 1, 1), 5.0, 1800.0, 500.0),
            RunRecord::new(date(2024, 1, 20), 3.0, 900.0, 300.0),
        ])
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["runlog"]).is_err());
    }

    #[test]
    fn test_cli_parse_stats() {
        let cli = Cli::try_parse_from(["runlog", "stats"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Stats {
                json: false,
                count_rest_days: false,
                ..
            }
        ));
    }

    #[test]
    fn test_cli_parse_series_range() {
        let cli = Cli::try_parse_from([
            "runlog",
            "series",
            "--from",
            "2024-01-01",
            "--to",
            "01/31/2024",
        ])
        .unwrap();
        match cli.command {
            Commands::Series { range, .. } => {
                assert_eq!(range.from, Some(date(2024, 1, 1)));
                assert_eq!(range.to, Some(date(2024, 1, 31)));
            }
            _ => panic!("expected series"),
        }
    }

    #[test]
    fn test_cli_parse_invalid_date() {
        assert!(Cli::try_parse_from(["runlog", "stats", "--from", "soon"]).is_err());
    }

    #[test]
    fn test_cli_global_data_after_subcommand() {
        let cli =
            Cli::try_parse_from(["runlog", "report", "--json", "--data", "runs/*.csv"]).unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("runs/*.csv")));
        assert!(matches!(cli.command, Commands::Report { json: true, .. }));
    }

    #[test]
    fn test_cli_series_json_conflicts_with_csv() {
        assert!(
            Cli::try_parse_from(["runlog", "series", "--json", "--csv", "out.csv"]).is_err()
        );
    }

    #[test]
    fn test_cli_parse_histogram_bin_width() {
        let cli = Cli::try_parse_from(["runlog", "histogram", "--bin-width", "2.5"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Histogram {
                bin_width: Some(w),
                ..
            } if (w - 2.5).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn test_range_defaults_to_log_bounds() {
        let args = RangeArgs {
            from: None,
            to: None,
        };
        let range = args.resolve(&sample_log()).unwrap();
        assert_eq!(range.start(), date(2024, 1, 1));
        assert_eq!(range.end(), date(2024, 1, 20));
    }

    #[test]
    fn test_range_partial_override() {
        let args = RangeArgs {
            from: Some(date(2024, 1, 10)),
            to: None,
        };
        let range = args.resolve(&sample_log()).unwrap();
        assert_eq!(range.start(), date(2024, 1, 10));
        assert_eq!(range.end(), date(2024, 1, 20));
    }

    #[test]
    fn test_range_inverted_rejected() {
        let args = RangeArgs {
            from: Some(date(2024, 2, 1)),
            to: Some(date(2024, 1, 1)),
        };
        assert!(matches!(
            args.resolve(&sample_log()),
            Err(RunlogError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_range_empty_log() {
        let args = RangeArgs {
            from: None,
            to: None,
        };
        assert!(matches!(
            args.resolve(&RunLog::default()),
            Err(RunlogError::NoData(_))
        ));
    }
}
