//! Aggregator service for range-bound run statistics
//!
//! Every function here is pure over `(RunLog, DateRange)`: nothing is
//! cached between calls, so a range change is just another call.

use crate::types::{
    Dashboard, DateRange, DenseSeries, DerivedSeries, HistogramBin, Result, RunCountPolicy,
    RunLog, RunRecord, RunlogError, SummaryStatistics,
};

const SECONDS_PER_HOUR: f64 = 3600.0;

/// Upper bound on histogram bars for one request
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

/// Knobs for a recomputation pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecomputeOptions {
    pub run_count: RunCountPolicy,
    pub weekly_window: usize,
    pub monthly_window: usize,
}

impl Default for RecomputeOptions {
    fn default() -> Self {
        Self {
            run_count: RunCountPolicy::default(),
            weekly_window: 7,
            monthly_window: 30,
        }
    }
}

/// Aggregator for computing run statistics
pub struct Aggregator;

impl Aggregator {
    /// One record per calendar day in `range`; days absent from the log are zero-filled
    pub fn densify(log: &RunLog, range: DateRange) -> DenseSeries {
        let days = range
            .iter_days()
            .map(|date| {
                log.get(date)
                    .copied()
                    .unwrap_or_else(|| RunRecord::rest_day(date))
            })
            .collect();
        DenseSeries { days }
    }

    /// Trailing window sum. The first `window_days - 1` positions have no value.
    pub fn rolling_sum(series: &[f64], window_days: usize) -> Result<Vec<Option<f64>>> {
        if window_days == 0 {
            return Err(RunlogError::InvalidWindow(window_days));
        }

        let mut result = Vec::with_capacity(series.len());
        let warmup = (window_days - 1).min(series.len());
        result.extend(std::iter::repeat_n(None, warmup));
        // Each window is summed from scratch so that float drift from a
        // running add/subtract never leaks into later values
        result.extend(
            series
                .windows(window_days)
                .map(|window| Some(window.iter().sum::<f64>())),
        );
        Ok(result)
    }

    pub fn cumulative_sum(series: &[f64]) -> Vec<f64> {
        series
            .iter()
            .scan(0.0, |total, value| {
                *total += value;
                Some(*total)
            })
            .collect()
    }

    /// Totals over the logged entries in `range` (no densification)
    pub fn summary_statistics(
        log: &RunLog,
        range: DateRange,
        policy: RunCountPolicy,
    ) -> SummaryStatistics {
        let mut total_seconds = 0.0;
        let mut stats = SummaryStatistics::default();

        for record in log.entries_in(range) {
            stats.total_distance += record.distance;
            stats.total_calories += record.calories;
            total_seconds += record.duration;
            if policy.counts(record) {
                stats.total_runs = stats.total_runs.saturating_add(1);
            }
        }

        stats.total_hours = (total_seconds / SECONDS_PER_HOUR).trunc() as u64;
        stats
    }

    /// Raw, cumulative and rolling distance over the densified range
    pub fn derived_series(
        log: &RunLog,
        range: DateRange,
        options: &RecomputeOptions,
    ) -> Result<DerivedSeries> {
        let dense = Self::densify(log, range);
        let distance = dense.distances();

        Ok(DerivedSeries {
            dates: dense.dates(),
            cumulative: Self::cumulative_sum(&distance),
            rolling_week: Self::rolling_sum(&distance, options.weekly_window)?,
            rolling_month: Self::rolling_sum(&distance, options.monthly_window)?,
            distance,
        })
    }

    /// Full pass for one range selection: statistics plus every series
    pub fn recompute(
        log: &RunLog,
        range: DateRange,
        options: &RecomputeOptions,
    ) -> Result<Dashboard> {
        Ok(Dashboard {
            range,
            stats: Self::summary_statistics(log, range, options.run_count),
            series: Self::derived_series(log, range, options)?,
        })
    }

    /// Distance distribution of logged entries in `range`, in bins of
    /// `bin_width` starting at 0. Trailing empty bins are not emitted.
    /// A width that would need more than `MAX_HISTOGRAM_BINS` bars is rejected.
    pub fn distance_histogram(
        log: &RunLog,
        range: DateRange,
        bin_width: f64,
    ) -> Result<Vec<HistogramBin>> {
        if !bin_width.is_finite() || bin_width <= 0.0 {
            return Err(RunlogError::InvalidBinWidth(bin_width));
        }

        let Some(max_distance) = log
            .entries_in(range)
            .map(|r| r.distance)
            .max_by(f64::total_cmp)
        else {
            return Ok(Vec::new());
        };

        // Checked in f64 before any cast so that a tiny width cannot saturate
        let last_index = (max_distance / bin_width).floor();
        if !last_index.is_finite() || last_index >= MAX_HISTOGRAM_BINS as f64 {
            return Err(RunlogError::TooManyBins {
                bin_width,
                max_distance,
            });
        }

        let mut counts = vec![0u64; last_index as usize + 1];
        for record in log.entries_in(range) {
            let index = (record.distance / bin_width).floor() as usize;
            counts[index] += 1;
        }

        Ok(counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: i as f64 * bin_width,
                upper: (i + 1) as f64 * bin_width,
                count,
            })
            .collect())
    }
}
