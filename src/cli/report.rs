//! Plain-text and CSV rendering of recomputed statistics

use std::io::Write;

use crate::types::{DateRange, DerivedSeries, HistogramBin, Result, SummaryStatistics};

/// Group digits in threes from the right: 1234567 -> "1,234,567"
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let groups: Vec<&str> = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .collect();
    groups.join(",")
}

/// Whole units for the summary cards (truncated, as the totals are shown)
fn whole(value: f64) -> u64 {
    value.max(0.0).trunc() as u64
}

fn format_optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

pub fn format_stats(range: DateRange, stats: &SummaryStatistics) -> String {
    format!(
        "{} to {}\n\
         Mile Count     {:>10}\n\
         Run Count      {:>10}\n\
         Hour Count     {:>10}\n\
         Calorie Count  {:>10}\n",
        range.start(),
        range.end(),
        format_number(whole(stats.total_distance)),
        format_number(stats.total_runs),
        format_number(stats.total_hours),
        format_number(whole(stats.total_calories)),
    )
}

pub fn format_series(series: &DerivedSeries) -> String {
    let mut out = format!(
        "{:<10}  {:>9}  {:>10}  {:>9}  {:>9}\n",
        "date", "distance", "cumulative", "7d", "30d"
    );
    for i in 0..series.len() {
        out.push_str(&format!(
            "{:<10}  {:>9.2}  {:>10.2}  {:>9}  {:>9}\n",
            series.dates[i],
            series.distance[i],
            series.cumulative[i],
            format_optional(series.rolling_week[i]),
            format_optional(series.rolling_month[i]),
        ));
    }
    out
}

pub fn format_histogram(bins: &[HistogramBin]) -> String {
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);
    let mut out = String::new();
    for bin in bins {
        let width = if max == 0 {
            0
        } else {
            (bin.count * 40).div_ceil(max) as usize
        };
        out.push_str(&format!(
            "{:>7.1} - {:<7.1} {:>5}  {}\n",
            bin.lower,
            bin.upper,
            bin.count,
            "#".repeat(width)
        ));
    }
    out
}

/// Write the derived series as CSV; unset rolling values are empty cells
pub fn write_series_csv<W: Write>(series: &DerivedSeries, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(["date", "distance", "cumulative", "rolling_7d", "rolling_30d"])?;
    for i in 0..series.len() {
        writer.write_record([
            series.dates[i].to_string(),
            series.distance[i].to_string(),
            series.cumulative[i].to_string(),
            series.rolling_week[i].map(|v| v.to_string()).unwrap_or_default(),
            series.rolling_month[i].map(|v| v.to_string()).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
