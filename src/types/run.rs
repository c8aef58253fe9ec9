//! Run log types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Result, RunlogError};

/// One day of running: a single run, or the sum of every run logged that day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RunRecord {
    pub date: NaiveDate,
    pub distance: f64,
    /// Seconds
    pub duration: f64,
    pub calories: f64,
}

impl RunRecord {
    pub fn new(date: NaiveDate, distance: f64, duration: f64, calories: f64) -> Self {
        Self {
            date,
            distance,
            duration,
            calories,
        }
    }

    /// Placeholder for a day with no run
    pub fn rest_day(date: NaiveDate) -> Self {
        Self::new(date, 0.0, 0.0, 0.0)
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration / 60.0
    }

    /// Fold another run on the same day into this one
    pub fn add(&mut self, other: &RunRecord) {
        self.distance += other.distance;
        self.duration += other.duration;
        self.calories += other.calories;
    }
}

/// Inclusive range of calendar days. Always `start <= end`, including when deserialized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Wire shape of `DateRange`, validated through `DateRange::new`
#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = RunlogError;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Build a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(RunlogError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day in the range, ascending
    pub fn iter_days(&self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take(self.days())
    }
}

/// Immutable, date-indexed run log with one aggregated record per day
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunLog {
    records: BTreeMap<NaiveDate, RunRecord>,
}

impl RunLog {
    /// Build a log, summing records that share a date
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RunRecord>,
    {
        let mut map: BTreeMap<NaiveDate, RunRecord> = BTreeMap::new();
        for record in records {
            map.entry(record.date)
                .and_modify(|existing| existing.add(&record))
                .or_insert(record);
        }
        Self { records: map }
    }

    pub fn get(&self, date: NaiveDate) -> Option<&RunRecord> {
        self.records.get(&date)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First and last logged day (None for an empty log)
    pub fn bounds(&self) -> Option<DateRange> {
        let (start, _) = self.records.first_key_value()?;
        let (end, _) = self.records.last_key_value()?;
        // BTreeMap keys are ordered, so first <= last
        Some(DateRange {
            start: *start,
            end: *end,
        })
    }

    /// Logged entries inside `range`, ascending by date
    pub fn entries_in(&self, range: DateRange) -> impl Iterator<Item = &RunRecord> {
        self.records
            .range(range.start..=range.end)
            .map(|(_, record)| record)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.values()
    }
}

/// Gap-free daily table produced by densification
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DenseSeries {
    pub days: Vec<RunRecord>,
}

impl DenseSeries {
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.days.iter().map(|d| d.date).collect()
    }

    pub fn distances(&self) -> Vec<f64> {
        self.days.iter().map(|d| d.distance).collect()
    }
}

/// The four chartable series, aligned to `dates`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DerivedSeries {
    pub dates: Vec<NaiveDate>,
    pub distance: Vec<f64>,
    pub cumulative: Vec<f64>,
    /// Trailing weekly sum; `None` until the window is full
    pub rolling_week: Vec<Option<f64>>,
    /// Trailing monthly sum; `None` until the window is full
    pub rolling_month: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct SummaryStatistics {
    pub total_distance: f64,
    pub total_runs: u64,
    /// Whole hours, truncated
    pub total_hours: u64,
    pub total_calories: f64,
}

/// Which log entries count towards `total_runs`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunCountPolicy {
    /// Zero-distance rows are rest-day placeholders and not runs
    #[default]
    PositiveDistance,
    /// Every logged row is a run
    AllEntries,
}

impl RunCountPolicy {
    pub fn counts(&self, record: &RunRecord) -> bool {
        match self {
            RunCountPolicy::PositiveDistance => record.distance > 0.0,
            RunCountPolicy::AllEntries => true,
        }
    }
}

/// Result of one recomputation pass over a range
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub range: DateRange,
    pub stats: SummaryStatistics,
    pub series: DerivedSeries,
}

/// One bar of the distance distribution, `[lower, upper)`
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        let result = DateRange::new(date(2024, 1, 3), date(2024, 1, 1));
        assert!(matches!(result, Err(RunlogError::InvalidRange { .. })));
    }

    #[test]
    fn test_date_range_deserialize_rejects_inverted() {
        let result =
            serde_json::from_str::<DateRange>(r#"{"start":"2024-02-01","end":"2024-01-01"}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid range"));
    }

    #[test]
    fn test_date_range_serde_round_trip() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#"{"start":"2024-01-01","end":"2024-01-31"}"#);
        assert_eq!(serde_json::from_str::<DateRange>(&json).unwrap(), range);
    }

    #[test]
    fn test_date_range_single_day() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 1)).unwrap();
        assert_eq!(range.days(), 1);
        assert_eq!(range.iter_days().collect::<Vec<_>>(), vec![date(2024, 1, 1)]);
    }

    #[test]
    fn test_date_range_days_across_leap_february() {
        let range = DateRange::new(date(2024, 2, 27), date(2024, 3, 1)).unwrap();
        assert_eq!(range.days(), 4);
        let days: Vec<_> = range.iter_days().collect();
        assert_eq!(days[2], date(2024, 2, 29));
        assert_eq!(days[3], date(2024, 3, 1));
    }

    #[test]
    fn test_date_range_contains() {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert!(range.contains(date(2024, 1, 1)));
        assert!(range.contains(date(2024, 1, 31)));
        assert!(!range.contains(date(2024, 2, 1)));
    }

    #[test]
    fn test_run_log_sums_same_day() {
        let log = RunLog::from_records(vec![
            RunRecord::new(date(2024, 1, 2), 3.0, 1200.0, 300.0),
            RunRecord::new(date(2024, 1, 2), 2.0, 600.0, 150.0),
        ]);

        assert_eq!(log.len(), 1);
        let day = log.get(date(2024, 1, 2)).unwrap();
        assert!((day.distance - 5.0).abs() < f64::EPSILON);
        assert!((day.duration - 1800.0).abs() < f64::EPSILON);
        assert!((day.calories - 450.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_log_sorted_and_bounded() {
        let log = RunLog::from_records(vec![
            RunRecord::new(date(2024, 3, 1), 1.0, 0.0, 0.0),
            RunRecord::new(date(2024, 1, 1), 1.0, 0.0, 0.0),
            RunRecord::new(date(2024, 2, 1), 1.0, 0.0, 0.0),
        ]);

        let dates: Vec<_> = log.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 2, 1), date(2024, 3, 1)]);

        let bounds = log.bounds().unwrap();
        assert_eq!(bounds.start(), date(2024, 1, 1));
        assert_eq!(bounds.end(), date(2024, 3, 1));
    }

    #[test]
    fn test_run_log_empty_has_no_bounds() {
        let log = RunLog::default();
        assert!(log.is_empty());
        assert!(log.bounds().is_none());
    }

    #[test]
    fn test_entries_in_range_inclusive() {
        let log = RunLog::from_records(vec![
            RunRecord::new(date(2024, 1, 1), 1.0, 0.0, 0.0),
            RunRecord::new(date(2024, 1, 5), 2.0, 0.0, 0.0),
            RunRecord::new(date(2024, 1, 9), 3.0, 0.0, 0.0),
        ]);
        let range = DateRange::new(date(2024, 1, 1), date(2024, 1, 5)).unwrap();

        let distances: Vec<f64> = log.entries_in(range).map(|r| r.distance).collect();
        assert_eq!(distances, vec![1.0, 2.0]);
    }

    #[test]
    fn test_duration_minutes() {
        let record = RunRecord::new(date(2024, 1, 1), 5.0, 1800.0, 400.0);
        assert!((record.duration_minutes() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_run_count_policy() {
        let rest = RunRecord::rest_day(date(2024, 1, 1));
        let run = RunRecord::new(date(2024, 1, 2), 4.0, 1500.0, 350.0);

        assert!(!RunCountPolicy::PositiveDistance.counts(&rest));
        assert!(RunCountPolicy::PositiveDistance.counts(&run));
        assert!(RunCountPolicy::AllEntries.counts(&rest));
    }

    #[test]
    fn test_run_count_policy_serde_names() {
        let json = serde_json::to_string(&RunCountPolicy::AllEntries).unwrap();
        assert_eq!(json, "\"all_entries\"");
        let parsed: RunCountPolicy = serde_json::from_str("\"positive_distance\"").unwrap();
        assert_eq!(parsed, RunCountPolicy::PositiveDistance);
    }
}
