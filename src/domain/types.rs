//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed between pipeline stages without copying underlying records
//! - exported to JSON/CSV
//! - handed to an external chart renderer

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Trailing window used for the "MM7" rolling mean.
pub const DEFAULT_WINDOW: usize = 7;

/// Country selected when none is configured.
pub const DEFAULT_COUNTRY: &str = "Brazil";

/// WHO global daily COVID-19 export.
pub const DEFAULT_SOURCE_URL: &str =
    "https://srhdpeuwpubsa.blob.core.windows.net/whdh/COVID/WHO-COVID-19-global-daily-data.csv";

/// A raw input row with every field optional.
///
/// This mirrors the source schema (`Date_reported`, `Country`, `New_cases`,
/// `New_deaths`) after per-cell parsing; a field is `None` when the cell was
/// empty or unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    /// 1-based source line (for diagnostics).
    pub line: usize,
    pub date: Option<NaiveDate>,
    pub country: Option<String>,
    pub new_cases: Option<u64>,
    pub new_deaths: Option<u64>,
}

impl RawRow {
    pub fn new(
        date: Option<NaiveDate>,
        country: &str,
        new_cases: Option<u64>,
        new_deaths: Option<u64>,
    ) -> Self {
        Self {
            line: 0,
            date,
            country: Some(country.to_string()),
            new_cases,
            new_deaths,
        }
    }
}

/// One calendar day's cleaned record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub country: String,
    pub new_cases: u64,
    pub new_deaths: u64,
}

/// Numeric field of an `Observation` that can be smoothed or summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Cases,
    Deaths,
}

impl Field {
    pub fn value(self, obs: &Observation) -> u64 {
        match self {
            Field::Cases => obs.new_cases,
            Field::Deaths => obs.new_deaths,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Cases => "cases",
            Field::Deaths => "deaths",
        }
    }
}

/// A per-observation numeric sequence parallel to a `RecordStore`.
///
/// `None` marks a day where the quantity is undefined (e.g. lethality on a
/// zero-case day). It is never equivalent to `Some(0.0)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DerivedSeries {
    values: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn new(values: Vec<Option<f64>>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Number of defined entries.
    pub fn defined_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

impl FromIterator<Option<f64>> for DerivedSeries {
    fn from_iter<I: IntoIterator<Item = Option<f64>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Two equal-length sequences on a shared day-of-year axis.
///
/// Index `0` holds day-of-year 1. Every entry is a concrete number.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AlignedPair {
    pub series_a: Vec<f64>,
    pub series_b: Vec<f64>,
}

impl AlignedPair {
    pub fn len(&self) -> usize {
        self.series_a.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series_a.is_empty()
    }

    /// Values for a 1-based day-of-year.
    pub fn day(&self, day_of_year: u32) -> Option<(f64, f64)> {
        let idx = (day_of_year as usize).checked_sub(1)?;
        Some((*self.series_a.get(idx)?, *self.series_b.get(idx)?))
    }
}

/// Aggregate totals over one comparison period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PeriodTotals {
    pub cases: u64,
    pub deaths: u64,
}

/// Year-over-year change between two totals (`b` relative to baseline `a`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeltaSummary {
    pub total_a: u64,
    pub total_b: u64,
    pub delta_absolute: i64,
    pub delta_percent: f64,
    /// Length of the aligned day-of-year range the totals cover.
    pub aligned_days: usize,
}

/// One day of the current reporting period, as handed to chart/CSV output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub new_cases: u64,
    pub new_deaths: u64,
    pub cases_mm7: f64,
    pub deaths_mm7: f64,
    pub lethality: Option<f64>,
}

/// Cases and deaths summed over one Sunday-terminated week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyTotal {
    pub week_ending: NaiveDate,
    pub cases: u64,
    pub deaths: u64,
}

/// The persisted run summary.
///
/// Period `a` is the baseline (prior year), period `b` the comparison
/// (current year). Lethality is `null` when the period has zero cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub total_cases_period_a: u64,
    pub total_deaths_period_a: u64,
    pub total_cases_period_b: u64,
    pub total_deaths_period_b: u64,
    pub lethality_a: Option<f64>,
    pub lethality_b: Option<f64>,
    pub generated_at: NaiveDateTime,
}

/// A closed calendar interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl Period {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.from, self.to)
    }
}

/// Inputs the analytics core needs besides rows and "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub country: String,
    pub window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            window: DEFAULT_WINDOW,
        }
    }
}

/// A full run's configuration as understood by the application shell.
///
/// This is derived from CLI flags, environment, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// URL (`http://`, `https://`) or local CSV path.
    pub source: String,
    pub country: String,
    pub out_dir: PathBuf,
    pub window: usize,
    /// Overrides the wall-clock run timestamp.
    pub now: Option<NaiveDateTime>,
    pub charts: bool,
    pub timeout_secs: u64,
    pub retries: u32,
}

impl DashboardConfig {
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            country: self.country.clone(),
            window: self.window,
        }
    }
}
