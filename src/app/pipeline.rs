//! The analytics pipeline shared by every front-end command.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! rows -> store -> year windows -> smoothing -> lethality -> alignment -> deltas -> summary
//!
//! The pipeline performs no I/O. It takes already-parsed rows and an
//! already-resolved "now", so identical inputs always give identical outputs.

use chrono::{Datelike, NaiveDateTime};
use log::{debug, info};

use crate::analytics::{align, daily_lethality, smooth, summarize, totals_through_day, weekly_totals};
use crate::domain::{
    AlignedPair, DailyPoint, DeltaSummary, DerivedSeries, Field, Period, PipelineConfig, RawRow,
    SummaryRecord, WeeklyTotal,
};
use crate::error::IngestError;
use crate::report::build_summary;
use crate::store::{RecordStore, current_year_period, prior_year_period, slice_period};

/// Smoothed series attached to one year window.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedWindow {
    pub period: Period,
    pub store: RecordStore,
    pub cases_mm7: DerivedSeries,
    pub deaths_mm7: DerivedSeries,
}

impl SmoothedWindow {
    fn new(store: &RecordStore, period: Period, window: usize, label: &str) -> Result<Self, IngestError> {
        let store = slice_period(store, period);
        store.require_non_empty(&format!("{label} ({period})"))?;
        Ok(Self {
            period,
            cases_mm7: smooth(&store, Field::Cases, window),
            deaths_mm7: smooth(&store, Field::Deaths, window),
            store,
        })
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub country: String,
    /// Baseline window (prior calendar year).
    pub prior: SmoothedWindow,
    /// Comparison window (current year to date).
    pub current: SmoothedWindow,
    /// Per-day lethality for the current window.
    pub lethality: DerivedSeries,
    pub aligned_cases: AlignedPair,
    pub aligned_deaths: AlignedPair,
    pub delta_cases: DeltaSummary,
    pub delta_deaths: DeltaSummary,
    /// Weekly totals over the whole country history.
    pub weekly: Vec<WeeklyTotal>,
    pub summary: SummaryRecord,
}

impl PipelineOutput {
    /// Per-day rows for the current window.
    pub fn daily_points(&self) -> Vec<DailyPoint> {
        self.current
            .store
            .iter()
            .enumerate()
            .map(|(i, obs)| DailyPoint {
                date: obs.date,
                new_cases: obs.new_cases,
                new_deaths: obs.new_deaths,
                cases_mm7: self.current.cases_mm7.get(i).unwrap_or(0.0),
                deaths_mm7: self.current.deaths_mm7.get(i).unwrap_or(0.0),
                lethality: self.lethality.get(i),
            })
            .collect()
    }
}

/// Execute the full pipeline over parsed rows.
pub fn run_pipeline(
    rows: &[RawRow],
    config: &PipelineConfig,
    now: NaiveDateTime,
) -> Result<PipelineOutput, IngestError> {
    let store = RecordStore::build(rows, &config.country)?;
    let today = now.date();

    let current = SmoothedWindow::new(&store, current_year_period(today), config.window, "current year")?;
    let prior = SmoothedWindow::new(&store, prior_year_period(today), config.window, "prior year")?;
    info!(
        "Windows: prior {} ({} day(s)), current {} ({} day(s))",
        prior.period,
        prior.store.len(),
        current.period,
        current.store.len()
    );

    let lethality = daily_lethality(&current.store);
    debug!(
        "Lethality defined on {} of {} day(s)",
        lethality.defined_count(),
        lethality.len()
    );

    let aligned_cases = align(&prior.store, &prior.cases_mm7, &current.store, &current.cases_mm7, today);
    let aligned_deaths = align(&prior.store, &prior.deaths_mm7, &current.store, &current.deaths_mm7, today);

    // Deltas compare the same calendar span in both years.
    let span = u32::try_from(aligned_cases.len()).unwrap_or(today.ordinal());
    let totals_prior = totals_through_day(&prior.store, span);
    let totals_current = totals_through_day(&current.store, span);
    let delta_cases = summarize(&aligned_cases, totals_prior.cases, totals_current.cases);
    let delta_deaths = summarize(&aligned_deaths, totals_prior.deaths, totals_current.deaths);
    info!(
        "Year-over-year through day {span}: cases {:+} ({:+.1}%), deaths {:+} ({:+.1}%)",
        delta_cases.delta_absolute,
        delta_cases.delta_percent,
        delta_deaths.delta_absolute,
        delta_deaths.delta_percent
    );

    let weekly = weekly_totals(&store);
    let summary = build_summary(&prior.store, &current.store, now)?;

    Ok(PipelineOutput {
        country: store.country().to_string(),
        prior,
        current,
        lethality,
        aligned_cases,
        aligned_deaths,
        delta_cases,
        delta_deaths,
        weekly,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rows() -> Vec<RawRow> {
        let mut rows = Vec::new();
        for doy in 1..=10 {
            rows.push(RawRow::new(NaiveDate::from_yo_opt(2023, doy), "Brazil", Some(100), Some(2)));
        }
        for doy in 1..=8 {
            rows.push(RawRow::new(NaiveDate::from_yo_opt(2024, doy), "Brazil", Some(150), Some(3)));
        }
        rows.push(RawRow::new(Some(d(2024, 1, 2)), "Chile", Some(9), Some(9)));
        rows
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_yo_opt(2024, 9).unwrap().and_hms_opt(8, 30, 0).unwrap()
    }

    #[test]
    fn end_to_end_outputs_are_consistent() {
        let out = run_pipeline(&rows(), &PipelineConfig::default(), now()).unwrap();

        assert_eq!(out.country, "Brazil");
        assert_eq!(out.current.store.len(), 8);
        assert_eq!(out.prior.store.len(), 10);
        assert_eq!(out.current.cases_mm7.len(), 8);
        assert_eq!(out.lethality.len(), 8);

        assert_eq!(out.aligned_cases.len(), 8);
        assert_eq!(out.aligned_deaths.len(), 8);
        assert_eq!(out.aligned_cases.series_a, vec![100.0; 8]);
        assert_eq!(out.aligned_cases.series_b, vec![150.0; 8]);

        assert_eq!(out.delta_cases.total_a, 800);
        assert_eq!(out.delta_cases.total_b, 1200);
        assert_eq!(out.delta_cases.delta_absolute, 400);
        assert!((out.delta_cases.delta_percent - 50.0).abs() < 1e-9);

        assert_eq!(out.summary.total_cases_period_a, 1000);
        assert_eq!(out.summary.total_deaths_period_a, 20);
        assert_eq!(out.summary.total_cases_period_b, 1200);
        assert_eq!(out.summary.lethality_b, Some(2.0));
        assert_eq!(out.summary.generated_at, now());

        let daily = out.daily_points();
        assert_eq!(daily.len(), 8);
        assert_eq!(daily[0].date, d(2024, 1, 1));
        assert_eq!(daily[0].lethality, Some(2.0));
    }

    #[test]
    fn rerun_is_idempotent() {
        let a = run_pipeline(&rows(), &PipelineConfig::default(), now()).unwrap();
        let b = run_pipeline(&rows(), &PipelineConfig::default(), now()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn missing_prior_year_aborts() {
        let rows: Vec<RawRow> = rows().into_iter().filter(|r| r.date.map(|d| d.year()) == Some(2024)).collect();
        let err = run_pipeline(&rows, &PipelineConfig::default(), now()).unwrap_err();
        assert!(matches!(err, IngestError::Empty { .. }));
    }

    #[test]
    fn unknown_country_aborts() {
        let config = PipelineConfig {
            country: "Atlantis".to_string(),
            ..PipelineConfig::default()
        };
        assert!(run_pipeline(&rows(), &config, now()).is_err());
    }
}
