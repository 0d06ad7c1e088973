//! Year-over-year deltas.

use chrono::Datelike;

use crate::domain::{AlignedPair, DeltaSummary, PeriodTotals};
use crate::store::RecordStore;

/// Absolute and percentage change of `total_b` relative to `total_a`.
///
/// A zero baseline reports `delta_percent = 0.0` ("no change") rather than
/// an undefined value.
pub fn summarize(pair: &AlignedPair, total_a: u64, total_b: u64) -> DeltaSummary {
    let delta_absolute = total_b as i64 - total_a as i64;
    let delta_percent = if total_a != 0 {
        delta_absolute as f64 / total_a as f64 * 100.0
    } else {
        0.0
    };

    DeltaSummary {
        total_a,
        total_b,
        delta_absolute,
        delta_percent,
        aligned_days: pair.len(),
    }
}

/// Raw totals over observations whose day-of-year is `<= last_day`.
///
/// Used to compare two years over the same aligned calendar span.
pub fn totals_through_day(store: &RecordStore, last_day: u32) -> PeriodTotals {
    store
        .iter()
        .filter(|o| o.date.ordinal() <= last_day)
        .fold(PeriodTotals::default(), |acc, o| PeriodTotals {
            cases: acc.cases + o.new_cases,
            deaths: acc.deaths + o.new_deaths,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use chrono::NaiveDate;

    #[test]
    fn growth_against_nonzero_baseline() {
        let s = summarize(&AlignedPair::default(), 100, 150);
        assert_eq!(s.delta_absolute, 50);
        assert!((s.delta_percent - 50.0).abs() < 1e-9);
    }

    #[test]
    fn decline_is_negative() {
        let s = summarize(&AlignedPair::default(), 200, 50);
        assert_eq!(s.delta_absolute, -150);
        assert!((s.delta_percent + 75.0).abs() < 1e-9);
    }

    #[test]
    fn zero_baseline_reports_zero_percent() {
        let s = summarize(&AlignedPair::default(), 0, 50);
        assert_eq!(s.delta_absolute, 50);
        assert_eq!(s.delta_percent, 0.0);
    }

    #[test]
    fn aligned_days_come_from_pair() {
        let pair = AlignedPair {
            series_a: vec![0.0; 3],
            series_b: vec![0.0; 3],
        };
        assert_eq!(summarize(&pair, 1, 1).aligned_days, 3);
    }

    #[test]
    fn totals_through_day_cuts_by_ordinal() {
        let rows: Vec<RawRow> = (1..=5)
            .map(|doy| RawRow::new(NaiveDate::from_yo_opt(2023, doy), "BR", Some(10), Some(1)))
            .collect();
        let store = RecordStore::build(&rows, "BR").unwrap();
        assert_eq!(totals_through_day(&store, 3), PeriodTotals { cases: 30, deaths: 3 });
        assert_eq!(totals_through_day(&store, 0), PeriodTotals::default());
    }
}
