//! Case-fatality ratio ("lethality").
//!
//! `deaths / cases * 100`. A zero-case denominator yields
//! `ComputationError::UndefinedRate`, which downstream code carries as `None`.
//! Ratios are not clamped; noisy data can exceed 100.

use crate::domain::{DerivedSeries, PeriodTotals};
use crate::error::ComputationError;
use crate::store::RecordStore;

pub fn lethality(cases: u64, deaths: u64) -> Result<f64, ComputationError> {
    if cases == 0 {
        return Err(ComputationError::UndefinedRate);
    }
    Ok(deaths as f64 / cases as f64 * 100.0)
}

/// Per-day lethality from raw daily counts.
pub fn daily_lethality(store: &RecordStore) -> DerivedSeries {
    store
        .iter()
        .map(|o| lethality(o.new_cases, o.new_deaths).ok())
        .collect()
}

/// Lethality over period totals (sum of deaths / sum of cases).
pub fn period_lethality(totals: PeriodTotals) -> Option<f64> {
    lethality(totals.cases, totals.deaths).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;
    use chrono::NaiveDate;

    #[test]
    fn zero_cases_is_undefined() {
        assert_eq!(lethality(0, 0), Err(ComputationError::UndefinedRate));
        assert_eq!(lethality(0, 5), Err(ComputationError::UndefinedRate));
    }

    #[test]
    fn ratio_is_a_percentage_and_unclamped() {
        assert!((lethality(10, 1).unwrap() - 10.0).abs() < 1e-12);
        assert_eq!(lethality(20, 0), Ok(0.0));
        assert!((lethality(2, 3).unwrap() - 150.0).abs() < 1e-12);
    }

    #[test]
    fn daily_series_marks_zero_case_days() {
        let rows: Vec<RawRow> = [(1, 10, 1), (2, 20, 0), (3, 0, 0)]
            .into_iter()
            .map(|(day, c, d)| {
                RawRow::new(NaiveDate::from_ymd_opt(2024, 1, day), "BR", Some(c), Some(d))
            })
            .collect();
        let store = RecordStore::build(&rows, "BR").unwrap();

        let rates = daily_lethality(&store);
        assert_eq!(rates.values(), &[Some(10.0), Some(0.0), None]);
    }

    #[test]
    fn period_lethality_uses_totals() {
        assert_eq!(period_lethality(PeriodTotals { cases: 200, deaths: 5 }), Some(2.5));
        assert_eq!(period_lethality(PeriodTotals { cases: 0, deaths: 5 }), None);
    }
}
