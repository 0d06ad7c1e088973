//! Ordered, deduplicated storage of daily observations for one country.
//!
//! - cleaning + construction (`RecordStore::build`)
//! - date-window selection (`filter`)

pub mod filter;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{info, warn};

use crate::domain::{Field, Observation, PeriodTotals, RawRow};
use crate::error::IngestError;

pub use filter::*;

/// Observations for a single country, strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordStore {
    country: String,
    observations: Vec<Observation>,
}

/// Counters describing what `RecordStore::build` kept and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub rows_read: usize,
    pub rows_incomplete: usize,
    pub rows_other_country: usize,
    pub duplicate_dates: usize,
}

impl RecordStore {
    /// Clean raw rows into a store for `country`.
    ///
    /// Policy:
    /// - rows missing a date, `new_cases`, or `new_deaths` are dropped
    /// - rows for other countries are dropped (case-insensitive match)
    /// - duplicate dates resolve to the row encountered last
    ///
    /// Fails with `IngestError::Empty` when nothing remains.
    pub fn build<'a, I>(rows: I, country: &str) -> Result<Self, IngestError>
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        Self::build_with_stats(rows, country).map(|(store, _)| store)
    }

    pub fn build_with_stats<'a, I>(rows: I, country: &str) -> Result<(Self, BuildStats), IngestError>
    where
        I: IntoIterator<Item = &'a RawRow>,
    {
        let target = country.trim();
        let mut stats = BuildStats::default();
        let mut by_date: BTreeMap<NaiveDate, Observation> = BTreeMap::new();

        for row in rows {
            stats.rows_read += 1;

            let (Some(date), Some(row_country), Some(new_cases), Some(new_deaths)) =
                (row.date, row.country.as_deref(), row.new_cases, row.new_deaths)
            else {
                stats.rows_incomplete += 1;
                continue;
            };

            if !row_country.trim().eq_ignore_ascii_case(target) {
                stats.rows_other_country += 1;
                continue;
            }

            let obs = Observation {
                date,
                country: target.to_string(),
                new_cases,
                new_deaths,
            };
            if by_date.insert(date, obs).is_some() {
                stats.duplicate_dates += 1;
            }
        }

        if stats.rows_incomplete > 0 {
            warn!("Dropped {} incomplete row(s)", stats.rows_incomplete);
        }
        if stats.duplicate_dates > 0 {
            warn!(
                "Resolved {} duplicate date(s) for '{target}' (last row wins)",
                stats.duplicate_dates
            );
        }

        if by_date.is_empty() {
            return Err(IngestError::empty(format!("country '{target}'")));
        }

        let store = Self {
            country: target.to_string(),
            observations: by_date.into_values().collect(),
        };
        if let (Some(first), Some(last)) = (store.first_date(), store.last_date()) {
            info!(
                "Built record store for '{}': {} day(s), {first}..={last}",
                store.country,
                store.len(),
            );
        }
        Ok((store, stats))
    }

    /// Wrap observations that already satisfy the store invariants.
    fn from_sorted(country: String, observations: Vec<Observation>) -> Self {
        debug_assert!(observations.windows(2).all(|w| w[0].date < w[1].date));
        Self { country, observations }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }

    /// Values of `field` in date order.
    pub fn values(&self, field: Field) -> Vec<u64> {
        self.observations.iter().map(|o| field.value(o)).collect()
    }

    pub fn totals(&self) -> PeriodTotals {
        self.observations.iter().fold(PeriodTotals::default(), |acc, o| PeriodTotals {
            cases: acc.cases + o.new_cases,
            deaths: acc.deaths + o.new_deaths,
        })
    }

    /// Fail with `IngestError::Empty` unless the store has at least one row.
    pub fn require_non_empty(&self, context: &str) -> Result<&Self, IngestError> {
        if self.is_empty() {
            Err(IngestError::empty(format!("'{}' in {context}", self.country)))
        } else {
            Ok(self)
        }
    }
}

impl<'a> IntoIterator for &'a RecordStore {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn row(date: Option<NaiveDate>, country: &str, cases: Option<u64>, deaths: Option<u64>) -> RawRow {
        RawRow::new(date, country, cases, deaths)
    }

    #[test]
    fn build_sorts_and_filters_country() {
        let rows = vec![
            row(Some(d(2024, 1, 3)), "Brazil", Some(3), Some(0)),
            row(Some(d(2024, 1, 1)), "Brazil", Some(1), Some(0)),
            row(Some(d(2024, 1, 2)), "Chile", Some(99), Some(9)),
            row(Some(d(2024, 1, 2)), " brazil ", Some(2), Some(1)),
        ];

        let (store, stats) = RecordStore::build_with_stats(&rows, "Brazil").unwrap();
        let dates: Vec<_> = store.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(store.values(Field::Cases), vec![1, 2, 3]);
        assert!(store.iter().all(|o| o.country == "Brazil"));
        assert_eq!(stats.rows_other_country, 1);
    }

    #[test]
    fn build_drops_incomplete_rows() {
        let rows = vec![
            row(None, "Brazil", Some(5), Some(0)),
            row(Some(d(2024, 1, 1)), "Brazil", None, Some(0)),
            row(Some(d(2024, 1, 2)), "Brazil", Some(5), None),
            row(Some(d(2024, 1, 3)), "Brazil", Some(7), Some(1)),
        ];

        let (store, stats) = RecordStore::build_with_stats(&rows, "Brazil").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.observations()[0].new_cases, 7);
        assert_eq!(stats.rows_incomplete, 3);
    }

    #[test]
    fn duplicate_dates_last_row_wins() {
        let rows = vec![
            row(Some(d(2024, 1, 1)), "Brazil", Some(1), Some(0)),
            row(Some(d(2024, 1, 1)), "Brazil", Some(2), Some(1)),
        ];

        let (store, stats) = RecordStore::build_with_stats(&rows, "Brazil").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.observations()[0].new_cases, 2);
        assert_eq!(stats.duplicate_dates, 1);
    }

    #[test]
    fn empty_result_is_an_error() {
        let rows = vec![row(Some(d(2024, 1, 1)), "Chile", Some(1), Some(0))];
        let err = RecordStore::build(&rows, "Brazil").unwrap_err();
        assert!(matches!(err, IngestError::Empty { .. }));
    }

    #[test]
    fn totals_sum_both_fields() {
        let rows = vec![
            row(Some(d(2024, 1, 1)), "Brazil", Some(10), Some(1)),
            row(Some(d(2024, 1, 2)), "Brazil", Some(20), Some(2)),
        ];
        let store = RecordStore::build(&rows, "Brazil").unwrap();
        assert_eq!(store.totals(), PeriodTotals { cases: 30, deaths: 3 });
    }
}
