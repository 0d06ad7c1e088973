//! Date-window selection over a `RecordStore`.
//!
//! Windows are closed intervals. An empty result is valid; callers check
//! emptiness before aggregating.

use chrono::{Datelike, NaiveDate};

use crate::domain::Period;
use crate::store::RecordStore;

/// Observations with `from <= date <= to`, as a new store.
pub fn slice(store: &RecordStore, from: NaiveDate, to: NaiveDate) -> RecordStore {
    if from > to {
        return RecordStore::from_sorted(store.country.clone(), Vec::new());
    }
    let obs = &store.observations;
    let start = obs.partition_point(|o| o.date < from);
    let end = obs.partition_point(|o| o.date <= to);
    RecordStore::from_sorted(store.country.clone(), obs[start..end].to_vec())
}

pub fn slice_period(store: &RecordStore, period: Period) -> RecordStore {
    slice(store, period.from, period.to)
}

/// January 1st through `today` of `today`'s year.
pub fn current_year_period(today: NaiveDate) -> Period {
    Period::new(year_start(today.year()), today)
}

/// The whole calendar year preceding `today`'s year.
pub fn prior_year_period(today: NaiveDate) -> Period {
    let year = today.year() - 1;
    Period::new(year_start(year), year_end(year))
}

fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_yo_opt(year, 1).unwrap_or(NaiveDate::MIN)
}

fn year_end(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn store() -> RecordStore {
        let rows: Vec<RawRow> = [d(2023, 12, 31), d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 5)]
            .into_iter()
            .map(|date| RawRow::new(Some(date), "Brazil", Some(1), Some(0)))
            .collect();
        RecordStore::build(&rows, "Brazil").unwrap()
    }

    #[test]
    fn slice_is_inclusive_on_both_ends() {
        let s = slice(&store(), d(2024, 1, 1), d(2024, 1, 5));
        let dates: Vec<_> = s.iter().map(|o| o.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 5)]);
        assert_eq!(s.country(), "Brazil");
    }

    #[test]
    fn slice_can_be_empty() {
        assert!(slice(&store(), d(2024, 2, 1), d(2024, 3, 1)).is_empty());
        assert!(slice(&store(), d(2024, 1, 5), d(2024, 1, 1)).is_empty());
    }

    #[test]
    fn year_periods() {
        let today = d(2024, 3, 9);
        assert_eq!(current_year_period(today), Period::new(d(2024, 1, 1), today));
        assert_eq!(prior_year_period(today), Period::new(d(2023, 1, 1), d(2023, 12, 31)));
    }
}
