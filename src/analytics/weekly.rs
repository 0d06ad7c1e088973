//! Weekly resampling.
//!
//! Weeks end on Sunday and are labelled by that Sunday. Every week between
//! the first and last observed week is emitted, with zero totals when no
//! observation falls inside it.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::WeeklyTotal;
use crate::store::RecordStore;

pub fn weekly_totals(store: &RecordStore) -> Vec<WeeklyTotal> {
    let mut buckets: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for obs in store {
        let entry = buckets.entry(week_ending(obs.date)).or_default();
        entry.0 += obs.new_cases;
        entry.1 += obs.new_deaths;
    }

    let (Some(&first), Some(&last)) = (buckets.keys().next(), buckets.keys().next_back()) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    let mut week = first;
    while week <= last {
        let (cases, deaths) = buckets.get(&week).copied().unwrap_or((0, 0));
        out.push(WeeklyTotal {
            week_ending: week,
            cases,
            deaths,
        });
        week += Duration::days(7);
    }
    out
}

/// The Sunday on or after `date`.
pub fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - date.weekday().num_days_from_monday();
    date + Duration::days(i64::from(days_to_sunday))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawRow;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_ending_is_sunday() {
        // 2024-01-01 is a Monday; 2024-01-07 a Sunday.
        assert_eq!(week_ending(d(2024, 1, 1)), d(2024, 1, 7));
        assert_eq!(week_ending(d(2024, 1, 7)), d(2024, 1, 7));
        assert_eq!(week_ending(d(2024, 1, 8)), d(2024, 1, 14));
    }

    #[test]
    fn sums_per_week_and_fills_gaps() {
        let rows = vec![
            RawRow::new(Some(d(2024, 1, 1)), "BR", Some(1), Some(0)),
            RawRow::new(Some(d(2024, 1, 7)), "BR", Some(2), Some(1)),
            RawRow::new(Some(d(2024, 1, 22)), "BR", Some(5), Some(2)),
        ];
        let store = RecordStore::build(&rows, "BR").unwrap();

        let weeks = weekly_totals(&store);
        let summary: Vec<_> = weeks.iter().map(|w| (w.week_ending, w.cases, w.deaths)).collect();
        assert_eq!(
            summary,
            vec![
                (d(2024, 1, 7), 3, 1),
                (d(2024, 1, 14), 0, 0),
                (d(2024, 1, 21), 0, 0),
                (d(2024, 1, 28), 5, 2),
            ]
        );
    }

    #[test]
    fn empty_store_has_no_weeks() {
        let rows = vec![RawRow::new(Some(d(2024, 1, 1)), "BR", Some(1), Some(0))];
        let store = RecordStore::build(&rows, "BR").unwrap();
        let empty = crate::store::slice(&store, d(2025, 1, 1), d(2025, 12, 31));
        assert!(empty.is_empty());
        assert!(weekly_totals(&empty).is_empty());
    }
}
