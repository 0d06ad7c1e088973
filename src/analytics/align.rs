//! Cross-year calendar alignment.
//!
//! Two stores from different years are re-indexed by day-of-year (1..=366,
//! leap years handled per source year) onto a shared axis of length
//!
//! `N = min(last day-of-year in a, last day-of-year in b, today's day-of-year)`
//!
//! Days absent from a source are filled with `0.0`, as are undefined values.
//! The zero-fill treats "no report" as "zero observed"; it can understate
//! sparsely reported stretches.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use log::debug;

use crate::domain::{AlignedPair, DerivedSeries};
use crate::store::RecordStore;

/// Map each observation's day-of-year to its value in `series`.
///
/// `series` must be parallel to `store` (one value per observation).
pub fn day_of_year_index(store: &RecordStore, series: &DerivedSeries) -> BTreeMap<u32, f64> {
    debug_assert_eq!(store.len(), series.len());
    store
        .iter()
        .zip(series.values())
        .map(|(obs, v)| (obs.date.ordinal(), v.unwrap_or(0.0)))
        .collect()
}

/// Align two stores' derived series on the day-of-year axis.
pub fn align(
    store_a: &RecordStore,
    series_a: &DerivedSeries,
    store_b: &RecordStore,
    series_b: &DerivedSeries,
    today: NaiveDate,
) -> AlignedPair {
    let index_a = day_of_year_index(store_a, series_a);
    let index_b = day_of_year_index(store_b, series_b);
    align_series(&index_a, &index_b, today.ordinal())
}

/// Align two pre-indexed series, bounded by `today_doy`.
pub fn align_series(index_a: &BTreeMap<u32, f64>, index_b: &BTreeMap<u32, f64>, today_doy: u32) -> AlignedPair {
    let last_a = index_a.keys().next_back().copied().unwrap_or(0);
    let last_b = index_b.keys().next_back().copied().unwrap_or(0);
    let n = last_a.min(last_b).min(today_doy);

    debug!("Aligning day-of-year axis: last_a={last_a} last_b={last_b} today={today_doy} -> n={n}");

    let fill = |index: &BTreeMap<u32, f64>| -> Vec<f64> {
        (1..=n).map(|day| index.get(&day).copied().unwrap_or(0.0)).collect()
    };

    AlignedPair {
        series_a: fill(index_a),
        series_b: fill(index_b),
    }
}
