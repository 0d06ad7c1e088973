//! Trailing rolling mean ("MM7").
//!
//! The window shrinks at the start of the series instead of producing
//! undefined values: output `i` is the mean of inputs
//! `max(0, i + 1 - window)..=i`. Output length always equals input length.

use crate::domain::{DerivedSeries, Field};
use crate::store::RecordStore;

/// Smooth one field of a store with a trailing window.
pub fn smooth(store: &RecordStore, field: Field, window: usize) -> DerivedSeries {
    let values: Vec<f64> = store.iter().map(|o| field.value(o) as f64).collect();
    rolling_mean(&values, window).into_iter().map(Some).collect()
}

/// Trailing mean with a minimum of one observation per window.
///
/// A `window` of zero is treated as one.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        out.push(sum / count as f64);
    }

    out
}
