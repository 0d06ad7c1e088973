//! Analytics over a `RecordStore`.
//!
//! Each stage is a pure function of its inputs:
//!
//! - trailing rolling mean (`smooth`)
//! - case-fatality ratio (`rate`)
//! - cross-year day-of-year alignment (`align`)
//! - year-over-year deltas (`delta`)
//! - weekly resampling (`weekly`)

pub mod align;
pub mod delta;
pub mod rate;
pub mod smooth;
pub mod weekly;

pub use align::{align, align_series, day_of_year_index};
pub use delta::{summarize, totals_through_day};
pub use rate::{daily_lethality, lethality, period_lethality};
pub use smooth::{rolling_mean, smooth};
pub use weekly::weekly_totals;
