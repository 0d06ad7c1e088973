//! Reporting utilities: the persisted summary and formatted terminal output.

pub mod format;

use chrono::NaiveDateTime;

use crate::analytics::period_lethality;
use crate::domain::SummaryRecord;
use crate::error::IngestError;
use crate::store::RecordStore;

pub use format::*;

/// Assemble the summary record for two comparison periods.
///
/// Both periods must contain data; an empty period aborts the run.
pub fn build_summary(
    period_a: &RecordStore,
    period_b: &RecordStore,
    generated_at: NaiveDateTime,
) -> Result<SummaryRecord, IngestError> {
    let totals_a = period_a.require_non_empty("period a")?.totals();
    let totals_b = period_b.require_non_empty("period b")?.totals();

    Ok(SummaryRecord {
        total_cases_period_a: totals_a.cases,
        total_deaths_period_a: totals_a.deaths,
        total_cases_period_b: totals_b.cases,
        total_deaths_period_b: totals_b.deaths,
        lethality_a: period_lethality(totals_a),
        lethality_b: period_lethality(totals_b),
        generated_at,
    })
}
