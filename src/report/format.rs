//! Formatted terminal output.
//!
//! We keep formatting code in one place so the analytics stay clean and
//! output changes are localized.

use crate::app::pipeline::PipelineOutput;
use crate::domain::DeltaSummary;

/// Format the full run summary (windows, totals, lethality, deltas).
pub fn format_run_summary(output: &PipelineOutput) -> String {
    let s = &output.summary;
    let mut out = String::new();

    out.push_str(&format!("=== epi - {} ===\n", output.country));
    out.push_str(&format!("Generated: {}\n", s.generated_at.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!(
        "Prior year:   {} | days={} | cases={} | deaths={} | lethality={}\n",
        output.prior.period,
        output.prior.store.len(),
        s.total_cases_period_a,
        s.total_deaths_period_a,
        fmt_rate(s.lethality_a),
    ));
    out.push_str(&format!(
        "Current year: {} | days={} | cases={} | deaths={} | lethality={}\n",
        output.current.period,
        output.current.store.len(),
        s.total_cases_period_b,
        s.total_deaths_period_b,
        fmt_rate(s.lethality_b),
    ));

    out.push_str(&format!(
        "\nYear over year (days 1..={}):\n",
        output.delta_cases.aligned_days
    ));
    out.push_str(&format_delta("cases", &output.delta_cases));
    out.push_str(&format_delta("deaths", &output.delta_deaths));

    let daily = output.daily_points();
    if let Some(last) = daily.last() {
        out.push_str(&format!(
            "\nLatest ({}): cases={} (mean {:.1}) | deaths={} (mean {:.1}) | lethality={}\n",
            last.date,
            last.new_cases,
            last.cases_mm7,
            last.new_deaths,
            last.deaths_mm7,
            fmt_rate(last.lethality),
        ));
    }

    out
}

fn format_delta(label: &str, delta: &DeltaSummary) -> String {
    format!(
        "- {label:<7} {:>10} -> {:>10} | {:+} ({:+.1}%)\n",
        delta.total_a, delta.total_b, delta.delta_absolute, delta.delta_percent
    )
}

/// Render an optional percentage; undefined prints as `n/a`.
pub fn fmt_rate(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.2}%"),
        _ => "n/a".to_string(),
    }
}
