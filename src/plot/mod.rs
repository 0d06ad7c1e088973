//! Chart datasets and SVG rendering.
//!
//! Presentation state lives entirely here; the analytics core only hands over
//! `DailyPoint`s, `AlignedPair`s, and `WeeklyTotal`s.
//!
//! Daily and weekly charts use "days since CE" on the x axis so tick labels can
//! be turned back into dates without capturing state.

pub mod svg;

use chrono::{Datelike, NaiveDate};
use plotters::style::RGBColor;

use crate::app::pipeline::PipelineOutput;
use crate::domain::{AlignedPair, DailyPoint, Field, WeeklyTotal};
use crate::error::AppError;

pub use svg::{ChartSeries, LineChart, SeriesStyle};

const CHART_SIZE: (u32, u32) = (1000, 500);

const RAW_COLOR: RGBColor = RGBColor(120, 144, 156);
const CASES_COLOR: RGBColor = RGBColor(30, 100, 200);
const DEATHS_COLOR: RGBColor = RGBColor(200, 40, 40);
const PRIOR_COLOR: RGBColor = RGBColor(150, 150, 150);
const RATE_COLOR: RGBColor = RGBColor(120, 60, 160);

/// Daily raw counts (bars) with the rolling mean (line) for one field.
pub fn daily_chart(country: &str, points: &[DailyPoint], field: Field, window: usize) -> LineChart {
    let (raw, smooth, color): (Vec<(f64, f64)>, Vec<(f64, f64)>, RGBColor) = match field {
        Field::Cases => (
            points.iter().map(|p| (date_x(p.date), p.new_cases as f64)).collect(),
            points.iter().map(|p| (date_x(p.date), p.cases_mm7)).collect(),
            CASES_COLOR,
        ),
        Field::Deaths => (
            points.iter().map(|p| (date_x(p.date), p.new_deaths as f64)).collect(),
            points.iter().map(|p| (date_x(p.date), p.deaths_mm7)).collect(),
            DEATHS_COLOR,
        ),
    };

    LineChart {
        title: format!("{country}: daily new {}", field.label()),
        x_label: "date".to_string(),
        y_label: format!("new {}", field.label()),
        series: vec![
            ChartSeries {
                label: "daily".to_string(),
                points: raw,
                color: RAW_COLOR,
                style: SeriesStyle::Bars,
            },
            ChartSeries {
                label: format!("{window}-day mean"),
                points: smooth,
                color,
                style: SeriesStyle::Line,
            },
        ],
        size: CHART_SIZE,
        fmt_x: fmt_date_x,
    }
}

/// Per-day lethality. Undefined days are left out rather than drawn as zero.
pub fn lethality_chart(country: &str, points: &[DailyPoint]) -> LineChart {
    LineChart {
        title: format!("{country}: daily lethality"),
        x_label: "date".to_string(),
        y_label: "deaths / cases (%)".to_string(),
        series: vec![ChartSeries {
            label: "lethality".to_string(),
            points: points
                .iter()
                .filter_map(|p| p.lethality.map(|v| (date_x(p.date), v)))
                .collect(),
            color: RATE_COLOR,
            style: SeriesStyle::Points,
        }],
        size: CHART_SIZE,
        fmt_x: fmt_date_x,
    }
}

/// Prior vs current year on the shared day-of-year axis.
pub fn aligned_chart(country: &str, pair: &AlignedPair, field: Field, year_a: i32, year_b: i32) -> LineChart {
    let to_points = |values: &[f64]| -> Vec<(f64, f64)> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| ((i + 1) as f64, v))
            .collect()
    };
    let color = match field {
        Field::Cases => CASES_COLOR,
        Field::Deaths => DEATHS_COLOR,
    };

    LineChart {
        title: format!("{country}: {} year over year", field.label()),
        x_label: "day of year".to_string(),
        y_label: format!("new {} (rolling mean)", field.label()),
        series: vec![
            ChartSeries {
                label: year_a.to_string(),
                points: to_points(&pair.series_a),
                color: PRIOR_COLOR,
                style: SeriesStyle::Line,
            },
            ChartSeries {
                label: year_b.to_string(),
                points: to_points(&pair.series_b),
                color,
                style: SeriesStyle::Line,
            },
        ],
        size: CHART_SIZE,
        fmt_x: |v| format!("{v:.0}"),
    }
}

/// Weekly totals for one field.
pub fn weekly_chart(country: &str, weeks: &[WeeklyTotal], field: Field) -> LineChart {
    let (points, color): (Vec<(f64, f64)>, RGBColor) = match field {
        Field::Cases => (
            weeks.iter().map(|w| (date_x(w.week_ending), w.cases as f64)).collect(),
            CASES_COLOR,
        ),
        Field::Deaths => (
            weeks.iter().map(|w| (date_x(w.week_ending), w.deaths as f64)).collect(),
            DEATHS_COLOR,
        ),
    };

    LineChart {
        title: format!("{country}: weekly {}", field.label()),
        x_label: "week ending".to_string(),
        y_label: format!("{} per week", field.label()),
        series: vec![ChartSeries {
            label: field.label().to_string(),
            points,
            color,
            style: SeriesStyle::Line,
        }],
        size: CHART_SIZE,
        fmt_x: fmt_date_x,
    }
}

/// Render the standard chart set as `(file name, SVG)` pairs.
pub fn render_charts(output: &PipelineOutput, window: usize) -> Result<Vec<(String, String)>, AppError> {
    let country = output.country.as_str();
    let daily = output.daily_points();
    let year_a = output.prior.period.from.year();
    let year_b = output.current.period.from.year();

    let charts = [
        ("daily_cases.svg", daily_chart(country, &daily, Field::Cases, window)),
        ("daily_deaths.svg", daily_chart(country, &daily, Field::Deaths, window)),
        ("daily_lethality.svg", lethality_chart(country, &daily)),
        (
            "yoy_cases.svg",
            aligned_chart(country, &output.aligned_cases, Field::Cases, year_a, year_b),
        ),
        (
            "yoy_deaths.svg",
            aligned_chart(country, &output.aligned_deaths, Field::Deaths, year_a, year_b),
        ),
        ("weekly_cases.svg", weekly_chart(country, &output.weekly, Field::Cases)),
        ("weekly_deaths.svg", weekly_chart(country, &output.weekly, Field::Deaths)),
    ];

    charts
        .into_iter()
        .map(|(name, chart)| -> Result<(String, String), AppError> {
            Ok((name.to_string(), chart.render_svg()?))
        })
        .collect()
}

fn date_x(date: NaiveDate) -> f64 {
    f64::from(date.num_days_from_ce())
}

fn fmt_date_x(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%d/%m/%y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, cases: u64, lethality: Option<f64>) -> DailyPoint {
        DailyPoint {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            new_cases: cases,
            new_deaths: 0,
            cases_mm7: cases as f64,
            deaths_mm7: 0.0,
            lethality,
        }
    }

    #[test]
    fn date_axis_round_trips_through_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(fmt_date_x(date_x(d)), "09/03/24");
    }

    #[test]
    fn lethality_chart_skips_undefined_days() {
        let points = vec![point(1, 10, Some(10.0)), point(2, 0, None), point(3, 5, Some(0.0))];
        let chart = lethality_chart("Brazil", &points);
        assert_eq!(chart.series[0].points.len(), 2);
    }

    #[test]
    fn aligned_chart_is_one_based() {
        let pair = AlignedPair {
            series_a: vec![1.0, 2.0],
            series_b: vec![3.0, 4.0],
        };
        let chart = aligned_chart("Brazil", &pair, Field::Cases, 2023, 2024);
        assert_eq!(chart.series[0].points, vec![(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(chart.series[1].label, "2024");
    }

    #[test]
    fn daily_chart_has_raw_and_smoothed_series() {
        let points = vec![point(1, 10, None), point(2, 20, None)];
        let chart = daily_chart("Brazil", &points, Field::Cases, 7);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].style, SeriesStyle::Bars);
        assert_eq!(chart.series[1].label, "7-day mean");
    }

    #[test]
    fn weekly_chart_follows_field() {
        let weeks = vec![
            WeeklyTotal {
                week_ending: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
                cases: 70,
                deaths: 3,
            },
            WeeklyTotal {
                week_ending: NaiveDate::from_ymd_opt(2024, 1, 14).unwrap(),
                cases: 40,
                deaths: 1,
            },
        ];
        let deaths = weekly_chart("Brazil", &weeks, Field::Deaths);
        let ys: Vec<f64> = deaths.series[0].points.iter().map(|p| p.1).collect();
        assert_eq!(ys, vec![3.0, 1.0]);
        assert_eq!(deaths.series[0].color, DEATHS_COLOR);
        assert_eq!(deaths.title, "Brazil: weekly deaths");

        let cases = weekly_chart("Brazil", &weeks, Field::Cases);
        assert_eq!(cases.series[0].points[0].1, 70.0);
        assert_eq!(cases.series[0].color, CASES_COLOR);
    }

    #[test]
    fn standard_set_includes_weekly_deaths() {
        use crate::app::pipeline::run_pipeline;
        use crate::domain::{PipelineConfig, RawRow};

        let rows = vec![
            RawRow::new(NaiveDate::from_ymd_opt(2023, 1, 1), "Brazil", Some(5), Some(0)),
            RawRow::new(NaiveDate::from_ymd_opt(2024, 1, 1), "Brazil", Some(10), Some(1)),
        ];
        let now = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(8, 0, 0).unwrap();
        let output = run_pipeline(&rows, &PipelineConfig::default(), now).unwrap();

        let names: Vec<String> = render_charts(&output, 7).unwrap().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"weekly_deaths.svg".to_string()));
    }
}
