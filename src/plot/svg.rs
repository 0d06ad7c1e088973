//! Plotters-powered SVG chart renderer.
//!
//! The chart is render-only and data-driven: all series and bounds are
//! computed by the caller, `render_svg()` only draws.

use std::error::Error;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::AppError;

/// How a series is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesStyle {
    Line,
    /// Thin translucent bars from zero.
    Bars,
    /// Unconnected dots; used where gaps must stay visible.
    Points,
}

#[derive(Debug, Clone)]
pub struct ChartSeries {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub style: SeriesStyle,
}

/// A lightweight chart description.
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<ChartSeries>,
    pub size: (u32, u32),
    /// Formatting of x tick labels.
    pub fmt_x: fn(f64) -> String,
}

impl LineChart {
    /// X/Y bounds covering every series, with zero as the y floor.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut x0 = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut y1 = 0.0_f64;
        for &(x, y) in self.series.iter().flat_map(|s| s.points.iter()) {
            x0 = x0.min(x);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        if !(x0.is_finite() && x1.is_finite()) {
            return ([0.0, 1.0], [0.0, 1.0]);
        }
        // Half a step of padding keeps bars at the edges inside the plot.
        let x = [x0 - 0.5, x1 + 0.5];
        let y = if y1 > 0.0 { [0.0, y1 * 1.1] } else { [0.0, 1.0] };
        (x, y)
    }

    pub fn render_svg(&self) -> Result<String, AppError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            self.draw(&root)
                .map_err(|e| AppError::new(4, format!("Failed to render chart '{}': {e}", self.title)))?;
            root.present()
                .map_err(|e| AppError::new(4, format!("Failed to finish chart '{}': {e}", self.title)))?;
        }
        Ok(svg)
    }

    fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), Box<dyn Error>>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let ([x0, x1], [y0, y1]) = self.bounds();

        root.fill(&WHITE)?;
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, ("sans-serif", 20))
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(x0..x1, y0..y1)?;

        chart
            .configure_mesh()
            .x_desc(self.x_label.as_str())
            .y_desc(self.y_label.as_str())
            .x_labels(8)
            .y_labels(6)
            .x_label_formatter(&|v| (self.fmt_x)(*v))
            .y_label_formatter(&|v| format!("{v:.0}"))
            .draw()?;

        for series in &self.series {
            let color = series.color;
            let drawn = match series.style {
                SeriesStyle::Line => chart.draw_series(LineSeries::new(
                    series.points.iter().copied(),
                    color.stroke_width(2),
                ))?,
                SeriesStyle::Bars => chart.draw_series(series.points.iter().map(|&(x, y)| {
                    Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], color.mix(0.35).filled())
                }))?,
                SeriesStyle::Points => chart.draw_series(
                    series
                        .points
                        .iter()
                        .map(|&(x, y)| Circle::new((x, y), 2, color.filled())),
                )?,
            };
            drawn
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        Ok(())
    }
}
