// src/charts.rs
//
// Bar charts drawn against any plotters backend: PNG files for the batch
// report, inline SVG for the dashboard.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::error::{KpiError, Result};
use crate::models::{DepartmentAverage, ProductivityScore, SatisfactionScore};

pub const CHART_SIZE: (u32, u32) = (1000, 600);
pub const PRODUCTIVITY_CHART_LIMIT: usize = 20;

pub const PRODUCTIVITY_TITLE: &str = "Top 20 Employee Productivity (tasks per hour)";
pub const DEPARTMENT_TITLE: &str = "Average KPI by Department";
pub const SATISFACTION_TITLE: &str = "Top Employees by Customer Satisfaction";

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const METRIC_COLORS: [RGBColor; 3] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
];

// slots per department: one bar per metric plus a gap
const GROUP_WIDTH: usize = 4;

pub type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn chart_error<E: std::fmt::Display>(chart: &str, e: E) -> KpiError {
    KpiError::Chart { chart: chart.to_string(), message: e.to_string() }
}

fn y_upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

/// Single-series bar chart, one labelled bar per entry.
fn draw_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    title: &str,
    y_desc: &str,
    bars: &[(&str, f64)],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let slots = bars.len().max(1);
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(120)
        .y_label_area_size(70)
        .build_cartesian_2d(
            (0..slots - 1).into_segmented(),
            0f64..y_upper_bound(bars.iter().map(|(_, v)| *v)),
        )?;

    let label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            bars.get(*i).map(|(name, _)| name.to_string()).unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&label)
        .x_label_style(("sans-serif", 13).into_font().transform(FontTransform::Rotate90))
        .y_desc(y_desc)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BAR_COLOR.filled())
            .margin(4)
            .data(bars.iter().enumerate().map(|(i, (_, v))| (i, *v))),
    )?;
    Ok(())
}

/// Top 20 employees by productivity. Undefined productivity is not plotted.
pub fn draw_productivity<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scores: &[ProductivityScore],
) -> DrawResult<DB> {
    let bars: Vec<(&str, f64)> = scores
        .iter()
        .filter_map(|s| s.productivity.map(|p| (s.name.as_str(), p)))
        .take(PRODUCTIVITY_CHART_LIMIT)
        .collect();
    draw_bars(root, PRODUCTIVITY_TITLE, "Tasks per hour", &bars)
}

pub fn draw_satisfaction<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scores: &[SatisfactionScore],
) -> DrawResult<DB> {
    let bars: Vec<(&str, f64)> = scores
        .iter()
        .map(|s| (s.name.as_str(), s.customer_satisfaction))
        .collect();
    draw_bars(root, SATISFACTION_TITLE, "Customer satisfaction", &bars)
}

/// Grouped bars: sales, satisfaction and tasks side by side per department.
pub fn draw_department_averages<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    averages: &[DepartmentAverage],
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let slots = (averages.len() * GROUP_WIDTH).max(1);
    let y_max = y_upper_bound(
        averages
            .iter()
            .flat_map(|a| [a.sales, a.customer_satisfaction, a.tasks_completed]),
    );
    let mut chart = ChartBuilder::on(root)
        .caption(DEPARTMENT_TITLE, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(120)
        .y_label_area_size(70)
        .build_cartesian_2d((0..slots - 1).into_segmented(), 0f64..y_max)?;

    // department name under the middle bar of its group
    let label = |v: &SegmentValue<usize>| match v {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) if *i % GROUP_WIDTH == 1 => averages
            .get(*i / GROUP_WIDTH)
            .map(|a| a.department.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&label)
        .x_label_style(("sans-serif", 13).into_font().transform(FontTransform::Rotate90))
        .y_desc("Value")
        .draw()?;

    let metrics: [(&str, fn(&DepartmentAverage) -> f64); 3] = [
        ("sales", |a| a.sales),
        ("customer_satisfaction", |a| a.customer_satisfaction),
        ("tasks_completed", |a| a.tasks_completed),
    ];
    for (j, ((metric, value), color)) in metrics.into_iter().zip(METRIC_COLORS).enumerate() {
        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(color.filled())
                    .margin(1)
                    .data(
                        averages
                            .iter()
                            .enumerate()
                            .map(|(i, a)| (i * GROUP_WIDTH + j, value(a))),
                    ),
            )?
            .label(metric)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Output targets
// ─────────────────────────────────────────────────────────────────────────────

/// Draws into a PNG at `path`, replacing any existing file.
pub fn render_png<F>(path: &Path, draw: F) -> Result<()>
where
    F: for<'a> FnOnce(&DrawingArea<BitMapBackend<'a>, Shift>) -> DrawResult<BitMapBackend<'a>>,
{
    let chart = path.display().to_string();
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    draw(&root).map_err(|e| chart_error(&chart, e))?;
    root.present().map_err(|e| chart_error(&chart, e))?;
    Ok(())
}

/// Draws into an SVG document returned as a string.
pub fn render_svg<F>(chart: &str, draw: F) -> Result<String>
where
    F: for<'a> FnOnce(&DrawingArea<SVGBackend<'a>, Shift>) -> DrawResult<SVGBackend<'a>>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw(&root).map_err(|e| chart_error(chart, e))?;
        root.present().map_err(|e| chart_error(chart, e))?;
    }
    Ok(svg)
}
