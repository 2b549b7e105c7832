//! SVG chart files rendered with Plotters.
//!
//! Three charts are produced for the report:
//! - `monthly_sales.svg`: monthly revenue line
//! - `top_products.svg`: revenue bars for the top-N products
//! - `sales_trend.svg`: monthly revenue with its moving average and forecast
//!
//! Months are plotted by position (0, 1, 2, ...) and labelled `YYYY-MM`, which
//! keeps the axis readable when months are missing from the history.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use tracing::info;

use crate::domain::{MonthlyRevenue, ProductTotals};
use crate::error::AppError;
use crate::forecast::Forecast;

pub const MONTHLY_SALES_FILE: &str = "monthly_sales.svg";
pub const TOP_PRODUCTS_FILE: &str = "top_products.svg";
pub const SALES_TREND_FILE: &str = "sales_trend.svg";

const CHART_SIZE: (u32, u32) = (960, 540);

type DrawResult = Result<(), Box<dyn Error>>;

/// Inputs for [`write_charts`].
#[derive(Debug, Clone, Copy)]
pub struct ChartData<'a> {
    pub monthly: &'a [MonthlyRevenue],
    pub moving_average: &'a [Option<f64>],
    pub top: &'a [ProductTotals],
    pub forecast: Option<&'a Forecast>,
}

/// Render every chart into `dir` (created if missing). Returns the files written.
pub fn write_charts(dir: &Path, data: &ChartData<'_>) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)
        .map_err(|e| AppError::new(2, format!("Failed to create chart directory '{}': {e}", dir.display())))?;

    let monthly_path = dir.join(MONTHLY_SALES_FILE);
    let top_path = dir.join(TOP_PRODUCTS_FILE);
    let trend_path = dir.join(SALES_TREND_FILE);

    draw_monthly_sales(&monthly_path, data.monthly).map_err(|e| chart_error(&monthly_path, e))?;
    draw_top_products(&top_path, data.top).map_err(|e| chart_error(&top_path, e))?;
    draw_sales_trend(&trend_path, data.monthly, data.moving_average, data.forecast)
        .map_err(|e| chart_error(&trend_path, e))?;

    info!(dir = %dir.display(), "wrote charts");
    Ok(vec![monthly_path, top_path, trend_path])
}

fn chart_error(path: &Path, e: Box<dyn Error>) -> AppError {
    AppError::new(4, format!("Failed to render chart '{}': {e}", path.display()))
}

fn draw_monthly_sales(path: &Path, monthly: &[MonthlyRevenue]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let series: Vec<(f64, f64)> = monthly.iter().enumerate().map(|(i, m)| (i as f64, m.revenue)).collect();
    let labels = month_labels(monthly);
    let x_max = (series.len().saturating_sub(1)).max(1) as f64;
    let y_max = upper_bound(series.iter().map(|&(_, y)| y));

    let mut chart = ChartBuilder::on(&root)
        .caption("Monthly Sales Revenue", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Revenue")
        .x_labels(labels.len().clamp(2, 12))
        .x_label_formatter(&|v| label_at(&labels, *v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart.draw_series(LineSeries::new(series.iter().copied(), BLUE.stroke_width(2)))?;
    chart.draw_series(series.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))?;

    root.present()?;
    Ok(())
}

fn draw_top_products(path: &Path, top: &[ProductTotals]) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let y_max = upper_bound(top.iter().map(|t| t.revenue));

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Top {} Products by Revenue", top.len()), ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d((0..top.len().max(1)).into_segmented(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Product")
        .y_desc("Revenue")
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => top.get(*i).map(|t| t.product_name.clone()).unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    let bar_color = RGBColor(70, 130, 180);
    chart.draw_series(top.iter().enumerate().map(|(i, t)| {
        Rectangle::new(
            [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), t.revenue)],
            bar_color.filled(),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_sales_trend(
    path: &Path,
    monthly: &[MonthlyRevenue],
    moving_average: &[Option<f64>],
    forecast: Option<&Forecast>,
) -> DrawResult {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let observed: Vec<(f64, f64)> = monthly.iter().enumerate().map(|(i, m)| (i as f64, m.revenue)).collect();
    let average: Vec<(f64, f64)> = moving_average
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
        .collect();
    let projected: Vec<(f64, f64)> = forecast
        .map(|fc| {
            fc.points
                .iter()
                .enumerate()
                .map(|(k, p)| ((fc.observed + k) as f64, p.predicted_revenue))
                .collect()
        })
        .unwrap_or_default();

    let mut labels = month_labels(monthly);
    if let Some(fc) = forecast {
        labels.extend(fc.points.iter().map(|p| p.month.format("%Y-%m").to_string()));
    }

    let x_max = (labels.len().saturating_sub(1)).max(1) as f64;
    let y_max = upper_bound(
        observed
            .iter()
            .chain(average.iter())
            .chain(projected.iter())
            .map(|&(_, y)| y),
    );

    let mut chart = ChartBuilder::on(&root)
        .caption("Sales Trend", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(80)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Month")
        .y_desc("Revenue")
        .x_labels(labels.len().clamp(2, 12))
        .x_label_formatter(&|v| label_at(&labels, *v))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .draw()?;

    chart
        .draw_series(LineSeries::new(observed.iter().copied(), BLUE.stroke_width(2)))?
        .label("Revenue")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    if !average.is_empty() {
        let orange = RGBColor(255, 140, 0);
        chart
            .draw_series(LineSeries::new(average.iter().copied(), orange.stroke_width(2)))?
            .label("Moving average")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], orange));
    }

    if let (Some(&last), false) = (observed.last(), projected.is_empty()) {
        // Join the forecast onto the last observed month.
        let line: Vec<(f64, f64)> = std::iter::once(last).chain(projected.iter().copied()).collect();
        chart
            .draw_series(LineSeries::new(line, RED.stroke_width(2)))?
            .label(format!("Forecast ({} months)", projected.len()))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn month_labels(monthly: &[MonthlyRevenue]) -> Vec<String> {
    monthly.iter().map(|m| m.month.format("%Y-%m").to_string()).collect()
}

/// Label for an axis position; blank between whole months.
fn label_at(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Top of the y axis: 10% headroom over the largest finite value.
fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.filter(|v| v.is_finite()).fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}
