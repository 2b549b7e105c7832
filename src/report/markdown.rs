//! Markdown report writer.
//!
//! The report is a single self-contained `.md` file: tables for the top
//! products, monthly revenue and forecast, plus links to the SVG charts when
//! they were rendered next to it.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::info;

use crate::analysis::SalesAnalyzer;
use crate::error::AppError;
use crate::forecast::Forecast;
use crate::report::format::{fmt_money, fmt_thousands};

/// Everything the report needs, computed up front.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub analyzer: &'a SalesAnalyzer,
    pub top_n: usize,
    pub recent_days: i64,
    /// `None` when the history was too short to forecast.
    pub forecast: Option<&'a Forecast>,
    /// Chart files to link, relative to the report's directory where possible.
    pub charts: &'a [PathBuf],
}

/// Render the report as Markdown text.
pub fn render_markdown(input: &ReportInput<'_>, report_dir: Option<&Path>) -> String {
    let analyzer = input.analyzer;
    let mut out = String::new();

    out.push_str("# Sales Analysis Report\n\n");
    out.push_str(&format!("_Generated {}_\n\n", Local::now().format("%Y-%m-%d %H:%M")));

    let cleaning = analyzer.cleaning_report();
    out.push_str(&format!(
        "Rows analysed: {} of {} ({} invalid, {} outliers removed).\n\n",
        cleaning.rows_kept, cleaning.rows_read, cleaning.dropped_invalid, cleaning.dropped_outliers
    ));

    out.push_str("## Top Products by Revenue\n\n");
    out.push_str("| Product | Revenue | Quantity |\n");
    out.push_str("| - | -: | -: |\n");
    for t in analyzer.top_products(input.top_n) {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            t.product_name,
            fmt_money(t.revenue),
            fmt_thousands(t.quantity_sold)
        ));
    }
    out.push('\n');

    if let Some(recent) = analyzer.recent_summary(input.recent_days) {
        out.push_str(&format!("## Last {} Days\n\n", recent.days));
        out.push_str(&format!(
            "- Window: {} .. {}\n- Total revenue: {}\n- Units sold: {}\n\n",
            recent.start,
            recent.end,
            fmt_money(recent.revenue),
            fmt_thousands(recent.quantity)
        ));
    }

    out.push_str("## Monthly Revenue\n\n");
    out.push_str("| Month | Revenue |\n");
    out.push_str("| - | -: |\n");
    for m in analyzer.monthly_sales() {
        out.push_str(&format!("| {} | {} |\n", m.month.format("%Y-%m"), fmt_money(m.revenue)));
    }
    out.push('\n');

    out.push_str("## Forecast\n\n");
    match input.forecast {
        Some(fc) => {
            out.push_str(&format!(
                "Linear trend over {} months: {} per month (intercept {}).\n\n",
                fc.observed,
                fmt_money(fc.slope),
                fmt_money(fc.intercept)
            ));
            out.push_str("| Month | Forecasted Revenue |\n");
            out.push_str("| - | -: |\n");
            for p in &fc.points {
                out.push_str(&format!(
                    "| {} | {} |\n",
                    p.month.format("%B %Y"),
                    fmt_money(p.predicted_revenue)
                ));
            }
        }
        None => out.push_str("Not enough monthly history for a forecast.\n"),
    }
    out.push('\n');

    if !input.charts.is_empty() {
        out.push_str("## Sales Visualizations\n\n");
        for chart in input.charts {
            let link = report_dir
                .and_then(|dir| chart.strip_prefix(dir).ok())
                .unwrap_or(chart.as_path());
            let title = chart
                .file_stem()
                .map(|s| s.to_string_lossy().replace('_', " "))
                .unwrap_or_default();
            out.push_str(&format!("![{title}]({})\n\n", link.display()));
        }
    }

    out
}

/// Render and write the report to `path`.
pub fn write_markdown_report(path: &Path, input: &ReportInput<'_>) -> Result<(), AppError> {
    let text = render_markdown(input, path.parent());
    let mut file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create report '{}': {e}", path.display())))?;
    file.write_all(text.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write report: {e}")))?;

    info!(path = %path.display(), "wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::SaleRecord;

    fn analyzer() -> SalesAnalyzer {
        let rows: Vec<SaleRecord> = (0..6)
            .map(|i| SaleRecord {
                product_id: i + 1,
                product_name: if i % 2 == 0 { "Laptop" } else { "Mouse" }.to_string(),
                quantity_sold: 2,
                sale_date: NaiveDate::from_ymd_opt(2024, 1 + i as u32, 15).unwrap(),
                price: Some(100.0),
            })
            .collect();
        SalesAnalyzer::from_records(&rows).unwrap()
    }

    #[test]
    fn report_contains_all_sections() {
        let analyzer = analyzer();
        let forecast = analyzer.forecast(2).unwrap();
        let charts = vec![PathBuf::from("out/monthly_sales.svg")];
        let input = ReportInput {
            analyzer: &analyzer,
            top_n: 5,
            recent_days: 30,
            forecast: Some(&forecast),
            charts: &charts,
        };
        let text = render_markdown(&input, Some(Path::new("out")));

        assert!(text.starts_with("# Sales Analysis Report"));
        assert!(text.contains("| Laptop | $600.00 | 6 |"));
        assert!(text.contains("| 2024-06 | $200.00 |"));
        assert!(text.contains("July 2024"));
        assert!(text.contains("August 2024"));
        assert!(text.contains("![monthly sales](monthly_sales.svg)"));
    }

    #[test]
    fn report_without_forecast_says_so() {
        let analyzer = analyzer();
        let input = ReportInput {
            analyzer: &analyzer,
            top_n: 1,
            recent_days: 30,
            forecast: None,
            charts: &[],
        };
        let text = render_markdown(&input, None);
        assert!(text.contains("Not enough monthly history"));
        assert!(!text.contains("Sales Visualizations"));
    }

    #[test]
    fn report_is_written_to_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales_report.md");
        let analyzer = analyzer();
        let input = ReportInput {
            analyzer: &analyzer,
            top_n: 5,
            recent_days: 30,
            forecast: None,
            charts: &[],
        };
        write_markdown_report(&path, &input).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("## Monthly Revenue"));
    }
}
