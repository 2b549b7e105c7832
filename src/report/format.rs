//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analysis code stays clean and testable
//! - output changes are localized

use crate::domain::{CleaningReport, ForecastPoint, MonthlyRevenue, ProductSummary, ProductTotals, RecentSummary};

/// Cleaning summary block.
pub fn format_cleaning_summary(report: &CleaningReport) -> String {
    let mut out = String::new();
    out.push_str("=== Sales Analysis ===\n");
    out.push_str(&format!(
        "Rows: read={} kept={} | dropped invalid={} outliers={}\n",
        report.rows_read, report.rows_kept, report.dropped_invalid, report.dropped_outliers
    ));
    match report.imputed_price {
        Some(p) => out.push_str(&format!(
            "Imputed {} missing price(s) with median {}\n",
            report.prices_imputed,
            fmt_money(p)
        )),
        None => out.push_str("No prices present to impute from\n"),
    }
    out.push_str(&format!(
        "Bounds: price=[{:.2}, {:.2}] quantity=[{:.2}, {:.2}]\n",
        report.price_bounds.lower,
        report.price_bounds.upper,
        report.quantity_bounds.lower,
        report.quantity_bounds.upper
    ));
    out
}

/// Per-product statistics table.
pub fn format_product_statistics(stats: &[ProductSummary]) -> String {
    let mut out = String::new();
    out.push_str("Product Statistics:\n");
    push_row(
        &mut out,
        format!(
            "{:<14} {:>5} {:>8} {:>8} {:>8} {:>14} {:>11} {:>11} {:>9} {:>9} {:>9}",
            "product", "n", "qty_sum", "qty_mean", "qty_std", "rev_sum", "rev_mean", "rev_std", "p_mean", "p_min",
            "p_max"
        ),
    );
    push_row(
        &mut out,
        format!(
            "{:-<14} {:-<5} {:-<8} {:-<8} {:-<8} {:-<14} {:-<11} {:-<11} {:-<9} {:-<9} {:-<9}",
            "", "", "", "", "", "", "", "", "", "", ""
        ),
    );

    for s in stats {
        push_row(
            &mut out,
            format!(
                "{:<14} {:>5} {:>8} {:>8} {:>8} {:>14} {:>11} {:>11} {:>9} {:>9} {:>9}",
                truncate(&s.product_name, 14),
                s.sales,
                s.quantity_total,
                fmt_num(s.quantity_mean),
                fmt_num(s.quantity_std),
                fmt_num(s.revenue_total),
                fmt_num(s.revenue_mean),
                fmt_num(s.revenue_std),
                fmt_num(s.price_mean),
                fmt_num(s.price_min),
                fmt_num(s.price_max),
            ),
        );
    }
    out
}

/// Top-N products table.
pub fn format_top_products(top: &[ProductTotals]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Top {} Products by Revenue:\n", top.len()));
    push_row(&mut out, format!("{:<4} {:<16} {:>16} {:>10}", "#", "product", "revenue", "quantity"));
    push_row(&mut out, format!("{:-<4} {:-<16} {:-<16} {:-<10}", "", "", "", ""));
    for (idx, t) in top.iter().enumerate() {
        push_row(
            &mut out,
            format!(
                "{:<4} {:<16} {:>16} {:>10}",
                idx + 1,
                truncate(&t.product_name, 16),
                fmt_money(t.revenue),
                t.quantity_sold
            ),
        );
    }
    out
}

/// "Last N days" summary.
pub fn format_recent_summary(summary: &RecentSummary) -> String {
    format!(
        "Last {} Days Analysis ({} .. {}):\nTotal Revenue: {}\nTotal Sales: {}\n",
        summary.days,
        summary.start,
        summary.end,
        fmt_money(summary.revenue),
        fmt_thousands(summary.quantity)
    )
}

/// Observed monthly revenue, with the moving average alongside when given.
pub fn format_monthly(monthly: &[MonthlyRevenue], moving_average: &[Option<f64>]) -> String {
    let mut out = String::new();
    out.push_str("Monthly Revenue:\n");
    push_row(&mut out, format!("{:<10} {:>16} {:>16}", "month", "revenue", "moving_avg"));
    push_row(&mut out, format!("{:-<10} {:-<16} {:-<16}", "", "", ""));
    for (idx, m) in monthly.iter().enumerate() {
        let ma = moving_average
            .get(idx)
            .copied()
            .flatten()
            .map(fmt_money)
            .unwrap_or_else(|| "-".to_string());
        push_row(
            &mut out,
            format!("{:<10} {:>16} {:>16}", m.month.format("%Y-%m"), fmt_money(m.revenue), ma),
        );
    }
    out
}

/// Forecast table, months spelled out ("April 2024").
pub fn format_forecast(points: &[ForecastPoint]) -> String {
    let mut out = String::new();
    out.push_str("Forecasted Revenue:\n");
    push_row(&mut out, format!("{:<16} {:>16}", "month", "revenue"));
    push_row(&mut out, format!("{:-<16} {:-<16}", "", ""));
    for p in points {
        push_row(
            &mut out,
            format!("{:<16} {:>16}", p.month.format("%B %Y"), fmt_money(p.predicted_revenue)),
        );
    }
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

/// `$1,234.56` (negative values keep their sign in front).
pub fn fmt_money(v: f64) -> String {
    if !v.is_finite() {
        return "-".to_string();
    }
    let cents = (v.abs() * 100.0).round() as i64;
    let sign = if v < 0.0 && cents != 0 { "-" } else { "" };
    format!("{sign}${}.{:02}", fmt_thousands(cents / 100), cents % 100)
}

/// Integer with `,` thousands separators.
pub fn fmt_thousands(v: i64) -> String {
    let digits = v.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if v < 0 {
        out.insert(0, '-');
    }
    out
}

/// Two decimals; `NaN` (e.g. std of a single sale) prints as `NaN`.
pub fn fmt_num(v: f64) -> String {
    if v.is_nan() { "NaN".to_string() } else { format!("{v:.2}") }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Bounds;

    #[test]
    fn money_formatting() {
        assert_eq!(fmt_money(1234567.891), "$1,234,567.89");
        assert_eq!(fmt_money(0.5), "$0.50");
        assert_eq!(fmt_money(-42.0), "-$42.00");
        assert_eq!(fmt_money(f64::NAN), "-");
        assert_eq!(fmt_thousands(1000), "1,000");
        assert_eq!(fmt_thousands(999), "999");
        assert_eq!(fmt_thousands(-12345), "-12,345");
    }

    #[test]
    fn top_products_table_ranks_rows() {
        let top = vec![
            ProductTotals { product_name: "Laptop".to_string(), quantity_sold: 30, revenue: 15000.0 },
            ProductTotals { product_name: "Mouse".to_string(), quantity_sold: 120, revenue: 2400.5 },
        ];
        let text = format_top_products(&top);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Top 2 Products by Revenue:");
        assert!(lines[3].starts_with("1    Laptop"));
        assert!(lines[3].contains("$15,000.00"));
        assert!(lines[4].contains("$2,400.50"));
        assert!(lines.iter().all(|l| l.len() == l.trim_end().len()));
    }

    #[test]
    fn statistics_table_shows_nan_std() {
        let stats = vec![ProductSummary {
            product_name: "Camera".to_string(),
            sales: 1,
            quantity_total: 2,
            quantity_mean: 2.0,
            quantity_std: f64::NAN,
            revenue_total: 600.0,
            revenue_mean: 600.0,
            revenue_std: f64::NAN,
            price_mean: 300.0,
            price_min: 300.0,
            price_max: 300.0,
        }];
        let text = format_product_statistics(&stats);
        assert!(text.contains("NaN"));
        assert!(text.contains("600.00"));
    }

    #[test]
    fn forecast_table_uses_month_names() {
        let points = vec![ForecastPoint {
            month: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            predicted_revenue: 400.0,
        }];
        let text = format_forecast(&points);
        assert!(text.contains("April 2024"));
        assert!(text.contains("$400.00"));
    }

    #[test]
    fn monthly_table_marks_missing_average() {
        let monthly = vec![
            MonthlyRevenue { month: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), revenue: 10.0 },
            MonthlyRevenue { month: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), revenue: 20.0 },
        ];
        let text = format_monthly(&monthly, &[None, Some(15.0)]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[3].starts_with("2024-01") && lines[3].ends_with('-'));
        assert!(lines[4].ends_with("$15.00"));
    }

    #[test]
    fn cleaning_summary_mentions_counts() {
        let report = CleaningReport {
            rows_read: 10,
            prices_imputed: 2,
            imputed_price: Some(99.5),
            dropped_invalid: 1,
            dropped_outliers: 3,
            rows_kept: 6,
            price_bounds: Bounds { lower: 1.0, upper: 2.0 },
            quantity_bounds: Bounds { lower: 3.0, upper: 4.0 },
        };
        let text = format_cleaning_summary(&report);
        assert!(text.contains("read=10 kept=6"));
        assert!(text.contains("median $99.50"));
        assert!(text.contains("quantity=[3.00, 4.00]"));
    }
}
