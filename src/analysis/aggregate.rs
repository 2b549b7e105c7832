//! Aggregations over the cleaned dataset.
//!
//! Every function here is a pure read: it takes the cleaned sales and
//! recomputes its result from scratch.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate};

use crate::domain::{CleanedSale, ExportRow, MonthlyRevenue, ProductSummary, ProductTotals, RecentSummary, month_end};
use crate::math::{mean, sample_std};

/// Descriptive statistics per product, ordered by product name.
pub fn product_statistics(sales: &[CleanedSale]) -> Vec<ProductSummary> {
    let mut groups: BTreeMap<&str, Vec<&CleanedSale>> = BTreeMap::new();
    for s in sales {
        groups.entry(s.product_name()).or_default().push(s);
    }

    groups
        .into_iter()
        .map(|(name, rows)| {
            let quantity: Vec<f64> = rows.iter().map(|s| s.quantity_sold() as f64).collect();
            let revenue: Vec<f64> = rows.iter().map(|s| s.revenue()).collect();
            let price: Vec<f64> = rows.iter().map(|s| s.price()).collect();

            ProductSummary {
                product_name: name.to_string(),
                sales: rows.len(),
                quantity_total: total_quantity(rows.iter().copied()),
                quantity_mean: mean(&quantity),
                quantity_std: sample_std(&quantity),
                revenue_total: revenue.iter().sum(),
                revenue_mean: mean(&revenue),
                revenue_std: sample_std(&revenue),
                price_mean: mean(&price),
                price_min: price.iter().copied().fold(f64::INFINITY, f64::min),
                price_max: price.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect()
}

/// Per-product totals in the order each product first appears.
fn product_totals(sales: &[CleanedSale]) -> Vec<ProductTotals> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<ProductTotals> = Vec::new();

    for s in sales {
        let idx = *index.entry(s.product_name()).or_insert_with(|| {
            totals.push(ProductTotals {
                product_name: s.product_name().to_string(),
                quantity_sold: 0,
                revenue: 0.0,
            });
            totals.len() - 1
        });
        totals[idx].quantity_sold = totals[idx].quantity_sold.saturating_add(s.quantity_sold());
        totals[idx].revenue += s.revenue();
    }

    totals
}

/// The `n` products with the highest total revenue.
///
/// Ties keep first-appearance order (the sort is stable). `n` larger than the
/// number of products returns every product.
pub fn top_products(sales: &[CleanedSale], n: usize) -> Vec<ProductTotals> {
    let mut totals = product_totals(sales);
    totals.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    totals.truncate(n);
    totals
}

/// Revenue per calendar month, ascending. Months without sales are absent.
pub fn monthly_sales(sales: &[CleanedSale]) -> Vec<MonthlyRevenue> {
    let mut months: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for s in sales {
        *months.entry(month_end(s.sale_date())).or_insert(0.0) += s.revenue();
    }
    months
        .into_iter()
        .map(|(month, revenue)| MonthlyRevenue { month, revenue })
        .collect()
}

/// Latest sale date in the dataset.
pub fn max_sale_date(sales: &[CleanedSale]) -> Option<NaiveDate> {
    sales.iter().map(CleanedSale::sale_date).max()
}

/// Sales dated in `[max_date - days, max_date]`, both ends inclusive.
///
/// A negative `days` gives an empty window. A window reaching past the
/// earliest representable date covers everything up to `max_date`.
pub fn filter_by_date_range(sales: &[CleanedSale], days: i64) -> Vec<&CleanedSale> {
    let Some(end) = max_sale_date(sales) else {
        return Vec::new();
    };
    let start = window_start(end, days);
    sales
        .iter()
        .filter(|s| s.sale_date() >= start && s.sale_date() <= end)
        .collect()
}

/// Totals over [`filter_by_date_range`].
pub fn recent_summary(sales: &[CleanedSale], days: i64) -> Option<RecentSummary> {
    let end = max_sale_date(sales)?;
    let window = filter_by_date_range(sales, days);
    Some(RecentSummary {
        days,
        start: window_start(end, days),
        end,
        sales: window.len(),
        revenue: window.iter().map(|s| s.revenue()).sum(),
        quantity: total_quantity(window.iter().copied()),
    })
}

/// `end - days`, clamped to the representable date range.
fn window_start(end: NaiveDate, days: i64) -> NaiveDate {
    let unrepresentable = if days < 0 { NaiveDate::MAX } else { NaiveDate::MIN };
    Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(unrepresentable)
}

/// Unit total that saturates at `i64::MAX` instead of overflowing.
fn total_quantity<'a>(sales: impl Iterator<Item = &'a CleanedSale>) -> i64 {
    sales.fold(0i64, |acc, s| acc.saturating_add(s.quantity_sold()))
}

/// Rows of the per-product CSV export (totals plus mean price, 2 decimals).
pub fn export_rows(sales: &[CleanedSale]) -> Vec<ExportRow> {
    product_statistics(sales)
        .into_iter()
        .map(|s| ExportRow {
            product_name: s.product_name,
            quantity_sold: s.quantity_total,
            revenue: round2(s.revenue_total),
            price: round2(s.price_mean),
        })
        .collect()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sale(id: i64, name: &str, qty: i64, date: NaiveDate, price: f64) -> CleanedSale {
        CleanedSale::new(id, name.to_string(), qty, date, price)
    }

    fn fixture() -> Vec<CleanedSale> {
        vec![
            sale(1, "Mouse", 2, d(2024, 1, 5), 10.0),
            sale(2, "Laptop", 1, d(2024, 1, 20), 900.0),
            sale(3, "Mouse", 4, d(2024, 3, 2), 12.0),
            sale(4, "Tablet", 3, d(2024, 3, 31), 250.0),
            sale(5, "Camera", 1, d(2024, 4, 1), 900.0),
        ]
    }

    #[test]
    fn product_statistics_groups_by_name() {
        let stats = product_statistics(&fixture());
        let names: Vec<&str> = stats.iter().map(|s| s.product_name.as_str()).collect();
        assert_eq!(names, ["Camera", "Laptop", "Mouse", "Tablet"]);

        let mouse = &stats[2];
        assert_eq!(mouse.sales, 2);
        assert_eq!(mouse.quantity_total, 6);
        assert_eq!(mouse.quantity_mean, 3.0);
        assert!((mouse.quantity_std - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(mouse.revenue_total, 68.0);
        assert_eq!(mouse.price_min, 10.0);
        assert_eq!(mouse.price_max, 12.0);
        assert_eq!(mouse.price_mean, 11.0);
    }

    #[test]
    fn single_sale_product_has_nan_std() {
        let stats = product_statistics(&fixture());
        let laptop = stats.iter().find(|s| s.product_name == "Laptop").unwrap();
        assert!(laptop.quantity_std.is_nan());
        assert!(laptop.revenue_std.is_nan());
    }

    #[test]
    fn top_products_sorted_with_stable_ties() {
        let top = top_products(&fixture(), 10);
        let names: Vec<&str> = top.iter().map(|t| t.product_name.as_str()).collect();
        // Laptop and Camera tie at 900; Laptop appeared first.
        assert_eq!(names, ["Laptop", "Camera", "Tablet", "Mouse"]);
        assert!(top.windows(2).all(|w| w[0].revenue >= w[1].revenue));

        assert_eq!(top_products(&fixture(), 2).len(), 2);
        assert_eq!(top_products(&fixture(), 4), top_products(&fixture(), usize::MAX));
        assert!(top_products(&fixture(), 0).is_empty());
    }

    #[test]
    fn monthly_sales_skips_empty_months() {
        let months = monthly_sales(&fixture());
        assert_eq!(
            months,
            vec![
                MonthlyRevenue { month: d(2024, 1, 31), revenue: 920.0 },
                MonthlyRevenue { month: d(2024, 3, 31), revenue: 798.0 },
                MonthlyRevenue { month: d(2024, 4, 30), revenue: 900.0 },
            ]
        );
    }

    #[test]
    fn monthly_total_matches_row_total() {
        let sales = fixture();
        let monthly: f64 = monthly_sales(&sales).iter().map(|m| m.revenue).sum();
        let rows: f64 = sales.iter().map(|s| s.revenue()).sum();
        assert!((monthly - rows).abs() < 1e-9);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let end = d(2024, 5, 31);
        let sales = vec![
            sale(1, "A", 1, end - Duration::days(31), 1.0),
            sale(2, "A", 1, end - Duration::days(30), 1.0),
            sale(3, "A", 1, end - Duration::days(10), 1.0),
            sale(4, "A", 1, end, 1.0),
        ];
        let ids: Vec<i64> = filter_by_date_range(&sales, 30).iter().map(|s| s.product_id()).collect();
        assert_eq!(ids, [2, 3, 4]);
        assert!(filter_by_date_range(&sales, -1).is_empty());
        assert_eq!(filter_by_date_range(&sales, 0).len(), 1);
    }

    #[test]
    fn recent_summary_totals_window() {
        let summary = recent_summary(&fixture(), 30).unwrap();
        assert_eq!(summary.end, d(2024, 4, 1));
        assert_eq!(summary.start, d(2024, 3, 2));
        assert_eq!(summary.sales, 3);
        assert_eq!(summary.quantity, 8);
        assert_eq!(summary.revenue, 48.0 + 750.0 + 900.0);
        assert!(recent_summary(&[], 30).is_none());
    }

    #[test]
    fn huge_day_counts_cover_the_whole_history() {
        let sales = fixture();
        assert_eq!(filter_by_date_range(&sales, 100_000_000).len(), sales.len());
        assert_eq!(filter_by_date_range(&sales, i64::MAX).len(), sales.len());
        assert!(filter_by_date_range(&sales, i64::MIN).is_empty());

        let summary = recent_summary(&sales, i64::MAX).unwrap();
        assert_eq!(summary.start, NaiveDate::MIN);
        assert_eq!(summary.sales, sales.len());
        assert_eq!(summary.quantity, 11);
    }

    #[test]
    fn extreme_quantities_saturate_instead_of_overflowing() {
        let qty = 5_000_000_000_000_000_000;
        let sales: Vec<CleanedSale> = (1..=4).map(|i| sale(i, "Laptop", qty, d(2024, 1, i as u32), 2.0)).collect();

        let stats = product_statistics(&sales);
        assert_eq!(stats[0].quantity_total, i64::MAX);
        assert_eq!(stats[0].quantity_mean, qty as f64);

        let top = top_products(&sales, 1);
        assert_eq!(top[0].quantity_sold, i64::MAX);
        assert_eq!(top[0].revenue, 4.0 * qty as f64 * 2.0);

        assert_eq!(recent_summary(&sales, 30).unwrap().quantity, i64::MAX);
        assert_eq!(export_rows(&sales)[0].quantity_sold, i64::MAX);
    }

    #[test]
    fn export_rows_round_to_cents() {
        let sales = vec![
            sale(1, "Speaker", 3, d(2024, 1, 1), 10.005),
            sale(2, "Speaker", 1, d(2024, 1, 2), 20.0),
        ];
        let rows = export_rows(&sales);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].quantity_sold, 4);
        assert_eq!(rows[0].price, 15.0);
    }
}
