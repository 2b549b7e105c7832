//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the analyzer
//! - exported to CSV/JSON
//! - handed to renderers (charts, reports, the dashboard) as plain data

use std::path::PathBuf;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One raw row of the sales CSV.
///
/// `price` is optional: missing prices are imputed during cleaning.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleRecord {
    pub product_id: i64,
    pub product_name: String,
    pub quantity_sold: i64,
    pub sale_date: NaiveDate,
    pub price: Option<f64>,
}

/// A sale that survived cleaning, with its derived revenue.
///
/// Fields are private so a `CleanedSale` cannot be mutated after the cleaner
/// builds it; `revenue` always equals `quantity_sold * price`.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedSale {
    product_id: i64,
    product_name: String,
    quantity_sold: i64,
    sale_date: NaiveDate,
    price: f64,
    revenue: f64,
}

impl CleanedSale {
    pub(crate) fn new(
        product_id: i64,
        product_name: String,
        quantity_sold: i64,
        sale_date: NaiveDate,
        price: f64,
    ) -> Self {
        Self {
            product_id,
            product_name,
            quantity_sold,
            sale_date,
            price,
            revenue: quantity_sold as f64 * price,
        }
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity_sold(&self) -> i64 {
        self.quantity_sold
    }

    pub fn sale_date(&self) -> NaiveDate {
        self.sale_date
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    /// Convert back into a raw record (price present), e.g. to re-run cleaning.
    pub fn to_record(&self) -> SaleRecord {
        SaleRecord {
            product_id: self.product_id,
            product_name: self.product_name.clone(),
            quantity_sold: self.quantity_sold,
            sale_date: self.sale_date,
            price: Some(self.price),
        }
    }
}

/// Per-product descriptive statistics.
///
/// Standard deviations use the sample (n - 1) denominator, so a product with a
/// single sale has `NaN` std.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub sales: usize,
    pub quantity_total: i64,
    pub quantity_mean: f64,
    pub quantity_std: f64,
    pub revenue_total: f64,
    pub revenue_mean: f64,
    pub revenue_std: f64,
    pub price_mean: f64,
    pub price_min: f64,
    pub price_max: f64,
}

/// Summed quantity and revenue for one product (a row of the top-N ranking).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotals {
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: f64,
}

/// Total revenue of one calendar month, labelled by the month's last day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    pub month: NaiveDate,
    pub revenue: f64,
}

/// Predicted revenue for a month after the last observed one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub month: NaiveDate,
    pub predicted_revenue: f64,
}

/// Row of the per-product CSV export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: f64,
    pub price: f64,
}

/// Totals over the trailing date window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentSummary {
    pub days: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub sales: usize,
    pub revenue: f64,
    pub quantity: i64,
}

/// Inclusive `[lower, upper]` range computed by the IQR rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// What the cleaner did to the raw table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleaningReport {
    pub rows_read: usize,
    pub prices_imputed: usize,
    /// Median used for imputation (`None` when no price was present at all).
    pub imputed_price: Option<f64>,
    pub dropped_invalid: usize,
    pub dropped_outliers: usize,
    pub rows_kept: usize,
    pub price_bounds: Bounds,
    pub quantity_bounds: Bounds,
}

/// Run configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus `.env` / defaults).
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub csv_path: PathBuf,
    pub top_n: usize,
    pub recent_days: i64,
    pub forecast_months: usize,
    pub moving_average_window: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_summary: Option<PathBuf>,
    pub chart_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(DEFAULT_DATA_FILE),
            top_n: 5,
            recent_days: 30,
            forecast_months: 3,
            moving_average_window: 3,
            plot: false,
            plot_width: 72,
            plot_height: 18,
            export_summary: None,
            chart_dir: None,
        }
    }
}

/// Default input file written by `sales generate` and read by every other command.
pub const DEFAULT_DATA_FILE: &str = "sales_data.csv";

/// Last calendar day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

/// Month-end of the `n`-th month after the month containing `date`.
pub fn month_end_after(date: NaiveDate, n: u32) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    first.checked_add_months(Months::new(n)).map(month_end)
}
