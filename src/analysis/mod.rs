//! Sales analysis core: cleaning, aggregation, trend.
//!
//! [`SalesAnalyzer`] owns the cleaned dataset for its whole lifetime. The
//! dataset is never mutated; every query recomputes from it.

use std::path::Path;

use crate::domain::{
    CleanedSale, CleaningReport, ExportRow, MonthlyRevenue, ProductSummary, ProductTotals, RecentSummary,
    SaleRecord,
};
use crate::error::{AnalysisError, AppError};
use crate::forecast::{Forecast, forecast_revenue};

pub mod aggregate;
pub mod cleaner;
pub mod trend;

pub use cleaner::{CleanedData, clean, iqr_bounds};

#[derive(Debug, Clone)]
pub struct SalesAnalyzer {
    sales: Vec<CleanedSale>,
    report: CleaningReport,
}

impl SalesAnalyzer {
    /// Clean `records` and hold the result.
    pub fn from_records(records: &[SaleRecord]) -> Result<Self, AnalysisError> {
        let CleanedData { sales, report } = clean(records)?;
        Ok(Self { sales, report })
    }

    /// Read a sales CSV and clean it.
    pub fn from_csv(path: &Path) -> Result<Self, AppError> {
        let records = crate::io::load_sales_csv(path)?;
        Ok(Self::from_records(&records)?)
    }

    pub fn sales(&self) -> &[CleanedSale] {
        &self.sales
    }

    pub fn cleaning_report(&self) -> &CleaningReport {
        &self.report
    }

    pub fn product_statistics(&self) -> Vec<ProductSummary> {
        aggregate::product_statistics(&self.sales)
    }

    pub fn top_products(&self, n: usize) -> Vec<ProductTotals> {
        aggregate::top_products(&self.sales, n)
    }

    pub fn monthly_sales(&self) -> Vec<MonthlyRevenue> {
        aggregate::monthly_sales(&self.sales)
    }

    pub fn filter_by_date_range(&self, days: i64) -> Vec<&CleanedSale> {
        aggregate::filter_by_date_range(&self.sales, days)
    }

    pub fn recent_summary(&self, days: i64) -> Option<RecentSummary> {
        aggregate::recent_summary(&self.sales, days)
    }

    pub fn export_rows(&self) -> Vec<ExportRow> {
        aggregate::export_rows(&self.sales)
    }

    /// Monthly moving average aligned with [`Self::monthly_sales`].
    pub fn moving_average(&self, window: usize) -> Vec<Option<f64>> {
        trend::moving_average(&self.monthly_sales(), window)
    }

    pub fn forecast(&self, months: usize) -> Result<Forecast, AnalysisError> {
        forecast_revenue(&self.monthly_sales(), months)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use super::*;

    fn rec(id: i64, name: &str, qty: i64, date: NaiveDate, price: Option<f64>) -> SaleRecord {
        SaleRecord {
            product_id: id,
            product_name: name.to_string(),
            quantity_sold: qty,
            sale_date: date,
            price,
        }
    }

    #[test]
    fn analyzer_answers_from_cleaned_rows() {
        let end = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let records = vec![
            rec(1, "Mouse", 2, end - Duration::days(30), Some(10.0)),
            rec(2, "Mouse", 3, end, Some(12.0)),
            rec(3, "Laptop", -1, end, Some(900.0)),
            rec(4, "Camera", 2, end - Duration::days(45), None),
        ];
        let analyzer = SalesAnalyzer::from_records(&records).unwrap();

        assert_eq!(analyzer.sales().len(), 3);
        assert_eq!(analyzer.cleaning_report().dropped_invalid, 1);

        let window: Vec<i64> = analyzer.filter_by_date_range(30).iter().map(|s| s.product_id()).collect();
        assert_eq!(window, [1, 2]);

        let monthly = analyzer.monthly_sales();
        assert_eq!(monthly.len(), 2);
        let total: f64 = monthly.iter().map(|m| m.revenue).sum();
        let rows: f64 = analyzer.sales().iter().map(|s| s.revenue()).sum();
        assert!((total - rows).abs() < 1e-9);

        assert!(analyzer.forecast(2).is_ok());
        assert_eq!(analyzer.moving_average(3), vec![None, None]);
    }

    #[test]
    fn single_month_history_cannot_forecast() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let records = vec![rec(1, "Mouse", 2, day, Some(10.0)), rec(2, "Tablet", 1, day, Some(20.0))];
        let analyzer = SalesAnalyzer::from_records(&records).unwrap();
        assert_eq!(
            analyzer.forecast(3).unwrap_err(),
            AnalysisError::InsufficientData { observed: 1 }
        );
    }

    #[test]
    fn queries_do_not_change_the_dataset() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let records = vec![
            rec(1, "Mouse", 2, day, Some(10.0)),
            rec(2, "Tablet", 1, day + Duration::days(40), Some(20.0)),
        ];
        let analyzer = SalesAnalyzer::from_records(&records).unwrap();
        let before = analyzer.sales().to_vec();
        let _ = analyzer.top_products(1);
        let _ = analyzer.filter_by_date_range(5);
        let _ = analyzer.product_statistics();
        assert_eq!(analyzer.sales(), before.as_slice());
        assert_eq!(analyzer.top_products(1), analyzer.top_products(1));
    }
}
