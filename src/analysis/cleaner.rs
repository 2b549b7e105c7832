//! Data cleaning: price imputation, validity filter, IQR outlier filter.
//!
//! The steps run in a fixed order and each one sees the output of the one
//! before it:
//!
//! 1. missing prices take the median of every present price (pre-filter)
//! 2. rows with `quantity_sold <= 0` or `price <= 0` are dropped
//! 3. IQR bounds are computed for price and quantity over the survivors, and a
//!    row is kept only if it lies inside *both* bounds
//! 4. revenue is derived for each remaining row
//!
//! A zero-variance column gives `IQR = 0`, so its bound is just `[Q1, Q3]`.

use tracing::{debug, info};

use crate::domain::{Bounds, CleanedSale, CleaningReport, SaleRecord};
use crate::error::AnalysisError;
use crate::math::{median, quantile};

/// Tukey fence multiplier.
const IQR_FENCE: f64 = 1.5;

/// Output of [`clean`]: the surviving sales and what happened to the rest.
#[derive(Debug, Clone)]
pub struct CleanedData {
    pub sales: Vec<CleanedSale>,
    pub report: CleaningReport,
}

/// Clean a raw table. Survivors keep their input order.
pub fn clean(records: &[SaleRecord]) -> Result<CleanedData, AnalysisError> {
    let rows_read = records.len();

    // 1) Impute from the median of the full, unfiltered price column.
    let present: Vec<f64> = records.iter().filter_map(|r| r.price).collect();
    let imputed_price = median(&present);

    let mut prices_imputed = 0usize;
    let mut valid: Vec<(&SaleRecord, f64)> = Vec::with_capacity(records.len());
    for r in records {
        let price = match (r.price, imputed_price) {
            (Some(p), _) => Some(p),
            (None, Some(m)) => {
                prices_imputed += 1;
                Some(m)
            }
            (None, None) => None,
        };

        // 2) Validity.
        match price {
            Some(p) if r.quantity_sold > 0 && p > 0.0 => valid.push((r, p)),
            _ => {}
        }
    }

    let dropped_invalid = rows_read - valid.len();
    if valid.is_empty() {
        return Err(AnalysisError::EmptyDataset {
            stage: "validity filtering",
        });
    }

    // 3) Outlier bounds, each over its own column of the valid rows.
    let price_col: Vec<f64> = valid.iter().map(|(_, p)| *p).collect();
    let quantity_col: Vec<f64> = valid.iter().map(|(r, _)| r.quantity_sold as f64).collect();
    let price_bounds = iqr_bounds(&price_col).ok_or(AnalysisError::EmptyDataset {
        stage: "validity filtering",
    })?;
    let quantity_bounds = iqr_bounds(&quantity_col).ok_or(AnalysisError::EmptyDataset {
        stage: "validity filtering",
    })?;
    debug!(?price_bounds, ?quantity_bounds, "outlier bounds");

    // 4) AND of the two masks, then derive revenue.
    let sales: Vec<CleanedSale> = valid
        .iter()
        .filter(|(r, p)| price_bounds.contains(*p) && quantity_bounds.contains(r.quantity_sold as f64))
        .map(|(r, p)| CleanedSale::new(r.product_id, r.product_name.clone(), r.quantity_sold, r.sale_date, *p))
        .collect();

    let dropped_outliers = valid.len() - sales.len();
    if sales.is_empty() {
        return Err(AnalysisError::EmptyDataset {
            stage: "outlier filtering",
        });
    }

    let report = CleaningReport {
        rows_read,
        prices_imputed,
        imputed_price,
        dropped_invalid,
        dropped_outliers,
        rows_kept: sales.len(),
        price_bounds,
        quantity_bounds,
    };
    info!(
        rows_read,
        prices_imputed,
        dropped_invalid,
        dropped_outliers,
        rows_kept = report.rows_kept,
        "cleaned sales data"
    );

    Ok(CleanedData { sales, report })
}

/// `[Q1 - 1.5 IQR, Q3 + 1.5 IQR]` of a column.
pub fn iqr_bounds(values: &[f64]) -> Option<Bounds> {
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Some(Bounds {
        lower: q1 - IQR_FENCE * iqr,
        upper: q3 + IQR_FENCE * iqr,
    })
}
