//! Linear-trend revenue forecast.
//!
//! Revenue is regressed on the month index `0..L` (ordinary least squares) and
//! the fitted line is extended over the next `months` calendar months. The
//! index counts *observed* months, so a gap in the history is not stretched
//! out; the labels of the forecast still continue month by month from the
//! last observed month.

use serde::Serialize;
use tracing::debug;

use crate::domain::{ForecastPoint, MonthlyRevenue, month_end_after};
use crate::error::AnalysisError;
use crate::math::{LineFit, fit_line};

/// Fitted trend and its projection.
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub intercept: f64,
    pub slope: f64,
    /// Number of observed months the line was fitted on.
    pub observed: usize,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Fitted value at observed position `idx` (for drawing the trend line).
    pub fn fitted(&self, idx: usize) -> f64 {
        self.intercept + self.slope * idx as f64
    }
}

/// Fit the monthly series and project `months` months ahead.
///
/// Fewer than two observed months is an [`AnalysisError::InsufficientData`];
/// a NaN or infinite monthly total is an [`AnalysisError::NonFiniteHistory`].
/// A zero horizon returns the fit with no points.
pub fn forecast_revenue(monthly: &[MonthlyRevenue], months: usize) -> Result<Forecast, AnalysisError> {
    let observed = monthly.len();
    let insufficient = AnalysisError::InsufficientData { observed };
    let Some(last) = monthly.last() else {
        return Err(insufficient);
    };
    if observed < 2 {
        return Err(insufficient);
    }

    let revenue: Vec<f64> = monthly.iter().map(|m| m.revenue).collect();
    let fit: LineFit = fit_line(&revenue)
        .filter(|fit| fit.intercept.is_finite() && fit.slope.is_finite())
        .ok_or(AnalysisError::NonFiniteHistory { observed })?;
    debug!(intercept = fit.intercept, slope = fit.slope, observed, "fitted revenue trend");

    let points = (0..months)
        .map_while(|k| {
            let month = month_end_after(last.month, k as u32 + 1)?;
            Some(ForecastPoint {
                month,
                predicted_revenue: fit.predict((observed + k) as f64),
            })
        })
        .collect();

    Ok(Forecast {
        intercept: fit.intercept,
        slope: fit.slope,
        observed,
        points,
    })
}
