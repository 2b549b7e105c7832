//! Least squares solver and straight-line fit.
//!
//! The revenue trend is an ordinary least squares fit of `y` against the
//! month index `x = 0, 1, ..., L-1`:
//!
//! ```text
//! minimize Σ (y_i - (β0 + β1 x_i))^2
//! ```
//!
//! We build the `L × 2` design matrix and solve with SVD, which handles the
//! tall (more rows than columns) system directly.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// A fitted line `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LineFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y` against `0..y.len()`.
///
/// Needs at least two points; returns `None` otherwise or when the solve fails.
pub fn fit_line(y: &[f64]) -> Option<LineFit> {
    if y.len() < 2 || !y.iter().all(|v| v.is_finite()) {
        return None;
    }

    let n = y.len();
    let x = DMatrix::from_fn(n, 2, |r, c| if c == 0 { 1.0 } else { r as f64 });
    let y = DVector::from_column_slice(y);

    let beta = solve_least_squares(&x, &y)?;
    Some(LineFit {
        intercept: beta[0],
        slope: beta[1],
    })
}
