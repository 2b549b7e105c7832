//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and cleaned sale rows (`SaleRecord`, `CleanedSale`)
//! - aggregate outputs (`ProductSummary`, `ProductTotals`, `MonthlyRevenue`)
//! - forecast outputs (`ForecastPoint`)
//! - the run configuration (`AnalysisConfig`)

pub mod types;

pub use types::*;
