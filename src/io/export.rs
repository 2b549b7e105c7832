//! Exports: per-product summary CSV and forecast JSON.
//!
//! Both are meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::path::Path;

use tracing::info;

use crate::domain::ExportRow;
use crate::error::AppError;
use crate::forecast::Forecast;

/// Write the per-product summary (`product_name,quantity_sold,revenue,price`).
pub fn write_summary_csv(path: &Path, rows: &[ExportRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;

    info!(path = %path.display(), products = rows.len(), "wrote summary export");
    Ok(())
}

/// Serialize a forecast as pretty JSON.
pub fn forecast_json(forecast: &Forecast) -> Result<String, AppError> {
    serde_json::to_string_pretty(forecast)
        .map_err(|e| AppError::new(4, format!("Failed to serialize forecast: {e}")))
}
