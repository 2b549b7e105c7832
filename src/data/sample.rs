//! Synthetic sales table generation.
//!
//! The table is a uniform random draw over a fixed product catalogue, with a
//! handful of prices blanked out so the cleaner has something to impute.

use std::fs::File;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::info;

use crate::domain::SaleRecord;
use crate::error::AppError;

/// Product names used by the generator.
pub const PRODUCTS: [&str; 10] = [
    "Laptop",
    "Smartphone",
    "Headphones",
    "Tablet",
    "Smartwatch",
    "Camera",
    "Speaker",
    "Monitor",
    "Keyboard",
    "Mouse",
];

/// How far back (days) sale dates may fall from the anchor date.
const DATE_SPAN_DAYS: i64 = 365;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub count: usize,
    /// Number of price cells to blank (positions drawn with replacement).
    pub missing_prices: usize,
    pub seed: u64,
    /// Most recent possible sale date.
    pub anchor: NaiveDate,
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SaleRecord>, AppError> {
    if config.count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut records = Vec::with_capacity(config.count);

    for i in 0..config.count {
        let product_name = PRODUCTS
            .choose(&mut rng)
            .copied()
            .unwrap_or(PRODUCTS[0])
            .to_string();
        let quantity_sold = rng.gen_range(1..50);
        let days_back = rng.gen_range(0..DATE_SPAN_DAYS);
        let sale_date = config.anchor - Duration::days(days_back);
        let price = rng.gen_range(10.0..1000.0);

        records.push(SaleRecord {
            product_id: i as i64 + 1,
            product_name,
            quantity_sold,
            sale_date,
            price: Some(price),
        });
    }

    for _ in 0..config.missing_prices {
        let idx = rng.gen_range(0..records.len());
        records[idx].price = None;
    }

    Ok(records)
}

#[derive(Serialize)]
struct CsvRow<'a> {
    product_id: i64,
    product_name: &'a str,
    quantity_sold: i64,
    sale_date: NaiveDate,
    price: Option<f64>,
}

/// Write records as a sales CSV (the same schema `io::ingest` reads).
pub fn write_sales_csv(path: &Path, records: &[SaleRecord]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sales CSV '{}': {e}", path.display())))?;
    let mut writer = csv::Writer::from_writer(file);

    for r in records {
        writer
            .serialize(CsvRow {
                product_id: r.product_id,
                product_name: &r.product_name,
                quantity_sold: r.quantity_sold,
                sale_date: r.sale_date,
                price: r.price,
            })
            .map_err(|e| AppError::new(2, format!("Failed to write sales CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush sales CSV: {e}")))?;

    info!(path = %path.display(), rows = records.len(), "wrote synthetic sales data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            count: 400,
            missing_prices: 20,
            seed,
            anchor: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        }
    }

    #[test]
    fn same_seed_same_table() {
        let a = generate_sample(&config(7)).unwrap();
        let b = generate_sample(&config(7)).unwrap();
        assert_eq!(a, b);
        let c = generate_sample(&config(8)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn values_stay_in_their_ranges() {
        let cfg = config(1);
        let rows = generate_sample(&cfg).unwrap();
        assert_eq!(rows.len(), 400);
        let earliest = cfg.anchor - Duration::days(DATE_SPAN_DAYS - 1);
        for (i, r) in rows.iter().enumerate() {
            assert_eq!(r.product_id, i as i64 + 1);
            assert!(PRODUCTS.contains(&r.product_name.as_str()));
            assert!((1..50).contains(&r.quantity_sold));
            assert!(r.sale_date <= cfg.anchor && r.sale_date >= earliest);
            if let Some(p) = r.price {
                assert!((10.0..1000.0).contains(&p));
            }
        }
        let missing = rows.iter().filter(|r| r.price.is_none()).count();
        assert!(missing >= 1 && missing <= 20);
    }

    #[test]
    fn zero_count_is_rejected() {
        let mut cfg = config(1);
        cfg.count = 0;
        assert_eq!(generate_sample(&cfg).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn written_csv_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.csv");
        let rows = generate_sample(&config(3)).unwrap();
        write_sales_csv(&path, &rows).unwrap();

        let back = crate::io::load_sales_csv(&path).unwrap();
        assert_eq!(back.len(), rows.len());
        assert_eq!(back[0].product_name, rows[0].product_name);
        assert_eq!(back[0].sale_date, rows[0].sale_date);
        let missing_back = back.iter().filter(|r| r.price.is_none()).count();
        let missing = rows.iter().filter(|r| r.price.is_none()).count();
        assert_eq!(missing_back, missing);
    }
}
