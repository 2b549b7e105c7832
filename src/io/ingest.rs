//! CSV ingest.
//!
//! This module turns a sales CSV into raw `SaleRecord`s. It does not clean
//! anything: missing prices stay `None`, negative quantities are kept. That is
//! the cleaner's job.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Strict rows**: the first malformed date/number aborts with its line number
//! - **Separation of concerns**: no cleaning or aggregation here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::debug;

use crate::domain::SaleRecord;
use crate::error::{AnalysisError, AppError};

const REQUIRED_COLUMNS: [&str; 5] = [
    "product_id",
    "product_name",
    "quantity_sold",
    "sale_date",
    "price",
];

/// Load a sales CSV from disk.
pub fn load_sales_csv(path: &Path) -> Result<Vec<SaleRecord>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let records = read_sales(file)?;
    debug!(path = %path.display(), rows = records.len(), "loaded sales csv");
    Ok(records)
}

/// Parse sales rows from any reader (a file, or a string in tests).
pub fn read_sales<R: Read>(input: R) -> Result<Vec<SaleRecord>, AnalysisError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| AnalysisError::parse(1, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line, and lines are 1-based.
        let line = idx + 2;
        let record = result.map_err(|e| AnalysisError::parse(line, format!("CSV parse error: {e}")))?;
        let row = parse_row(&record, &header_map).map_err(|message| AnalysisError::parse(line, message))?;
        records.push(row);
    }

    Ok(records)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AnalysisError> {
    for name in REQUIRED_COLUMNS {
        if !header_map.contains_key(name) {
            return Err(AnalysisError::parse(1, format!("Missing required column: `{name}`")));
        }
    }
    Ok(())
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SaleRecord, String> {
    let product_id = parse_int(get_required(record, header_map, "product_id")?, "product_id")?;
    let product_name = get_required(record, header_map, "product_name")?.to_string();
    let quantity_sold = parse_int(get_required(record, header_map, "quantity_sold")?, "quantity_sold")?;
    let sale_date = parse_date(get_required(record, header_map, "sale_date")?)?;
    let price = parse_price(get_optional(record, header_map, "price"))?;

    Ok(SaleRecord {
        product_id,
        product_name,
        quantity_sold,
        sale_date,
        price,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

fn parse_int(s: &str, name: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    // Some exporters write integer columns as floats ("12.0").
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
        _ => Err(format!("Invalid integer for `{name}`: '{s}'")),
    }
}

/// Empty, `nan` and `null` all mean "price missing".
fn parse_price(s: Option<&str>) -> Result<Option<f64>, String> {
    let Some(s) = s else { return Ok(None) };
    if s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .map_err(|_| format!("Invalid number for `price`: '{s}'"))?;
    Ok(if v.is_finite() { Some(v) } else { None })
}

/// Parse a sale date. Date-times are accepted and truncated to their date.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const DATE_FMTS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY-MM-DD HH:MM:SS, YYYY/MM/DD, MM/DD/YYYY."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn reads_rows_with_missing_prices() {
        let csv = "\u{feff}product_id,product_name,quantity_sold,sale_date,price\n\
                   1,Laptop,3,2024-03-05,999.5\n\
                   2,Mouse,10,2024-03-06 14:22:01.123456,\n\
                   3,Camera,1,2024-03-07,NaN\n";
        let rows = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].price, Some(999.5));
        assert_eq!(rows[1].sale_date, d(2024, 3, 6));
        assert_eq!(rows[1].price, None);
        assert_eq!(rows[2].price, None);
    }

    #[test]
    fn header_case_and_extra_columns_are_tolerated() {
        let csv = "Product_ID,PRODUCT_NAME,quantity_sold,sale_date,price,store\n\
                   7,Tablet,-2,2024/01/31,12,north\n";
        let rows = read_sales(csv.as_bytes()).unwrap();
        assert_eq!(rows[0].product_id, 7);
        assert_eq!(rows[0].quantity_sold, -2);
        assert_eq!(rows[0].sale_date, d(2024, 1, 31));
    }

    #[test]
    fn bad_date_reports_line_number() {
        let csv = "product_id,product_name,quantity_sold,sale_date,price\n\
                   1,Laptop,3,2024-03-05,10\n\
                   2,Laptop,3,yesterday,10\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();
        match err {
            AnalysisError::Parse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("yesterday"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_rejected() {
        let csv = "product_id,product_name,sale_date,price\n1,Laptop,2024-01-01,3\n";
        let err = read_sales(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("quantity_sold"));
    }

    #[test]
    fn float_quantities_with_no_fraction_are_integers() {
        assert_eq!(parse_int("12.0", "q"), Ok(12));
        assert!(parse_int("12.5", "q").is_err());
    }

    #[test]
    fn bad_price_is_a_parse_error() {
        let csv = "product_id,product_name,quantity_sold,sale_date,price\n1,Laptop,3,2024-03-05,cheap\n";
        assert!(matches!(
            read_sales(csv.as_bytes()),
            Err(AnalysisError::Parse { line: 2, .. })
        ));
    }
}
