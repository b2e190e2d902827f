//! # Loader Module
//!
//! Reads retail transaction exports and cleans them into [`TransactionRecord`]s
//!
//! ## Key Components
//! - [`RawTransaction`] - A row exactly as it appears in the source file
//! - [`read_transactions_file`] - Read and clean a transactions file (CSV or workbook)
//! - [`raw_transactions_from_rows`] - Map worksheet rows onto [`RawTransaction`]s
//! - [`clean`] - Drop rows without a customer, parse dates, derive totals
//! - [`parse_invoice_date`] - Parse the supported InvoiceDate formats

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{NaiveDate, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::LoadError;
use crate::models::TransactionRecord;

/// Date-time layouts seen in exports of the retail spreadsheet
const INVOICE_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

/// Extensions read through calamine instead of the CSV reader
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

static EMPTY_CELL: Data = Data::Empty;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawTransaction {
    pub invoice_no: String,
    #[serde(rename = "CustomerID", default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: f64,
    pub country: String,
    pub invoice_date: String,
}

/// Read a transactions file from disk and clean it.
///
/// Spreadsheet workbooks are picked by extension; anything else is read as CSV.
pub fn read_transactions_file(path: &Path) -> Result<Vec<TransactionRecord>, LoadError> {
    let rows = if is_workbook(path) {
        read_workbook(path)?
    } else {
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        read_raw_transactions(file).map_err(|source| LoadError::Csv {
            path: path.to_path_buf(),
            source,
        })?
    };

    let row_count = rows.len();
    let records = clean(rows)?;

    debug!(
        "Loaded {} rows from {} ({} dropped without CustomerID)",
        row_count,
        path.display(),
        row_count - records.len()
    );

    Ok(records)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| WORKBOOK_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
}

/// Read the first worksheet of a workbook
fn read_workbook(path: &Path) -> Result<Vec<RawTransaction>, LoadError> {
    let workbook_error = |source: calamine::Error| LoadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| LoadError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;

    debug!("Reading worksheet '{}' of {}", sheet_name, path.display());
    let sheet = workbook.worksheet_range(&sheet_name).map_err(workbook_error)?;

    raw_transactions_from_rows(sheet.rows())
}

/// Column positions resolved from a worksheet header row
struct SheetColumns {
    invoice_no: usize,
    customer_id: Option<usize>,
    description: Option<usize>,
    quantity: usize,
    unit_price: usize,
    country: usize,
    invoice_date: usize,
}

impl SheetColumns {
    fn from_header(header: &[Data]) -> Result<Self, LoadError> {
        let names: Vec<String> = header.iter().map(|cell| cell.to_string().trim().to_string()).collect();
        let find = |column: &str| names.iter().position(|name| name == column);
        let require = |column: &'static str| find(column).ok_or(LoadError::MissingColumn { column });

        Ok(Self {
            invoice_no: require("InvoiceNo")?,
            customer_id: find("CustomerID"),
            description: find("Description"),
            quantity: require("Quantity")?,
            unit_price: require("UnitPrice")?,
            country: require("Country")?,
            invoice_date: require("InvoiceDate")?,
        })
    }
}

/// Map header-first worksheet rows onto raw transactions.
///
/// Numeric CustomerID cells (`17850.0`) come out as integer text and
/// date-formatted InvoiceDate cells are rendered as ISO date-times, so both
/// go through the same cleaning as the CSV path.
pub fn raw_transactions_from_rows<'a, I>(rows: I) -> Result<Vec<RawTransaction>, LoadError>
where
    I: IntoIterator<Item = &'a [Data]>,
{
    let mut rows = rows.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let columns = SheetColumns::from_header(header)?;

    rows.enumerate()
        .map(|(index, row)| {
            let line = index + 2;
            let cell = |position: usize| row.get(position).unwrap_or(&EMPTY_CELL);

            Ok::<_, LoadError>(RawTransaction {
                invoice_no: cell_text(cell(columns.invoice_no)).unwrap_or_default(),
                customer_id: columns.customer_id.map(cell).and_then(cell_text),
                description: columns.description.map(cell).and_then(cell_text),
                quantity: cell_integer(cell(columns.quantity))
                    .ok_or_else(|| invalid_cell(line, "Quantity", cell(columns.quantity)))?,
                unit_price: cell_float(cell(columns.unit_price))
                    .ok_or_else(|| invalid_cell(line, "UnitPrice", cell(columns.unit_price)))?,
                country: cell_text(cell(columns.country)).unwrap_or_default(),
                invoice_date: cell_date_text(cell(columns.invoice_date)),
            })
        })
        .collect()
}

fn invalid_cell(line: usize, column: &'static str, cell: &Data) -> LoadError {
    LoadError::InvalidCell {
        line,
        column,
        value: cell.to_string(),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some((*f as i64).to_string()),
        other => Some(other.to_string().trim().to_string()),
    }
}

fn cell_integer(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.fract() == 0.0 => Some(*f as i64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn cell_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// InvoiceDate as text for [`parse_invoice_date`]
fn cell_date_text(cell: &Data) -> String {
    match cell {
        Data::DateTime(excel) => excel
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| cell.to_string()),
        Data::DateTimeIso(iso) => iso.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Deserialize every row of a header-first CSV document
pub fn read_raw_transactions<R: Read>(reader: R) -> Result<Vec<RawTransaction>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    csv_reader.deserialize().collect()
}

/// Turn raw rows into records.
///
/// Rows without a customer are dropped. Any unparseable InvoiceDate fails the
/// whole load; the error names the source line (header is line 1).
pub fn clean(rows: Vec<RawTransaction>) -> Result<Vec<TransactionRecord>, LoadError> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.into_iter().enumerate() {
        let Some(customer_id) = row.customer_id.as_deref().and_then(normalize_customer_id) else {
            continue;
        };

        let invoice_date =
            parse_invoice_date(&row.invoice_date).ok_or_else(|| LoadError::InvalidDate {
                line: index + 2,
                value: row.invoice_date.clone(),
            })?;

        records.push(TransactionRecord::new(
            row.invoice_no,
            customer_id,
            row.description.map(|d| d.trim().to_string()).unwrap_or_default(),
            row.quantity,
            row.unit_price,
            row.country,
            invoice_date,
        ));
    }

    Ok(records)
}

/// Parse an InvoiceDate value. Date-only values resolve to midnight.
pub fn parse_invoice_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    INVOICE_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Spreadsheet exports store CustomerID as a float (`17850.0`)
fn normalize_customer_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return None;
    }

    match trimmed.strip_suffix(".0") {
        Some(digits) if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            Some(digits.to_string())
        }
        _ => Some(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::{Datelike, Timelike};

    const SAMPLE: &str = "\
InvoiceNo,StockCode,Description,Quantity,InvoiceDate,UnitPrice,CustomerID,Country
536365,85123A,WHITE HANGING HEART T-LIGHT HOLDER,6,12/1/2010 8:26,2.55,17850.0,United Kingdom
536366,22633,HAND WARMER UNION JACK,6,12/1/2010 8:28,1.85,,United Kingdom
C536379,D,Discount,-1,2010-12-01 09:41:00,27.5,14527,United Kingdom
536370,22728,ALARM CLOCK BAKELIKE PINK,24,2010-12-01 08:45,3.75,12583,France
";

    fn raw_row(customer_id: Option<&str>, invoice_date: &str) -> RawTransaction {
        RawTransaction {
            invoice_no: "536365".to_string(),
            customer_id: customer_id.map(str::to_string),
            description: Some("  WHITE METAL LANTERN ".to_string()),
            quantity: 6,
            unit_price: 3.39,
            country: "United Kingdom".to_string(),
            invoice_date: invoice_date.to_string(),
        }
    }

    #[test]
    fn test_read_sample_and_clean() {
        let rows = read_raw_transactions(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].customer_id, None);

        let records = clean(rows).unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| !r.customer_id.is_empty()));

        assert_eq!(records[0].customer_id, "17850");
        assert_eq!(records[0].total_price, 6.0 * 2.55);
        assert_eq!(records[1].invoice_no, "C536379");
        assert_eq!(records[1].quantity, -1);
        assert_eq!(records[2].country, "France");
    }

    #[test]
    fn test_clean_drops_missing_customers() {
        let rows = vec![
            raw_row(Some("17850"), "2010-12-01 08:26:00"),
            raw_row(None, "2010-12-01 08:26:00"),
            raw_row(Some("   "), "2010-12-01 08:26:00"),
            raw_row(Some("NaN"), "2010-12-01 08:26:00"),
        ];

        let records = clean(rows).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "WHITE METAL LANTERN");
    }

    #[test]
    fn test_clean_fails_on_malformed_date() {
        let rows = vec![
            raw_row(Some("17850"), "2010-12-01 08:26:00"),
            raw_row(Some("17850"), "first of december"),
        ];

        match clean(rows) {
            Err(LoadError::InvalidDate { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "first of december");
            }
            other => panic!("expected InvalidDate, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_date_on_dropped_row_is_ignored() {
        let rows = vec![raw_row(None, "not a date")];
        assert!(clean(rows).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invoice_date_formats() {
        let us = parse_invoice_date("12/9/2011 12:50").unwrap();
        assert_eq!((us.year(), us.month(), us.day()), (2011, 12, 9));
        assert_eq!((us.hour(), us.minute()), (12, 50));

        let iso = parse_invoice_date("2011-12-09T12:50:07").unwrap();
        assert_eq!(iso.second(), 7);

        let date_only = parse_invoice_date("2011-12-09").unwrap();
        assert_eq!((date_only.hour(), date_only.minute()), (0, 0));

        assert!(parse_invoice_date("").is_none());
        assert!(parse_invoice_date("2011-13-45 10:00").is_none());
    }

    #[test]
    fn test_normalize_customer_id() {
        assert_eq!(normalize_customer_id("17850.0"), Some("17850".to_string()));
        assert_eq!(normalize_customer_id(" 12583 "), Some("12583".to_string()));
        assert_eq!(normalize_customer_id("A1.0"), Some("A1.0".to_string()));
        assert_eq!(normalize_customer_id(".0"), Some(".0".to_string()));
        assert_eq!(normalize_customer_id(""), None);
        assert_eq!(normalize_customer_id("nan"), None);
    }

    #[test]
    fn test_missing_column_is_csv_error() {
        let text = "InvoiceNo,Description,Quantity,UnitPrice,Country\n1,A,1,1.0,UK\n";
        assert!(read_raw_transactions(text.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = std::env::temp_dir().join("retail-report-does-not-exist.csv");
        let result = read_transactions_file(&path);
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    fn sheet_header() -> Vec<Data> {
        ["InvoiceNo", "StockCode", "Description", "Quantity", "InvoiceDate", "UnitPrice", "CustomerID", "Country"]
            .iter()
            .map(|name| Data::String(name.to_string()))
            .collect()
    }

    #[test]
    fn test_workbook_rows_are_cleaned_like_csv() {
        let sheet = vec![
            sheet_header(),
            vec![
                Data::Float(536365.0),
                Data::String("85123A".to_string()),
                Data::String("WHITE HANGING HEART T-LIGHT HOLDER".to_string()),
                Data::Float(6.0),
                Data::DateTime(ExcelDateTime::new(40513.5, ExcelDateTimeType::DateTime, false)),
                Data::Float(2.55),
                Data::Float(17850.0),
                Data::String("United Kingdom".to_string()),
            ],
            vec![
                Data::String("536366".to_string()),
                Data::String("22633".to_string()),
                Data::String("HAND WARMER UNION JACK".to_string()),
                Data::Int(6),
                Data::DateTimeIso("2010-12-01T08:28:00".to_string()),
                Data::Float(1.85),
                Data::Empty,
                Data::String("United Kingdom".to_string()),
            ],
            vec![
                Data::String("C536379".to_string()),
                Data::String("D".to_string()),
                Data::String("Discount".to_string()),
                Data::Float(-1.0),
                Data::String("12/1/2010 9:41".to_string()),
                Data::Int(27),
                Data::String("14527".to_string()),
                Data::String("United Kingdom".to_string()),
            ],
        ];

        let rows = raw_transactions_from_rows(sheet.iter().map(Vec::as_slice)).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].invoice_no, "536365");
        assert_eq!(rows[0].customer_id.as_deref(), Some("17850"));
        assert_eq!(rows[1].customer_id, None);

        let records = clean(rows).unwrap();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.customer_id, "17850");
        assert_eq!(first.quantity, 6);
        assert_eq!(
            (first.invoice_date.year(), first.invoice_date.month(), first.invoice_date.day()),
            (2010, 12, 1)
        );
        assert_eq!(first.invoice_date.hour(), 12);

        assert_eq!(records[1].invoice_no, "C536379");
        assert_eq!(records[1].quantity, -1);
        assert_eq!(records[1].unit_price, 27.0);
        assert_eq!(records[1].invoice_date.minute(), 41);
    }

    #[test]
    fn test_workbook_missing_column() {
        let header: Vec<Data> = ["InvoiceNo", "Quantity", "UnitPrice", "Country"]
            .iter()
            .map(|name| Data::String(name.to_string()))
            .collect();
        let sheet = vec![header];

        match raw_transactions_from_rows(sheet.iter().map(Vec::as_slice)) {
            Err(LoadError::MissingColumn { column }) => assert_eq!(column, "InvoiceDate"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_workbook_fractional_quantity_is_rejected() {
        let mut row = vec![Data::Empty; 8];
        row[0] = Data::Int(1);
        row[3] = Data::Float(2.5);
        row[4] = Data::String("2010-12-01 08:26".to_string());
        row[5] = Data::Float(1.0);
        row[6] = Data::Float(100.0);
        row[7] = Data::String("France".to_string());
        let sheet = vec![sheet_header(), row];

        match raw_transactions_from_rows(sheet.iter().map(Vec::as_slice)) {
            Err(LoadError::InvalidCell { line, column, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(column, "Quantity");
            }
            other => panic!("expected InvalidCell, got {:?}", other),
        }
    }

    #[test]
    fn test_workbook_chosen_by_extension() {
        assert!(is_workbook(Path::new("Online Retail.xlsx")));
        assert!(is_workbook(Path::new("data/retail.XLS")));
        assert!(is_workbook(Path::new("retail.ods")));
        assert!(!is_workbook(Path::new("online_retail.csv")));
        assert!(!is_workbook(Path::new("online_retail")));
    }

    #[test]
    fn test_missing_workbook_is_workbook_error() {
        let path = std::env::temp_dir().join("retail-report-does-not-exist.xlsx");
        let result = read_transactions_file(&path);
        assert!(matches!(result, Err(LoadError::Workbook { .. })));
    }
}
