//! # Errors Module
//!
//! Error taxonomy for loading transaction data and building reports
//!
//! ## Key Components
//! - [`LoadError`] - Fatal errors while reading or cleaning the source file
//! - [`ReportError`] - Errors surfaced while building a report

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read transactions file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed transactions file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {path} has no worksheets")]
    EmptyWorkbook { path: PathBuf },

    #[error("missing column '{column}'")]
    MissingColumn { column: &'static str },

    #[error("line {line}: invalid {column} '{value}'")]
    InvalidCell {
        line: usize,
        column: &'static str,
        value: String,
    },

    #[error("line {line}: invalid InvoiceDate '{value}'")]
    InvalidDate { line: usize, value: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("no transactions found for country '{country}' in the selected period")]
    EmptyResult { country: String },

    #[error("top N must be between 5 and 20, got {0}")]
    InvalidTopN(usize),

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

impl ReportError {
    /// Empty results end a single report, not the process.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ReportError::EmptyResult { .. })
    }
}
