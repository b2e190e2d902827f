//! # Models Module
//!
//! Data model for transaction records, filter criteria and aggregate views
//!
//! ## Key Components
//! - [`TransactionRecord`] - A cleaned transaction line item
//! - [`FilterCriteria`] - Country, period and Top-N selection
//! - [`Kpis`] - Scalar summary metrics
//! - [`DashboardReport`] - All views computed for one set of criteria

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::errors::ReportError;

/// One cleaned line item. `total_price` is always `quantity * unit_price`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub invoice_no: String,
    pub customer_id: String,
    pub description: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub country: String,
    pub invoice_date: NaiveDateTime,
    pub total_price: f64,
}

impl TransactionRecord {
    pub fn new(
        invoice_no: String,
        customer_id: String,
        description: String,
        quantity: i64,
        unit_price: f64,
        country: String,
        invoice_date: NaiveDateTime,
    ) -> Self {
        Self {
            invoice_no,
            customer_id,
            description,
            quantity,
            unit_price,
            country,
            invoice_date,
            total_price: quantity as f64 * unit_price,
        }
    }
}

/// Inclusive period; the end bound covers the whole end day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let date = timestamp.date();
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopN(usize);

impl TopN {
    pub const MIN: usize = 5;
    pub const MAX: usize = 20;

    pub fn new(n: usize) -> Result<Self, ReportError> {
        if !(Self::MIN..=Self::MAX).contains(&n) {
            return Err(ReportError::InvalidTopN(n));
        }
        Ok(Self(n))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopN {
    fn default() -> Self {
        Self(10)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub country: String,
    /// `None` selects the full range of the data.
    pub date_range: Option<DateRange>,
    pub top_n: TopN,
}

impl FilterCriteria {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            date_range: None,
            top_n: TopN::default(),
        }
    }

    pub fn with_date_range(mut self, date_range: Option<DateRange>) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn with_top_n(mut self, top_n: TopN) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn matches(&self, record: &TransactionRecord) -> bool {
        record.country == self.country
            && self
                .date_range
                .is_none_or(|range| range.contains(record.invoice_date))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub unique_customers: usize,
    pub total_orders: usize,
    pub average_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductTotal {
    pub description: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerTotal {
    pub customer_id: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    pub month_start: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub country: String,
    /// Requested period, or the span of the filtered records when none was given.
    pub period: Option<DateRange>,
    pub record_count: usize,
    pub kpis: Kpis,
    pub top_products: Vec<ProductTotal>,
    pub top_customers: Vec<CustomerTotal>,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}
