//! # Report Module
//!
//! Runs the filter-then-aggregate pipeline for one set of criteria
//!
//! ## Key Components
//! - [`filtered_view`] - Filter records, failing fast on an empty result
//! - [`build_report`] - Compute every dashboard view for the criteria

use log::{debug, warn};

use crate::data_processing::{
    compute_kpis, date_bounds, filter, monthly_revenue, top_customers, top_products,
};
use crate::errors::ReportError;
use crate::models::{DashboardReport, DateRange, FilterCriteria, TransactionRecord};

/// Filter `records`, turning an empty selection into [`ReportError::EmptyResult`]
pub fn filtered_view(
    records: &[TransactionRecord],
    criteria: &FilterCriteria,
) -> Result<Vec<TransactionRecord>, ReportError> {
    let filtered = filter(records, criteria);

    if filtered.is_empty() {
        warn!(
            "No transactions for country '{}' in period {:?}",
            criteria.country, criteria.date_range
        );
        return Err(ReportError::EmptyResult {
            country: criteria.country.clone(),
        });
    }

    debug!(
        "Selected {} of {} records for '{}'",
        filtered.len(),
        records.len(),
        criteria.country
    );

    Ok(filtered)
}

pub fn build_report(
    records: &[TransactionRecord],
    criteria: &FilterCriteria,
) -> Result<DashboardReport, ReportError> {
    let filtered = filtered_view(records, criteria)?;
    let top_n = criteria.top_n.get();

    // Without an explicit range, report the span actually covered
    let period = criteria.date_range.or_else(|| {
        date_bounds(&filtered).and_then(|(start, end)| DateRange::new(start, end).ok())
    });

    Ok(DashboardReport {
        country: criteria.country.clone(),
        period,
        record_count: filtered.len(),
        kpis: compute_kpis(&filtered),
        top_products: top_products(&filtered, top_n),
        top_customers: top_customers(&filtered, top_n),
        monthly_revenue: monthly_revenue(&filtered),
    })
}
