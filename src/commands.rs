//! # Commands Module
//!
//! Command handlers for the dashboard, ranking, monthly and country reports
//!
//! ## Key Components
//! - [`handle_report_command`] - Full dashboard
//! - [`handle_products_command`] / [`handle_customers_command`] - Ranking views
//! - [`handle_monthly_command`] - Monthly revenue series
//! - [`handle_countries_command`] - Available countries

use anyhow::{Context, Result};
use log::debug;
use std::path::Path;
use std::sync::Arc;

use crate::cache::load_dataset;
use crate::cli::{FilterArgs, SortOrder};
use crate::data_processing::{
    available_countries, date_bounds, default_country, monthly_revenue, parse_date_filter, top_customers,
    top_products,
};
use crate::errors::ReportError;
use crate::models::{DateRange, FilterCriteria, TopN, TransactionRecord};
use crate::report::{build_report, filtered_view};
use crate::table_display::{
    format_countries, format_customers_table, format_monthly_table, format_products_table,
    format_report,
};

const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

fn load_records(data: &Path) -> Result<Arc<Vec<TransactionRecord>>> {
    let records = load_dataset(data)
        .with_context(|| format!("Failed to load transactions from {}", data.display()))?;

    if records.is_empty() {
        anyhow::bail!(
            "No usable transactions found in {}. Every row is missing a CustomerID.",
            data.display()
        );
    }

    debug!("{} transactions available", records.len());
    Ok(records)
}

/// Turn command-line filters into pipeline criteria.
///
/// A period given with only one bound is closed with the first or last
/// invoice date in the data.
pub fn resolve_criteria(
    records: &[TransactionRecord],
    filter: &FilterArgs,
    top_n: TopN,
) -> Result<FilterCriteria> {
    let country = match &filter.country {
        Some(country) => country.clone(),
        None => {
            let countries = available_countries(records);
            default_country(&countries)
                .context("No countries found in the data")?
                .to_string()
        }
    };

    let since = filter.since.as_deref().map(parse_date_filter).transpose()?;
    let until = filter.until.as_deref().map(parse_date_filter).transpose()?;

    let date_range = match (since, until) {
        (None, None) => None,
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        (start, end) => {
            let (first, last) = date_bounds(records).context("No invoice dates found in the data")?;
            let start = start.unwrap_or_else(|| first.min(end.unwrap_or(first)));
            let end = end.unwrap_or_else(|| last.max(start));
            Some(DateRange::new(start, end)?)
        }
    };

    Ok(FilterCriteria::new(country)
        .with_date_range(date_range)
        .with_top_n(top_n))
}

/// Select records, printing the no-data notice on an empty result
fn select_records(
    records: &[TransactionRecord],
    criteria: &FilterCriteria,
) -> Result<Option<Vec<TransactionRecord>>> {
    match filtered_view(records, criteria) {
        Ok(filtered) => Ok(Some(filtered)),
        Err(e) if e.is_empty_result() => {
            println!("{}", NO_DATA_MESSAGE);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle the full dashboard command
pub fn handle_report_command(data: &Path, filter: &FilterArgs, top: u8, json: bool) -> Result<()> {
    let records = load_records(data)?;
    let criteria = resolve_criteria(&records, filter, TopN::new(usize::from(top))?)?;

    let report = match build_report(&records, &criteria) {
        Ok(report) => report,
        Err(ReportError::EmptyResult { .. }) => {
            println!("{}", NO_DATA_MESSAGE);
            return Ok(());
        }
        Err(e) => return Err(e).context("Failed to build report"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }

    Ok(())
}

/// Handle the top products command
pub fn handle_products_command(data: &Path, filter: &FilterArgs, top: u8, json: bool) -> Result<()> {
    let records = load_records(data)?;
    let criteria = resolve_criteria(&records, filter, TopN::new(usize::from(top))?)?;

    let Some(filtered) = select_records(&records, &criteria)? else {
        return Ok(());
    };
    let products = top_products(&filtered, criteria.top_n.get());

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "country": criteria.country,
            "products": products,
        }))?);
    } else {
        println!("Top {} products by quantity sold - {}", products.len(), criteria.country);
        println!("{}", format_products_table(&products));
    }

    Ok(())
}

/// Handle the top customers command
pub fn handle_customers_command(data: &Path, filter: &FilterArgs, top: u8, json: bool) -> Result<()> {
    let records = load_records(data)?;
    let criteria = resolve_criteria(&records, filter, TopN::new(usize::from(top))?)?;

    let Some(filtered) = select_records(&records, &criteria)? else {
        return Ok(());
    };
    let customers = top_customers(&filtered, criteria.top_n.get());

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "country": criteria.country,
            "customers": customers,
        }))?);
    } else {
        println!("Top {} customers by revenue - {}", customers.len(), criteria.country);
        println!("{}", format_customers_table(&customers));
    }

    Ok(())
}

/// Handle the monthly revenue command
pub fn handle_monthly_command(data: &Path, filter: &FilterArgs, order: SortOrder, json: bool) -> Result<()> {
    let records = load_records(data)?;
    let criteria = resolve_criteria(&records, filter, TopN::default())?;

    let Some(filtered) = select_records(&records, &criteria)? else {
        return Ok(());
    };
    let mut months = monthly_revenue(&filtered);

    if json {
        if matches!(order, SortOrder::Desc) {
            months.reverse();
        }
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "country": criteria.country,
            "monthly": months,
        }))?);
    } else {
        println!("Monthly revenue - {}", criteria.country);
        println!("{}", format_monthly_table(&months, order));
    }

    Ok(())
}

/// Handle the countries listing command
pub fn handle_countries_command(data: &Path, json: bool) -> Result<()> {
    let records = load_records(data)?;
    let countries = available_countries(&records);
    let default = default_country(&countries);

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "countries": countries,
            "default": default,
        }))?);
    } else {
        println!("{}", format_countries(&countries, default));
    }

    Ok(())
}
