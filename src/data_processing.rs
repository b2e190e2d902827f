//! # Data Processing Module
//!
//! Filtering and aggregation of transaction records into reporting views
//!
//! ## Key Components
//! - [`filter`] - Select records by country and date range
//! - [`compute_kpis`] - Revenue, customer, order and average ticket metrics
//! - [`top_products`] / [`top_customers`] - Ranked Top-N views
//! - [`monthly_revenue`] - Revenue per calendar month
//! - [`truncate_label`] - Shorten display labels

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::models::{
    CustomerTotal, FilterCriteria, Kpis, MonthlyRevenue, ProductTotal, TransactionRecord,
};

const ELLIPSIS: &str = "...";

/// Parse a date in YYYYMMDD or YYYY-MM-DD format
pub fn parse_date_filter(date_str: &str) -> Result<NaiveDate> {
    let date_str = date_str.trim();

    if date_str.len() == 8 && date_str.chars().all(|c| c.is_ascii_digit()) {
        let year = date_str[0..4].parse::<i32>()
            .context("Invalid year in date")?;
        let month = date_str[4..6].parse::<u32>()
            .context("Invalid month in date")?;
        let day = date_str[6..8].parse::<u32>()
            .context("Invalid day in date")?;

        return NaiveDate::from_ymd_opt(year, month, day)
            .with_context(|| format!("Invalid date: {}", date_str));
    }

    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("Date must be in YYYYMMDD or YYYY-MM-DD format, got: {}", date_str))
}

/// Keep the records matching the criteria's country and period
pub fn filter(records: &[TransactionRecord], criteria: &FilterCriteria) -> Vec<TransactionRecord> {
    records
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}

pub fn compute_kpis(records: &[TransactionRecord]) -> Kpis {
    let total_revenue: f64 = records.iter().map(|r| r.total_price).sum();
    let unique_customers = records
        .iter()
        .map(|r| r.customer_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    let total_orders = records
        .iter()
        .map(|r| r.invoice_no.as_str())
        .collect::<HashSet<_>>()
        .len();

    let average_ticket = if total_orders == 0 {
        0.0
    } else {
        total_revenue / total_orders as f64
    };

    Kpis {
        total_revenue,
        unique_customers,
        total_orders,
        average_ticket,
    }
}

/// Sum values per key, keeping keys in first-occurrence order
fn group_sum<'a, V, I>(items: I) -> Vec<(&'a str, V)>
where
    I: IntoIterator<Item = (&'a str, V)>,
    V: Copy + std::ops::AddAssign,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, V)> = Vec::new();

    for (key, value) in items {
        match positions.get(key) {
            Some(&index) => groups[index].1 += value,
            None => {
                positions.insert(key, groups.len());
                groups.push((key, value));
            }
        }
    }

    groups
}

/// Best-selling products by summed quantity.
///
/// Ties keep the order in which products first appear. Records without a
/// description do not form a product.
pub fn top_products(records: &[TransactionRecord], n: usize) -> Vec<ProductTotal> {
    let mut products = group_sum(
        records
            .iter()
            .filter(|r| !r.description.is_empty())
            .map(|r| (r.description.as_str(), r.quantity)),
    );

    products.sort_by(|a, b| b.1.cmp(&a.1));
    products.truncate(n);

    products
        .into_iter()
        .map(|(description, quantity)| ProductTotal {
            description: description.to_string(),
            quantity,
        })
        .collect()
}

/// Highest-spending customers by summed revenue, ties in first-occurrence order
pub fn top_customers(records: &[TransactionRecord], n: usize) -> Vec<CustomerTotal> {
    let mut customers = group_sum(
        records
            .iter()
            .map(|r| (r.customer_id.as_str(), r.total_price)),
    );

    customers.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    customers.truncate(n);

    customers
        .into_iter()
        .map(|(customer_id, revenue)| CustomerTotal {
            customer_id: customer_id.to_string(),
            revenue,
        })
        .collect()
}

/// Revenue per calendar month, ascending, only months that have records
pub fn monthly_revenue(records: &[TransactionRecord]) -> Vec<MonthlyRevenue> {
    let mut monthly_map: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for record in records {
        let date = record.invoice_date.date();
        *monthly_map.entry((date.year(), date.month())).or_insert(0.0) += record.total_price;
    }

    monthly_map
        .into_iter()
        .filter_map(|((year, month), revenue)| {
            NaiveDate::from_ymd_opt(year, month, 1).map(|month_start| MonthlyRevenue {
                month_start,
                revenue,
            })
        })
        .collect()
}

/// Shorten `text` to at most `max_width` characters for display.
///
/// Runs of whitespace collapse to one space first; text that then fits is
/// returned as is. Otherwise as many whole words as fit are kept and `...` is
/// appended, so a first word too long for the room left becomes just `...`.
/// Widths smaller than the marker fall back to a plain character cut.
pub fn truncate_label(text: &str, max_width: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_width {
        return collapsed;
    }

    let marker_width = ELLIPSIS.chars().count();
    if max_width < marker_width {
        return collapsed.chars().take(max_width).collect();
    }

    let room = max_width - marker_width;
    let mut result = String::new();
    let mut width = 0;

    for word in collapsed.split(' ') {
        let word_width = word.chars().count();
        let needed = if result.is_empty() { word_width } else { word_width + 1 };
        if width + needed > room {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
        width += needed;
    }

    result.push_str(ELLIPSIS);
    result
}

/// Distinct countries in sorted order
pub fn available_countries(records: &[TransactionRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.country.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// United Kingdom when present, otherwise the first country
pub fn default_country(countries: &[String]) -> Option<&str> {
    countries
        .iter()
        .find(|c| c.as_str() == "United Kingdom")
        .or_else(|| countries.first())
        .map(String::as_str)
}

/// Earliest and latest invoice dates
pub fn date_bounds(records: &[TransactionRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.invoice_date.date()).min()?;
    let max = records.iter().map(|r| r.invoice_date.date()).max()?;
    Some((min, max))
}
