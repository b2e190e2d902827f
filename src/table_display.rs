//! # Table Display Module
//!
//! Renders dashboard views as terminal tables
//!
//! ## Key Components
//! - [`format_report`] - Full dashboard: KPIs, rankings, monthly revenue
//! - [`format_products_table`] / [`format_customers_table`] - Ranking tables
//! - [`format_monthly_table`] - Monthly revenue table
//! - [`format_currency`] - GBP amounts with thousands separators

use crate::cli::SortOrder;
use crate::data_processing::truncate_label;
use crate::models::{CustomerTotal, DashboardReport, Kpis, MonthlyRevenue, ProductTotal};

/// Product names are shortened to this many characters in tables
pub const PRODUCT_LABEL_WIDTH: usize = 35;

/// Format numbers with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

fn format_signed(n: i64) -> String {
    if n < 0 {
        format!("-{}", format_number(n.unsigned_abs()))
    } else {
        format_number(n as u64)
    }
}

pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}£{}.{:02}", sign, format_number(cents / 100), cents % 100)
}

fn title_box(title: &str) -> String {
    let width = title.chars().count() + 4;
    let mut output = String::new();
    output.push('\n');
    output.push_str(&format!(" ╭{}╮\n", "─".repeat(width)));
    output.push_str(&format!(" │{}│\n", " ".repeat(width)));
    output.push_str(&format!(" │  {}  │\n", title));
    output.push_str(&format!(" │{}│\n", " ".repeat(width)));
    output.push_str(&format!(" ╰{}╯\n", "─".repeat(width)));
    output.push('\n');
    output
}

pub fn format_kpis(kpis: &Kpis) -> String {
    let mut output = String::new();

    output.push_str("┌─────────────────────┬─────────────────┐\n");
    output.push_str(&format!("│ {:<19} │ {:>15} │\n", "Total revenue (GBP)", format_currency(kpis.total_revenue)));
    output.push_str(&format!("│ {:<19} │ {:>15} │\n", "Unique customers", format_number(kpis.unique_customers as u64)));
    output.push_str(&format!("│ {:<19} │ {:>15} │\n", "Orders (invoices)", format_number(kpis.total_orders as u64)));
    output.push_str(&format!("│ {:<19} │ {:>15} │\n", "Average ticket", format_currency(kpis.average_ticket)));
    output.push_str("└─────────────────────┴─────────────────┘\n");

    output
}

pub fn format_products_table(products: &[ProductTotal]) -> String {
    let mut output = String::new();

    output.push_str("┌─────┬─────────────────────────────────────┬──────────────┐\n");
    output.push_str("│   # │ Product                             │ Quantity     │\n");
    output.push_str("├─────┼─────────────────────────────────────┼──────────────┤\n");

    for (rank, product) in products.iter().enumerate() {
        output.push_str(&format!(
            "│ {:>3} │ {:<35} │ {:>12} │\n",
            rank + 1,
            truncate_label(&product.description, PRODUCT_LABEL_WIDTH),
            format_signed(product.quantity)
        ));
    }

    output.push_str("└─────┴─────────────────────────────────────┴──────────────┘\n");
    output
}

pub fn format_customers_table(customers: &[CustomerTotal]) -> String {
    let mut output = String::new();

    output.push_str("┌─────┬──────────────┬─────────────────┐\n");
    output.push_str("│   # │ Customer     │ Revenue (GBP)   │\n");
    output.push_str("├─────┼──────────────┼─────────────────┤\n");

    for (rank, customer) in customers.iter().enumerate() {
        output.push_str(&format!(
            "│ {:>3} │ {:<12} │ {:>15} │\n",
            rank + 1,
            customer.customer_id,
            format_currency(customer.revenue)
        ));
    }

    output.push_str("└─────┴──────────────┴─────────────────┘\n");
    output
}

pub fn format_monthly_table(months: &[MonthlyRevenue], order: SortOrder) -> String {
    let mut output = String::new();

    output.push_str("┌─────────┬─────────────────┐\n");
    output.push_str("│ Month   │ Revenue (GBP)   │\n");
    output.push_str("├─────────┼─────────────────┤\n");

    let mut rows: Vec<&MonthlyRevenue> = months.iter().collect();
    if matches!(order, SortOrder::Desc) {
        rows.reverse();
    }

    for month in rows {
        output.push_str(&format!(
            "│ {:<7} │ {:>15} │\n",
            month.month_start.format("%Y-%m").to_string(),
            format_currency(month.revenue)
        ));
    }

    output.push_str("└─────────┴─────────────────┘\n");

    let total: f64 = months.iter().map(|m| m.revenue).sum();
    output.push_str(&format!("\nTotal Revenue: {}\n", format_currency(total)));

    output
}

pub fn format_report(report: &DashboardReport) -> String {
    let mut output = title_box(&format!("Online Retail Dashboard - {}", report.country));

    output.push_str(&format_kpis(&report.kpis));

    output.push_str(&format!(
        "\nTop {} products by quantity sold\n",
        report.top_products.len()
    ));
    output.push_str(&format_products_table(&report.top_products));

    output.push_str(&format!(
        "\nTop {} customers by revenue\n",
        report.top_customers.len()
    ));
    output.push_str(&format_customers_table(&report.top_customers));

    output.push_str("\nMonthly revenue\n");
    output.push_str(&format_monthly_table(&report.monthly_revenue, SortOrder::Asc));

    let period = match report.period {
        Some(range) => format!("{} to {}", range.start, range.end),
        None => "all dates".to_string(),
    };
    output.push_str(&format!(
        "\nFiltered data: {} • Total rows: {}",
        period,
        format_number(report.record_count as u64)
    ));

    output
}

pub fn format_countries(countries: &[String], default: Option<&str>) -> String {
    let mut output = String::new();
    for country in countries {
        let marker = if Some(country.as_str()) == default { " (default)" } else { "" };
        output.push_str(&format!("{}{}\n", country, marker));
    }
    output.push_str(&format!("\n{} countries", format_number(countries.len() as u64)));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_signed(-74215), "-74,215");
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_currency(0.0), "£0.00");
        assert_eq!(format_currency(1234.5), "£1,234.50");
        assert_eq!(format_currency(8187806.364), "£8,187,806.36");
        assert_eq!(format_currency(-27.5), "-£27.50");
        assert_eq!(format_currency(-0.001), "£0.00");
    }

    #[test]
    fn test_products_table_truncates_labels() {
        let products = vec![ProductTotal {
            description: "SET OF 3 CAKE TINS PANTRY DESIGN WITH EXTRA LONG NAME".to_string(),
            quantity: 1200,
        }];

        let table = format_products_table(&products);
        assert!(table.contains("SET OF 3 CAKE TINS PANTRY DESIGN..."));
        assert!(!table.contains("EXTRA LONG NAME"));
        assert!(table.contains("1,200"));
    }

    #[test]
    fn test_monthly_table_order() {
        let months = vec![
            MonthlyRevenue { month_start: NaiveDate::from_ymd_opt(2011, 1, 1).unwrap(), revenue: 10.0 },
            MonthlyRevenue { month_start: NaiveDate::from_ymd_opt(2011, 2, 1).unwrap(), revenue: 5.0 },
        ];

        let asc = format_monthly_table(&months, SortOrder::Asc);
        assert!(asc.find("2011-01").unwrap() < asc.find("2011-02").unwrap());
        assert!(asc.contains("Total Revenue: £15.00"));

        let desc = format_monthly_table(&months, SortOrder::Desc);
        assert!(desc.find("2011-02").unwrap() < desc.find("2011-01").unwrap());
    }

    #[test]
    fn test_countries_marks_default() {
        let countries = vec!["France".to_string(), "United Kingdom".to_string()];
        let output = format_countries(&countries, Some("United Kingdom"));
        assert!(output.contains("United Kingdom (default)"));
        assert!(!output.contains("France (default)"));
        assert!(output.ends_with("2 countries"));
    }
}
