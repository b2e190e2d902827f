//! # CLI Module
//!
//! Command-line interface definitions and argument parsing for retail-report
//!
//! ## Key Components
//! - [`Args`] - Main CLI arguments structure
//! - [`Commands`] - Subcommand definitions
//! - [`FilterArgs`] - Country and period selection shared by the report commands
//! - [`SortOrder`] - Display order for the monthly series

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct FilterArgs {
    /// Country to report on (defaults to United Kingdom when present)
    #[arg(long)]
    pub country: Option<String>,

    /// Start of the period, inclusive (YYYYMMDD or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// End of the period, inclusive through the end of the day (YYYYMMDD or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the full dashboard: KPIs, top products, top customers, monthly revenue (default)
    Report {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of products and customers to rank (5-20)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(5..=20))]
        top: u8,
    },
    /// Show the best-selling products by quantity
    Products {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of products to rank (5-20)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(5..=20))]
        top: u8,
    },
    /// Show the customers with the highest revenue
    Customers {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of customers to rank (5-20)
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(5..=20))]
        top: u8,
    },
    /// Show revenue per calendar month
    Monthly {
        #[command(flatten)]
        filter: FilterArgs,

        /// Display order of the months
        #[arg(long, default_value = "asc", value_enum)]
        order: SortOrder,
    },
    /// List the countries present in the data
    Countries,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Report {
            filter: FilterArgs::default(),
            top: 10,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Retail Sales Report - KPIs, top products, top customers and monthly revenue"
)]
pub struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Transactions file: CSV export, or an .xlsx/.xls/.ods workbook of the retail spreadsheet
    #[arg(long, global = true, env = "RETAIL_REPORT_DATA", default_value = "online_retail.csv")]
    pub data: PathBuf,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
