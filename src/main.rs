//! # Retail Report
//!
//! Sales dashboard reports for retail transaction exports
//!
//! ## Key Components
//! - [`loader`] - Reads and cleans the transactions file
//! - [`cache`] - Keeps loaded datasets for the life of the process
//! - [`data_processing`] - Filtering and aggregation views
//! - [`report`] - Builds the dashboard for one set of criteria
//! - [`commands`] - Command handlers

mod cache;
mod cli;
mod commands;
mod data_processing;
mod errors;
mod loader;
mod models;
mod report;
mod table_display;

use anyhow::Result;
use clap::Parser;
use log::debug;

use crate::cli::{Args, Commands};

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logger based on debug flag
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    debug!("Using transactions file {}", args.data.display());

    match args.command.unwrap_or_default() {
        Commands::Report { filter, top } => {
            commands::handle_report_command(&args.data, &filter, top, args.json)
        }
        Commands::Products { filter, top } => {
            commands::handle_products_command(&args.data, &filter, top, args.json)
        }
        Commands::Customers { filter, top } => {
            commands::handle_customers_command(&args.data, &filter, top, args.json)
        }
        Commands::Monthly { filter, order } => {
            commands::handle_monthly_command(&args.data, &filter, order, args.json)
        }
        Commands::Countries => commands::handle_countries_command(&args.data, args.json),
    }
}
