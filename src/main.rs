//! Nmbrs command line client.
//!
//! Run with: `nmbrs --config nmbrs.yaml companies`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nmbrs_client::{NmbrsClient, NmbrsConfig};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Read-only queries against the Nmbrs payroll API.
///
/// Prints the result of each command as JSON on stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long, default_value = "nmbrs.yaml")]
    config: PathBuf,

    /// Use the sandbox environment regardless of the config file
    #[arg(long)]
    sandbox: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every company
    Companies,
    /// Show one company from the directory
    Company { id: i64 },
    /// Print the highest company number
    HighestNumber,
    /// List every debtor
    Debtors,
    /// List the employees of a company
    Employees {
        company_id: i64,
        /// Employee type filter as understood by the service
        #[arg(long, default_value_t = 1)]
        employee_type: i32,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args.log_level.parse().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Config file: {}", args.config.display());

    let mut config = NmbrsConfig::load(&args.config)
        .with_context(|| format!("Failed to load config file {}", args.config.display()))?;
    if args.sandbox {
        config.sandbox = true;
    }

    let client = NmbrsClient::from_config(&config).context("Failed to connect to Nmbrs")?;

    match args.command {
        Command::Companies => print_json(&client.get_all_companies()?),
        Command::Company { id } => match client.get_company_by_id(id)? {
            Some(company) => print_json(company),
            None => anyhow::bail!("Company {} not found", id),
        },
        Command::HighestNumber => print_json(&client.get_highest_company_number()?),
        Command::Debtors => print_json(&client.get_all_debtors()?),
        Command::Employees {
            company_id,
            employee_type,
        } => print_json(&client.get_all_employees_by_company(company_id, employee_type)?),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{}", rendered);
    Ok(())
}
