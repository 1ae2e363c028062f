//! # billbook-cli: Command Line for Billbook
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Application Startup                               │
//! │                                                                         │
//! │  1. Initialize Tracing ───────────────────────────────────────────────► │
//! │     • tracing-subscriber with env filter, written to stderr             │
//! │     • Default: info, override with RUST_LOG                             │
//! │                                                                         │
//! │  2. Load Configuration ───────────────────────────────────────────────► │
//! │     • defaults → billbook.toml → BILLBOOK_* environment                 │
//! │                                                                         │
//! │  3. Open Database ────────────────────────────────────────────────────► │
//! │     • Create parent directory, connect, run migrations                  │
//! │                                                                         │
//! │  4. Dispatch Command ─────────────────────────────────────────────────► │
//! │     • Results on stdout, errors as "error: ..." with exit code 1        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod config;
pub mod draft;
pub mod error;
pub mod print;

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use billbook_db::{Database, DbConfig};
use commands::Context;
use config::AppConfig;
pub use error::{AppError, AppResult};

/// Billbook: invoicing for paper sheet and bag sales.
#[derive(Debug, Parser)]
#[command(name = "billbook", version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print records as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage customers
    #[command(subcommand)]
    Customer(commands::customer::CustomerCommand),

    /// Manage the product catalog
    #[command(subcommand)]
    Product(commands::product::ProductCommand),

    /// Manage salespersons and their commission
    #[command(subcommand)]
    Salesperson(commands::salesperson::SalespersonCommand),

    /// Manage bank accounts printed on invoices
    #[command(subcommand)]
    Bank(commands::bank::BankCommand),

    /// Business profile and tax rate
    #[command(subcommand)]
    Settings(commands::settings::SettingsCommand),

    /// Price, preview, create and settle invoices
    #[command(subcommand)]
    Invoice(commands::invoice::InvoiceCommand),

    /// CSV exports
    #[command(subcommand)]
    Report(commands::report::ReportCommand),
}

/// Initializes the tracing subscriber.
///
/// Logs go to stderr so stdout stays clean for tables, JSON and CSV.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=billbook_db=trace` - Trace the database layer only
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,billbook=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Opens the configured database, creating its directory if needed.
pub async fn open_database(config: &AppConfig) -> AppResult<Database> {
    let path = &config.database.path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    info!(?path, "Opening database");
    let db = Database::new(DbConfig::new(path).max_connections(config.database.max_connections))
        .await?;
    Ok(db)
}

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> AppResult<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let db = open_database(&config).await?;

    let ctx = Context {
        db,
        config,
        json: cli.json,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let result = commands::dispatch(&ctx, cli.command, &mut out).await;
    out.flush()?;

    ctx.db.close().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_invoice_pay() {
        let cli = Cli::try_parse_from(["billbook", "invoice", "pay", "inv-1", "200"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Invoice(commands::invoice::InvoiceCommand::Pay { ref id, amount })
                if id == "inv-1" && amount == 200.0
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["billbook", "customer", "list", "--json", "--config", "b.toml"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.config, Some(PathBuf::from("b.toml")));
    }

    #[test]
    fn test_product_type_is_validated() {
        assert!(Cli::try_parse_from([
            "billbook", "product", "add", "--gsm", "90", "--type", "roll", "--price", "1"
        ])
        .is_err());
    }

    #[tokio::test]
    async fn test_open_database_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.database.path = dir.path().join("nested").join("billbook.db");

        let db = open_database(&config).await.unwrap();
        assert!(db.health_check().await);
        assert!(config.database.path.exists());
        db.close().await;
    }
}
