//! CSV report commands.

use billbook_core::report::{commission_report_csv, customer_summary_csv, invoices_csv};
use clap::Subcommand;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use super::Context;
use crate::error::AppResult;

#[derive(Debug, Subcommand)]
pub enum ReportCommand {
    /// One row per invoice
    Invoices {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Billed, paid and due per customer
    Customers {
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Sales and commission per salesperson
    Commission {
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub async fn run(ctx: &Context, cmd: ReportCommand, out: &mut dyn Write) -> AppResult<()> {
    let invoices = ctx.db.invoices().list().await?;

    let (csv, target) = match cmd {
        ReportCommand::Invoices { out: target } => (invoices_csv(&invoices)?, target),
        ReportCommand::Customers { out: target } => {
            let customers = ctx.db.customers().list().await?;
            (customer_summary_csv(&customers, &invoices)?, target)
        }
        ReportCommand::Commission { out: target } => {
            let salespersons = ctx.db.salespersons().list().await?;
            (commission_report_csv(&salespersons, &invoices)?, target)
        }
    };

    match target {
        Some(path) => {
            std::fs::write(&path, &csv)?;
            info!(?path, rows = csv.lines().count().saturating_sub(1), "Report written");
            writeln!(out, "Report written to {}", path.display())?;
        }
        None => out.write_all(csv.as_bytes())?,
    }
    Ok(())
}
