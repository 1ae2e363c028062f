//! Salesperson commands.

use billbook_core::validation::validate_salesperson;
use billbook_core::{Commission, Salesperson};
use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::{write_json, write_records, Context};
use crate::error::AppResult;

#[derive(Debug, Subcommand)]
pub enum SalespersonCommand {
    /// Add a salesperson
    ///
    /// Without any rate options the salesperson earns no commission.
    Add {
        #[arg(long)]
        name: String,
        /// Percentage of the invoice subtotal
        #[arg(long, conflicts_with_all = ["sheet_rate", "bag_rate"])]
        percentage: Option<f64>,
        /// Fixed commission per square meter of sheet sold
        #[arg(long)]
        sheet_rate: Option<f64>,
        /// Fixed commission per bag sold
        #[arg(long)]
        bag_rate: Option<f64>,
    },
    /// List salespersons
    List,
    /// Delete a salesperson (existing invoices keep the name)
    Delete { id: String },
}

/// Turns the rate options into a commission config.
fn commission_from_args(
    percentage: Option<f64>,
    sheet_rate: Option<f64>,
    bag_rate: Option<f64>,
) -> AppResult<Option<Commission>> {
    let commission = match (percentage, sheet_rate, bag_rate) {
        (Some(rate), _, _) => Some(Commission::percentage(rate)?),
        (None, None, None) => None,
        (None, sheet, bag) => Some(Commission::fixed(sheet, bag)?),
    };
    Ok(commission)
}

fn describe(commission: &Option<Commission>) -> String {
    commission
        .map(|c| c.describe())
        .unwrap_or_else(|| "none".to_string())
}

pub async fn run(ctx: &Context, cmd: SalespersonCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        SalespersonCommand::Add {
            name,
            percentage,
            sheet_rate,
            bag_rate,
        } => {
            let salesperson = Salesperson {
                id: String::new(),
                name: name.trim().to_string(),
                commission: commission_from_args(percentage, sheet_rate, bag_rate)?,
            };
            validate_salesperson(&salesperson)?;

            let saved = ctx.db.salespersons().insert(&salesperson).await?;
            info!(id = %saved.id, commission = %describe(&saved.commission), "Salesperson added");

            if ctx.json {
                write_json(out, &saved)
            } else {
                writeln!(out, "{}", saved.id)?;
                Ok(())
            }
        }
        SalespersonCommand::List => {
            let salespersons = ctx.db.salespersons().list().await?;
            write_records(
                ctx,
                out,
                &salespersons,
                &["ID", "NAME", "COMMISSION"],
                |s| vec![s.id.clone(), s.name.clone(), describe(&s.commission)],
            )
        }
        SalespersonCommand::Delete { id } => {
            ctx.db.salespersons().delete(&id).await?;
            writeln!(out, "Deleted salesperson {}", id)?;
            Ok(())
        }
    }
}
