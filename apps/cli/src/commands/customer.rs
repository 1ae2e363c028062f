//! Customer commands.

use billbook_core::validation::validate_customer;
use billbook_core::Customer;
use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::{write_json, write_records, Context};
use crate::error::AppResult;

#[derive(Debug, Subcommand)]
pub enum CustomerCommand {
    /// Add a customer
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// List customers
    List,
    /// Delete a customer (existing invoices keep their copy)
    Delete { id: String },
}

pub async fn run(ctx: &Context, cmd: CustomerCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        CustomerCommand::Add {
            name,
            address,
            phone,
            email,
        } => {
            let customer = Customer {
                id: String::new(),
                name: name.trim().to_string(),
                address,
                phone,
                email,
            };
            validate_customer(&customer)?;

            let saved = ctx.db.customers().insert(&customer).await?;
            info!(id = %saved.id, "Customer added");

            if ctx.json {
                write_json(out, &saved)
            } else {
                writeln!(out, "{}", saved.id)?;
                Ok(())
            }
        }
        CustomerCommand::List => {
            let customers = ctx.db.customers().list().await?;
            write_records(
                ctx,
                out,
                &customers,
                &["ID", "NAME", "PHONE", "EMAIL", "ADDRESS"],
                |c| {
                    vec![
                        c.id.clone(),
                        c.name.clone(),
                        c.phone.clone(),
                        c.email.clone(),
                        c.address.clone(),
                    ]
                },
            )
        }
        CustomerCommand::Delete { id } => {
            ctx.db.customers().delete(&id).await?;
            writeln!(out, "Deleted customer {}", id)?;
            Ok(())
        }
    }
}
