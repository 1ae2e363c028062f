//! Bank account commands.

use billbook_core::validation::validate_bank_account;
use billbook_core::BankAccount;
use clap::Subcommand;
use std::io::Write;
use tracing::info;

use super::{write_json, write_records, Context};
use crate::error::AppResult;

#[derive(Debug, Subcommand)]
pub enum BankCommand {
    /// Add a bank account
    Add {
        #[arg(long)]
        bank_name: String,
        #[arg(long, default_value = "")]
        branch: String,
        #[arg(long)]
        account_name: String,
        #[arg(long)]
        account_number: String,
        #[arg(long, default_value = "")]
        routing_number: String,
    },
    /// List bank accounts (the first one is printed on invoices)
    List,
    /// Delete a bank account
    Delete { id: String },
}

pub async fn run(ctx: &Context, cmd: BankCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        BankCommand::Add {
            bank_name,
            branch,
            account_name,
            account_number,
            routing_number,
        } => {
            let account = BankAccount {
                id: String::new(),
                bank_name: bank_name.trim().to_string(),
                bank_branch: branch,
                account_name: account_name.trim().to_string(),
                account_number: account_number.trim().to_string(),
                routing_number,
            };
            validate_bank_account(&account)?;

            let saved = ctx.db.bank_accounts().insert(&account).await?;
            info!(id = %saved.id, bank = %saved.bank_name, "Bank account added");

            if ctx.json {
                write_json(out, &saved)
            } else {
                writeln!(out, "{}", saved.id)?;
                Ok(())
            }
        }
        BankCommand::List => {
            let accounts = ctx.db.bank_accounts().list().await?;
            write_records(
                ctx,
                out,
                &accounts,
                &["ID", "BANK", "BRANCH", "ACCOUNT NAME", "ACCOUNT NO", "ROUTING NO"],
                |a| {
                    vec![
                        a.id.clone(),
                        a.bank_name.clone(),
                        a.bank_branch.clone(),
                        a.account_name.clone(),
                        a.account_number.clone(),
                        a.routing_number.clone(),
                    ]
                },
            )
        }
        BankCommand::Delete { id } => {
            ctx.db.bank_accounts().delete(&id).await?;
            writeln!(out, "Deleted bank account {}", id)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{context, output};
    use crate::error::AppError;

    fn add(account_number: &str) -> BankCommand {
        BankCommand::Add {
            bank_name: "City Bank".to_string(),
            branch: "Main".to_string(),
            account_name: "Paper Works".to_string(),
            account_number: account_number.to_string(),
            routing_number: String::new(),
        }
    }

    #[tokio::test]
    async fn test_add_and_list_in_creation_order() {
        let ctx = context().await;
        let mut buf = Vec::new();
        run(&ctx, add("0001"), &mut buf).await.unwrap();
        run(&ctx, add("0002"), &mut buf).await.unwrap();

        let mut buf = Vec::new();
        run(&ctx, BankCommand::List, &mut buf).await.unwrap();
        let listing = output(buf);
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].contains("0001"));
        assert!(lines[2].contains("0002"));
    }

    #[tokio::test]
    async fn test_missing_account_number_rejected() {
        let ctx = context().await;
        let mut buf = Vec::new();
        assert!(matches!(
            run(&ctx, add(" "), &mut buf).await,
            Err(AppError::Validation(_))
        ));
    }
}
