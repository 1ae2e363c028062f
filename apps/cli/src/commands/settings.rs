//! Business settings commands.
//!
//! `settings set` only changes the fields given; everything else keeps
//! its saved value.

use billbook_core::money::format_number;
use billbook_core::validation::validate_business_settings;
use billbook_core::BusinessSettings;
use clap::{Args, Subcommand};
use std::io::Write;

use super::{write_json, Context};
use crate::error::{AppError, AppResult};

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the business profile
    Show,
    /// Update the business profile
    Set(SettingsArgs),
}

#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub office_address: Option<String>,
    #[arg(long)]
    pub factory_address: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub logo_url: Option<String>,
    /// Percentage, e.g. 5 for 5%
    #[arg(long)]
    pub tax_rate: Option<f64>,
    /// Bank account id, or "none" to clear
    #[arg(long)]
    pub default_bank: Option<String>,
}

impl SettingsArgs {
    fn apply(self, mut settings: BusinessSettings) -> BusinessSettings {
        if let Some(name) = self.name {
            settings.name = name.trim().to_string();
        }
        if let Some(v) = self.office_address {
            settings.office_address = v;
        }
        if let Some(v) = self.factory_address {
            settings.factory_address = v;
        }
        if let Some(v) = self.phone {
            settings.phone = v;
        }
        if let Some(v) = self.email {
            settings.email = v;
        }
        if let Some(v) = self.logo_url {
            settings.logo_url = v;
        }
        if let Some(rate) = self.tax_rate {
            settings.tax_rate = rate;
        }
        if let Some(bank) = self.default_bank {
            settings.default_bank_account_id = match bank.trim() {
                "" | "none" => None,
                id => Some(id.to_string()),
            };
        }
        settings
    }
}

fn write_settings(out: &mut dyn Write, s: &BusinessSettings) -> AppResult<()> {
    let rows = [
        ("Name", s.name.clone()),
        ("Office address", s.office_address.clone()),
        ("Factory address", s.factory_address.clone()),
        ("Phone", s.phone.clone()),
        ("Email", s.email.clone()),
        ("Logo URL", s.logo_url.clone()),
        ("Tax rate", format!("{}%", format_number(s.tax_rate))),
        (
            "Default bank",
            s.default_bank_account_id.clone().unwrap_or_default(),
        ),
    ];
    for (label, value) in rows {
        writeln!(out, "{:<16} {}", format!("{}:", label), value)?;
    }
    Ok(())
}

pub async fn run(ctx: &Context, cmd: SettingsCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        SettingsCommand::Show => {
            let settings = ctx.db.settings().get().await?;
            if ctx.json {
                write_json(out, &settings)
            } else {
                write_settings(out, &settings)
            }
        }
        SettingsCommand::Set(args) => {
            let current = ctx.db.settings().get().await?;
            let updated = args.apply(current);
            validate_business_settings(&updated)?;

            if let Some(id) = &updated.default_bank_account_id {
                if ctx.db.bank_accounts().get_by_id(id).await?.is_none() {
                    return Err(AppError::not_found("Bank account", id.clone()));
                }
            }

            ctx.db.settings().save(&updated).await?;

            if ctx.json {
                write_json(out, &updated)
            } else {
                write_settings(out, &updated)
            }
        }
    }
}
