//! # Invoice Commands
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  draft.json ──► totals   (priced, nothing saved)                        │
//! │       │                                                                 │
//! │       ├──────► preview  (rendered as "PREVIEW", nothing validated)     │
//! │       │                                                                 │
//! │       └──────► create   (validated, numbered INV-<millis>, saved)      │
//! │                   │                                                     │
//! │                   ├──► pay <amount>   (total paid += amount)            │
//! │                   ├──► print          (HTML file or system printer)     │
//! │                   └──► delete                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::money::{format_money, format_number};
use billbook_core::validation::{validate_payment_amount, validate_uuid};
use billbook_core::{
    assemble_invoice, preview_invoice, render_invoice_document, BusinessSettings, Customer,
    Invoice, InvoiceDraft, Salesperson, Totals,
};
use chrono::Utc;
use clap::Subcommand;
use comfy_table::{Cell, CellAlignment};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{plain_table, write_json, write_records, write_rendered, write_table, Context};
use crate::draft::DraftFile;
use crate::error::{AppError, AppResult};
use crate::print::{HtmlFileSink, PrintSink, Printed, SystemPrintSink};

#[derive(Debug, Subcommand)]
pub enum InvoiceCommand {
    /// Price a draft without saving anything
    Totals {
        #[arg(long)]
        draft: PathBuf,
    },
    /// Render a draft as an unsaved "PREVIEW" invoice
    Preview {
        #[arg(long)]
        draft: PathBuf,
        /// Write the HTML here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Validate a draft and save it as a new invoice
    Create {
        #[arg(long)]
        draft: PathBuf,
    },
    /// List invoices, newest first
    List,
    /// Show one invoice with its lines
    Show { id: String },
    /// Record a payment
    Pay {
        id: String,
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },
    /// Print an invoice
    Print {
        id: String,
        /// Save as an HTML file instead of sending to the printer
        #[arg(long)]
        html: bool,
        /// Directory for --html (default: print.output_dir)
        #[arg(long, requires = "html")]
        out: Option<PathBuf>,
    },
    /// Delete an invoice permanently
    Delete { id: String },
}

pub async fn run(ctx: &Context, cmd: InvoiceCommand, out: &mut dyn Write) -> AppResult<()> {
    match cmd {
        InvoiceCommand::Totals { draft } => totals(ctx, &draft, out).await,
        InvoiceCommand::Preview { draft, out: target } => {
            preview(ctx, &draft, target.as_deref(), out).await
        }
        InvoiceCommand::Create { draft } => create(ctx, &draft, out).await,
        InvoiceCommand::List => list(ctx, out).await,
        InvoiceCommand::Show { id } => show(ctx, &id, out).await,
        InvoiceCommand::Pay { id, amount } => pay(ctx, &id, amount, out).await,
        InvoiceCommand::Print { id, html, out: dir } => {
            print(ctx, &id, html, dir.as_deref(), out).await
        }
        InvoiceCommand::Delete { id } => {
            ctx.db.invoices().delete(invoice_id(&id)?).await?;
            writeln!(out, "Deleted invoice {}", id)?;
            Ok(())
        }
    }
}

// =============================================================================
// Drafts
// =============================================================================

/// A draft file resolved against the catalog, with what pricing needs.
struct LoadedDraft {
    draft: InvoiceDraft,
    settings: BusinessSettings,
    salespersons: Vec<Salesperson>,
}

impl LoadedDraft {
    async fn load(ctx: &Context, path: &Path) -> AppResult<Self> {
        let file = DraftFile::from_path(path)?;
        let products = ctx.db.products().list().await?;

        Ok(LoadedDraft {
            draft: file.resolve(&products)?,
            settings: ctx.db.settings().get().await?,
            salespersons: ctx.db.salespersons().list().await?,
        })
    }

    fn totals(&self) -> Totals {
        self.draft.totals(self.settings.tax_rate, &self.salespersons)
    }

    fn salesperson(&self) -> Option<&Salesperson> {
        let id = self.draft.salesperson_id.as_deref()?;
        self.salespersons.iter().find(|s| s.id == id)
    }

    async fn customer(&self, ctx: &Context) -> AppResult<Option<Customer>> {
        match &self.draft.customer_id {
            Some(id) => Ok(ctx.db.customers().get_by_id(id).await?),
            None => Ok(None),
        }
    }
}

fn write_totals(out: &mut dyn Write, totals: &Totals, tax_rate: f64) -> AppResult<()> {
    let rows = [
        ("Total Sq. M".to_string(), format_money(totals.total_square_meters)),
        ("Subtotal".to_string(), format_money(totals.sub_total)),
        (
            format!("Tax ({}%)", format_number(tax_rate)),
            format_money(totals.tax_amount),
        ),
        ("Total".to_string(), format_money(totals.total_with_tax)),
        ("Paid".to_string(), format_money(totals.paid_amount)),
        ("Due".to_string(), format_money(totals.final_due)),
        ("Commission".to_string(), format_money(totals.commission_amount)),
    ];
    let mut table = plain_table();
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    write_rendered(out, &mut table)
}

async fn totals(ctx: &Context, path: &Path, out: &mut dyn Write) -> AppResult<()> {
    let loaded = LoadedDraft::load(ctx, path).await?;
    let totals = loaded.totals();

    if ctx.json {
        write_json(out, &totals)
    } else {
        write_totals(out, &totals, loaded.settings.tax_rate)
    }
}

async fn preview(
    ctx: &Context,
    path: &Path,
    target: Option<&Path>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let loaded = LoadedDraft::load(ctx, path).await?;
    let customer = loaded.customer(ctx).await?;
    let banks = ctx.db.bank_accounts().list().await?;

    let invoice = preview_invoice(
        customer.as_ref(),
        &loaded.draft.line_items,
        &loaded.totals(),
        loaded.salesperson(),
        &loaded.settings,
        Utc::now(),
    );
    let document = render_invoice_document(&invoice, &loaded.settings, &banks)?;

    match target {
        Some(file) => {
            std::fs::write(file, &document.html)?;
            writeln!(out, "Preview written to {}", file.display())?;
        }
        None => out.write_all(document.html.as_bytes())?,
    }
    Ok(())
}

async fn create(ctx: &Context, path: &Path, out: &mut dyn Write) -> AppResult<()> {
    let loaded = LoadedDraft::load(ctx, path).await?;

    let customer = match &loaded.draft.customer_id {
        Some(id) => Some(
            ctx.db
                .customers()
                .get_by_id(id)
                .await?
                .ok_or_else(|| AppError::not_found("Customer", id.clone()))?,
        ),
        None => None,
    };

    let salesperson = match loaded.draft.salesperson_id.as_deref() {
        Some(id) => Some(
            loaded
                .salesperson()
                .ok_or_else(|| AppError::not_found("Salesperson", id))?,
        ),
        None => None,
    };

    let invoice = assemble_invoice(
        customer.as_ref(),
        &loaded.draft.line_items,
        &loaded.totals(),
        salesperson,
        &loaded.settings,
        Utc::now(),
    )?;
    let saved = ctx.db.invoices().insert(&invoice).await?;

    info!(
        invoice_number = %saved.invoice_number,
        total = saved.total_amount,
        "Invoice created"
    );

    if ctx.json {
        write_json(out, &saved)
    } else {
        writeln!(
            out,
            "{} {}",
            saved.invoice_number,
            saved.id.as_deref().unwrap_or_default()
        )?;
        Ok(())
    }
}

// =============================================================================
// Saved Invoices
// =============================================================================

/// Invoice ids on the command line are the UUIDs `list` prints.
fn invoice_id(id: &str) -> AppResult<&str> {
    validate_uuid(id)?;
    Ok(id.trim())
}

fn status(invoice: &Invoice) -> &'static str {
    if invoice.is_settled() {
        "settled"
    } else {
        "outstanding"
    }
}

async fn fetch(ctx: &Context, id: &str) -> AppResult<Invoice> {
    let id = invoice_id(id)?;
    ctx.db
        .invoices()
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice", id))
}

async fn list(ctx: &Context, out: &mut dyn Write) -> AppResult<()> {
    let invoices = ctx.db.invoices().list().await?;
    write_records(
        ctx,
        out,
        &invoices,
        &["ID", "NUMBER", "DATE", "CUSTOMER", "TOTAL", "PAID", "DUE", "STATUS"],
        |i| {
            vec![
                i.id.clone().unwrap_or_default(),
                i.invoice_number.clone(),
                i.invoice_date.format("%Y-%m-%d").to_string(),
                i.customer_name.clone(),
                format_money(i.total_amount),
                format_money(i.total_paid),
                format_money(i.final_due),
                status(i).to_string(),
            ]
        },
    )
}

async fn show(ctx: &Context, id: &str, out: &mut dyn Write) -> AppResult<()> {
    let invoice = fetch(ctx, id).await?;
    if ctx.json {
        return write_json(out, &invoice);
    }

    writeln!(out, "Invoice:  {}", invoice.invoice_number)?;
    writeln!(out, "Date:     {}", invoice.invoice_date.format("%Y-%m-%d"))?;
    writeln!(out, "Customer: {}", invoice.customer_name)?;
    writeln!(out, "Status:   {}", status(&invoice))?;
    if let Some(name) = &invoice.salesperson_name {
        writeln!(out, "Salesperson: {}", name)?;
    }
    writeln!(out)?;

    let rows: Vec<Vec<String>> = invoice
        .products
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                (i + 1).to_string(),
                p.gsm.clone(),
                p.product_type.to_string(),
                format_number(p.quantity),
                p.length.map(format_number).unwrap_or_default(),
                p.width.map(format_number).unwrap_or_default(),
                format_money(p.square_meters),
                format_money(p.unit_price),
                format_money(p.line_total),
            ]
        })
        .collect();
    write_table(
        out,
        &["#", "GSM", "TYPE", "QTY", "LENGTH", "WIDTH", "SQ M", "PRICE", "TOTAL"],
        &rows,
    )?;
    writeln!(out)?;

    let totals = Totals {
        sub_total: invoice.sub_total,
        tax_amount: invoice.tax_amount,
        total_with_tax: invoice.total_amount,
        paid_amount: invoice.total_paid,
        final_due: invoice.final_due,
        total_square_meters: invoice.total_square_meters,
        commission_amount: invoice.commission_amount,
    };
    write_totals(out, &totals, invoice.tax_rate)
}

async fn pay(ctx: &Context, id: &str, amount: f64, out: &mut dyn Write) -> AppResult<()> {
    let id = invoice_id(id)?;
    validate_payment_amount(amount)?;

    let updated = ctx.db.invoices().apply_payment(id, amount).await?;

    if ctx.json {
        return write_json(out, &updated);
    }
    writeln!(
        out,
        "{}: paid {}, total paid {}, due {}",
        updated.invoice_number,
        format_money(amount),
        format_money(updated.total_paid),
        format_money(updated.final_due)
    )?;
    Ok(())
}

async fn print(
    ctx: &Context,
    id: &str,
    html: bool,
    dir: Option<&Path>,
    out: &mut dyn Write,
) -> AppResult<()> {
    let invoice = fetch(ctx, id).await?;
    let settings = ctx.db.settings().get().await?;
    let banks = ctx.db.bank_accounts().list().await?;
    let document = render_invoice_document(&invoice, &settings, &banks)?;

    let print_config = &ctx.config.print;
    let printed = if html {
        HtmlFileSink::new(dir.unwrap_or(&print_config.output_dir)).print(&document)?
    } else {
        SystemPrintSink::new(print_config.command_line())
            .keep_file(print_config.keep_file)
            .print(&document)?
    };

    match printed {
        Printed::Saved(path) => writeln!(out, "Saved {}", path.display())?,
        Printed::Sent { command } => writeln!(
            out,
            "Sent {} to printer ({})",
            invoice.invoice_number, command
        )?,
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
