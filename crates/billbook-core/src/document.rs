//! # Invoice Document Renderer
//!
//! Builds the printable HTML for an invoice. No files, no windows, no
//! printers: handing the document to a printer is the caller's job.
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  [logo]  BUSINESS NAME                                     INVOICE      │
//! │          Office / Factory address, phone, email       No: INV-...       │
//! │                                                       Date: 5 March, .. │
//! │  ───────────────────────────────────────────────────────────────────── │
//! │  Bill To: name, address, phone, email                                  │
//! │                                                                         │
//! │  SL │ GSM │ Type │ Qty │ Length │ Width │ Sq. M │ Unit Price │ Amount  │
//! │   1 │ 120 │ sheet│  2  │  1.5   │  2    │ 3.00  │   50.00    │ 300.00  │
//! │   2 │  70 │ bag  │ 25  │   -    │  -    │   -   │    4.00    │ 100.00  │
//! │                                                                         │
//! │  Bank details (first account)          Subtotal / Tax / Total / Paid / │
//! │                                        Due                             │
//! │  ───────────────────────────────────────────────────────────────────── │
//! │  This is a computer-generated invoice. No signature is required.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The markup lives in `templates/invoice.html`. Everything is formatted
//! into strings here first; askama HTML-escapes each value as it is
//! written into the template.

use askama::Template;
use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::{format_money, format_number};
use crate::types::{BankAccount, BusinessSettings, Invoice, InvoiceProductSnapshot, ProductType};

/// Fixed footer line printed on every invoice.
pub const FOOTER_DISCLAIMER: &str =
    "This is a computer-generated invoice. No signature is required.";

/// A rendered, print-ready invoice.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDocument {
    /// Used for the HTML `<title>` and as a file name stem.
    pub title: String,
    pub html: String,
}

/// Formats a date as `D Month, YYYY`, e.g. `5 March, 2024`.
///
/// ## Example
/// ```rust
/// use billbook_core::document::format_invoice_date;
/// use chrono::{TimeZone, Utc};
///
/// let date = Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap();
/// assert_eq!(format_invoice_date(&date), "5 March, 2024");
/// ```
pub fn format_invoice_date(date: &DateTime<Utc>) -> String {
    date.format("%-d %B, %Y").to_string()
}

// =============================================================================
// Template Data
// =============================================================================

/// Bank details block contents, with literal placeholders when no
/// account exists.
struct BankDetails<'a> {
    bank_name: &'a str,
    bank_branch: &'a str,
    account_name: &'a str,
    account_number: &'a str,
    routing_number: &'a str,
}

impl<'a> BankDetails<'a> {
    /// Always the first account in the list, whatever
    /// `default_bank_account_id` says.
    fn from_accounts(accounts: &'a [BankAccount]) -> Self {
        match accounts.first() {
            Some(account) => BankDetails {
                bank_name: &account.bank_name,
                bank_branch: &account.bank_branch,
                account_name: &account.account_name,
                account_number: &account.account_number,
                routing_number: &account.routing_number,
            },
            None => BankDetails {
                bank_name: "Bank Name",
                bank_branch: "Branch",
                account_name: "Account Holder",
                account_number: "Account Number",
                routing_number: "Routing Number",
            },
        }
    }
}

struct ContactLine<'a> {
    label: &'static str,
    value: &'a str,
}

/// One product line, already formatted. Bags print `-` for the sheet-only
/// columns.
struct LineRow<'a> {
    serial: usize,
    gsm: &'a str,
    product_type: ProductType,
    quantity: String,
    length: String,
    width: String,
    area: String,
    unit_price: String,
    amount: String,
}

impl<'a> LineRow<'a> {
    fn new(serial: usize, line: &'a InvoiceProductSnapshot) -> Self {
        let (length, width, area) = match line.product_type {
            ProductType::Sheet => (
                format_number(line.length.unwrap_or(0.0)),
                format_number(line.width.unwrap_or(0.0)),
                format_money(line.square_meters),
            ),
            ProductType::Bag => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        LineRow {
            serial,
            gsm: &line.gsm,
            product_type: line.product_type,
            quantity: format_number(line.quantity),
            length,
            width,
            area,
            unit_price: format_money(line.unit_price),
            amount: format_money(line.line_total),
        }
    }
}

struct TotalRow {
    label: String,
    amount: String,
}

#[derive(Template)]
#[template(path = "invoice.html")]
struct InvoiceTemplate<'a> {
    title: &'a str,
    logo_url: &'a str,
    business_name: &'a str,
    contact_lines: Vec<ContactLine<'a>>,
    invoice_number: &'a str,
    invoice_date: String,
    customer_name: &'a str,
    customer_lines: Vec<&'a str>,
    rows: Vec<LineRow<'a>>,
    bank: BankDetails<'a>,
    /// Empty when the invoice has no salesperson.
    salesperson: &'a str,
    totals: Vec<TotalRow>,
    footer: &'static str,
}

fn non_blank(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

impl<'a> InvoiceTemplate<'a> {
    fn new(
        title: &'a str,
        invoice: &'a Invoice,
        settings: &'a BusinessSettings,
        bank_accounts: &'a [BankAccount],
    ) -> Self {
        let contact_lines = [
            ("Office", settings.office_address.as_str()),
            ("Factory", settings.factory_address.as_str()),
            ("Phone", settings.phone.as_str()),
            ("Email", settings.email.as_str()),
        ]
        .into_iter()
        .filter_map(|(label, value)| non_blank(value).map(|value| ContactLine { label, value }))
        .collect();

        let customer_lines = [
            &invoice.customer_address,
            &invoice.customer_phone,
            &invoice.customer_email,
        ]
        .into_iter()
        .filter_map(|value| non_blank(value))
        .collect();

        let totals = [
            ("Total Sq. M".to_string(), invoice.total_square_meters),
            ("Subtotal".to_string(), invoice.sub_total),
            (
                format!("Tax ({}%)", format_number(invoice.tax_rate)),
                invoice.tax_amount,
            ),
            ("Total".to_string(), invoice.total_amount),
            ("Paid".to_string(), invoice.total_paid),
            ("Due".to_string(), invoice.final_due),
        ]
        .into_iter()
        .map(|(label, amount)| TotalRow {
            label,
            amount: format_money(amount),
        })
        .collect();

        InvoiceTemplate {
            title,
            logo_url: settings.logo_url.trim(),
            business_name: &settings.name,
            contact_lines,
            invoice_number: &invoice.invoice_number,
            invoice_date: format_invoice_date(&invoice.invoice_date),
            customer_name: &invoice.customer_name,
            customer_lines,
            rows: invoice
                .products
                .iter()
                .enumerate()
                .map(|(index, line)| LineRow::new(index + 1, line))
                .collect(),
            bank: BankDetails::from_accounts(bank_accounts),
            salesperson: invoice
                .salesperson_name
                .as_deref()
                .and_then(non_blank)
                .unwrap_or_default(),
            totals,
            footer: FOOTER_DISCLAIMER,
        }
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Renders the printable document for a saved or previewed invoice.
///
/// ## Arguments
/// * `invoice` - The record to print; no storage id needed
/// * `settings` - Business header (name, addresses, contact, logo)
/// * `bank_accounts` - Only the first entry is printed
pub fn render_invoice_document(
    invoice: &Invoice,
    settings: &BusinessSettings,
    bank_accounts: &[BankAccount],
) -> CoreResult<InvoiceDocument> {
    let title = format!("Invoice {}", invoice.invoice_number);
    let html = InvoiceTemplate::new(&title, invoice, settings, bank_accounts)
        .render()
        .map_err(|e| CoreError::Render(e.to_string()))?;

    Ok(InvoiceDocument { title, html })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_totals;
    use crate::invoice::{assemble_invoice, preview_invoice};
    use crate::numeric::NumericInput;
    use crate::types::{Customer, LineItem, Product};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap()
    }

    fn settings() -> BusinessSettings {
        BusinessSettings {
            name: "Paper & Co".to_string(),
            office_address: "1 Office Lane".to_string(),
            phone: "555-0100".to_string(),
            tax_rate: 10.0,
            ..BusinessSettings::default()
        }
    }

    fn customer() -> Customer {
        Customer {
            id: "c-1".to_string(),
            name: "Rahman <Traders>".to_string(),
            address: "12 Mill Road".to_string(),
            phone: String::new(),
            email: String::new(),
        }
    }

    fn rows() -> Vec<LineItem> {
        let sheet = Product {
            id: "p-sheet".to_string(),
            gsm: "120".to_string(),
            product_type: ProductType::Sheet,
            unit_price: 33.333,
        };
        let bag = Product {
            id: "p-bag".to_string(),
            gsm: "70".to_string(),
            product_type: ProductType::Bag,
            unit_price: 4.0,
        };
        vec![
            LineItem::new()
                .select_product(&sheet)
                .with_quantity("3")
                .with_length("1.5")
                .with_width("2"),
            LineItem::new().select_product(&bag).with_quantity("25"),
        ]
    }

    fn saved_invoice() -> Invoice {
        let rows = rows();
        let totals = calculate_totals(&rows, 10.0, &NumericInput::from("100"), &[], None);
        let mut invoice =
            assemble_invoice(Some(&customer()), &rows, &totals, None, &settings(), now()).unwrap();
        invoice.id = Some("0b8f7c1e-0000-4000-8000-000000000001".to_string());
        invoice
    }

    fn bank() -> BankAccount {
        BankAccount {
            id: "b-1".to_string(),
            bank_name: "City Bank".to_string(),
            bank_branch: "Gulshan".to_string(),
            account_name: "Paper Works Ltd".to_string(),
            account_number: "0012345".to_string(),
            routing_number: "225".to_string(),
        }
    }

    #[test]
    fn test_logo_url_cannot_break_out_of_attribute() {
        let mut settings = settings();
        settings.logo_url = r#"logo.png" onerror="alert(1)"#.to_string();

        let doc = render_invoice_document(&saved_invoice(), &settings, &[]).unwrap();

        assert!(doc.html.contains("<img src=\"logo.png&quot; onerror=&quot;alert(1)\""));
        assert!(!doc.html.contains("onerror=\"alert"));
    }

    #[test]
    fn test_blank_logo_and_contact_fields_are_skipped() {
        let doc = render_invoice_document(&saved_invoice(), &settings(), &[]).unwrap();

        assert!(!doc.html.contains("<img"));
        assert!(doc.html.contains("<div>Office: 1 Office Lane</div>"));
        assert!(doc.html.contains("<div>Phone: 555-0100</div>"));
        assert!(!doc.html.contains("Factory:"));
        assert!(!doc.html.contains("Salesperson:"));
    }

    #[test]
    fn test_date_has_no_leading_zero() {
        let date = Utc.with_ymd_and_hms(2023, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(format_invoice_date(&date), "25 December, 2023");
        assert_eq!(format_invoice_date(&now()), "5 March, 2024");
    }

    #[test]
    fn test_renders_header_and_escapes_text() {
        let doc = render_invoice_document(&saved_invoice(), &settings(), &[bank()]).unwrap();

        assert!(doc.title.starts_with("Invoice INV-"));
        assert!(doc.html.contains("<h1>Paper &amp; Co</h1>"));
        assert!(doc.html.contains("Rahman &lt;Traders&gt;"));
        assert!(!doc.html.contains("Rahman <Traders>"));
        assert!(doc.html.contains("Date: 5 March, 2024"));
        assert!(doc.html.contains(FOOTER_DISCLAIMER));
    }

    #[test]
    fn test_lines_are_numbered_and_bags_show_dashes() {
        let doc = render_invoice_document(&saved_invoice(), &settings(), &[bank()]).unwrap();

        assert!(doc.html.contains(
            "<tr><td class=\"num\">1</td><td>120</td><td>sheet</td>\
<td class=\"num\">3</td><td class=\"num\">1.5</td><td class=\"num\">2</td>\
<td class=\"num\">3.00</td><td class=\"num\">33.33</td><td class=\"num\">300.00</td></tr>"
        ));
        assert!(doc.html.contains(
            "<tr><td class=\"num\">2</td><td>70</td><td>bag</td>\
<td class=\"num\">25</td><td class=\"num\">-</td><td class=\"num\">-</td>\
<td class=\"num\">-</td><td class=\"num\">4.00</td><td class=\"num\">100.00</td></tr>"
        ));
    }

    #[test]
    fn test_first_bank_account_is_used() {
        let mut second = bank();
        second.bank_name = "Other Bank".to_string();
        let mut settings = settings();
        settings.default_bank_account_id = Some(second.id.clone());

        let doc = render_invoice_document(&saved_invoice(), &settings, &[bank(), second]).unwrap();

        assert!(doc.html.contains("Bank: City Bank"));
        assert!(!doc.html.contains("Other Bank"));
    }

    #[test]
    fn test_missing_bank_account_uses_placeholders() {
        let doc = render_invoice_document(&saved_invoice(), &settings(), &[]).unwrap();

        assert!(doc.html.contains("Bank: Bank Name"));
        assert!(doc.html.contains("Branch: Branch"));
        assert!(doc.html.contains("Account Name: Account Holder"));
        assert!(doc.html.contains("Account No: Account Number"));
        assert!(doc.html.contains("Routing No: Routing Number"));
    }

    #[test]
    fn test_rendered_amounts_match_invoice() {
        let invoice = saved_invoice();
        let doc = render_invoice_document(&invoice, &settings(), &[bank()]).unwrap();

        for amount in [
            invoice.sub_total,
            invoice.tax_amount,
            invoice.total_amount,
            invoice.total_paid,
            invoice.final_due,
        ] {
            let printed = format_money(amount);
            assert!(doc.html.contains(&format!("<td class=\"num\">{}</td>", printed)));
            // Re-formatting the printed figure gives the same text.
            assert_eq!(format_money(printed.parse::<f64>().unwrap()), printed);
        }
        assert!(doc.html.contains("<tr><td>Subtotal</td><td class=\"num\">400.00</td></tr>"));
        assert!(doc.html.contains("<tr><td>Tax (10%)</td>"));
    }

    #[test]
    fn test_nan_amounts_render_as_zero() {
        let mut invoice = saved_invoice();
        invoice.final_due = f64::NAN;

        let doc = render_invoice_document(&invoice, &settings(), &[]).unwrap();
        assert!(doc.html.contains("<tr><td>Due</td><td class=\"num\">0.00</td></tr>"));
        assert!(!doc.html.contains("NaN"));
    }

    #[test]
    fn test_preview_renders_without_id() {
        let rows = rows();
        let totals = calculate_totals(&rows, 10.0, &NumericInput::blank(), &[], None);
        let preview = preview_invoice(None, &rows, &totals, None, &settings(), now());

        let doc = render_invoice_document(&preview, &settings(), &[]).unwrap();
        assert_eq!(doc.title, "Invoice PREVIEW");
        assert!(doc.html.contains("Invoice No: <strong>PREVIEW</strong>"));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let invoice = saved_invoice();
        let a = render_invoice_document(&invoice, &settings(), &[bank()]).unwrap();
        let b = render_invoice_document(&invoice, &settings(), &[bank()]).unwrap();
        assert_eq!(a, b);
    }
}
