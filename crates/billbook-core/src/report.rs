//! # CSV Reports
//!
//! Flat exports of already-computed invoice figures. Nothing here
//! recalculates an invoice: every amount comes from the stored record,
//! formatted with two decimals.
//!
//! ## Reports
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoices_csv            one row per invoice                            │
//! │  customer_summary_csv    one row per customer  (count, billed, paid,    │
//! │                                                 due)                    │
//! │  commission_report_csv   one row per salesperson (count, sales,         │
//! │                                                   commission)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoices whose customer or salesperson has since been deleted are
//! still counted, under the name frozen into the invoice.

use std::collections::{HashMap, HashSet};

use crate::error::{CoreError, CoreResult};
use crate::money::{format_money, sum_finite};
use crate::types::{Customer, Invoice, Salesperson};

pub const INVOICES_HEADER: [&str; 11] = [
    "Invoice Number",
    "Date",
    "Customer",
    "Salesperson",
    "Subtotal",
    "Tax",
    "Total",
    "Paid",
    "Due",
    "Square Meters",
    "Commission",
];

pub const CUSTOMER_SUMMARY_HEADER: [&str; 5] = ["Customer", "Invoices", "Billed", "Paid", "Due"];

pub const COMMISSION_HEADER: [&str; 5] = [
    "Salesperson",
    "Commission",
    "Invoices",
    "Sales",
    "Commission Earned",
];

fn csv_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> CoreResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CoreError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CoreError::Export(e.to_string()))
}

/// Invoices grouped under a key, in first-seen order.
struct InvoiceGroups<'a> {
    groups: Vec<(String, Vec<&'a Invoice>)>,
    index: HashMap<String, usize>,
}

impl<'a> InvoiceGroups<'a> {
    fn new<F>(invoices: &'a [Invoice], key: F) -> Self
    where
        F: Fn(&Invoice) -> Option<String>,
    {
        let mut groups: Vec<(String, Vec<&'a Invoice>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for invoice in invoices {
            let Some(k) = key(invoice) else { continue };
            match index.get(&k) {
                Some(&slot) => groups[slot].1.push(invoice),
                None => {
                    index.insert(k.clone(), groups.len());
                    groups.push((k, vec![invoice]));
                }
            }
        }
        InvoiceGroups { groups, index }
    }

    fn members(&self, key: &str) -> &[&'a Invoice] {
        self.index
            .get(key)
            .map(|&slot| self.groups[slot].1.as_slice())
            .unwrap_or(&[])
    }

    /// Groups whose key is not in `known`, in first-seen order.
    fn orphans(&self, known: &HashSet<&str>) -> Vec<(&str, &[&'a Invoice])> {
        self.groups
            .iter()
            .filter(|(key, _)| !known.contains(key.as_str()))
            .map(|(key, members)| (key.as_str(), members.as_slice()))
            .collect()
    }
}

// =============================================================================
// Invoices
// =============================================================================

/// One row per invoice, in the order given.
pub fn invoices_csv(invoices: &[Invoice]) -> CoreResult<String> {
    let mut csv = csv_writer();
    csv.write_record(INVOICES_HEADER)?;

    for invoice in invoices {
        csv.write_record([
            invoice.invoice_number.clone(),
            invoice.invoice_date.format("%Y-%m-%d").to_string(),
            invoice.customer_name.clone(),
            invoice.salesperson_name.clone().unwrap_or_default(),
            format_money(invoice.sub_total),
            format_money(invoice.tax_amount),
            format_money(invoice.total_amount),
            format_money(invoice.total_paid),
            format_money(invoice.final_due),
            format_money(invoice.total_square_meters),
            format_money(invoice.commission_amount),
        ])?;
    }

    finish(csv)
}

// =============================================================================
// Customers
// =============================================================================

/// Billing totals per customer.
///
/// Known customers come first, in the order given (including those with
/// no invoices). Invoices for customers no longer on file follow.
pub fn customer_summary_csv(customers: &[Customer], invoices: &[Invoice]) -> CoreResult<String> {
    let mut csv = csv_writer();
    csv.write_record(CUSTOMER_SUMMARY_HEADER)?;

    let groups = InvoiceGroups::new(invoices, |inv| Some(inv.customer_id.clone()));

    for customer in customers {
        write_customer_row(&mut csv, &customer.name, groups.members(&customer.id))?;
    }

    let known: HashSet<&str> = customers.iter().map(|c| c.id.as_str()).collect();
    for (_, members) in groups.orphans(&known) {
        write_customer_row(&mut csv, &members[0].customer_name, members)?;
    }

    finish(csv)
}

fn write_customer_row(
    csv: &mut csv::Writer<Vec<u8>>,
    name: &str,
    invoices: &[&Invoice],
) -> CoreResult<()> {
    csv.write_record([
        name.to_string(),
        invoices.len().to_string(),
        format_money(sum_finite(invoices.iter().map(|i| i.total_amount))),
        format_money(sum_finite(invoices.iter().map(|i| i.total_paid))),
        format_money(sum_finite(invoices.iter().map(|i| i.final_due))),
    ])?;
    Ok(())
}

// =============================================================================
// Commission
// =============================================================================

/// Sales and commission per salesperson.
///
/// "Sales" is the sum of invoice subtotals (before tax), the same base a
/// percentage commission is computed from.
pub fn commission_report_csv(
    salespersons: &[Salesperson],
    invoices: &[Invoice],
) -> CoreResult<String> {
    let mut csv = csv_writer();
    csv.write_record(COMMISSION_HEADER)?;

    let groups = InvoiceGroups::new(invoices, |inv| inv.salesperson_id.clone());

    for salesperson in salespersons {
        let description = salesperson
            .commission
            .map(|c| c.describe())
            .unwrap_or_else(|| "none".to_string());
        write_commission_row(
            &mut csv,
            &salesperson.name,
            &description,
            groups.members(&salesperson.id),
        )?;
    }

    let known: HashSet<&str> = salespersons.iter().map(|s| s.id.as_str()).collect();
    for (salesperson_id, members) in groups.orphans(&known) {
        let name = members[0]
            .salesperson_name
            .clone()
            .unwrap_or_else(|| salesperson_id.to_string());
        write_commission_row(&mut csv, &name, "unknown", members)?;
    }

    finish(csv)
}

fn write_commission_row(
    csv: &mut csv::Writer<Vec<u8>>,
    name: &str,
    description: &str,
    invoices: &[&Invoice],
) -> CoreResult<()> {
    csv.write_record([
        name.to_string(),
        description.to_string(),
        invoices.len().to_string(),
        format_money(sum_finite(invoices.iter().map(|i| i.sub_total))),
        format_money(sum_finite(invoices.iter().map(|i| i.commission_amount))),
    ])?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
