//! # Invoice Assembly & Payments
//!
//! Turns a validated draft into an immutable [`Invoice`] record and
//! applies payments to existing invoices.
//!
//! ## Invoice Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Invoice Lifecycle                                 │
//! │                                                                         │
//! │  1. ASSEMBLE                                                           │
//! │     └── assemble_invoice() → Invoice { id: None, number: INV-<ms> }    │
//! │         (customer, salesperson and tax rate frozen here)               │
//! │                                                                         │
//! │  2. PERSIST (billbook-db)                                              │
//! │     └── insert() → Invoice { id: Some(uuid) }                          │
//! │                                                                         │
//! │  3. PAY (any number of times)                                          │
//! │     └── apply_payment() → total_paid += amount                         │
//! │                           final_due = total_amount - total_paid        │
//! │                                                                         │
//! │  4. DELETE (hard, no undo)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoice numbers are millisecond timestamps. That is unique enough for
//! one business creating invoices from one place at a time; concurrent
//! writers would need a centrally issued sequence.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calculator::Totals;
use crate::error::ValidationError;
use crate::types::{
    BusinessSettings, Customer, Invoice, InvoiceProductSnapshot, LineItem, ProductType,
    Salesperson,
};
use crate::validation::ValidationResult;
use crate::{INVOICE_NUMBER_PREFIX, PREVIEW_INVOICE_NUMBER};

// =============================================================================
// Numbering
// =============================================================================

/// Generates an invoice number: `INV-<unix millis>`.
///
/// ## Example
/// ```rust
/// use billbook_core::invoice::generate_invoice_number;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
/// assert_eq!(generate_invoice_number(at), "INV-1700000000123");
/// ```
pub fn generate_invoice_number(now: DateTime<Utc>) -> String {
    format!("{}{}", INVOICE_NUMBER_PREFIX, now.timestamp_millis())
}

// =============================================================================
// Assembly
// =============================================================================

/// Checks that every row is complete enough to be invoiced.
///
/// ## Rules
/// - At least one row
/// - Every row has a product
/// - Every row has a numeric quantity
/// - Sheet rows have numeric length and width
pub fn validate_line_items(line_items: &[LineItem]) -> ValidationResult<()> {
    if line_items.is_empty() {
        return Err(ValidationError::NoLineItems);
    }

    for (index, item) in line_items.iter().enumerate() {
        let line = index + 1;

        if item
            .product_id
            .as_deref()
            .map_or(true, |id| id.trim().is_empty())
        {
            return Err(ValidationError::line(line, "product is required"));
        }

        if item.quantity.parse().is_none() {
            return Err(ValidationError::line(line, "quantity must be a valid number"));
        }

        if item.product_type == ProductType::Sheet {
            if item.length.parse().is_none() {
                return Err(ValidationError::line(
                    line,
                    "length is required for sheet products",
                ));
            }
            if item.width.parse().is_none() {
                return Err(ValidationError::line(
                    line,
                    "width is required for sheet products",
                ));
            }
        }
    }

    Ok(())
}

/// Builds the invoice record for a finished draft.
///
/// ## Arguments
/// * `customer` - The selected customer (`None` is rejected)
/// * `line_items` - Draft rows; frozen into snapshots
/// * `totals` - Output of the calculator for the same rows
/// * `salesperson` - Credited salesperson, if any
/// * `settings` - Source of the tax rate copied into the invoice
/// * `now` - Creation time; also drives the invoice number
///
/// ## Errors
/// A [`ValidationError`] naming the first problem. Nothing is produced
/// on failure and the inputs are untouched, so the caller's form state
/// survives.
pub fn assemble_invoice(
    customer: Option<&Customer>,
    line_items: &[LineItem],
    totals: &Totals,
    salesperson: Option<&Salesperson>,
    settings: &BusinessSettings,
    now: DateTime<Utc>,
) -> ValidationResult<Invoice> {
    let customer = customer.ok_or_else(|| ValidationError::required("customer"))?;
    validate_line_items(line_items)?;

    let invoice = build_invoice(
        generate_invoice_number(now),
        Some(customer),
        line_items,
        totals,
        salesperson,
        settings,
        now,
    );

    debug!(
        invoice_number = %invoice.invoice_number,
        lines = invoice.products.len(),
        total = invoice.total_amount,
        "Invoice assembled"
    );

    Ok(invoice)
}

/// Builds an unsaved invoice for on-screen or printed preview.
///
/// Nothing is validated: incomplete rows appear with zero amounts, a
/// missing customer leaves the bill-to block empty, and the invoice
/// number is the `PREVIEW` placeholder.
pub fn preview_invoice(
    customer: Option<&Customer>,
    line_items: &[LineItem],
    totals: &Totals,
    salesperson: Option<&Salesperson>,
    settings: &BusinessSettings,
    now: DateTime<Utc>,
) -> Invoice {
    build_invoice(
        PREVIEW_INVOICE_NUMBER.to_string(),
        customer,
        line_items,
        totals,
        salesperson,
        settings,
        now,
    )
}

fn build_invoice(
    invoice_number: String,
    customer: Option<&Customer>,
    line_items: &[LineItem],
    totals: &Totals,
    salesperson: Option<&Salesperson>,
    settings: &BusinessSettings,
    now: DateTime<Utc>,
) -> Invoice {
    let total_amount = totals.sub_total + totals.tax_amount;

    Invoice {
        id: None,
        invoice_number,
        invoice_date: now,
        customer_id: customer.map(|c| c.id.clone()).unwrap_or_default(),
        customer_name: customer.map(|c| c.name.clone()).unwrap_or_default(),
        customer_address: customer.map(|c| c.address.clone()).unwrap_or_default(),
        customer_phone: customer.map(|c| c.phone.clone()).unwrap_or_default(),
        customer_email: customer.map(|c| c.email.clone()).unwrap_or_default(),
        products: line_items
            .iter()
            .map(InvoiceProductSnapshot::from_line)
            .collect(),
        sub_total: totals.sub_total,
        tax_rate: settings.tax_rate,
        tax_amount: totals.tax_amount,
        total_amount,
        total_paid: totals.paid_amount,
        final_due: total_amount - totals.paid_amount,
        total_square_meters: totals.total_square_meters,
        salesperson_id: salesperson.map(|s| s.id.clone()),
        salesperson_name: salesperson.map(|s| s.name.clone()),
        commission_amount: totals.commission_amount,
        created_at: now,
    }
}

// =============================================================================
// Payments
// =============================================================================

impl Invoice {
    /// Returns a copy with `amount` added to the paid total.
    ///
    /// `final_due` is recomputed from `total_amount - total_paid`, never
    /// adjusted by the payment directly. Negative amounts are accepted as
    /// corrections.
    ///
    /// ## Example
    /// ```rust,ignore
    /// // total 1000, paid 300, due 700
    /// let paid = invoice.apply_payment(200.0)?;
    /// assert_eq!(paid.total_paid, 500.0);
    /// assert_eq!(paid.final_due, 500.0);
    /// ```
    pub fn apply_payment(&self, amount: f64) -> ValidationResult<Invoice> {
        if !amount.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "payment amount".to_string(),
            });
        }
        self.with_total_paid(self.total_paid + amount)
    }

    /// Returns a copy with the paid total replaced (for corrections).
    pub fn with_total_paid(&self, total_paid: f64) -> ValidationResult<Invoice> {
        if !total_paid.is_finite() {
            return Err(ValidationError::InvalidNumber {
                field: "total paid".to_string(),
            });
        }

        let mut updated = self.clone();
        updated.total_paid = total_paid;
        updated.final_due = updated.total_amount - total_paid;
        Ok(updated)
    }

    /// True once nothing is left to pay.
    pub fn is_settled(&self) -> bool {
        self.final_due <= 0.0
    }

    /// True for invoices built by [`preview_invoice`].
    pub fn is_preview(&self) -> bool {
        self.invoice_number == PREVIEW_INVOICE_NUMBER
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::calculate_totals;
    use crate::numeric::NumericInput;
    use crate::types::{Commission, Product};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 10, 30, 0).unwrap()
    }

    fn customer() -> Customer {
        Customer {
            id: "c-1".to_string(),
            name: "Rahman Traders".to_string(),
            address: "12 Mill Road".to_string(),
            phone: "555-0101".to_string(),
            email: "orders@rahman.test".to_string(),
        }
    }

    fn settings() -> BusinessSettings {
        BusinessSettings {
            name: "Paper Works".to_string(),
            tax_rate: 10.0,
            ..BusinessSettings::default()
        }
    }

    fn sheet() -> Product {
        Product {
            id: "p-sheet".to_string(),
            gsm: "120".to_string(),
            product_type: ProductType::Sheet,
            unit_price: 50.0,
        }
    }

    fn bag() -> Product {
        Product {
            id: "p-bag".to_string(),
            gsm: "70".to_string(),
            product_type: ProductType::Bag,
            unit_price: 4.0,
        }
    }

    fn rows() -> Vec<LineItem> {
        vec![
            LineItem::new()
                .select_product(&sheet())
                .with_quantity("2")
                .with_length("1.5")
                .with_width("2"),
            LineItem::new().select_product(&bag()).with_quantity("25"),
        ]
    }

    fn rep() -> Salesperson {
        Salesperson {
            id: "s-1".to_string(),
            name: "Nadia".to_string(),
            commission: Some(Commission::percentage(5.0).unwrap()),
        }
    }

    #[test]
    fn test_invoice_number_format() {
        let number = generate_invoice_number(now());
        assert!(number.starts_with("INV-"));
        assert_eq!(number, format!("INV-{}", now().timestamp_millis()));
    }

    #[test]
    fn test_assemble_freezes_snapshot_fields() {
        let rows = rows();
        let reps = vec![rep()];
        let totals = calculate_totals(&rows, 10.0, &NumericInput::from("100"), &reps, Some("s-1"));

        let invoice =
            assemble_invoice(Some(&customer()), &rows, &totals, Some(&rep()), &settings(), now())
                .unwrap();

        assert_eq!(invoice.id, None);
        assert_eq!(invoice.customer_name, "Rahman Traders");
        assert_eq!(invoice.customer_email, "orders@rahman.test");
        assert_eq!(invoice.salesperson_name.as_deref(), Some("Nadia"));
        assert_eq!(invoice.tax_rate, 10.0);
        assert_eq!(invoice.products.len(), 2);
        assert_eq!(invoice.products[0].square_meters, 3.0);
        assert_eq!(invoice.products[0].line_total, 300.0);
        assert_eq!(invoice.products[1].line_total, 100.0);
        assert_eq!(invoice.sub_total, 400.0);
        assert_eq!(invoice.total_amount, invoice.sub_total + invoice.tax_amount);
        assert_eq!(invoice.final_due, invoice.total_amount - invoice.total_paid);
        assert_eq!(invoice.total_paid, 100.0);
        assert_eq!(invoice.created_at, now());
    }

    #[test]
    fn test_later_customer_edits_do_not_touch_invoice() {
        let rows = rows();
        let totals = calculate_totals(&rows, 0.0, &NumericInput::blank(), &[], None);
        let mut cust = customer();

        let invoice =
            assemble_invoice(Some(&cust), &rows, &totals, None, &settings(), now()).unwrap();
        cust.name = "Renamed Ltd".to_string();

        assert_eq!(invoice.customer_name, "Rahman Traders");
        assert_eq!(invoice.salesperson_id, None);
    }

    #[test]
    fn test_assemble_requires_customer() {
        let rows = rows();
        let totals = calculate_totals(&rows, 0.0, &NumericInput::blank(), &[], None);

        let err = assemble_invoice(None, &rows, &totals, None, &settings(), now()).unwrap_err();
        assert_eq!(err, ValidationError::required("customer"));
    }

    #[test]
    fn test_assemble_requires_lines() {
        let totals = Totals::default();
        let err =
            assemble_invoice(Some(&customer()), &[], &totals, None, &settings(), now()).unwrap_err();
        assert_eq!(err, ValidationError::NoLineItems);
    }

    #[test]
    fn test_assemble_rejects_incomplete_rows() {
        let totals = Totals::default();

        let no_product = vec![LineItem::new().with_quantity("1")];
        let err = assemble_invoice(Some(&customer()), &no_product, &totals, None, &settings(), now())
            .unwrap_err();
        assert_eq!(err, ValidationError::line(1, "product is required"));

        let bad_quantity = vec![
            LineItem::new().select_product(&bag()).with_quantity("3"),
            LineItem::new().select_product(&bag()).with_quantity("lots"),
        ];
        let err =
            assemble_invoice(Some(&customer()), &bad_quantity, &totals, None, &settings(), now())
                .unwrap_err();
        assert_eq!(err, ValidationError::line(2, "quantity must be a valid number"));

        let no_width = vec![LineItem::new()
            .select_product(&sheet())
            .with_quantity("1")
            .with_length("2")];
        let err = assemble_invoice(Some(&customer()), &no_width, &totals, None, &settings(), now())
            .unwrap_err();
        assert_eq!(err, ValidationError::line(1, "width is required for sheet products"));
    }

    #[test]
    fn test_bag_rows_do_not_need_dimensions() {
        let rows = vec![LineItem::new().select_product(&bag()).with_quantity("3")];
        assert!(validate_line_items(&rows).is_ok());
    }

    #[test]
    fn test_preview_skips_validation() {
        let rows = vec![LineItem::new().with_quantity("oops")];
        let totals = calculate_totals(&rows, 0.0, &NumericInput::blank(), &[], None);

        let invoice = preview_invoice(None, &rows, &totals, None, &settings(), now());

        assert!(invoice.is_preview());
        assert_eq!(invoice.id, None);
        assert_eq!(invoice.customer_name, "");
        assert_eq!(invoice.products[0].line_total, 0.0);
    }

    fn invoice_with(total_amount: f64, total_paid: f64) -> Invoice {
        let rows = rows();
        let totals = calculate_totals(&rows, 0.0, &NumericInput::blank(), &[], None);
        let mut invoice =
            assemble_invoice(Some(&customer()), &rows, &totals, None, &settings(), now()).unwrap();
        invoice.sub_total = total_amount;
        invoice.tax_amount = 0.0;
        invoice.total_amount = total_amount;
        invoice.with_total_paid(total_paid).unwrap()
    }

    #[test]
    fn test_apply_payment_recomputes_due() {
        let invoice = invoice_with(1000.0, 300.0);
        assert_eq!(invoice.final_due, 700.0);

        let paid = invoice.apply_payment(200.0).unwrap();
        assert_eq!(paid.total_paid, 500.0);
        assert_eq!(paid.final_due, 500.0);
        assert!(!paid.is_settled());

        // The original record is untouched.
        assert_eq!(invoice.total_paid, 300.0);
    }

    #[test]
    fn test_due_is_derived_not_adjusted() {
        let mut invoice = invoice_with(1000.0, 300.0);
        // A stale due value must not survive a payment.
        invoice.final_due = 12345.0;

        let paid = invoice.apply_payment(100.0).unwrap();
        assert_eq!(paid.final_due, 600.0);
    }

    #[test]
    fn test_corrections_and_settlement() {
        let invoice = invoice_with(1000.0, 1000.0);
        assert!(invoice.is_settled());

        let corrected = invoice.apply_payment(-250.0).unwrap();
        assert_eq!(corrected.total_paid, 750.0);
        assert_eq!(corrected.final_due, 250.0);

        assert!(invoice.apply_payment(f64::NAN).is_err());
        assert!(invoice.with_total_paid(f64::INFINITY).is_err());
    }
}
