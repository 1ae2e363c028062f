//! # Invoice Totals Calculator
//!
//! Derives every invoice figure from the current draft rows.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  line items ──► Σ line_total ───────────────► sub_total                 │
//! │                                                  │                      │
//! │  tax rate % ──────────────────────► × rate/100 ──► tax_amount           │
//! │                                                  │                      │
//! │                          sub_total + tax_amount ──► total_with_tax      │
//! │                                                  │                      │
//! │  paid input ──► lenient parse ──► paid_amount ───► final_due            │
//! │                                                                         │
//! │  sheet rows ──► Σ quantity × sq m ──────────────► total_square_meters   │
//! │                                                                         │
//! │  salesperson ──► Percentage: sub_total × rate/100                       │
//! │              └─► Fixed: Σ sheet qty × sq m × sheet rate                 │
//! │                        + Σ bag qty × bag rate   ──► commission_amount   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Purity
//! Called on every keystroke, so it must be deterministic and cheap:
//! no clock, no I/O, no shared state. Nothing non-finite escapes: each
//! term is zeroed before it is added, and so is any sum that overflows.

use serde::{Deserialize, Serialize};

use crate::money::sum_finite;
use crate::numeric::{finite_or_zero, NumericInput};
use crate::types::{Commission, LineItem, ProductType, Salesperson};

// =============================================================================
// Totals
// =============================================================================

/// Everything the invoice form displays below the product table.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub sub_total: f64,
    pub tax_amount: f64,
    pub total_with_tax: f64,
    pub paid_amount: f64,
    pub final_due: f64,
    pub total_square_meters: f64,
    pub commission_amount: f64,
}

/// Computes invoice totals for a set of draft rows.
///
/// ## Arguments
/// * `line_items` - Draft rows in display order
/// * `tax_rate_percent` - e.g. `10.0` for 10%
/// * `total_paid` - Amount paid so far, as typed (blank/garbage → 0;
///   negative values pass through untouched)
/// * `salespersons` - All salespersons
/// * `selected_salesperson_id` - The chosen one, if any; an id that
///   matches nobody earns no commission
///
/// ## Example
/// ```rust
/// use billbook_core::calculator::calculate_totals;
/// use billbook_core::numeric::NumericInput;
///
/// let totals = calculate_totals(&[], 5.0, &NumericInput::blank(), &[], None);
/// assert_eq!(totals.sub_total, 0.0);
/// assert_eq!(totals.final_due, 0.0);
/// ```
pub fn calculate_totals(
    line_items: &[LineItem],
    tax_rate_percent: f64,
    total_paid: &NumericInput,
    salespersons: &[Salesperson],
    selected_salesperson_id: Option<&str>,
) -> Totals {
    let sub_total = sum_finite(line_items.iter().map(LineItem::line_total));
    let tax_amount = finite_or_zero(sub_total * (tax_rate_percent / 100.0));
    let total_with_tax = finite_or_zero(sub_total + tax_amount);
    let paid_amount = total_paid.value_or_zero();
    let final_due = finite_or_zero(total_with_tax - paid_amount);

    let total_square_meters = sum_finite(
        line_items
            .iter()
            .filter(|item| item.product_type == ProductType::Sheet)
            .map(|item| item.quantity.value_or_zero() * item.square_meters()),
    );

    let commission = selected_salesperson_id
        .and_then(|id| salespersons.iter().find(|s| s.id == id))
        .and_then(|s| s.commission.as_ref());
    let commission_amount = match commission {
        Some(commission) => commission_for(commission, line_items, sub_total),
        None => 0.0,
    };

    Totals {
        sub_total,
        tax_amount,
        total_with_tax,
        paid_amount,
        final_due,
        total_square_meters,
        commission_amount,
    }
}

/// Commission earned on a set of rows.
fn commission_for(commission: &Commission, line_items: &[LineItem], sub_total: f64) -> f64 {
    match commission {
        Commission::Percentage { rate } => finite_or_zero(sub_total * (rate.value() / 100.0)),
        Commission::Fixed(rates) => sum_finite(line_items.iter().map(|item| {
            let quantity = item.quantity.value_or_zero();
            match item.product_type {
                ProductType::Sheet => rates
                    .sheet_rate()
                    .map_or(0.0, |rate| quantity * item.square_meters() * rate),
                ProductType::Bag => rates.bag_rate().map_or(0.0, |rate| quantity * rate),
            }
        })),
    }
}

// =============================================================================
// Invoice Draft
// =============================================================================

/// The in-progress invoice form as one immutable value.
///
/// Every edit returns a new draft, so the totals shown are always
/// computed from exactly the state that produced them.
///
/// ## Example
/// ```rust
/// use billbook_core::calculator::InvoiceDraft;
/// use billbook_core::types::LineItem;
///
/// let draft = InvoiceDraft::new()
///     .with_customer("c-1")
///     .with_line(LineItem::new())
///     .with_total_paid("100");
///
/// assert_eq!(draft.line_items.len(), 1);
/// assert_eq!(draft.totals(0.0, &[]).final_due, -100.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDraft {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub total_paid: NumericInput,
    #[serde(default)]
    pub salesperson_id: Option<String>,
}

impl InvoiceDraft {
    /// An empty form.
    pub fn new() -> Self {
        InvoiceDraft::default()
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_salesperson(mut self, salesperson_id: Option<String>) -> Self {
        self.salesperson_id = salesperson_id;
        self
    }

    pub fn with_total_paid(mut self, total_paid: impl Into<NumericInput>) -> Self {
        self.total_paid = total_paid.into();
        self
    }

    /// Appends a row.
    pub fn with_line(mut self, line: LineItem) -> Self {
        self.line_items.push(line);
        self
    }

    /// Replaces the row with the same id; unknown ids leave the draft as is.
    pub fn replace_line(mut self, line: LineItem) -> Self {
        if let Some(slot) = self.line_items.iter_mut().find(|l| l.id == line.id) {
            *slot = line;
        }
        self
    }

    /// Removes the row with the given id.
    pub fn remove_line(mut self, line_id: &str) -> Self {
        self.line_items.retain(|l| l.id != line_id);
        self
    }

    /// Totals for the current state of the form.
    pub fn totals(&self, tax_rate_percent: f64, salespersons: &[Salesperson]) -> Totals {
        calculate_totals(
            &self.line_items,
            tax_rate_percent,
            &self.total_paid,
            salespersons,
            self.salesperson_id.as_deref(),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;

    fn approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    /// Sheet row with quantity 2 and 1 m² priced so that its total is 1000.
    fn sheet_row() -> LineItem {
        LineItem::new()
            .select_product(&Product {
                id: "sheet".to_string(),
                gsm: "120".to_string(),
                product_type: ProductType::Sheet,
                unit_price: 500.0,
            })
            .with_quantity("2")
            .with_length("1")
            .with_width("1")
    }

    /// Bag row with quantity 5 totalling 500.
    fn bag_row() -> LineItem {
        LineItem::new()
            .select_product(&Product {
                id: "bag".to_string(),
                gsm: "70".to_string(),
                product_type: ProductType::Bag,
                unit_price: 100.0,
            })
            .with_quantity("5")
    }

    fn salesperson(id: &str, commission: Option<Commission>) -> Salesperson {
        Salesperson {
            id: id.to_string(),
            name: format!("Rep {}", id),
            commission,
        }
    }

    #[test]
    fn test_empty_invoice_is_all_zero() {
        let reps = vec![salesperson("s1", Some(Commission::percentage(5.0).unwrap()))];
        let totals = calculate_totals(&[], 15.0, &NumericInput::blank(), &reps, Some("s1"));

        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_percentage_commission_example() {
        let reps = vec![salesperson("s1", Some(Commission::percentage(5.0).unwrap()))];
        let rows = vec![sheet_row(), bag_row()];

        let totals = calculate_totals(&rows, 10.0, &NumericInput::from("200"), &reps, Some("s1"));

        approx(totals.sub_total, 1500.0);
        approx(totals.tax_amount, 150.0);
        approx(totals.total_with_tax, 1650.0);
        approx(totals.paid_amount, 200.0);
        approx(totals.final_due, 1450.0);
        approx(totals.commission_amount, 75.0);
        approx(totals.total_square_meters, 2.0);
    }

    #[test]
    fn test_fixed_commission_example() {
        let reps = vec![salesperson(
            "s2",
            Some(Commission::fixed(Some(2.0), Some(1.0)).unwrap()),
        )];
        // Priced at zero so only quantities and area matter.
        let sheet = sheet_row()
            .with_unit_price(0.0)
            .with_quantity("3")
            .with_length("2")
            .with_width("1");
        let bag = bag_row().with_unit_price(0.0).with_quantity("10");

        let totals = calculate_totals(&[sheet, bag], 0.0, &NumericInput::from(0.0), &reps, Some("s2"));

        approx(totals.sub_total, 0.0);
        approx(totals.commission_amount, 22.0);
        approx(totals.total_square_meters, 6.0);
    }

    #[test]
    fn test_fixed_commission_missing_rate_counts_zero() {
        let reps = vec![salesperson("s3", Some(Commission::fixed(None, Some(1.5)).unwrap()))];
        let totals = calculate_totals(
            &[sheet_row(), bag_row()],
            0.0,
            &NumericInput::blank(),
            &reps,
            Some("s3"),
        );

        // Sheet rate absent: only 5 bags × 1.5
        approx(totals.commission_amount, 7.5);
    }

    #[test]
    fn test_unknown_or_unpaid_salesperson_earns_nothing() {
        let reps = vec![salesperson("s1", None)];
        let rows = vec![sheet_row()];

        let none = calculate_totals(&rows, 0.0, &NumericInput::blank(), &reps, Some("s1"));
        let unknown = calculate_totals(&rows, 0.0, &NumericInput::blank(), &reps, Some("ghost"));
        let unselected = calculate_totals(&rows, 0.0, &NumericInput::blank(), &reps, None);

        assert_eq!(none.commission_amount, 0.0);
        assert_eq!(unknown.commission_amount, 0.0);
        assert_eq!(unselected.commission_amount, 0.0);
    }

    #[test]
    fn test_unparsable_quantity_contributes_zero() {
        let broken = sheet_row().with_quantity("abc");
        let rows = vec![broken, bag_row()];

        let totals = calculate_totals(&rows, 10.0, &NumericInput::from("x"), &[], None);

        approx(totals.sub_total, 500.0);
        approx(totals.total_square_meters, 0.0);
        approx(totals.paid_amount, 0.0);
        assert!(totals.final_due.is_finite());
        approx(totals.final_due, 550.0);
    }

    #[test]
    fn test_nan_inputs_never_leak() {
        let rows = vec![
            sheet_row().with_quantity(f64::NAN),
            bag_row().with_unit_price(f64::INFINITY),
        ];
        let reps = vec![salesperson("s1", Some(Commission::fixed(Some(1.0), Some(1.0)).unwrap()))];

        let totals = calculate_totals(&rows, f64::NAN, &NumericInput::from(f64::NAN), &reps, Some("s1"));

        for value in [
            totals.sub_total,
            totals.tax_amount,
            totals.total_with_tax,
            totals.paid_amount,
            totals.final_due,
            totals.total_square_meters,
            totals.commission_amount,
        ] {
            assert!(value.is_finite());
        }
        // Bags still count toward fixed commission by quantity.
        approx(totals.commission_amount, 5.0);
    }

    #[test]
    fn test_negative_paid_amount_passes_through() {
        let totals = calculate_totals(&[bag_row()], 0.0, &NumericInput::from("-50"), &[], None);

        approx(totals.paid_amount, -50.0);
        approx(totals.final_due, 550.0);
    }

    #[test]
    fn test_negative_quantity_and_price_are_not_clamped() {
        let bags = bag_row().with_quantity("-5");
        let sheets = sheet_row().with_unit_price(-250.0);
        approx(bags.line_total(), -500.0);
        approx(sheets.line_total(), -500.0);

        let reps = vec![
            salesperson("pct", Some(Commission::percentage(10.0).unwrap())),
            salesperson("bag", Some(Commission::fixed(None, Some(1.0)).unwrap())),
        ];
        let rows = vec![sheets, bags];

        let totals = calculate_totals(&rows, 10.0, &NumericInput::blank(), &reps, Some("pct"));
        approx(totals.sub_total, -1000.0);
        approx(totals.tax_amount, -100.0);
        approx(totals.total_with_tax, -1100.0);
        approx(totals.final_due, -1100.0);
        approx(totals.commission_amount, -100.0);

        let totals = calculate_totals(&rows, 10.0, &NumericInput::blank(), &reps, Some("bag"));
        approx(totals.commission_amount, -5.0);
    }

    #[test]
    fn test_overflowing_subtotal_degrades_to_zero() {
        let huge = bag_row().with_quantity("1").with_unit_price(1e308);
        let rows = vec![huge.clone(), huge];

        let totals = calculate_totals(&rows, 10.0, &NumericInput::from("5"), &[], None);
        assert_eq!(totals.sub_total, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total_with_tax, 0.0);
        assert_eq!(totals.final_due, -5.0);
        assert!(totals.final_due.is_finite());
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let reps = vec![salesperson("s1", Some(Commission::percentage(3.5).unwrap()))];
        let rows = vec![sheet_row().with_length("1.37"), bag_row()];

        let first = calculate_totals(&rows, 7.25, &NumericInput::from("12.3"), &reps, Some("s1"));
        let second = calculate_totals(&rows, 7.25, &NumericInput::from("12.3"), &reps, Some("s1"));

        assert_eq!(first, second);
        assert_eq!(first.sub_total.to_bits(), second.sub_total.to_bits());
    }

    #[test]
    fn test_draft_edits_are_reflected_in_totals() {
        let sheet = sheet_row();
        let sheet_id = sheet.id.clone();
        let draft = InvoiceDraft::new().with_customer("c1").with_line(sheet.clone());
        approx(draft.totals(0.0, &[]).sub_total, 1000.0);

        let edited = draft.clone().replace_line(sheet.with_quantity("4"));
        approx(edited.totals(0.0, &[]).sub_total, 2000.0);
        // The earlier draft value is untouched.
        approx(draft.totals(0.0, &[]).sub_total, 1000.0);

        let emptied = edited.remove_line(&sheet_id);
        assert!(emptied.line_items.is_empty());
        approx(emptied.totals(0.0, &[]).sub_total, 0.0);
    }

    #[test]
    fn test_draft_uses_selected_salesperson() {
        let reps = vec![salesperson("s1", Some(Commission::percentage(10.0).unwrap()))];
        let draft = InvoiceDraft::new()
            .with_line(bag_row())
            .with_salesperson(Some("s1".to_string()));

        approx(draft.totals(0.0, &reps).commission_amount, 50.0);
    }
}
