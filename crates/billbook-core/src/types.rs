//! # Domain Types
//!
//! Core domain types used throughout Billbook.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog & parties             Editing                Persisted         │
//! │  ─────────────────             ───────                ─────────         │
//! │  Product ─── select ─────────► LineItem ── freeze ──► InvoiceProduct-   │
//! │  Customer                      (raw form input)       Snapshot          │
//! │  Salesperson + Commission                                  │            │
//! │  BankAccount                                               ▼            │
//! │  BusinessSettings ─── tax rate copied at creation ───► Invoice          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! An invoice copies everything it displays (customer contact details,
//! salesperson name, product gsm/type/price, tax rate). Editing the source
//! records later never rewrites history.
//!
//! All records serialize with camelCase field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::numeric::{finite_or_zero, lenient_f64, lenient_opt_f64, NumericInput};

// =============================================================================
// Product Type
// =============================================================================

/// How a product is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum ProductType {
    /// Area priced: quantity × length × width × unit price.
    #[default]
    Sheet,
    /// Unit priced: quantity × unit price.
    Bag,
}

impl ProductType {
    /// Wire/storage name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductType::Sheet => "sheet",
            ProductType::Bag => "bag",
        }
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sheet" => Ok(ProductType::Sheet),
            "bag" => Ok(ProductType::Bag),
            _ => Err(ValidationError::NotAllowed {
                field: "type".to_string(),
                allowed: vec!["sheet".to_string(), "bag".to_string()],
            }),
        }
    }
}

// =============================================================================
// Catalog & Parties
// =============================================================================

/// A catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: String,

    /// Grade label, e.g. "90" or "120 GSM".
    pub gsm: String,

    #[serde(rename = "type")]
    pub product_type: ProductType,

    /// Per square meter for sheets, per piece for bags.
    pub unit_price: f64,
}

/// A customer that invoices are billed to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

/// Bank details printed on invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BankAccount {
    pub id: String,
    pub bank_name: String,
    #[serde(default)]
    pub bank_branch: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(default)]
    pub routing_number: String,
}

/// The business profile shown in invoice headers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct BusinessSettings {
    pub name: String,
    pub office_address: String,
    pub factory_address: String,
    pub phone: String,
    pub email: String,
    pub logo_url: String,

    /// Percentage, e.g. `5.0` for 5%.
    pub tax_rate: f64,

    /// Chosen in settings. Documents currently print the first bank
    /// account instead (see `document::render_invoice_document`).
    pub default_bank_account_id: Option<String>,
}

// =============================================================================
// Salesperson & Commission
// =============================================================================

/// A salesperson who can be credited on invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salesperson {
    pub id: String,
    pub name: String,

    /// `None` means the salesperson earns no commission.
    #[serde(default)]
    pub commission: Option<Commission>,
}

/// How a salesperson's commission is computed.
///
/// ```json
/// { "type": "percentage", "percentageRate": 5 }
/// { "type": "fixed", "fixedSheetRate": 2, "fixedBagRate": null }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Commission {
    /// A percentage of the invoice subtotal.
    Percentage {
        #[serde(rename = "percentageRate")]
        rate: PercentageRate,
    },
    /// Per square meter of sheet sold and/or per bag sold.
    Fixed(FixedRates),
}

impl Commission {
    /// Creates a percentage commission; the rate must be finite and ≥ 0.
    pub fn percentage(rate: f64) -> Result<Self, ValidationError> {
        PercentageRate::new(rate).map(|rate| Commission::Percentage { rate })
    }

    /// Creates a fixed-rate commission (see [`FixedRates::new`]).
    pub fn fixed(sheet_rate: Option<f64>, bag_rate: Option<f64>) -> Result<Self, ValidationError> {
        FixedRates::new(sheet_rate, bag_rate).map(Commission::Fixed)
    }

    /// Short human-readable description, used in reports.
    pub fn describe(&self) -> String {
        match self {
            Commission::Percentage { rate } => format!("{}% of subtotal", rate.value()),
            Commission::Fixed(rates) => {
                let mut parts = Vec::new();
                if let Some(sheet) = rates.sheet_rate() {
                    parts.push(format!("{} per sq m", sheet));
                }
                if let Some(bag) = rates.bag_rate() {
                    parts.push(format!("{} per bag", bag));
                }
                format!("fixed: {}", parts.join(", "))
            }
        }
    }
}

/// A percentage commission rate, e.g. `5.0` for 5%.
///
/// Always finite and ≥ 0; a stored `-5` fails to load rather than
/// paying negative commission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PercentageRate(f64);

impl PercentageRate {
    pub fn new(rate: f64) -> Result<Self, ValidationError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ValidationError::InvalidCommission {
                reason: "percentage rate must be a non-negative number".to_string(),
            });
        }
        Ok(PercentageRate(rate))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Serialize for PercentageRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for PercentageRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rate = f64::deserialize(deserializer)?;
        PercentageRate::new(rate).map_err(serde::de::Error::custom)
    }
}

/// Fixed commission rates.
///
/// At least one of the two rates is always present and every present
/// rate is a finite, non-negative number. The fields are private so the
/// only ways in are [`FixedRates::new`] and deserialization, both of
/// which enforce that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRates {
    sheet: Option<f64>,
    bag: Option<f64>,
}

impl FixedRates {
    pub fn new(sheet_rate: Option<f64>, bag_rate: Option<f64>) -> Result<Self, ValidationError> {
        for (name, rate) in [("sheet", sheet_rate), ("bag", bag_rate)] {
            if let Some(rate) = rate {
                if !rate.is_finite() || rate < 0.0 {
                    return Err(ValidationError::InvalidCommission {
                        reason: format!("{} rate must be a non-negative number", name),
                    });
                }
            }
        }

        if sheet_rate.is_none() && bag_rate.is_none() {
            return Err(ValidationError::InvalidCommission {
                reason: "fixed commission needs a sheet rate or a bag rate".to_string(),
            });
        }

        Ok(FixedRates {
            sheet: sheet_rate,
            bag: bag_rate,
        })
    }

    /// Commission per square meter of sheet sold.
    pub fn sheet_rate(&self) -> Option<f64> {
        self.sheet
    }

    /// Commission per bag sold.
    pub fn bag_rate(&self) -> Option<f64> {
        self.bag
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixedRatesWire {
    #[serde(default)]
    fixed_sheet_rate: Option<f64>,
    #[serde(default)]
    fixed_bag_rate: Option<f64>,
}

impl Serialize for FixedRates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FixedRatesWire {
            fixed_sheet_rate: self.sheet,
            fixed_bag_rate: self.bag,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FixedRates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = FixedRatesWire::deserialize(deserializer)?;
        FixedRates::new(wire.fixed_sheet_rate, wire.fixed_bag_rate)
            .map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Line Item (draft row)
// =============================================================================

/// One editable row of an in-progress invoice.
///
/// Numeric fields hold raw input; `square_meters()` and `line_total()`
/// are derived on every read so they can never go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Client-generated, stable for the editing session.
    pub id: String,

    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default)]
    pub gsm: String,

    #[serde(rename = "type", default)]
    pub product_type: ProductType,

    #[serde(default)]
    pub quantity: NumericInput,

    /// Meters; only meaningful for sheets.
    #[serde(default)]
    pub length: NumericInput,

    /// Meters; only meaningful for sheets.
    #[serde(default)]
    pub width: NumericInput,

    #[serde(default)]
    pub unit_price: NumericInput,
}

impl LineItem {
    /// Creates an empty row with a fresh id.
    pub fn new() -> Self {
        LineItem {
            id: Uuid::new_v4().to_string(),
            product_id: None,
            gsm: String::new(),
            product_type: ProductType::default(),
            quantity: NumericInput::blank(),
            length: NumericInput::blank(),
            width: NumericInput::blank(),
            unit_price: NumericInput::blank(),
        }
    }

    /// Returns this row pointed at `product`.
    ///
    /// gsm, type and unit price are copied from the product; quantity and
    /// dimensions are cleared. The row id is kept.
    pub fn select_product(&self, product: &Product) -> Self {
        LineItem {
            id: self.id.clone(),
            product_id: Some(product.id.clone()),
            gsm: product.gsm.clone(),
            product_type: product.product_type,
            quantity: NumericInput::blank(),
            length: NumericInput::blank(),
            width: NumericInput::blank(),
            unit_price: NumericInput::Number(product.unit_price),
        }
    }

    pub fn with_quantity(mut self, quantity: impl Into<NumericInput>) -> Self {
        self.quantity = quantity.into();
        self
    }

    pub fn with_length(mut self, length: impl Into<NumericInput>) -> Self {
        self.length = length.into();
        self
    }

    pub fn with_width(mut self, width: impl Into<NumericInput>) -> Self {
        self.width = width.into();
        self
    }

    /// Overrides the price copied from the product.
    pub fn with_unit_price(mut self, unit_price: impl Into<NumericInput>) -> Self {
        self.unit_price = unit_price.into();
        self
    }

    #[inline]
    pub fn is_sheet(&self) -> bool {
        self.product_type == ProductType::Sheet
    }

    /// length × width for sheets; 0 for bags or unparsable dimensions.
    pub fn square_meters(&self) -> f64 {
        if !self.is_sheet() {
            return 0.0;
        }
        match (self.length.parse(), self.width.parse()) {
            (Some(length), Some(width)) => finite_or_zero(length * width),
            _ => 0.0,
        }
    }

    /// The billed amount for this row.
    ///
    /// ```text
    /// sheet (length & width parse) : quantity × square meters × unit price
    /// bag                          : quantity × unit price
    /// anything else                : 0
    /// ```
    pub fn line_total(&self) -> f64 {
        let (Some(quantity), Some(unit_price)) = (self.quantity.parse(), self.unit_price.parse())
        else {
            return 0.0;
        };

        match self.product_type {
            ProductType::Sheet => match (self.length.parse(), self.width.parse()) {
                (Some(_), Some(_)) => finite_or_zero(quantity * self.square_meters() * unit_price),
                _ => 0.0,
            },
            ProductType::Bag => finite_or_zero(quantity * unit_price),
        }
    }
}

impl Default for LineItem {
    fn default() -> Self {
        LineItem::new()
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A frozen copy of one invoice line.
///
/// Numeric fields read leniently: missing, null or unparsable stored
/// values come back as 0 rather than failing the whole invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceProductSnapshot {
    #[serde(default)]
    pub product_id: String,

    #[serde(default)]
    pub gsm: String,

    #[serde(rename = "type", default)]
    pub product_type: ProductType,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub quantity: f64,

    /// Present for sheets only.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub length: Option<f64>,

    /// Present for sheets only.
    #[serde(
        default,
        deserialize_with = "lenient_opt_f64",
        skip_serializing_if = "Option::is_none"
    )]
    pub width: Option<f64>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub square_meters: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub unit_price: f64,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub line_total: f64,
}

impl InvoiceProductSnapshot {
    /// Freezes a draft row, computing its derived values one last time.
    pub fn from_line(line: &LineItem) -> Self {
        let (length, width) = if line.is_sheet() {
            (line.length.parse(), line.width.parse())
        } else {
            (None, None)
        };

        InvoiceProductSnapshot {
            product_id: line.product_id.clone().unwrap_or_default(),
            gsm: line.gsm.clone(),
            product_type: line.product_type,
            quantity: line.quantity.value_or_zero(),
            length,
            width,
            square_meters: line.square_meters(),
            unit_price: line.unit_price.value_or_zero(),
            line_total: line.line_total(),
        }
    }
}

/// A finalized (or previewed) invoice.
///
/// ## Invariants
/// - `total_amount == sub_total + tax_amount`
/// - `final_due == total_amount - total_paid`, recomputed on every payment
///
/// Only `total_paid`/`final_due` ever change after creation; see
/// `Invoice::apply_payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Storage id; `None` for previews and before the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub invoice_number: String,
    pub invoice_date: DateTime<Utc>,

    #[serde(default)]
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_address: String,
    #[serde(default)]
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: String,

    #[serde(default)]
    pub products: Vec<InvoiceProductSnapshot>,

    #[serde(default, deserialize_with = "lenient_f64")]
    pub sub_total: f64,
    /// Copied from business settings at creation.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tax_rate: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub tax_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_paid: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub final_due: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_square_meters: f64,

    #[serde(default)]
    pub salesperson_id: Option<String>,
    #[serde(default)]
    pub salesperson_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub commission_amount: f64,

    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
