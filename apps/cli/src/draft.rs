//! # Draft Files
//!
//! JSON description of an invoice to price, preview or create.
//!
//! ```json
//! {
//!   "customerId": "5b0c...",
//!   "salespersonId": "9e1d...",
//!   "totalPaid": 200,
//!   "lines": [
//!     { "productId": "a1f2...", "quantity": 10, "length": 1.2, "width": 0.8 },
//!     { "productId": "c3d4...", "quantity": "25", "unitPrice": 3.5 }
//!   ]
//! }
//! ```
//!
//! Numbers may be given as JSON numbers or strings; they are read with
//! the same leniency as form input. Each line is pointed at its catalog
//! product (copying gsm, type and price) before quantity, dimensions and
//! any price override are applied.

use billbook_core::{InvoiceDraft, LineItem, NumericInput, Product};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftFile {
    #[serde(default)]
    pub customer_id: Option<String>,

    #[serde(default)]
    pub salesperson_id: Option<String>,

    #[serde(default)]
    pub total_paid: NumericInput,

    #[serde(default)]
    pub lines: Vec<DraftLine>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftLine {
    /// A missing product leaves the row empty (previewed as zero,
    /// rejected on create).
    #[serde(default)]
    pub product_id: Option<String>,

    #[serde(default)]
    pub quantity: NumericInput,

    #[serde(default)]
    pub length: NumericInput,

    #[serde(default)]
    pub width: NumericInput,

    /// Replaces the catalog price for this invoice only.
    #[serde(default)]
    pub unit_price: Option<NumericInput>,
}

impl DraftFile {
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Builds the editable draft against the product catalog.
    ///
    /// ## Errors
    /// `AppError::NotFound` when a line names a product id that is not in
    /// `products`.
    pub fn resolve(&self, products: &[Product]) -> AppResult<InvoiceDraft> {
        let mut draft = InvoiceDraft::new()
            .with_salesperson(self.salesperson_id.clone())
            .with_total_paid(self.total_paid.clone());

        if let Some(customer_id) = &self.customer_id {
            draft = draft.with_customer(customer_id.clone());
        }

        for line in &self.lines {
            draft = draft.with_line(line.resolve(products)?);
        }

        Ok(draft)
    }
}

impl DraftLine {
    fn resolve(&self, products: &[Product]) -> AppResult<LineItem> {
        let Some(product_id) = self.product_id.as_deref().filter(|id| !id.trim().is_empty())
        else {
            return Ok(LineItem::new()
                .with_quantity(self.quantity.clone())
                .with_length(self.length.clone())
                .with_width(self.width.clone()));
        };

        let product = products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| AppError::not_found("Product", product_id))?;

        let mut item = LineItem::new()
            .select_product(product)
            .with_quantity(self.quantity.clone())
            .with_length(self.length.clone())
            .with_width(self.width.clone());

        if let Some(price) = &self.unit_price {
            item = item.with_unit_price(price.clone());
        }

        Ok(item)
    }
}
