//! # billbook-core: Pure Business Logic for Billbook
//!
//! This crate is the **heart** of Billbook. It contains the invoicing
//! rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    billbook CLI (apps/cli)                      │   │
//! │  │    draft files ──► totals ──► create ──► pay ──► print          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ billbook-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌────────────┐ ┌──────────┐ ┌──────────────┐    │   │
//! │  │   │  types   │ │ calculator │ │ invoice  │ │   document   │    │   │
//! │  │   │ LineItem │ │   Totals   │ │ assemble │ │  HTML render │    │   │
//! │  │   │Commission│ │   Draft    │ │ payments │ │   reports    │    │   │
//! │  │   └──────────┘ └────────────┘ └──────────┘ └──────────────┘    │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  billbook-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain records (Product, LineItem, Salesperson, Invoice, ...)
//! - [`numeric`] - Lenient parsing of form input
//! - [`money`] - Amount helpers and 2-decimal formatting
//! - [`calculator`] - Invoice totals and the immutable draft
//! - [`invoice`] - Invoice numbering, assembly and payments
//! - [`document`] - Printable invoice renderer
//! - [`report`] - CSV exports
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use billbook_core::calculator::calculate_totals;
//! use billbook_core::numeric::NumericInput;
//! use billbook_core::types::{LineItem, Product, ProductType};
//!
//! let bag = Product {
//!     id: "p-1".to_string(),
//!     gsm: "90".to_string(),
//!     product_type: ProductType::Bag,
//!     unit_price: 12.5,
//! };
//! let line = LineItem::new()
//!     .select_product(&bag)
//!     .with_quantity(NumericInput::from(4.0));
//!
//! let totals = calculate_totals(&[line], 10.0, &NumericInput::from("20"), &[], None);
//! assert_eq!(totals.sub_total, 50.0);
//! assert_eq!(totals.total_with_tax, 55.0);
//! assert_eq!(totals.final_due, 35.0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod document;
pub mod error;
pub mod invoice;
pub mod money;
pub mod numeric;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{calculate_totals, InvoiceDraft, Totals};
pub use document::{render_invoice_document, InvoiceDocument};
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{assemble_invoice, preview_invoice};
pub use numeric::NumericInput;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of every generated invoice number.
pub const INVOICE_NUMBER_PREFIX: &str = "INV-";

/// Invoice number shown on documents rendered from an unsaved draft.
pub const PREVIEW_INVOICE_NUMBER: &str = "PREVIEW";
