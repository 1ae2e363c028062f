//! # Errors
//!
//! ```text
//! validate_* / assemble_invoice ──► ValidationError ──► CoreError::Validation
//! report::*_csv ──────────────────────────────────────► CoreError::Export
//! render_invoice_document ────────────────────────────► CoreError::Render
//! ```
//!
//! billbook-db carries `ValidationError` as-is for payment updates.
//!
//! Unparsable numbers inside totals are NOT errors: the calculator
//! degrades them to 0. Only assembly and record saves reject input.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Failure of a core operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input was rejected before anything was built.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A CSV report could not be written.
    #[error("Report export failed: {0}")]
    Export(String),

    /// The invoice template failed to render.
    #[error("Invoice rendering failed: {0}")]
    Render(String),
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Export(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Something the operator typed needs fixing.
///
/// Messages are surfaced to the user verbatim, so the messages name the
/// field (and the invoice line, counted from 1) that needs fixing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Blank after trimming.
    #[error("{field} is required")]
    Required { field: String },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// e.g. a phone number with letters in it.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A numeric field did not hold a usable number.
    #[error("{field} must be a valid number")]
    InvalidNumber { field: String },

    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Quantities and payments.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        allowed: Vec<String>,
    },

    /// An invoice needs at least one product line.
    #[error("Invoice must contain at least one product")]
    NoLineItems,

    /// A specific invoice line is incomplete.
    #[error("Line {line}: {reason}")]
    InvalidLineItem { line: usize, reason: String },

    /// Commission configuration is unusable.
    #[error("Invalid commission: {reason}")]
    InvalidCommission { reason: String },
}

impl ValidationError {
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// `line` counts from 1, as printed on the invoice.
    pub fn line(line: usize, reason: impl Into<String>) -> Self {
        ValidationError::InvalidLineItem {
            line,
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field_and_line() {
        assert_eq!(
            ValidationError::required("customer").to_string(),
            "customer is required"
        );
        assert_eq!(
            ValidationError::line(2, "length is required for sheet products").to_string(),
            "Line 2: length is required for sheet products"
        );
        assert_eq!(
            ValidationError::NoLineItems.to_string(),
            "Invoice must contain at least one product"
        );
    }

    #[test]
    fn test_rejected_input_becomes_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: name is required");
    }
}
