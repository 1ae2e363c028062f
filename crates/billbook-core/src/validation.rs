//! # Validation Module
//!
//! Record checks run before anything is saved.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: CLI argument parsing (clap)                                  │
//! │  └── Types and required flags                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Records: customer, product, salesperson, bank, settings           │
//! │  └── Payments                                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE invoice numbers                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Invoice rows are checked separately by
//! [`validate_line_items`](crate::invoice::validate_line_items), since
//! draft rows carry raw input rather than finished records.

use crate::error::ValidationError;
use crate::types::{BankAccount, BusinessSettings, Customer, Product, Salesperson};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted name/label.
pub const MAX_TEXT_LENGTH: usize = 200;

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a required text field.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most [`MAX_TEXT_LENGTH`] characters
///
/// ## Example
/// ```rust
/// use billbook_core::validation::validate_required_text;
///
/// assert!(validate_required_text("name", "Rahman Traders").is_ok());
/// assert!(validate_required_text("name", "   ").is_err());
/// ```
pub fn validate_required_text(field: &str, value: &str) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_TEXT_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_TEXT_LENGTH,
        });
    }

    Ok(())
}

/// Validates an amount or rate that may be zero.
pub fn validate_non_negative(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: field.to_string(),
        });
    }

    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a payment amount.
///
/// ## Rules
/// - Must be a finite number
/// - Must be positive (> 0)
///
/// Corrections (negative adjustments) go through
/// `Invoice::with_total_paid` instead.
pub fn validate_payment_amount(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::InvalidNumber {
            field: "payment amount".to_string(),
        });
    }

    if amount <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a record id string format.
///
/// ## Example
/// ```rust
/// use billbook_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id.trim()).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

pub fn validate_customer(customer: &Customer) -> ValidationResult<()> {
    validate_required_text("name", &customer.name)
}

/// Validates a catalog product.
///
/// ## Rules
/// - gsm label is required
/// - Unit price is finite and ≥ 0 (free items are allowed)
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_required_text("gsm", &product.gsm)?;
    validate_non_negative("unit price", product.unit_price)
}

/// Validates a salesperson. Commission rates are checked when the
/// [`crate::types::Commission`] is built or loaded.
pub fn validate_salesperson(salesperson: &Salesperson) -> ValidationResult<()> {
    validate_required_text("name", &salesperson.name)
}

pub fn validate_bank_account(account: &BankAccount) -> ValidationResult<()> {
    validate_required_text("bank name", &account.bank_name)?;
    validate_required_text("account name", &account.account_name)?;
    validate_required_text("account number", &account.account_number)
}

/// Validates the business profile.
///
/// ## Rules
/// - Business name is required
/// - Tax rate is a finite percentage ≥ 0
pub fn validate_business_settings(settings: &BusinessSettings) -> ValidationResult<()> {
    validate_required_text("business name", &settings.name)?;
    validate_non_negative("tax rate", settings.tax_rate)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commission, ProductType};

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("name", "Acme").is_ok());
        assert_eq!(
            validate_required_text("name", "").unwrap_err(),
            ValidationError::required("name")
        );
        assert!(matches!(
            validate_required_text("name", &"x".repeat(201)),
            Err(ValidationError::TooLong { max: 200, .. })
        ));
    }

    #[test]
    fn test_validate_product() {
        let mut product = Product {
            id: String::new(),
            gsm: "90".to_string(),
            product_type: ProductType::Sheet,
            unit_price: 0.0,
        };
        assert!(validate_product(&product).is_ok());

        product.unit_price = -1.0;
        assert!(matches!(
            validate_product(&product),
            Err(ValidationError::Negative { .. })
        ));

        product.unit_price = f64::NAN;
        assert!(matches!(
            validate_product(&product),
            Err(ValidationError::InvalidNumber { .. })
        ));

        product.unit_price = 10.0;
        product.gsm = " ".to_string();
        assert_eq!(
            validate_product(&product).unwrap_err(),
            ValidationError::required("gsm")
        );
    }

    #[test]
    fn test_validate_salesperson() {
        let mut rep = Salesperson {
            id: String::new(),
            name: "Nadia".to_string(),
            commission: None,
        };
        assert!(validate_salesperson(&rep).is_ok());

        rep.commission = Some(Commission::percentage(5.0).unwrap());
        assert!(validate_salesperson(&rep).is_ok());

        rep.name = "  ".to_string();
        assert_eq!(
            validate_salesperson(&rep).unwrap_err(),
            ValidationError::required("name")
        );
        rep.name = "Nadia".to_string();

        rep.commission = Some(Commission::fixed(Some(1.0), None).unwrap());
        assert!(validate_salesperson(&rep).is_ok());
    }

    #[test]
    fn test_validate_bank_account() {
        let mut account = BankAccount {
            id: String::new(),
            bank_name: "City Bank".to_string(),
            bank_branch: String::new(),
            account_name: "Paper Works".to_string(),
            account_number: "0012345".to_string(),
            routing_number: String::new(),
        };
        assert!(validate_bank_account(&account).is_ok());

        account.account_number = String::new();
        assert_eq!(
            validate_bank_account(&account).unwrap_err(),
            ValidationError::required("account number")
        );
    }

    #[test]
    fn test_validate_business_settings() {
        let mut settings = BusinessSettings {
            name: "Paper Works".to_string(),
            tax_rate: 7.5,
            ..BusinessSettings::default()
        };
        assert!(validate_business_settings(&settings).is_ok());

        settings.tax_rate = f64::INFINITY;
        assert!(validate_business_settings(&settings).is_err());

        settings.tax_rate = 5.0;
        settings.name.clear();
        assert!(validate_business_settings(&settings).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(200.0).is_ok());
        assert!(validate_payment_amount(0.0).is_err());
        assert!(validate_payment_amount(-5.0).is_err());
        assert!(validate_payment_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid(&uuid::Uuid::new_v4().to_string()).is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("INV-1").is_err());
    }
}
