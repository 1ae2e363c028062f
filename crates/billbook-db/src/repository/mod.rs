//! # Repository Module
//!
//! Database repository implementations for Billbook.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  CLI command                                                           │
//! │       │                                                                 │
//! │       │  db.invoices().apply_payment(id, 200.0)                        │
//! │       ▼                                                                 │
//! │  InvoiceRepository                                                     │
//! │  ├── insert(&self, invoice)                                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list(&self)                                                       │
//! │  ├── apply_payment(&self, id, amount)                                  │
//! │  └── delete(&self, id)                                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`customer::CustomerRepository`] - Customer CRUD
//! - [`product::ProductRepository`] - Product catalog CRUD
//! - [`salesperson::SalespersonRepository`] - Salespersons and commission configs
//! - [`bank_account::BankAccountRepository`] - Bank details printed on invoices
//! - [`settings::SettingsRepository`] - The single business profile row
//! - [`invoice::InvoiceRepository`] - Invoices and payments

use uuid::Uuid;

pub mod bank_account;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod salesperson;
pub mod settings;

/// Generates a new record id (UUID v4).
///
/// ## Usage
/// ```rust,ignore
/// let id = generate_id();
/// ```
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::pool::{Database, DbConfig};

    /// Fresh, migrated in-memory database.
    pub async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }
}
