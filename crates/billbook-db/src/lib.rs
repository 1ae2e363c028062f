//! # billbook-db: Database Layer for Billbook
//!
//! This crate provides database access for Billbook.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Billbook Data Flow                               │
//! │                                                                         │
//! │  CLI command (billbook invoice pay <id> 200)                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   billbook-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ Customer       │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ Product        │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │    │ Salesperson    │    │  schema.sql  │  │   │
//! │  │   │ Management    │    │ BankAccount    │    │              │  │   │
//! │  │   │               │    │ Settings       │    │              │  │   │
//! │  │   │               │    │ Invoice        │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (platform data dir, or [database].path)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use billbook_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("billbook.db")).await?;
//! let customers = db.customers().list().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::bank_account::BankAccountRepository;
pub use repository::customer::CustomerRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::salesperson::SalespersonRepository;
pub use repository::settings::SettingsRepository;
