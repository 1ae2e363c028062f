//! # Database Handle
//!
//! Opens the Billbook SQLite file and hands out repositories.
//!
//! ## Opening a Database
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  [database] in billbook.toml                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbConfig::new(path).max_connections(n)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                           │
//! │       ├── sqlite://<path>?mode=rwc   (file created on first use)        │
//! │       ├── WAL journal, foreign keys ON                                  │
//! │       └── embedded migrations                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.customers()  db.products()  db.salespersons()                      │
//! │  db.bank_accounts()  db.settings()  db.invoices()                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL lets a report read while a payment is being written.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::bank_account::BankAccountRepository;
use crate::repository::customer::CustomerRepository;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::salesperson::SalespersonRepository;
use crate::repository::settings::SettingsRepository;

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives and how many connections to hold.
///
/// ```rust,ignore
/// let config = DbConfig::new("/srv/billbook/billbook.db").max_connections(2);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Default 5. In-memory databases always use 1.
    pub max_connections: u32,

    /// How long to wait for a free connection. Default 30s.
    pub acquire_timeout: Duration,

    /// `None` keeps connections open forever; required for in-memory
    /// databases, which disappear with their last connection.
    pub idle_timeout: Option<Duration>,

    /// Apply pending migrations while opening. Default true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// A file-backed database at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private, migrated database that lives as long as the handle.
    /// Used by tests.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = if self.is_in_memory() {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite://{}?mode=rwc", self.database_path.display())
        };

        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // off by default in SQLite; settings → bank account relies on it
            .foreign_keys(true)
            .create_if_missing(true);

        Ok(options)
    }
}

// =============================================================================
// Database
// =============================================================================

/// Shared handle to the Billbook database.
///
/// Clones share one pool. Repository accessors are cheap and can be
/// called per operation.
///
/// ```rust,ignore
/// let db = Database::new(DbConfig::new("billbook.db")).await?;
/// let paid = db.invoices().apply_payment(&id, 200.0).await?;
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connects (creating the file if needed) and migrates.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening database");

        let connect_options = config.connect_options()?;
        let max_connections = if config.is_in_memory() {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Raw pool access for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone())
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    pub fn salespersons(&self) -> SalespersonRepository {
        SalespersonRepository::new(self.pool.clone())
    }

    pub fn bank_accounts(&self) -> BankAccountRepository {
        BankAccountRepository::new(self.pool.clone())
    }

    pub fn settings(&self) -> SettingsRepository {
        SettingsRepository::new(self.pool.clone())
    }

    pub fn invoices(&self) -> InvoiceRepository {
        InvoiceRepository::new(self.pool.clone())
    }

    /// Waits for in-flight queries, then closes every connection.
    pub async fn close(&self) {
        debug!("Closing database");
        self.pool.close().await;
    }

    /// True if a trivial query succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
