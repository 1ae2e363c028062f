//! # CLI Error Type
//!
//! Unified error type for command handlers.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in billbook                               │
//! │                                                                         │
//! │  Command handler -> AppResult<()>                                       │
//! │         │                                                               │
//! │         ├── DbError::NotFound("Invoice", id) ──────┐                    │
//! │         ├── ValidationError::NoLineItems ──────────┤                    │
//! │         ├── CoreError::Export / Render ────────────┼──► AppError        │
//! │         ├── io / json / toml errors ───────────────┤        │           │
//! │         └── print command failed ──────────────────┘        │           │
//! │                                                             ▼           │
//! │  main: "error: <message>" on stderr, exit code 1                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::{CoreError, ValidationError};
use billbook_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Anything a command can fail with.
#[derive(Debug, Error)]
pub enum AppError {
    /// Input rejected by the domain rules.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    /// A record referenced on the command line or in a draft file.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Configuration file or environment could not be used.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Printing or writing a document failed.
    #[error("Print failed: {0}")]
    Print(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        AppError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type for command handlers.
pub type AppResult<T> = Result<T, AppError>;
