//! # CLI Configuration
//!
//! Where the database lives and how invoices get printed.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BILLBOOK_DB_PATH=./shop.db                                         │
//! │     BILLBOOK_PRINT_COMMAND="lp -d office"                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/billbook/billbook.toml (Linux)                           │
//! │     ~/Library/Application Support/com.billbook.billbook/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     database in the platform data dir, system print command           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # billbook.toml
//! [database]
//! path = "/srv/billbook/billbook.db"
//! max_connections = 5
//!
//! [print]
//! command = "lp -d office"   # file path is appended as the last argument
//! output_dir = "./invoices"  # where `invoice print --html` writes
//! keep_file = false          # keep the temp file after a system print
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

pub const CONFIG_FILE_NAME: &str = "billbook.toml";
pub const DATABASE_FILE_NAME: &str = "billbook.db";

pub const ENV_DB_PATH: &str = "BILLBOOK_DB_PATH";
pub const ENV_PRINT_COMMAND: &str = "BILLBOOK_PRINT_COMMAND";

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file; created on first use.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "billbook", "billbook")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[print]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Program plus leading arguments; the document path is appended.
    /// `None` uses [`default_print_command`].
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default)]
    pub keep_file: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            command: None,
            output_dir: default_output_dir(),
            keep_file: false,
        }
    }
}

/// The platform's "print this file" command.
pub fn default_print_command() -> &'static str {
    if cfg!(windows) {
        "rundll32 mshtml.dll,PrintHTML"
    } else {
        "lp"
    }
}

impl PrintSettings {
    pub fn command_line(&self) -> &str {
        self.command.as_deref().unwrap_or_else(|| default_print_command())
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub print: PrintSettings,
}

impl AppConfig {
    /// Loads configuration: defaults, then the TOML file, then environment.
    ///
    /// An explicit `config_path` must exist; the platform default path is
    /// optional.
    pub fn load(config_path: Option<&Path>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::from_file(path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => {
                    warn!("No platform config directory, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `BILLBOOK_*` overrides from `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH).filter(|v| !v.trim().is_empty()) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(command) = lookup(ENV_PRINT_COMMAND).filter(|v| !v.trim().is_empty()) {
            debug!(command = %command, "Overriding print command from environment");
            self.print.command = Some(command);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(AppError::Config("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(command) = &self.print.command {
            if command.trim().is_empty() {
                return Err(AppError::Config("print.command must not be blank".into()));
            }
        }

        Ok(())
    }

    /// `<platform config dir>/billbook.toml`.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "billbook", "billbook")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.path.ends_with(DATABASE_FILE_NAME));
        assert_eq!(config.print.command, None);
        assert!(!config.print.keep_file);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [database]
            path = "/tmp/shop.db"

            [print]
            command = "lp -d office"
            keep_file = true
            "#,
        );

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.print.command_line(), "lp -d office");
        assert!(config.print.keep_file);
        assert_eq!(config.print.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_partial_file_keeps_section_defaults() {
        let file = write_config("[print]\noutput_dir = \"out\"\n");
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database, DatabaseSettings::default());
        assert_eq!(config.print.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let file = write_config("[database\npath = 1");
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DB_PATH => Some("./override.db".to_string()),
            ENV_PRINT_COMMAND => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.database.path, PathBuf::from("./override.db"));
        assert_eq!(config.print.command, None);
    }

    #[test]
    fn test_validate_rejects_zero_connections() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_blank_print_command() {
        let mut config = AppConfig::default();
        config.print.command = Some(String::new());
        assert!(config.validate().is_err());
    }
}
