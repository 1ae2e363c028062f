//! # Print Sinks
//!
//! Where a rendered invoice goes once it leaves the renderer.
//!
//! ```text
//! render_invoice_document() ──► InvoiceDocument ──► PrintSink
//!                                                     ├── HtmlFileSink    (write <dir>/<name>.html)
//!                                                     └── SystemPrintSink (temp file → print command → remove)
//! ```

use billbook_core::InvoiceDocument;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// What happened to a printed document.
#[derive(Debug, Clone, PartialEq)]
pub enum Printed {
    /// Written to disk and left there.
    Saved(PathBuf),
    /// Handed to the system print command.
    Sent { command: String },
}

/// Destination for rendered invoices.
pub trait PrintSink {
    fn print(&self, document: &InvoiceDocument) -> AppResult<Printed>;
}

/// File name for a document, e.g. `Invoice_INV-1700000000123.html`.
pub fn document_file_name(document: &InvoiceDocument) -> String {
    let stem: String = document
        .title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.html", stem)
}

// =============================================================================
// HTML File
// =============================================================================

/// Writes the HTML into a directory.
#[derive(Debug, Clone)]
pub struct HtmlFileSink {
    dir: PathBuf,
}

impl HtmlFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        HtmlFileSink { dir: dir.into() }
    }
}

impl PrintSink for HtmlFileSink {
    fn print(&self, document: &InvoiceDocument) -> AppResult<Printed> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(document_file_name(document));
        std::fs::write(&path, &document.html)?;

        info!(?path, "Invoice document written");
        Ok(Printed::Saved(path))
    }
}

// =============================================================================
// System Printer
// =============================================================================

/// Prints through an external command such as `lp`.
///
/// The document is written to a temporary file whose path is appended to
/// the command line. The file is removed afterwards unless `keep_file`
/// is set, whether or not the command succeeded.
#[derive(Debug, Clone)]
pub struct SystemPrintSink {
    command: String,
    keep_file: bool,
    temp_dir: PathBuf,
}

impl SystemPrintSink {
    pub fn new(command: impl Into<String>) -> Self {
        SystemPrintSink {
            command: command.into(),
            keep_file: false,
            temp_dir: std::env::temp_dir(),
        }
    }

    pub fn keep_file(mut self, keep: bool) -> Self {
        self.keep_file = keep;
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    fn run(&self, path: &Path) -> AppResult<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| AppError::Config("print command is empty".into()))?;

        debug!(program, ?path, "Running print command");
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| AppError::Print(format!("could not run '{}': {}", program, e)))?;

        if !status.success() {
            return Err(AppError::Print(format!(
                "'{}' exited with {}",
                self.command, status
            )));
        }
        Ok(())
    }
}

impl PrintSink for SystemPrintSink {
    fn print(&self, document: &InvoiceDocument) -> AppResult<Printed> {
        let path = self.temp_dir.join(format!(
            "billbook-{}-{}",
            uuid::Uuid::new_v4().simple(),
            document_file_name(document)
        ));
        std::fs::write(&path, &document.html)?;

        let result = self.run(&path);

        if !self.keep_file {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(?path, error = %e, "Could not remove temporary print file");
            }
        }

        result?;
        info!(command = %self.command, "Invoice sent to printer");
        Ok(Printed::Sent {
            command: self.command.clone(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
