//! # Command Handlers
//!
//! One module per command group. Handlers receive the shared
//! [`Context`] and a writer for their output, so tests can capture what
//! a command prints.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ← This file (context, dispatch, comfy-table output)
//! ├── customer.rs     ← customer add | list | delete
//! ├── product.rs      ← product add | list | delete
//! ├── salesperson.rs  ← salesperson add | list | delete
//! ├── bank.rs         ← bank add | list | delete
//! ├── settings.rs     ← settings show | set
//! ├── invoice.rs      ← invoice totals | preview | create | list | show |
//! │                     pay | print | delete
//! └── report.rs       ← report invoices | customers | commission
//! ```

pub mod bank;
pub mod customer;
pub mod invoice;
pub mod product;
pub mod report;
pub mod salesperson;
pub mod settings;

use billbook_db::Database;
use comfy_table::{presets, Table};
use serde::Serialize;
use std::io::Write;

use crate::config::AppConfig;
use crate::error::AppResult;
use crate::Command;

/// Everything a command needs.
pub struct Context {
    pub db: Database,
    pub config: AppConfig,
    /// Print records as JSON rather than tables.
    pub json: bool,
}

/// Routes a parsed command to its group handler.
pub async fn dispatch(ctx: &Context, command: Command, out: &mut dyn Write) -> AppResult<()> {
    match command {
        Command::Customer(cmd) => customer::run(ctx, cmd, out).await,
        Command::Product(cmd) => product::run(ctx, cmd, out).await,
        Command::Salesperson(cmd) => salesperson::run(ctx, cmd, out).await,
        Command::Bank(cmd) => bank::run(ctx, cmd, out).await,
        Command::Settings(cmd) => settings::run(ctx, cmd, out).await,
        Command::Invoice(cmd) => invoice::run(ctx, cmd, out).await,
        Command::Report(cmd) => report::run(ctx, cmd, out).await,
    }
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Writes `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> AppResult<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// A borderless table: no frame, no header rule.
pub(crate) fn plain_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::NOTHING);
    table
}

/// Writes `table` with two spaces between columns and no trailing
/// whitespace.
pub(crate) fn write_rendered(out: &mut dyn Write, table: &mut Table) -> AppResult<()> {
    for column in table.column_iter_mut() {
        column.set_padding((0, 2));
    }
    for line in table.lines() {
        writeln!(out, "{}", line.trim_end())?;
    }
    Ok(())
}

/// Writes a header row followed by `rows`, left-aligned.
pub(crate) fn write_table(
    out: &mut dyn Write,
    headers: &[&str],
    rows: &[Vec<String>],
) -> AppResult<()> {
    let mut table = plain_table();
    table.set_header(headers.iter().copied());
    for row in rows {
        table.add_row(row);
    }
    write_rendered(out, &mut table)
}

/// Either the listed records as JSON or the table built from them.
pub(crate) fn write_records<T: Serialize>(
    ctx: &Context,
    out: &mut dyn Write,
    records: &[T],
    headers: &[&str],
    row: impl Fn(&T) -> Vec<String>,
) -> AppResult<()> {
    if ctx.json {
        return write_json(out, records);
    }
    if records.is_empty() {
        writeln!(out, "(none)")?;
        return Ok(());
    }
    let rows: Vec<Vec<String>> = records.iter().map(row).collect();
    write_table(out, headers, &rows)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use billbook_db::DbConfig;

    pub async fn context() -> Context {
        let db = Database::new(DbConfig::in_memory())
            .await
            .expect("Failed to create test database");
        Context {
            db,
            config: AppConfig::default(),
            json: false,
        }
    }

    pub fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).expect("output is utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_table_aligns_columns() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            &["ID", "NAME"],
            &[
                vec!["1".to_string(), "Rahman Traders".to_string()],
                vec!["22".to_string(), "Karim".to_string()],
            ],
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID  NAME");
        assert_eq!(lines[1], "1   Rahman Traders");
        assert_eq!(lines[2], "22  Karim");
    }

    #[test]
    fn test_write_table_keeps_empty_cells_aligned() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            &["ID", "NAME", "PHONE"],
            &[
                vec!["1".to_string(), String::new(), "555".to_string()],
                vec!["2".to_string(), "Karim".to_string(), String::new()],
            ],
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  NAME   PHONE");
        assert_eq!(lines[1], "1          555");
        assert_eq!(lines[2], "2   Karim");
    }
}
