//! # Invoice Repository
//!
//! Persistence for finalized invoices.
//!
//! ## Invoice Mutability
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  insert()          whole record written once, id assigned here         │
//! │  apply_payment()   ONLY total_paid / final_due change, in one          │
//! │                    transaction: read → Invoice::apply_payment → write  │
//! │  delete()          hard delete, no undo                                │
//! │                                                                         │
//! │  Nothing else ever updates an invoice row.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line snapshots are stored as a JSON array in `invoices.products`.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use billbook_core::numeric::finite_or_zero;
use billbook_core::{Invoice, InvoiceProductSnapshot, ValidationError};

const SELECT_INVOICE: &str = r#"
    SELECT
        id, invoice_number, invoice_date,
        customer_id, customer_name, customer_address, customer_phone, customer_email,
        products,
        sub_total, tax_rate, tax_amount, total_amount, total_paid, final_due,
        total_square_meters,
        salesperson_id, salesperson_name, commission_amount,
        created_at
    FROM invoices
"#;

/// Raw `invoices` row.
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    id: String,
    invoice_number: String,
    invoice_date: DateTime<Utc>,
    customer_id: String,
    customer_name: String,
    customer_address: String,
    customer_phone: String,
    customer_email: String,
    products: String,
    sub_total: f64,
    tax_rate: f64,
    tax_amount: f64,
    total_amount: f64,
    total_paid: f64,
    final_due: f64,
    total_square_meters: f64,
    salesperson_id: Option<String>,
    salesperson_name: Option<String>,
    commission_amount: f64,
    created_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DbError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let products: Vec<InvoiceProductSnapshot> = serde_json::from_str(&row.products)?;

        Ok(Invoice {
            id: Some(row.id),
            invoice_number: row.invoice_number,
            invoice_date: row.invoice_date,
            customer_id: row.customer_id,
            customer_name: row.customer_name,
            customer_address: row.customer_address,
            customer_phone: row.customer_phone,
            customer_email: row.customer_email,
            products,
            sub_total: row.sub_total,
            tax_rate: row.tax_rate,
            tax_amount: row.tax_amount,
            total_amount: row.total_amount,
            total_paid: row.total_paid,
            final_due: row.final_due,
            total_square_meters: row.total_square_meters,
            salesperson_id: row.salesperson_id,
            salesperson_name: row.salesperson_name,
            commission_amount: row.commission_amount,
            created_at: row.created_at,
        })
    }
}

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Saves a newly assembled invoice under a freshly generated id.
    ///
    /// ## Returns
    /// * `Ok(Invoice)` - The stored invoice, `id` filled in
    /// * `Err(DbError::UniqueViolation)` - Invoice number already used
    /// * `Err(DbError::Validation)` - A preview was passed in
    pub async fn insert(&self, invoice: &Invoice) -> DbResult<Invoice> {
        if invoice.is_preview() {
            return Err(ValidationError::InvalidFormat {
                field: "invoice number".to_string(),
                reason: "preview invoices cannot be saved".to_string(),
            }
            .into());
        }

        let stored = Invoice {
            id: Some(generate_id()),
            ..invoice.clone()
        };
        let id = stored.id.clone().unwrap_or_default();
        let products = serde_json::to_string(&stored.products)?;

        debug!(
            id = %id,
            invoice_number = %stored.invoice_number,
            lines = stored.products.len(),
            "Inserting invoice"
        );

        let result = sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, invoice_date,
                customer_id, customer_name, customer_address, customer_phone, customer_email,
                products,
                sub_total, tax_rate, tax_amount, total_amount, total_paid, final_due,
                total_square_meters,
                salesperson_id, salesperson_name, commission_amount,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7, ?8,
                ?9,
                ?10, ?11, ?12, ?13, ?14, ?15,
                ?16,
                ?17, ?18, ?19,
                ?20, ?20
            )
            "#,
        )
        .bind(&id)
        .bind(&stored.invoice_number)
        .bind(stored.invoice_date)
        .bind(&stored.customer_id)
        .bind(&stored.customer_name)
        .bind(&stored.customer_address)
        .bind(&stored.customer_phone)
        .bind(&stored.customer_email)
        .bind(products)
        .bind(finite_or_zero(stored.sub_total))
        .bind(finite_or_zero(stored.tax_rate))
        .bind(finite_or_zero(stored.tax_amount))
        .bind(finite_or_zero(stored.total_amount))
        .bind(finite_or_zero(stored.total_paid))
        .bind(finite_or_zero(stored.final_due))
        .bind(finite_or_zero(stored.total_square_meters))
        .bind(&stored.salesperson_id)
        .bind(&stored.salesperson_name)
        .bind(finite_or_zero(stored.commission_amount))
        .bind(stored.created_at)
        .execute(&self.pool)
        .await;

        if let Err(err) = result {
            return Err(match DbError::from(err) {
                DbError::UniqueViolation { .. } => {
                    DbError::duplicate("invoice number", &stored.invoice_number)
                }
                other => other,
            });
        }

        info!(
            id = %id,
            invoice_number = %stored.invoice_number,
            total = stored.total_amount,
            "Invoice saved"
        );
        Ok(stored)
    }

    /// Gets an invoice by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!("{} WHERE id = ?1", SELECT_INVOICE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Lists all invoices, newest first.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_INVOICE
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed invoices");
        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// Records a payment against an invoice.
    ///
    /// ## Transaction
    /// ```text
    /// BEGIN
    ///   SELECT invoice              (current total_paid)
    ///   Invoice::apply_payment()    (total_paid += amount,
    ///                                final_due = total_amount - total_paid)
    ///   UPDATE total_paid, final_due
    /// COMMIT
    /// ```
    ///
    /// ## Returns
    /// * `Ok(Invoice)` - The updated invoice
    /// * `Err(DbError::NotFound)` - No such invoice (nothing written)
    /// * `Err(DbError::Validation)` - Amount is not a finite number
    pub async fn apply_payment(&self, id: &str, amount: f64) -> DbResult<Invoice> {
        debug!(id = %id, amount = amount, "Applying payment");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let row = sqlx::query_as::<_, InvoiceRow>(&format!("{} WHERE id = ?1", SELECT_INVOICE))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        // Dropping `tx` on any early return rolls it back.
        let current = match row {
            Some(row) => Invoice::try_from(row)?,
            None => return Err(DbError::not_found("Invoice", id)),
        };
        let updated = current.apply_payment(amount)?;

        sqlx::query(
            r#"
            UPDATE invoices SET
                total_paid = ?2,
                final_due = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(updated.total_paid)
        .bind(updated.final_due)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            id = %id,
            invoice_number = %updated.invoice_number,
            total_paid = updated.total_paid,
            final_due = updated.final_due,
            "Payment recorded"
        );
        Ok(updated)
    }

    /// Deletes an invoice permanently.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM invoices WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        info!(id = %id, "Invoice deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
