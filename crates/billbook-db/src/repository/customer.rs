//! # Customer Repository
//!
//! Database operations for customers.
//!
//! Deleting a customer does not touch their invoices: invoices keep the
//! name and contact details they were created with.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use billbook_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Inserts a new customer under a freshly generated id.
    ///
    /// ## Returns
    /// The stored customer, carrying its new id.
    pub async fn insert(&self, customer: &Customer) -> DbResult<Customer> {
        let stored = Customer {
            id: generate_id(),
            ..customer.clone()
        };
        debug!(id = %stored.id, name = %stored.name, "Inserting customer");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, address, phone, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.name)
        .bind(&stored.address)
        .bind(&stored.phone)
        .bind(&stored.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Gets a customer by id.
    ///
    /// ## Returns
    /// * `Ok(Some(Customer))` - Customer found
    /// * `Ok(None)` - Customer not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, address, phone, email
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers, by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, address, phone, email
            FROM customers
            ORDER BY name COLLATE NOCASE, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = customers.len(), "Listed customers");
        Ok(customers)
    }

    /// Updates an existing customer.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Customer doesn't exist
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                address = ?3,
                phone = ?4,
                email = ?5,
                updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Deletes a customer (hard delete).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
