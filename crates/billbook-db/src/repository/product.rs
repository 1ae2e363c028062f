//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Catalog vs Invoice Lines
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products table                 invoices.products (JSON)               │
//! │  ──────────────                 ────────────────────────               │
//! │  id, gsm, type, unit_price ──►  copied into each line at creation      │
//! │                                                                         │
//! │  Editing or deleting a product never changes an existing invoice.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use billbook_core::numeric::finite_or_zero;
use billbook_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product under a freshly generated id.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        let stored = Product {
            id: generate_id(),
            ..product.clone()
        };
        debug!(id = %stored.id, gsm = %stored.gsm, kind = %stored.product_type, "Inserting product");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO products (id, gsm, product_type, unit_price, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.gsm)
        .bind(stored.product_type)
        .bind(finite_or_zero(stored.unit_price))
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, gsm, product_type, unit_price
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists the catalog: sheets first, then by gsm label.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, gsm, product_type, unit_price
            FROM products
            ORDER BY product_type DESC, gsm COLLATE NOCASE, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Updates an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                gsm = ?2,
                product_type = ?3,
                unit_price = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.gsm)
        .bind(product.product_type)
        .bind(finite_or_zero(product.unit_price))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product (hard delete; invoices keep their own copy).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts catalog products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;
    use billbook_core::ProductType;

    fn product(gsm: &str, product_type: ProductType, unit_price: f64) -> Product {
        Product {
            id: String::new(),
            gsm: gsm.to_string(),
            product_type,
            unit_price,
        }
    }

    #[tokio::test]
    async fn test_product_type_round_trips_through_text_column() {
        let db = test_db().await;
        let repo = db.products();

        let bag = repo.insert(&product("70", ProductType::Bag, 2.5)).await.unwrap();
        let fetched = repo.get_by_id(&bag.id).await.unwrap().unwrap();

        assert_eq!(fetched.product_type, ProductType::Bag);
        assert_eq!(fetched.unit_price, 2.5);

        let stored_type: String =
            sqlx::query_scalar("SELECT product_type FROM products WHERE id = ?1")
                .bind(&bag.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(stored_type, "bag");
    }

    #[tokio::test]
    async fn test_list_puts_sheets_first() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&product("70", ProductType::Bag, 2.0)).await.unwrap();
        repo.insert(&product("120", ProductType::Sheet, 40.0)).await.unwrap();
        repo.insert(&product("90", ProductType::Sheet, 30.0)).await.unwrap();

        let listed = repo.list().await.unwrap();
        let kinds: Vec<ProductType> = listed.iter().map(|p| p.product_type).collect();
        assert_eq!(
            kinds,
            vec![ProductType::Sheet, ProductType::Sheet, ProductType::Bag]
        );
        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = test_db().await;
        let mut ghost = product("90", ProductType::Sheet, 1.0);
        ghost.id = generate_id();

        assert!(matches!(
            db.products().update(&ghost).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
