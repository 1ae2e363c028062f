//! # Salesperson Repository
//!
//! Salespersons and their commission configuration.
//!
//! The commission is stored as JSON text in the same shape the rest of the
//! system uses, or NULL when the salesperson earns none:
//!
//! ```text
//! {"type":"percentage","percentageRate":5}
//! {"type":"fixed","fixedSheetRate":2,"fixedBagRate":null}
//! ```
//!
//! Decoding goes through `Commission`'s own deserializer, so a stored fixed
//! commission with neither rate, or a negative percentage, is reported as
//! corrupt instead of loaded.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use billbook_core::{Commission, Salesperson};

/// Raw `salespersons` row.
#[derive(Debug, sqlx::FromRow)]
struct SalespersonRow {
    id: String,
    name: String,
    commission: Option<String>,
}

impl TryFrom<SalespersonRow> for Salesperson {
    type Error = DbError;

    fn try_from(row: SalespersonRow) -> Result<Self, Self::Error> {
        let commission = row
            .commission
            .as_deref()
            .map(|raw| serde_json::from_str::<Commission>(raw))
            .transpose()?;

        Ok(Salesperson {
            id: row.id,
            name: row.name,
            commission,
        })
    }
}

fn encode_commission(commission: Option<&Commission>) -> DbResult<Option<String>> {
    Ok(commission.map(serde_json::to_string).transpose()?)
}

/// Repository for salesperson database operations.
#[derive(Debug, Clone)]
pub struct SalespersonRepository {
    pool: SqlitePool,
}

impl SalespersonRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SalespersonRepository { pool }
    }

    /// Inserts a new salesperson under a freshly generated id.
    pub async fn insert(&self, salesperson: &Salesperson) -> DbResult<Salesperson> {
        let stored = Salesperson {
            id: generate_id(),
            ..salesperson.clone()
        };
        debug!(id = %stored.id, name = %stored.name, "Inserting salesperson");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO salespersons (id, name, commission, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.name)
        .bind(encode_commission(stored.commission.as_ref())?)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Salesperson>> {
        let row = sqlx::query_as::<_, SalespersonRow>(
            "SELECT id, name, commission FROM salespersons WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Salesperson::try_from).transpose()
    }

    /// Lists all salespersons, by name.
    pub async fn list(&self) -> DbResult<Vec<Salesperson>> {
        let rows = sqlx::query_as::<_, SalespersonRow>(
            r#"
            SELECT id, name, commission
            FROM salespersons
            ORDER BY name COLLATE NOCASE, created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Salesperson::try_from).collect()
    }

    pub async fn update(&self, salesperson: &Salesperson) -> DbResult<()> {
        debug!(id = %salesperson.id, "Updating salesperson");

        let result = sqlx::query(
            r#"
            UPDATE salespersons SET
                name = ?2,
                commission = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&salesperson.id)
        .bind(&salesperson.name)
        .bind(encode_commission(salesperson.commission.as_ref())?)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Salesperson", &salesperson.id));
        }

        Ok(())
    }

    /// Deletes a salesperson. Past invoices keep the name they printed.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting salesperson");

        let result = sqlx::query("DELETE FROM salespersons WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Salesperson", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::test_db;

    #[tokio::test]
    async fn test_commission_round_trip() {
        let db = test_db().await;
        let repo = db.salespersons();

        let pct = repo
            .insert(&Salesperson {
                id: String::new(),
                name: "Nadia".to_string(),
                commission: Some(Commission::percentage(5.0).unwrap()),
            })
            .await
            .unwrap();
        let fixed = repo
            .insert(&Salesperson {
                id: String::new(),
                name: "Omar".to_string(),
                commission: Some(Commission::fixed(Some(2.0), None).unwrap()),
            })
            .await
            .unwrap();
        let none = repo
            .insert(&Salesperson {
                id: String::new(),
                name: "Anis".to_string(),
                commission: None,
            })
            .await
            .unwrap();

        assert_eq!(repo.get_by_id(&pct.id).await.unwrap(), Some(pct.clone()));
        assert_eq!(repo.get_by_id(&fixed.id).await.unwrap(), Some(fixed.clone()));
        assert_eq!(repo.list().await.unwrap(), vec![none, pct, fixed]);
    }

    #[tokio::test]
    async fn test_corrupt_commission_is_reported() {
        let db = test_db().await;
        sqlx::query(
            "INSERT INTO salespersons (id, name, commission, created_at, updated_at) \
             VALUES ('s-bad', 'Bad', '{\"type\":\"fixed\"}', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            db.salespersons().get_by_id("s-bad").await,
            Err(DbError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_negative_stored_percentage_is_reported() {
        let db = test_db().await;
        sqlx::query(
            "INSERT INTO salespersons (id, name, commission, created_at, updated_at) \
             VALUES ('s-neg', 'Neg', '{\"type\":\"percentage\",\"percentageRate\":-5}', \
             '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(matches!(
            db.salespersons().get_by_id("s-neg").await,
            Err(DbError::Serialization(_))
        ));
        assert!(db.salespersons().list().await.is_err());
    }

    #[tokio::test]
    async fn test_update_clears_commission() {
        let db = test_db().await;
        let repo = db.salespersons();

        let mut stored = repo
            .insert(&Salesperson {
                id: String::new(),
                name: "Nadia".to_string(),
                commission: Some(Commission::percentage(3.0).unwrap()),
            })
            .await
            .unwrap();
        stored.commission = None;
        repo.update(&stored).await.unwrap();

        let raw: Option<String> =
            sqlx::query_scalar("SELECT commission FROM salespersons WHERE id = ?1")
                .bind(&stored.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(raw, None);
    }
}
