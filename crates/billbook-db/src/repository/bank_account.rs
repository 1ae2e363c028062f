//! # Bank Account Repository
//!
//! Bank details printed at the bottom of invoices.
//!
//! `list()` returns accounts in the order they were added. The invoice
//! document prints the FIRST one, so that order is part of the contract.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use billbook_core::BankAccount;

/// Repository for bank account database operations.
#[derive(Debug, Clone)]
pub struct BankAccountRepository {
    pool: SqlitePool,
}

impl BankAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BankAccountRepository { pool }
    }

    /// Inserts a new bank account under a freshly generated id.
    pub async fn insert(&self, account: &BankAccount) -> DbResult<BankAccount> {
        let stored = BankAccount {
            id: generate_id(),
            ..account.clone()
        };
        debug!(id = %stored.id, bank = %stored.bank_name, "Inserting bank account");

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO bank_accounts (
                id, bank_name, bank_branch, account_name, account_number,
                routing_number, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&stored.id)
        .bind(&stored.bank_name)
        .bind(&stored.bank_branch)
        .bind(&stored.account_name)
        .bind(&stored.account_number)
        .bind(&stored.routing_number)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(stored)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<BankAccount>> {
        let account = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT id, bank_name, bank_branch, account_name, account_number, routing_number
            FROM bank_accounts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists accounts, oldest first.
    pub async fn list(&self) -> DbResult<Vec<BankAccount>> {
        let accounts = sqlx::query_as::<_, BankAccount>(
            r#"
            SELECT id, bank_name, bank_branch, account_name, account_number, routing_number
            FROM bank_accounts
            ORDER BY created_at, rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    pub async fn update(&self, account: &BankAccount) -> DbResult<()> {
        debug!(id = %account.id, "Updating bank account");

        let result = sqlx::query(
            r#"
            UPDATE bank_accounts SET
                bank_name = ?2,
                bank_branch = ?3,
                account_name = ?4,
                account_number = ?5,
                routing_number = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&account.id)
        .bind(&account.bank_name)
        .bind(&account.bank_branch)
        .bind(&account.account_name)
        .bind(&account.account_number)
        .bind(&account.routing_number)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bank account", &account.id));
        }

        Ok(())
    }

    /// Deletes an account. A settings row pointing at it falls back to
    /// no default (`ON DELETE SET NULL`).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting bank account");

        let result = sqlx::query("DELETE FROM bank_accounts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Bank account", id));
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

    fn account(bank_name: &str) -> BankAccount {
        BankAccount {
            id: String::new(),
            bank_name: bank_name.to_string(),
            bank_branch: "Main".to_string(),
            account_name: "Paper Works Ltd".to_string(),
            account_number: "0012345".to_string(),
            routing_number: String::new(),
        }
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let db = test_db().await;
        let repo = db.bank_accounts();

        let first = repo.insert(&account("Zenith Bank")).await.unwrap();
        let second = repo.insert(&account("Alpha Bank")).await.unwrap();

        let listed = repo.list().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let db = test_db().await;
        let repo = db.bank_accounts();

        let mut stored = repo.insert(&account("City Bank")).await.unwrap();
        stored.routing_number = "225".to_string();
        repo.update(&stored).await.unwrap();
        assert_eq!(repo.get_by_id(&stored.id).await.unwrap(), Some(stored.clone()));

        repo.delete(&stored.id).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }
}
