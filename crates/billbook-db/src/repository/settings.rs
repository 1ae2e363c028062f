//! # Settings Repository
//!
//! The business profile lives in a single row (`id = 1`). Reading before
//! the first save returns defaults rather than an error, so a fresh
//! install can still calculate and print.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use billbook_core::numeric::finite_or_zero;
use billbook_core::BusinessSettings;

/// Repository for the business settings row.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Returns the saved settings, or defaults if never saved.
    pub async fn get(&self) -> DbResult<BusinessSettings> {
        let settings = sqlx::query_as::<_, BusinessSettings>(
            r#"
            SELECT
                name, office_address, factory_address, phone, email,
                logo_url, tax_rate, default_bank_account_id
            FROM business_settings
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match settings {
            Some(settings) => Ok(settings),
            None => {
                debug!("No business settings saved yet, using defaults");
                Ok(BusinessSettings::default())
            }
        }
    }

    /// Saves (inserts or replaces) the settings row.
    ///
    /// ## Errors
    /// `DbError::ForeignKeyViolation` if `default_bank_account_id` names an
    /// account that doesn't exist.
    pub async fn save(&self, settings: &BusinessSettings) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO business_settings (
                id, name, office_address, factory_address, phone, email,
                logo_url, tax_rate, default_bank_account_id, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                office_address = excluded.office_address,
                factory_address = excluded.factory_address,
                phone = excluded.phone,
                email = excluded.email,
                logo_url = excluded.logo_url,
                tax_rate = excluded.tax_rate,
                default_bank_account_id = excluded.default_bank_account_id,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&settings.name)
        .bind(&settings.office_address)
        .bind(&settings.factory_address)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.logo_url)
        .bind(finite_or_zero(settings.tax_rate))
        .bind(&settings.default_bank_account_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(name = %settings.name, tax_rate = settings.tax_rate, "Business settings saved");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
