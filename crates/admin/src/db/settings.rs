//! Store settings database operations.
//!
//! The table holds at most one row, keyed by `id = TRUE`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::RepositoryError;
use crate::models::StoreSettings;

#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    preorder_enabled: bool,
    announcement_text: String,
    sender_name: String,
    updated_at: Option<DateTime<Utc>>,
}

impl From<SettingsRow> for StoreSettings {
    fn from(row: SettingsRow) -> Self {
        Self {
            preorder_enabled: row.preorder_enabled,
            announcement_text: row.announcement_text,
            sender_name: row.sender_name,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the settings record.
pub struct SettingsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SettingsRepository<'a> {
    /// Create a new settings repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load the settings row, if it was ever saved.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn load(&self) -> Result<Option<StoreSettings>, RepositoryError> {
        let row: Option<SettingsRow> = sqlx::query_as(
            r"
            SELECT preorder_enabled, announcement_text, sender_name, updated_at
            FROM shop.settings
            WHERE id
            ",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Overwrite the settings row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(&self, settings: &StoreSettings) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.settings (id, preorder_enabled, announcement_text, sender_name, updated_at)
            VALUES (TRUE, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                preorder_enabled = EXCLUDED.preorder_enabled,
                announcement_text = EXCLUDED.announcement_text,
                sender_name = EXCLUDED.sender_name,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(settings.preorder_enabled)
        .bind(&settings.announcement_text)
        .bind(&settings.sender_name)
        .bind(settings.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
