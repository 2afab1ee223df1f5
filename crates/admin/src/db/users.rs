//! Storefront user repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sareine_core::UserId;

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    display_name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    photo_url: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            display_name: row.display_name,
            email: row.email,
            phone: row.phone,
            photo_url: row.photo_url,
            created_at: row.created_at,
        }
    }
}

/// Repository for storefront users.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users, oldest account first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r"
            SELECT id, display_name, email, phone, photo_url, created_at
            FROM shop.users
            ORDER BY created_at ASC NULLS LAST, id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Insert a user or replace the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, user: &User) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.users (id, display_name, email, phone, photo_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                display_name = EXCLUDED.display_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                photo_url = EXCLUDED.photo_url,
                created_at = EXCLUDED.created_at
            ",
        )
        .bind(user.id.as_str())
        .bind(user.display_name.as_deref())
        .bind(user.email.as_deref())
        .bind(user.phone.as_deref())
        .bind(user.photo_url.as_deref())
        .bind(user.created_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
