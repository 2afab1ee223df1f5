//! Email log repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use sareine_core::EmailLogId;

use super::{RepositoryError, decode_status};
use crate::models::EmailLog;

#[derive(Debug, sqlx::FromRow)]
struct EmailLogRow {
    id: String,
    kind: String,
    recipient: String,
    subject: String,
    success: bool,
    error: Option<String>,
    sent_at: DateTime<Utc>,
}

impl TryFrom<EmailLogRow> for EmailLog {
    type Error = RepositoryError;

    fn try_from(row: EmailLogRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmailLogId::new(row.id),
            kind: decode_status(&row.kind)?,
            recipient: row.recipient,
            subject: row.subject,
            success: row.success,
            error: row.error,
            sent_at: row.sent_at,
        })
    }
}

/// Repository for the append-only email log.
pub struct EmailLogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> EmailLogRepository<'a> {
    /// Create a new email log repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn append(&self, entry: &EmailLog) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO shop.email_logs (id, kind, recipient, subject, success, error, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(entry.id.as_str())
        .bind(entry.kind.as_str())
        .bind(&entry.recipient)
        .bind(&entry.subject)
        .bind(entry.success)
        .bind(entry.error.as_deref())
        .bind(entry.sent_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// The newest `limit` entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored kind is unknown.
    pub async fn recent(&self, limit: usize) -> Result<Vec<EmailLog>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<EmailLogRow> = sqlx::query_as(
            r"
            SELECT id, kind, recipient, subject, success, error, sent_at
            FROM shop.email_logs
            ORDER BY sent_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
