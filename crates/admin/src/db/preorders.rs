//! Preorder repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use sareine_core::{Amount, PreorderId, PreorderStatus, UserId};

use super::{RepositoryError, decode_json, decode_status, encode_json};
use crate::models::{PaymentLinkRef, Preorder};

const PREORDER_COLUMNS: &str = "id, preorder_id, user_id, customer_name, customer_email, phone, \
                                amount, status, items, shipping_address, payment_link, \
                                razorpay_payment_id, created_at, updated_at";

/// Internal row type for `PostgreSQL` preorder queries.
#[derive(Debug, sqlx::FromRow)]
struct PreorderRow {
    id: String,
    preorder_id: String,
    user_id: Option<String>,
    customer_name: String,
    customer_email: String,
    phone: String,
    amount: Decimal,
    status: String,
    items: JsonValue,
    shipping_address: Option<JsonValue>,
    payment_link: Option<JsonValue>,
    razorpay_payment_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<PreorderRow> for Preorder {
    type Error = RepositoryError;

    fn try_from(row: PreorderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PreorderId::new(row.id),
            preorder_id: row.preorder_id,
            user_id: row.user_id.map(UserId::new),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            phone: row.phone,
            amount: Amount::new(row.amount),
            status: decode_status(&row.status)?,
            items: decode_json(row.items, "preorder items")?,
            shipping_address: row
                .shipping_address
                .map(|v| decode_json(v, "shipping address"))
                .transpose()?,
            payment_link: row
                .payment_link
                .map(|v| decode_json(v, "payment link"))
                .transpose()?,
            razorpay_payment_id: row.razorpay_payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for preorder database operations.
pub struct PreorderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PreorderRepository<'a> {
    /// Create a new preorder repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all preorders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self) -> Result<Vec<Preorder>, RepositoryError> {
        let rows: Vec<PreorderRow> = sqlx::query_as(&format!(
            "SELECT {PREORDER_COLUMNS} FROM shop.preorders ORDER BY created_at DESC NULLS LAST"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a preorder by document id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: &PreorderId) -> Result<Option<Preorder>, RepositoryError> {
        let row: Option<PreorderRow> = sqlx::query_as(&format!(
            "SELECT {PREORDER_COLUMNS} FROM shop.preorders WHERE id = $1"
        ))
        .bind(id.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a preorder by its customer-facing reference.
    ///
    /// Preorders without a `preorder_id` are referenced by document id.
    /// An explicit `preorder_id` match wins over a document id match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_reference(&self, reference: &str) -> Result<Option<Preorder>, RepositoryError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(None);
        }

        let row: Option<PreorderRow> = sqlx::query_as(&format!(
            r"
            SELECT {PREORDER_COLUMNS} FROM shop.preorders
            WHERE BTRIM(preorder_id) = $1 OR (BTRIM(preorder_id) = '' AND id = $1)
            ORDER BY BTRIM(preorder_id) = '' ASC
            LIMIT 1
            "
        ))
        .bind(reference)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Update a preorder's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no preorder has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: &PreorderId,
        status: PreorderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.preorders SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(id.as_str())
                .bind(status.as_str())
                .bind(at)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Mark a preorder `paid`. A `None` payment id keeps the stored one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no preorder has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_paid(
        &self,
        id: &PreorderId,
        payment_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.preorders
            SET status = $2, razorpay_payment_id = COALESCE($3, razorpay_payment_id), updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(PreorderStatus::Paid.as_str())
        .bind(payment_id)
        .bind(at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Store a sent payment link and mark the preorder `payment_link_sent`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no preorder has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn record_payment_link(
        &self,
        id: &PreorderId,
        link: &PaymentLinkRef,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let link = encode_json(link, "payment link")?;
        let result = sqlx::query(
            r"
            UPDATE shop.preorders
            SET payment_link = $2, status = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(id.as_str())
        .bind(link)
        .bind(PreorderStatus::PaymentLinkSent.as_str())
        .bind(at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert a preorder or replace the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, preorder: &Preorder) -> Result<(), RepositoryError> {
        let items = encode_json(&preorder.items, "preorder items")?;
        let shipping = preorder
            .shipping_address
            .as_ref()
            .map(|a| encode_json(a, "shipping address"))
            .transpose()?;
        let link = preorder
            .payment_link
            .as_ref()
            .map(|l| encode_json(l, "payment link"))
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO shop.preorders (id, preorder_id, user_id, customer_name, customer_email, phone,
                                        amount, status, items, shipping_address, payment_link,
                                        razorpay_payment_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (id) DO UPDATE SET
                preorder_id = EXCLUDED.preorder_id,
                user_id = EXCLUDED.user_id,
                customer_name = EXCLUDED.customer_name,
                customer_email = EXCLUDED.customer_email,
                phone = EXCLUDED.phone,
                amount = EXCLUDED.amount,
                status = EXCLUDED.status,
                items = EXCLUDED.items,
                shipping_address = EXCLUDED.shipping_address,
                payment_link = EXCLUDED.payment_link,
                razorpay_payment_id = EXCLUDED.razorpay_payment_id,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(preorder.id.as_str())
        .bind(&preorder.preorder_id)
        .bind(preorder.user_id.as_ref().map(UserId::as_str))
        .bind(&preorder.customer_name)
        .bind(&preorder.customer_email)
        .bind(&preorder.phone)
        .bind(preorder.amount.value())
        .bind(preorder.status.as_str())
        .bind(items)
        .bind(shipping)
        .bind(link)
        .bind(preorder.razorpay_payment_id.as_deref())
        .bind(preorder.created_at)
        .bind(preorder.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
